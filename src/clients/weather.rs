//! Weather and air quality clients for the OpenWeatherMap API
//!
//! Four independent endpoints: current conditions, the 5-day/3-hour
//! forecast, current air pollution, and forecast air pollution. Each call
//! validates the provider's own success marker before returning; a payload
//! that fails the check is a provider error, never a partial answer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{FetchError, FetchResult};
use crate::config::ProvidersConfig;

/// Shared measurement block of current and forecast payloads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MainMeasurements {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: f64,
    #[serde(default)]
    pub temp_min: f64,
    #[serde(default)]
    pub temp_max: f64,
    #[serde(default)]
    pub pressure: f64,
    #[serde(default)]
    pub humidity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionTag {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindBlock {
    pub speed: f64,
    #[serde(default)]
    pub deg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CloudsBlock {
    /// Cloud cover percentage (0-100)
    pub all: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SysBlock {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sunrise: i64,
    #[serde(default)]
    pub sunset: i64,
}

/// Current conditions payload (`/weather`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentConditions {
    pub main: MainMeasurements,
    pub weather: Vec<ConditionTag>,
    pub wind: WindBlock,
    pub clouds: CloudsBlock,
    pub sys: SysBlock,
    /// UTC offset in seconds
    #[serde(default)]
    pub timezone: i64,
    /// Visibility in meters
    #[serde(default)]
    pub visibility: f64,
    #[serde(default)]
    pub name: Option<String>,
}

/// Rain volume block of a forecast entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RainBlock {
    /// Accumulation over the 3-hour bucket, in mm
    #[serde(rename = "3h", default)]
    pub three_hour: f64,
}

/// One 3-hour slot of the forecast feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastEntry {
    pub dt: i64,
    pub main: MainMeasurements,
    pub weather: Vec<ConditionTag>,
    pub wind: WindBlock,
    pub clouds: CloudsBlock,
    #[serde(default)]
    pub pop: f64,
    #[serde(default)]
    pub rain: Option<RainBlock>,
    /// Visibility in meters
    #[serde(default)]
    pub visibility: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CityBlock {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sunrise: i64,
    #[serde(default)]
    pub sunset: i64,
    #[serde(default)]
    pub timezone: i64,
}

/// Forecast payload (`/forecast`): 5 days of 3-hour slots plus city metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastBundle {
    pub list: Vec<ForecastEntry>,
    pub city: CityBlock,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AqiBlock {
    pub aqi: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollutantComponents {
    pub co: f64,
    pub no2: f64,
    pub o3: f64,
    pub pm2_5: f64,
    pub pm10: f64,
}

/// One air pollution sample (current or one forecast hour)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AirPollutionSample {
    #[serde(default)]
    pub dt: i64,
    pub main: AqiBlock,
    pub components: PollutantComponents,
}

/// Weather-family provider calls, all keyed by a coordinate pair.
#[async_trait]
pub trait WeatherApi: Send + Sync {
    async fn current(&self, lat: f64, lng: f64) -> FetchResult<CurrentConditions>;
    async fn forecast(&self, lat: f64, lng: f64) -> FetchResult<ForecastBundle>;
    async fn air_pollution(&self, lat: f64, lng: f64) -> FetchResult<AirPollutionSample>;
    async fn air_pollution_forecast(
        &self,
        lat: f64,
        lng: f64,
    ) -> FetchResult<Vec<AirPollutionSample>>;
}

// The provider's success marker rides inside the payload: `cod` is a
// number on the current endpoint and a string on the forecast endpoint.

fn cod_as_u16(value: &serde_json::Value) -> u16 {
    match value.get("cod") {
        Some(serde_json::Value::Number(n)) => n.as_u64().unwrap_or_default() as u16,
        Some(serde_json::Value::String(s)) => s.parse().unwrap_or_default(),
        _ => 0,
    }
}

#[derive(Debug, Deserialize)]
struct PollutionEnvelope {
    #[serde(default)]
    list: Vec<AirPollutionSample>,
}

pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherClient {
    #[must_use]
    pub fn new(client: reqwest::Client, config: &ProvidersConfig) -> Self {
        Self {
            client,
            base_url: config.weather_base_url.clone(),
            api_key: config.openweather_api_key.clone(),
        }
    }

    fn api_key(&self) -> FetchResult<&str> {
        self.api_key.as_deref().ok_or(FetchError::MissingApiKey {
            provider: "openweather",
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> FetchResult<T> {
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn current(&self, lat: f64, lng: f64) -> FetchResult<CurrentConditions> {
        let url = format!(
            "{}/weather?lat={lat}&lon={lng}&appid={}&units=metric&lang=en",
            self.base_url,
            self.api_key()?
        );
        let value: serde_json::Value = self.get_json(url).await?;
        let cod = cod_as_u16(&value);
        if cod != 200 {
            return Err(FetchError::provider(format!(
                "current weather cod was {cod}"
            )));
        }
        serde_json::from_value(value).map_err(|e| FetchError::decode(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn forecast(&self, lat: f64, lng: f64) -> FetchResult<ForecastBundle> {
        let url = format!(
            "{}/forecast?lat={lat}&lon={lng}&appid={}&units=metric&lang=en",
            self.base_url,
            self.api_key()?
        );
        let value: serde_json::Value = self.get_json(url).await?;
        let cod = cod_as_u16(&value);
        if cod != 200 {
            return Err(FetchError::provider(format!("forecast cod was {cod}")));
        }
        serde_json::from_value(value).map_err(|e| FetchError::decode(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn air_pollution(&self, lat: f64, lng: f64) -> FetchResult<AirPollutionSample> {
        let url = format!(
            "{}/air_pollution?lat={lat}&lon={lng}&appid={}&lang=en",
            self.base_url,
            self.api_key()?
        );
        let envelope: PollutionEnvelope = self.get_json(url).await?;
        envelope
            .list
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::provider("air pollution list was empty"))
    }

    #[instrument(skip(self))]
    async fn air_pollution_forecast(
        &self,
        lat: f64,
        lng: f64,
    ) -> FetchResult<Vec<AirPollutionSample>> {
        let url = format!(
            "{}/air_pollution/forecast?lat={lat}&lon={lng}&appid={}&lang=en",
            self.base_url,
            self.api_key()?
        );
        let envelope: PollutionEnvelope = self.get_json(url).await?;
        if envelope.list.is_empty() {
            return Err(FetchError::provider("air pollution forecast was empty"));
        }
        Ok(envelope.list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_entry_reads_rain_bucket() {
        let json = r#"{
            "dt": 1700000000,
            "main": {"temp": 12.5, "feels_like": 11.0, "temp_min": 10.0, "temp_max": 14.0, "pressure": 1012, "humidity": 60},
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
            "wind": {"speed": 3.4, "deg": 210},
            "clouds": {"all": 75},
            "pop": 0.6,
            "rain": {"3h": 1.2},
            "visibility": 10000
        }"#;
        let entry: ForecastEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.rain.unwrap().three_hour, 1.2);
        assert_eq!(entry.clouds.all, 75.0);
    }

    #[test]
    fn test_cod_marker_read_as_number_or_string() {
        let current: serde_json::Value =
            serde_json::from_str(r#"{"cod": 404, "message": "city not found"}"#).unwrap();
        assert_eq!(cod_as_u16(&current), 404);

        let forecast: serde_json::Value = serde_json::from_str(r#"{"cod": "200"}"#).unwrap();
        assert_eq!(cod_as_u16(&forecast), 200);

        let missing: serde_json::Value = serde_json::from_str("{}").unwrap();
        assert_eq!(cod_as_u16(&missing), 0);
    }

    #[test]
    fn test_pollution_sample_components() {
        let json = r#"{
            "dt": 1700000000,
            "main": {"aqi": 3},
            "components": {"co": 201.9, "no2": 13.0, "o3": 68.7, "pm2_5": 5.4, "pm10": 7.1}
        }"#;
        let sample: AirPollutionSample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.main.aqi, 3);
        assert_eq!(sample.components.pm2_5, 5.4);
    }
}
