//! Forward and reverse geocoding against the OpenWeatherMap geo API

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{FetchError, FetchResult};
use crate::config::ProvidersConfig;

/// First geocoding hit for a place name
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Place-name to coordinates resolution and back.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a free-text place name to its best-match coordinates.
    /// `Ok(None)` means the provider answered with no results.
    async fn forward(&self, place: &str) -> FetchResult<Option<GeocodedPlace>>;

    /// Resolve coordinates to a display name, first result only.
    async fn reverse(&self, lat: f64, lng: f64) -> FetchResult<Option<String>>;
}

/// Raw geocoding row from the provider
#[derive(Debug, Deserialize)]
struct GeoRow {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    city: Option<String>,
    lat: f64,
    lon: f64,
}

pub struct OpenWeatherGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherGeocoder {
    #[must_use]
    pub fn new(client: reqwest::Client, config: &ProvidersConfig) -> Self {
        Self {
            client,
            base_url: config.geo_base_url.clone(),
            api_key: config.openweather_api_key.clone(),
        }
    }

    fn api_key(&self) -> FetchResult<&str> {
        self.api_key
            .as_deref()
            .ok_or(FetchError::MissingApiKey {
                provider: "openweather",
            })
    }

    async fn fetch_rows(&self, url: String) -> FetchResult<Vec<GeoRow>> {
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Geocoder for OpenWeatherGeocoder {
    #[instrument(skip(self))]
    async fn forward(&self, place: &str) -> FetchResult<Option<GeocodedPlace>> {
        let url = format!(
            "{}/direct?q={}&limit=1&appid={}&lang=en",
            self.base_url,
            urlencoding::encode(place),
            self.api_key()?
        );
        let rows = self.fetch_rows(url).await?;
        debug!("Geocoding '{}' returned {} rows", place, rows.len());

        Ok(rows.into_iter().next().map(|row| GeocodedPlace {
            name: row.name.or(row.city).unwrap_or_else(|| place.to_string()),
            lat: row.lat,
            lng: row.lon,
        }))
    }

    #[instrument(skip(self))]
    async fn reverse(&self, lat: f64, lng: f64) -> FetchResult<Option<String>> {
        let url = format!(
            "{}/reverse?lat={lat}&lon={lng}&limit=1&appid={}&lang=en",
            self.base_url,
            self.api_key()?
        );
        let rows = self.fetch_rows(url).await?;

        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.name.or(row.city).unwrap_or_else(|| "this spot".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_row_falls_back_to_city_field() {
        let json = r#"[{"city": "Lyon", "lat": 45.76, "lon": 4.84}]"#;
        let rows: Vec<GeoRow> = serde_json::from_str(json).unwrap();
        let row = &rows[0];
        assert!(row.name.is_none());
        assert_eq!(row.city.as_deref(), Some("Lyon"));
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let config = ProvidersConfig::default();
        let geocoder = OpenWeatherGeocoder::new(reqwest::Client::new(), &config);
        assert!(matches!(
            geocoder.api_key(),
            Err(FetchError::MissingApiKey { .. })
        ));
    }
}
