//! Normalized weather bundle rendered as the widget card
//!
//! The card combines three separate provider calls (current conditions,
//! 5-day/3-hour forecast, current air pollution) keyed to one place. The
//! temperature block mixes sources: `value` comes from current conditions
//! while `min`/`max` come from the forecast feed, so `min <= value <= max`
//! can be violated in practice.

use serde::{Deserialize, Serialize};

/// City block of the weather card
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CityInfo {
    pub name: String,
    pub country: String,
    /// Sunrise as a unix timestamp (seconds)
    pub sunrise: i64,
    /// Sunset as a unix timestamp (seconds)
    pub sunset: i64,
    /// UTC offset in seconds
    pub timezone: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Temperature {
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub feels_like: f64,
    pub unit: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Humidity {
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Pressure {
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WindSpeed {
    pub value: f64,
    pub unit: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WindDirection {
    /// Direction in degrees (0-360, where 0/360 is North)
    pub value: f64,
    /// Compass code, e.g. "NNE"
    pub code: String,
    /// Compass name, e.g. "North-northeast"
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Wind {
    pub speed: WindSpeed,
    pub direction: WindDirection,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Clouds {
    /// Cloud cover percentage (0-100)
    pub value: f64,
    /// Condition description, e.g. "scattered clouds"
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Visibility {
    /// Visibility in kilometers
    pub value: f64,
}

/// Air quality components in µg/m³
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AirQualityComponents {
    pub co: f64,
    pub no2: f64,
    pub o3: f64,
    pub pm2_5: f64,
    pub pm10: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AirQuality {
    /// AQI on the provider's 1-5 scale (Good..Very Poor)
    pub index: u8,
    pub components: AirQualityComponents,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DayTemperature {
    pub day: f64,
    pub min: f64,
    pub max: f64,
    pub night: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DayCondition {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// One forecast slot of the card
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DayForecast {
    /// Unix timestamp (seconds) of the slot
    pub dt: i64,
    pub temp: DayTemperature,
    pub weather: DayCondition,
    /// Probability of precipitation (0.0-1.0)
    pub pop: f64,
    pub humidity: f64,
}

/// The full widget card
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherCard {
    pub city: CityInfo,
    pub temperature: Temperature,
    pub humidity: Humidity,
    pub pressure: Pressure,
    pub wind: Wind,
    pub clouds: Clouds,
    pub visibility: Visibility,
    #[serde(rename = "airQuality")]
    pub air_quality: AirQuality,
    pub forecast: Vec<DayForecast>,
}

/// Convert wind direction degrees to a 16-point compass code
#[must_use]
pub fn wind_direction_code(degrees: f64) -> &'static str {
    let normalized = degrees.rem_euclid(360.0);
    let sector = ((normalized + 11.25) / 22.5) as usize % 16;
    [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ][sector]
}

/// Convert wind direction degrees to a compass name
#[must_use]
pub fn wind_direction_name(degrees: f64) -> &'static str {
    let normalized = degrees.rem_euclid(360.0);
    let sector = ((normalized + 11.25) / 22.5) as usize % 16;
    [
        "North",
        "North-northeast",
        "Northeast",
        "East-northeast",
        "East",
        "East-southeast",
        "Southeast",
        "South-southeast",
        "South",
        "South-southwest",
        "Southwest",
        "West-southwest",
        "West",
        "West-northwest",
        "Northwest",
        "North-northwest",
    ][sector]
}

/// Human-readable AQI label on the provider's 1-5 scale
#[must_use]
pub fn aqi_label(index: u8) -> &'static str {
    match index {
        5 => "Very Poor",
        4 => "Poor",
        3 => "Moderate",
        _ => "Good",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, "N")]
    #[case(359.9, "N")]
    #[case(22.5, "NNE")]
    #[case(45.0, "NE")]
    #[case(90.0, "E")]
    #[case(180.0, "S")]
    #[case(270.0, "W")]
    #[case(337.5, "NNW")]
    fn test_wind_direction_code(#[case] degrees: f64, #[case] expected: &str) {
        assert_eq!(wind_direction_code(degrees), expected);
    }

    #[test]
    fn test_wind_direction_name() {
        assert_eq!(wind_direction_name(0.0), "North");
        assert_eq!(wind_direction_name(225.0), "Southwest");
    }

    #[rstest]
    #[case(1, "Good")]
    #[case(2, "Good")]
    #[case(3, "Moderate")]
    #[case(4, "Poor")]
    #[case(5, "Very Poor")]
    fn test_aqi_label(#[case] index: u8, #[case] expected: &str) {
        assert_eq!(aqi_label(index), expected);
    }
}
