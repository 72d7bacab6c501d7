//! Points of interest shown as map markers

use serde::{Deserialize, Serialize};

/// Semantic category of a point of interest.
///
/// `WeatherSuggestion` is the sentinel used for spiral-search results; those
/// markers carry a `priority` encoding their rank.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PoiCategory {
    #[serde(rename = "attraction")]
    Attraction,
    #[serde(rename = "restaurant")]
    Restaurant,
    #[serde(rename = "park")]
    Park,
    #[serde(rename = "pub")]
    Pub,
    #[serde(rename = "museum")]
    Museum,
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "Weather Suggestion")]
    WeatherSuggestion,
}

/// A named, categorized, geolocated place of potential visitor interest.
///
/// One set of these is produced per chat response and replaces the previous
/// set in the UI; there is no merge or accumulation across turns.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PointOfInterest {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    pub category: PoiCategory,
    /// Rank 1..5 for weather-suggestion markers, absent otherwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_suggestion_serializes_with_sentinel_label() {
        let poi = PointOfInterest {
            id: "spiral-0".to_string(),
            lat: 48.85,
            lng: 2.35,
            name: "Paris".to_string(),
            category: PoiCategory::WeatherSuggestion,
            priority: Some(1),
        };
        let json = serde_json::to_value(&poi).unwrap();
        assert_eq!(json["category"], "Weather Suggestion");
        assert_eq!(json["priority"], 1);
    }

    #[test]
    fn test_priority_omitted_when_absent() {
        let poi = PointOfInterest {
            id: "42".to_string(),
            lat: 48.85,
            lng: 2.35,
            name: "Louvre".to_string(),
            category: PoiCategory::Museum,
            priority: None,
        };
        let json = serde_json::to_string(&poi).unwrap();
        assert!(!json.contains("priority"));
        assert!(json.contains("\"museum\""));
    }
}
