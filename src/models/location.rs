//! Location model for geographic coordinates

use serde::{Deserialize, Serialize};

/// A coordinate pair on the map. Produced by geolocation, geocoding, or a
/// dropped marker; consumed by every client as a query parameter.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lng: f64,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both coordinates are within valid bounds
    #[must_use]
    pub fn in_bounds(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    /// Format location as a coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lng)
    }

    /// Round coordinates for cache key generation
    #[must_use]
    pub fn rounded_coordinates(&self, precision: u32) -> (f64, f64) {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(4));
        let lat = (self.lat * multiplier).round() / multiplier;
        let lng = (self.lng * multiplier).round() / multiplier;
        (lat, lng)
    }

    /// Generate a cache key fragment for this location
    #[must_use]
    pub fn cache_key(&self) -> String {
        let (lat, lng) = self.rounded_coordinates(2);
        format!("{lat:.2}:{lng:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_cache_key() {
        let location = Location::new(46.8182, 8.2275);
        assert_eq!(location.cache_key(), "46.82:8.23");
    }

    #[test]
    fn test_location_rounded_coordinates() {
        let location = Location::new(46.818_234, 8.227_456);
        let (lat, lng) = location.rounded_coordinates(2);
        assert_eq!(lat, 46.82);
        assert_eq!(lng, 8.23);
    }

    #[test]
    fn test_bounds_check() {
        assert!(Location::new(46.8, 8.2).in_bounds());
        assert!(Location::new(-90.0, 180.0).in_bounds());
        assert!(!Location::new(91.0, 8.2).in_bounds());
        assert!(!Location::new(46.8, -181.0).in_bounds());
    }
}
