//! Nearby points of interest via an Overpass spatial query
//!
//! One query unions five category filters (tourist attraction, restaurant,
//! park, pub, museum) around a center point. Coordinates are validated
//! before the request goes out; at most 10 elements come back.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use super::{FetchError, FetchResult};
use crate::config::ProvidersConfig;
use crate::models::{Location, PoiCategory, PointOfInterest};

const MAX_RESULTS: usize = 10;

/// Spatial POI lookup around a coordinate pair.
#[async_trait]
pub trait PlacesApi: Send + Sync {
    /// Points of interest within `radius_km` of the center, at most 10.
    async fn nearby(
        &self,
        lat: f64,
        lng: f64,
        radius_km: f64,
    ) -> FetchResult<Vec<PointOfInterest>>;
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    id: u64,
    lat: f64,
    lon: f64,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

fn categorize(tags: &HashMap<String, String>) -> PoiCategory {
    match (
        tags.get("tourism").map(String::as_str),
        tags.get("amenity").map(String::as_str),
        tags.get("leisure").map(String::as_str),
    ) {
        (Some("attraction"), _, _) => PoiCategory::Attraction,
        (Some("museum"), _, _) => PoiCategory::Museum,
        (_, Some("restaurant"), _) => PoiCategory::Restaurant,
        (_, Some("pub"), _) => PoiCategory::Pub,
        (_, _, Some("park")) => PoiCategory::Park,
        _ => PoiCategory::Unknown,
    }
}

pub struct OverpassClient {
    client: reqwest::Client,
    url: String,
}

impl OverpassClient {
    #[must_use]
    pub fn new(client: reqwest::Client, config: &ProvidersConfig) -> Self {
        Self {
            client,
            url: config.overpass_url.clone(),
        }
    }

    fn build_query(lat: f64, lng: f64, radius_km: f64) -> String {
        let radius_m = radius_km * 1000.0;
        format!(
            "[out:json][timeout:25];( \
             node[\"tourism\"=\"attraction\"](around:{radius_m},{lat},{lng}); \
             node[\"amenity\"=\"restaurant\"](around:{radius_m},{lat},{lng}); \
             node[\"leisure\"=\"park\"](around:{radius_m},{lat},{lng}); \
             node[\"amenity\"=\"pub\"](around:{radius_m},{lat},{lng}); \
             node[\"tourism\"=\"museum\"](around:{radius_m},{lat},{lng}); \
             );out body;"
        )
    }
}

#[async_trait]
impl PlacesApi for OverpassClient {
    #[instrument(skip(self))]
    async fn nearby(
        &self,
        lat: f64,
        lng: f64,
        radius_km: f64,
    ) -> FetchResult<Vec<PointOfInterest>> {
        if !Location::new(lat, lng).in_bounds() {
            return Err(FetchError::invalid_request(format!(
                "coordinates out of bounds: {lat}, {lng}"
            )));
        }

        let query = Self::build_query(lat, lng, radius_km);
        let response = self
            .client
            .post(&self.url)
            .form(&[("data", query.as_str())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }

        let body: OverpassResponse = response.json().await?;
        debug!(
            "Overpass returned {} elements within {:.1} km",
            body.elements.len(),
            radius_km
        );

        Ok(body
            .elements
            .into_iter()
            .take(MAX_RESULTS)
            .map(|element| {
                let category = categorize(&element.tags);
                PointOfInterest {
                    id: element.id.to_string(),
                    lat: element.lat,
                    lng: element.lon,
                    name: element
                        .tags
                        .get("name")
                        .cloned()
                        .unwrap_or_else(|| "Unnamed".to_string()),
                    category,
                    priority: None,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_categorize_by_tag() {
        assert_eq!(
            categorize(&tags(&[("tourism", "attraction")])),
            PoiCategory::Attraction
        );
        assert_eq!(
            categorize(&tags(&[("amenity", "restaurant")])),
            PoiCategory::Restaurant
        );
        assert_eq!(categorize(&tags(&[("leisure", "park")])), PoiCategory::Park);
        assert_eq!(categorize(&tags(&[("amenity", "pub")])), PoiCategory::Pub);
        assert_eq!(
            categorize(&tags(&[("tourism", "museum")])),
            PoiCategory::Museum
        );
        assert_eq!(categorize(&tags(&[("shop", "bakery")])), PoiCategory::Unknown);
    }

    #[test]
    fn test_query_unions_all_five_filters() {
        let query = OverpassClient::build_query(48.85, 2.35, 2.0);
        assert!(query.contains("around:2000,48.85,2.35"));
        for filter in [
            "\"tourism\"=\"attraction\"",
            "\"amenity\"=\"restaurant\"",
            "\"leisure\"=\"park\"",
            "\"amenity\"=\"pub\"",
            "\"tourism\"=\"museum\"",
        ] {
            assert!(query.contains(filter), "missing filter {filter}");
        }
    }

    #[tokio::test]
    async fn test_out_of_bounds_coordinates_rejected_before_request() {
        let config = ProvidersConfig::default();
        let client = OverpassClient::new(reqwest::Client::new(), &config);
        let result = client.nearby(91.0, 2.35, 5.0).await;
        assert!(matches!(result, Err(FetchError::InvalidRequest { .. })));
    }
}
