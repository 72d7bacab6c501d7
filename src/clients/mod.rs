//! Typed clients for the upstream providers
//!
//! Each collaborator sits behind a trait so the orchestrator can be driven
//! by in-memory fakes in tests: geocoding, weather/air quality, places,
//! news, and the hosted language model. The reqwest implementations share
//! one HTTP client built from the provider configuration.

pub mod error;
pub mod geocoding;
pub mod model;
pub mod news;
pub mod places;
pub mod weather;

pub use error::{FetchError, FetchResult};
pub use geocoding::{GeocodedPlace, Geocoder, OpenWeatherGeocoder};
pub use model::{ChatModel, GeminiChatModel};
pub use news::{NewsApi, NewsApiClient, NewsQuota, NewsService};
pub use places::{OverpassClient, PlacesApi};
pub use weather::{
    AirPollutionSample, CityBlock, CurrentConditions, ForecastBundle, ForecastEntry,
    OpenWeatherClient, WeatherApi,
};

use crate::config::ProvidersConfig;
use anyhow::{Context, Result};
use std::time::Duration;

/// Build the shared HTTP client used by every provider implementation.
pub fn http_client(config: &ProvidersConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds.into()))
        .user_agent(concat!("tripscout/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}
