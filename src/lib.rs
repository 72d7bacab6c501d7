//! `TripScout` - conversational travel and weather assistant backend
//!
//! This library implements the chat pipeline behind the map assistant:
//! intent classification, location resolution, enrichment from weather,
//! air quality, points-of-interest and news providers, prompt assembly for
//! the hosted language model, and shaping of the reply for the map UI.

pub mod api;
pub mod chat;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod spiral;
pub mod store;
pub mod web;

// Re-export core types for public API
pub use chat::{ChatOrchestrator, Intent};
pub use clients::{ChatModel, FetchError, FetchResult, Geocoder, NewsApi, PlacesApi, WeatherApi};
pub use config::TripScoutConfig;
pub use error::TripScoutError;
pub use models::{Article, ChatReply, ChatResponseData, Location, PointOfInterest, WeatherCard};
pub use spiral::SpiralWeatherLocator;
pub use store::{Cache, KeyValueStore, MemoryStore, PersistentStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripScoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
