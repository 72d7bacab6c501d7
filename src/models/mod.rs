//! Data models for the `TripScout` application
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates and cache keys
//! - Poi: Points of interest shown as map markers
//! - Weather: The normalized weather widget card
//! - News: Articles and the daily request tracker
//! - Chat: Conversation messages and the per-turn reply envelope

pub mod chat;
pub mod location;
pub mod news;
pub mod poi;
pub mod weather;

// Re-export all public types for convenient access
pub use chat::{ChatMessage, ChatReply, ChatResponseData, ChatTurn, Sender, TurnRole};
pub use location::Location;
pub use news::{Article, ArticleSource, NewsRequestTracker};
pub use poi::{PoiCategory, PointOfInterest};
pub use weather::{
    AirQuality, CityInfo, Clouds, DayForecast, DayTemperature, Humidity, Pressure, Temperature,
    Visibility, WeatherCard, Wind, WindDirection, WindSpeed,
};
