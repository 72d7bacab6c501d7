//! Configuration management for the `TripScout` application
//!
//! Handles loading configuration from files and environment variables,
//! with serde defaults for every setting so a bare deployment works.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `TripScout` application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TripScoutConfig {
    /// Upstream provider configuration
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// News fetch limits
    #[serde(default)]
    pub news: NewsConfig,
    /// Chat pipeline settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Upstream provider endpoints and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// OpenWeatherMap API key (weather, air pollution, geocoding)
    pub openweather_api_key: Option<String>,
    /// News provider API key
    pub news_api_key: Option<String>,
    /// Language model API key
    pub model_api_key: Option<String>,
    #[serde(default = "default_weather_base_url")]
    pub weather_base_url: String,
    #[serde(default = "default_geo_base_url")]
    pub geo_base_url: String,
    #[serde(default = "default_overpass_url")]
    pub overpass_url: String,
    #[serde(default = "default_news_base_url")]
    pub news_base_url: String,
    #[serde(default = "default_model_base_url")]
    pub model_base_url: String,
    /// Hosted model identifier
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// News fetch limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// Maximum provider requests per rolling 24h window
    #[serde(default = "default_daily_news_limit")]
    pub daily_limit: u32,
    /// Articles requested per call
    #[serde(default = "default_news_page_size")]
    pub page_size: u32,
    /// Lookback window when the message names none
    #[serde(default = "default_news_days_back")]
    pub default_days_back: u32,
}

/// Chat pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// POI search radius when the message names none, in kilometers
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_geo_base_url() -> String {
    "https://api.openweathermap.org/geo/1.0".to_string()
}

fn default_overpass_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_news_base_url() -> String {
    "https://newsapi.org/v2".to_string()
}

fn default_model_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model_name() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_daily_news_limit() -> u32 {
    10
}

fn default_news_page_size() -> u32 {
    10
}

fn default_news_days_back() -> u32 {
    7
}

fn default_radius_km() -> f64 {
    5.0
}

fn default_cache_location() -> String {
    "~/.cache/tripscout".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openweather_api_key: None,
            news_api_key: None,
            model_api_key: None,
            weather_base_url: default_weather_base_url(),
            geo_base_url: default_geo_base_url(),
            overpass_url: default_overpass_url(),
            news_base_url: default_news_base_url(),
            model_base_url: default_model_base_url(),
            model_name: default_model_name(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            daily_limit: default_daily_news_limit(),
            page_size: default_news_page_size(),
            default_days_back: default_news_days_back(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_radius_km: default_radius_km(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            location: default_cache_location(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl TripScoutConfig {
    /// Load configuration from an optional TOML file plus `TRIPSCOUT_*`
    /// environment overrides (e.g. `TRIPSCOUT_NEWS__DAILY_LIMIT=5`).
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        let settings = builder
            .add_source(Environment::with_prefix("TRIPSCOUT").separator("__"))
            .build()
            .context("Failed to read configuration sources")?;

        settings
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Expand the configured cache location, resolving a leading `~`.
    #[must_use]
    pub fn cache_path(&self) -> PathBuf {
        if let Some(rest) = self.cache.location.strip_prefix("~/") {
            if let Some(home) = std::env::var_os("HOME") {
                return PathBuf::from(home).join(rest);
            }
        }
        PathBuf::from(&self.cache.location)
    }
}
