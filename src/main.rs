use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use tripscout::chat::ChatOrchestrator;
use tripscout::clients::{
    GeminiChatModel, NewsApiClient, OpenWeatherClient, OpenWeatherGeocoder, OverpassClient,
    http_client,
};
use tripscout::config::TripScoutConfig;
use tripscout::store::{Cache, PersistentStore};
use tripscout::web;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config_path = std::env::var_os("TRIPSCOUT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));
    let config = TripScoutConfig::load(Some(config_path))?;

    let store = PersistentStore::open(config.cache_path())
        .with_context(|| "Failed to open cache database")?;
    let cache = Cache::new(Arc::new(store));

    let client = http_client(&config.providers)?;
    let geocoder = Arc::new(OpenWeatherGeocoder::new(client.clone(), &config.providers));
    let weather = Arc::new(OpenWeatherClient::new(client.clone(), &config.providers));
    let places = Arc::new(OverpassClient::new(client.clone(), &config.providers));
    let news = Arc::new(NewsApiClient::new(client.clone(), &config.providers));
    let model = Arc::new(GeminiChatModel::new(client, &config.providers));

    let orchestrator = Arc::new(ChatOrchestrator::new(
        geocoder, weather, places, news, model, cache, &config,
    ));

    web::run(config.server.port, orchestrator).await;
    Ok(())
}
