//! HTTP API surface for the chat pipeline

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::Deserialize;

use crate::chat::ChatOrchestrator;
use crate::error::TripScoutError;
use crate::models::{ChatReply, Location};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(rename = "tempMarker")]
    pub temp_marker: Option<Location>,
    #[serde(rename = "currentLocation")]
    pub current_location: Option<Location>,
}

pub fn router(orchestrator: Arc<ChatOrchestrator>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .with_state(orchestrator)
}

async fn chat(
    State(orchestrator): State<Arc<ChatOrchestrator>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, (StatusCode, String)> {
    if request.message.trim().is_empty() {
        let error = TripScoutError::validation("Message cannot be empty");
        return Err((StatusCode::BAD_REQUEST, error.user_message()));
    }

    let reply = orchestrator
        .respond(
            &request.message,
            request.temp_marker,
            request.current_location,
        )
        .await;
    Ok(Json(reply))
}

async fn health() -> &'static str {
    "ok"
}
