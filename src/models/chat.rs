//! Conversation messages and the per-turn reply envelope

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Location, PointOfInterest, WeatherCard};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One message of the conversation. The conversation is the ordered,
/// append-only sequence of these; messages are never mutated once appended.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ChatResponseData>,
}

/// Weather payload of a turn: a single card for a resolved place, or one
/// card per suggested location for spiral results.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum WeatherPayload {
    Single(Box<WeatherCard>),
    Many(Vec<WeatherCard>),
}

/// Map overlay state produced once per assistant turn. Replaces the
/// previous overlay wholesale; never merged.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatResponseData {
    pub pois: Vec<PointOfInterest>,
    pub center: Location,
    #[serde(rename = "radiusKm")]
    pub radius_km: f64,
    #[serde(rename = "weatherData", skip_serializing_if = "Option::is_none")]
    pub weather_data: Option<WeatherPayload>,
}

/// The orchestrator's reply for one turn
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatReply {
    pub content: String,
    pub data: Option<ChatResponseData>,
}

impl ChatReply {
    /// A text-only reply with no map payload
    #[must_use]
    pub fn text<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            data: None,
        }
    }
}

/// Role of a turn sent to the language model
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// One turn of model conversation history
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub parts: String,
}

impl ChatTurn {
    #[must_use]
    pub fn user<S: Into<String>>(parts: S) -> Self {
        Self {
            role: TurnRole::User,
            parts: parts.into(),
        }
    }

    #[must_use]
    pub fn model<S: Into<String>>(parts: S) -> Self {
        Self {
            role: TurnRole::Model,
            parts: parts.into(),
        }
    }
}
