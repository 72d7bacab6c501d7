//! Hosted language model client
//!
//! The orchestrator hands over the capability preamble plus the composed
//! prompt and gets free-form text back. Trip-planning replies may carry an
//! embedded JSON itinerary block; extracting it is the orchestrator's job,
//! not this client's.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{FetchError, FetchResult};
use crate::config::ProvidersConfig;
use crate::models::{ChatTurn, TurnRole};

/// Conversation-in, text-out model call.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn send(&self, history: &[ChatTurn], message: &str) -> FetchResult<String>;
}

#[derive(Debug, Serialize)]
struct ContentPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ReplyContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ReplyContent>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// REST client for the hosted generative-language API.
pub struct GeminiChatModel {
    client: reqwest::Client,
    base_url: String,
    model_name: String,
    api_key: Option<String>,
}

impl GeminiChatModel {
    #[must_use]
    pub fn new(client: reqwest::Client, config: &ProvidersConfig) -> Self {
        Self {
            client,
            base_url: config.model_base_url.clone(),
            model_name: config.model_name.clone(),
            api_key: config.model_api_key.clone(),
        }
    }

    fn role_label(role: TurnRole) -> &'static str {
        match role {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        }
    }
}

#[async_trait]
impl ChatModel for GeminiChatModel {
    #[instrument(skip(self, history, message))]
    async fn send(&self, history: &[ChatTurn], message: &str) -> FetchResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(FetchError::MissingApiKey { provider: "model" })?;

        let mut contents: Vec<Content<'_>> = history
            .iter()
            .map(|turn| Content {
                role: Self::role_label(turn.role),
                parts: vec![ContentPart { text: &turn.parts }],
            })
            .collect();
        contents.push(Content {
            role: "user",
            parts: vec![ContentPart { text: message }],
        });

        let url = format!(
            "{}/models/{}:generateContent?key={api_key}",
            self.base_url, self.model_name
        );
        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest { contents })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }

        let reply: GenerateResponse = response.json().await?;
        let text = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<String>()
            })
            .ok_or_else(|| FetchError::provider("model reply carried no candidates"))?;

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape_matches_provider() {
        let request = GenerateRequest {
            contents: vec![
                Content {
                    role: "user",
                    parts: vec![ContentPart { text: "preamble" }],
                },
                Content {
                    role: "model",
                    parts: vec![ContentPart { text: "ack" }],
                },
            ],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["parts"][0]["text"], "ack");
    }

    #[test]
    fn test_reply_text_concatenates_parts() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Hello "}, {"text": "there"}]}}
            ]
        }"#;
        let reply: GenerateResponse = serde_json::from_str(json).unwrap();
        let text: String = reply.candidates[0]
            .content
            .as_ref()
            .unwrap()
            .parts
            .iter()
            .map(|p| p.text.clone())
            .collect();
        assert_eq!(text, "Hello there");
    }
}
