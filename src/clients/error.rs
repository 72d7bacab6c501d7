//! Client-level fetch errors
//!
//! A failed fetch and a successful-but-empty answer are different things at
//! this layer; callers that do not care collapse both to "no data".

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, timeout, body read)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status from the provider
    #[error("provider returned HTTP {status}")]
    Status { status: reqwest::StatusCode },

    /// Provider answered 200 but flagged the request as failed, or the
    /// payload carried no usable rows where some are required
    #[error("provider error: {message}")]
    Provider { message: String },

    /// Payload did not match the expected shape
    #[error("malformed provider payload: {message}")]
    Decode { message: String },

    /// Request rejected before it was sent
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Provider not usable without a credential
    #[error("missing API key for {provider}")]
    MissingApiKey { provider: &'static str },
}

impl FetchError {
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = FetchError::provider("cod was 404");
        assert!(err.to_string().contains("cod was 404"));

        let err = FetchError::MissingApiKey { provider: "news" };
        assert!(err.to_string().contains("news"));
    }
}
