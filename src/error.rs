//! Error types and handling for the `TripScout` application

use thiserror::Error;

/// Main error type for the `TripScout` application
#[derive(Error, Debug)]
pub enum TripScoutError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream provider communication errors
    #[error("Provider error: {source}")]
    Fetch {
        #[from]
        source: crate::clients::FetchError,
    },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Store operation errors
    #[error("Store error: {message}")]
    Store { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl TripScoutError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new input validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripScoutError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            TripScoutError::Fetch { .. } => {
                "Unable to reach external services. Please check your internet connection."
                    .to_string()
            }
            TripScoutError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TripScoutError::Store { .. } => {
                "Store operation failed. You may need to clear the cache directory.".to_string()
            }
            TripScoutError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            TripScoutError::General { message } => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = TripScoutError::config("missing API key");
        assert!(matches!(config_err, TripScoutError::Config { .. }));

        let validation_err = TripScoutError::validation("invalid coordinates");
        assert!(matches!(validation_err, TripScoutError::Validation { .. }));

        let store_err = TripScoutError::store("keyspace unavailable");
        assert!(matches!(store_err, TripScoutError::Store { .. }));
    }

    #[test]
    fn test_user_messages() {
        let config_err = TripScoutError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let validation_err = TripScoutError::validation("test input");
        assert!(validation_err.user_message().contains("test input"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let trip_err: TripScoutError = io_err.into();
        assert!(matches!(trip_err, TripScoutError::Io { .. }));
    }
}
