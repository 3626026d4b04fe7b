//! Error types and handling for the `GoTravel` application

use std::collections::HashMap;
use thiserror::Error;

/// Machine-readable codes for API failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Client- or server-side rate limit hit
    ApiRateLimit,
    /// Rejected credentials (HTTP 401/403)
    ApiUnauthorized,
    /// The queried location does not exist upstream
    ApiLocationNotFound,
    /// Upstream returned a body we could not interpret
    ApiInvalidResponse,
    /// Transport-level failure after retries
    ApiNetworkError,
    /// No generative model in the preference list produced output
    ModelUnavailable,
}

/// Main error type for the `GoTravel` application
#[derive(Error, Debug)]
pub enum GoTravelError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// API communication errors
    #[error("API error: {message}")]
    Api {
        message: String,
        code: ErrorCode,
        context: HashMap<String, String>,
    },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

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

impl GoTravelError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error with a default network error code
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
            code: ErrorCode::ApiNetworkError,
            context: HashMap::new(),
        }
    }

    /// Create a new API error with an explicit code and diagnostic context
    pub fn api_with_context<S: Into<String>>(
        message: S,
        code: ErrorCode,
        context: HashMap<String, String>,
    ) -> Self {
        Self::Api {
            message: message.into(),
            code,
            context,
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// The API error code, when this is an API error
    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            GoTravelError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            GoTravelError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            GoTravelError::Api { code, .. } => match code {
                ErrorCode::ApiRateLimit => {
                    "Too many requests. Please wait a moment and try again.".to_string()
                }
                ErrorCode::ApiUnauthorized => {
                    "An API key was rejected. Please check your credentials.".to_string()
                }
                ErrorCode::ApiLocationNotFound => {
                    "Location not found. Please check the spelling or try a nearby city."
                        .to_string()
                }
                ErrorCode::ModelUnavailable => {
                    "The itinerary service is temporarily unavailable. Please try again."
                        .to_string()
                }
                ErrorCode::ApiInvalidResponse | ErrorCode::ApiNetworkError => {
                    "Unable to connect to external services. Please check your internet connection."
                        .to_string()
                }
            },
            GoTravelError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            GoTravelError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
            GoTravelError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            GoTravelError::General { message } => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = GoTravelError::config("missing API key");
        assert!(matches!(config_err, GoTravelError::Config { .. }));

        let api_err = GoTravelError::api("connection failed");
        assert!(matches!(api_err, GoTravelError::Api { .. }));
        assert_eq!(api_err.code(), Some(ErrorCode::ApiNetworkError));

        let validation_err = GoTravelError::validation("invalid coordinates");
        assert!(matches!(validation_err, GoTravelError::Validation { .. }));
    }

    #[test]
    fn test_api_error_context() {
        let err = GoTravelError::api_with_context(
            "location missing",
            ErrorCode::ApiLocationNotFound,
            HashMap::from([("query".to_string(), "Atlantis".to_string())]),
        );

        assert_eq!(err.code(), Some(ErrorCode::ApiLocationNotFound));
        match err {
            GoTravelError::Api { context, .. } => {
                assert_eq!(context.get("query"), Some(&"Atlantis".to_string()));
            }
            _ => panic!("expected Api variant"),
        }
    }

    #[test]
    fn test_user_messages() {
        let config_err = GoTravelError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let api_err = GoTravelError::api("test");
        assert!(api_err.user_message().contains("Unable to connect"));

        let rate_err = GoTravelError::api_with_context(
            "slow down",
            ErrorCode::ApiRateLimit,
            HashMap::new(),
        );
        assert!(rate_err.user_message().contains("Too many requests"));

        let validation_err = GoTravelError::validation("test input");
        assert!(validation_err.user_message().contains("test input"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let travel_err: GoTravelError = io_err.into();
        assert!(matches!(travel_err, GoTravelError::Io { .. }));
    }
}
