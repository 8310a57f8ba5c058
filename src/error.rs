//! Error types and handling for the `localcast` resolver pipeline

use std::fmt;

use thiserror::Error;

/// Pipeline stage an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Public address discovery
    Address,
    /// Address-to-city geolocation
    Location,
    /// Weather lookup by city name
    Weather,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Address => "address",
            Stage::Location => "location",
            Stage::Weather => "weather",
        };
        write!(f, "{name}")
    }
}

/// Main error type for the `localcast` library
#[derive(Error, Debug)]
pub enum LocalcastError {
    /// The remote service reported "not found" for this stage
    #[error("{stage} service reported not found")]
    NotFound {
        stage: Stage,
        /// Provider-supplied message, when the response body carried one
        message: Option<String>,
    },

    /// The response body was not valid JSON or lacked a required field
    #[error("malformed response from {stage} service: {message}")]
    MalformedResponse { stage: Stage, message: String },

    /// The request never completed or failed at the transport level
    #[error("network error during {stage} lookup: {source}")]
    Network {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },

    /// A resolution run was started while a prior run was still in flight
    #[error("a resolution run is already in flight")]
    Busy,

    /// Configuration-related errors
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl LocalcastError {
    /// Create a new not-found error without a provider message
    pub fn not_found(stage: Stage) -> Self {
        Self::NotFound {
            stage,
            message: None,
        }
    }

    /// Create a new not-found error carrying the provider's message
    pub fn not_found_with_message<S: Into<String>>(stage: Stage, message: S) -> Self {
        Self::NotFound {
            stage,
            message: Some(message.into()),
        }
    }

    /// Create a new malformed-response error
    pub fn malformed<S: Into<String>>(stage: Stage, message: S) -> Self {
        Self::MalformedResponse {
            stage,
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network(stage: Stage, source: reqwest::Error) -> Self {
        Self::Network { stage, source }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            LocalcastError::NotFound {
                stage: Stage::Weather,
                ..
            } => "Place not found".to_string(),
            LocalcastError::NotFound { stage, .. } => {
                format!("The {stage} service could not find a match.")
            }
            LocalcastError::MalformedResponse { stage, .. } => {
                format!("The {stage} service returned data we could not understand.")
            }
            LocalcastError::Network { .. } => {
                "Unable to reach external services. Please check your internet connection."
                    .to_string()
            }
            LocalcastError::Busy => "A lookup is already running. Try again shortly.".to_string(),
            LocalcastError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let not_found = LocalcastError::not_found(Stage::Address);
        assert!(matches!(
            not_found,
            LocalcastError::NotFound {
                stage: Stage::Address,
                message: None,
            }
        ));

        let malformed = LocalcastError::malformed(Stage::Location, "missing city field");
        assert!(matches!(malformed, LocalcastError::MalformedResponse { .. }));

        let config_err = LocalcastError::config("missing API key");
        assert!(matches!(config_err, LocalcastError::Config { .. }));
    }

    #[test]
    fn test_weather_not_found_is_place_not_found() {
        let err = LocalcastError::not_found_with_message(Stage::Weather, "city not found");
        assert_eq!(err.user_message(), "Place not found");
    }

    #[test]
    fn test_user_messages() {
        let silent = LocalcastError::not_found(Stage::Location);
        assert!(silent.user_message().contains("location service"));

        let malformed = LocalcastError::malformed(Stage::Address, "invalid JSON");
        assert!(malformed.user_message().contains("address service"));

        let config_err = LocalcastError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Address.to_string(), "address");
        assert_eq!(Stage::Location.to_string(), "location");
        assert_eq!(Stage::Weather.to_string(), "weather");
    }
}
