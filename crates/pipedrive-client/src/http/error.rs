/*
[INPUT]:  Error sources (transport, HTTP status, serialization, config, wrapper preconditions)
[OUTPUT]: Structured error type shared by the whole crate
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the Pipedrive client
#[derive(Error, Debug)]
pub enum PipedriveError {
    /// The network call itself failed (connection, DNS, TLS, timeout, unreadable upload)
    #[error("API call failed: {0}")]
    Transport(String),

    /// API answered with a 4xx/5xx status
    #[error("API HTTP error {status}: {message}")]
    Api { status: u16, message: String },

    /// A resource wrapper was called without a required field
    #[error("Missing field `{field}`: {message}")]
    MissingField { field: String, message: String },

    /// Body or query parameters did not serialize to a JSON object
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The overall deadline expired, possibly mid-backoff
    #[error("Request deadline exceeded after {duration}s")]
    Timeout { duration: u64 },
}

/// The request URL carries `api_token`, so it is stripped from the message
impl From<reqwest::Error> for PipedriveError {
    fn from(err: reqwest::Error) -> Self {
        PipedriveError::Transport(err.without_url().to_string())
    }
}

impl From<serde_yaml::Error> for PipedriveError {
    fn from(err: serde_yaml::Error) -> Self {
        PipedriveError::Config(err.to_string())
    }
}

impl PipedriveError {
    /// HTTP status carried by an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            PipedriveError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if the error is a 429 that survived the retry budget
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(StatusCode::TOO_MANY_REQUESTS.as_u16())
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        PipedriveError::Api {
            status: status.as_u16(),
            message: message.into(),
        }
    }

    /// Create a missing-field error for a resource wrapper precondition
    pub fn missing_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        PipedriveError::MissingField {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for Pipedrive operations
pub type Result<T> = std::result::Result<T, PipedriveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_creation() {
        let err = PipedriveError::api_error(StatusCode::BAD_REQUEST, "Name is required");
        match err {
            PipedriveError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Name is required");
            }
            _ => panic!("Expected Api error variant"),
        }
    }

    #[test]
    fn test_status_helpers() {
        let limited = PipedriveError::api_error(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(limited.is_rate_limited());
        assert!(!limited.is_not_found());

        let missing = PipedriveError::api_error(StatusCode::NOT_FOUND, "Person not found");
        assert!(missing.is_not_found());
        assert_eq!(missing.status(), Some(404));

        assert_eq!(PipedriveError::Transport("refused".into()).status(), None);
    }

    #[test]
    fn test_display_messages() {
        let err = PipedriveError::Transport("connection refused".into());
        assert_eq!(err.to_string(), "API call failed: connection refused");

        let err = PipedriveError::missing_field("name", "name is required");
        assert_eq!(err.to_string(), "Missing field `name`: name is required");
    }
}
