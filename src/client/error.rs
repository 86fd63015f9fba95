use serde::Deserialize;

use crate::config::ConfigError;

/// Errors from a single fetch.
///
/// `Clone` so that one result can be handed to every caller waiting on a
/// de-duplicated request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A 2xx response whose body did not match the expected shape.
    #[error("Malformed response payload: {0}")]
    MalformedPayload(String),
}

impl FetchError {
    /// Transport failures may succeed on a later attempt. A response with a
    /// status code is an answer and is final for that attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Network(_) | FetchError::Timeout(_))
    }

    /// Build a status error, preferring the backend's own message when the
    /// body is an `{"error": {"code", "message"}}` envelope.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .map(|envelope| envelope.error.message)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| format!("Request failed with status code {status}"));
        FetchError::Status { status, message }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout(error.to_string())
        } else if error.is_decode() {
            FetchError::MalformedPayload(error.to_string())
        } else {
            FetchError::Network(error.to_string())
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetails,
}

#[derive(Deserialize)]
struct ErrorDetails {
    #[serde(default)]
    message: String,
}

/// Errors constructing a client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}
