use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Server is offline or unreachable")]
    Offline,

    #[error("Request timed out")]
    Timeout,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("A chat request is already in flight")]
    Busy,

    #[error("AI chat is not enabled")]
    Unavailable,

    #[error("Failed to start background runtime: {0}")]
    Runtime(String),
}

impl From<reqwest::Error> for IntegrationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            IntegrationError::Timeout
        } else if err.is_connect() {
            IntegrationError::Offline
        } else if err.is_decode() {
            IntegrationError::MalformedResponse(err.to_string())
        } else {
            IntegrationError::Network(err.to_string())
        }
    }
}

/// Only response bodies are decoded with serde_json
impl From<serde_json::Error> for IntegrationError {
    fn from(err: serde_json::Error) -> Self {
        IntegrationError::MalformedResponse(err.to_string())
    }
}
