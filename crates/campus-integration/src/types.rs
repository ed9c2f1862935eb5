use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::IntegrationError;

/// Longest error description carried in a failure sentinel
pub const ERROR_SENTINEL_CHARS: usize = 40;

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Body of `POST {base_url}/chat/completions`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Response from the chat completion endpoint. Only the first choice is read.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Trimmed text of the first choice
    pub fn into_text(self) -> Result<String, IntegrationError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| IntegrationError::MalformedResponse("no choices in response".into()))
    }
}

/// Endpoint credentials. All three fields must be non-empty to enable chat.
#[derive(Clone, Default, PartialEq)]
pub struct LlmCredentials {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl LlmCredentials {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.api_key.trim().is_empty()
            && !self.base_url.trim().is_empty()
            && !self.model.trim().is_empty()
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

// The key never reaches logs.
impl fmt::Debug for LlmCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmCredentials")
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Tunables for every outbound chat request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            max_tokens: 150,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Why a chat call produced no usable text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatFailure {
    /// The client is disabled or unconfigured; no request was made
    Unavailable,
    /// Network, status, timeout, or shape failure, already truncated
    Error(String),
}

impl From<&IntegrationError> for ChatFailure {
    fn from(err: &IntegrationError) -> Self {
        match err {
            IntegrationError::Unavailable => ChatFailure::Unavailable,
            other => ChatFailure::Error(truncate_chars(&other.to_string(), ERROR_SENTINEL_CHARS)),
        }
    }
}

impl From<IntegrationError> for ChatFailure {
    fn from(err: IntegrationError) -> Self {
        ChatFailure::from(&err)
    }
}

/// Renders the user-facing sentinel text
impl fmt::Display for ChatFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatFailure::Unavailable => f.write_str("(AI not enabled)"),
            ChatFailure::Error(msg) => write!(f, "(Error: {})", msg),
        }
    }
}

/// Result of one chat call as seen by the game loop
pub type ChatOutcome = Result<String, ChatFailure>;

/// Keep at most `max` characters, never splitting a code point
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
