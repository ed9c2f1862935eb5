use reqwest::Client;
use tracing::debug;

use crate::error::IntegrationError;
use crate::types::{ChatCompletionRequest, ChatCompletionResponse, LlmCredentials};

/// API client for an OpenAI-compatible chat completion endpoint
pub struct ChatCompletionApi {
    client: Client,
}

impl ChatCompletionApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Send one completion request and return the trimmed reply text
    pub async fn complete(
        &self,
        credentials: &LlmCredentials,
        request: &ChatCompletionRequest,
    ) -> Result<String, IntegrationError> {
        let url = credentials.completions_url();
        debug!("POST {} ({} messages)", url, request.messages.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&credentials.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(IntegrationError::ServerError {
                status: status.as_u16(),
                message: text,
            });
        }

        let body = response.text().await?;
        reply_text(&body)
    }
}

/// Pull the reply out of a completion response body
fn reply_text(body: &str) -> Result<String, IntegrationError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)?;
    parsed.into_text()
}
