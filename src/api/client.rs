use std::time::Duration;

use tracing::debug;

use super::{
    construct_api_url, ChatError, ChatRequest, ChatResponse, HealthStatus, HistoryEntry,
};
use crate::core::profile::Profile;

/// Thin HTTP client for the chat service.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ChatError::Transport)?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one student message to a custom chatbot.
    pub async fn send_custom(
        &self,
        profile: &Profile,
        student_id: &str,
        message: &str,
        history: &[HistoryEntry],
    ) -> Result<ChatResponse, ChatError> {
        let url = construct_api_url(&self.base_url, "api/chat/custom");
        let request = ChatRequest {
            message,
            student_id,
            chatbot_config: profile,
            conversation_history: history,
        };
        debug!(url = %url, bot = %profile.id, history = history.len(), "sending chat message");

        let response = self
            .http
            .post(url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(ChatError::Transport)?;
        let response = check_status(response).await?;
        response.json().await.map_err(ChatError::Decode)
    }

    pub async fn health(&self) -> Result<HealthStatus, ChatError> {
        let url = construct_api_url(&self.base_url, "api/health");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(ChatError::Transport)?;
        let response = check_status(response).await?;
        response.json().await.map_err(ChatError::Decode)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ChatError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ChatError::Status {
        status: status.as_u16(),
        body: body.trim().to_string(),
    })
}
