//! Payloads and client for the tutoring chat service.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::profile::{ConversationStyle, Profile};

pub mod client;

pub use client::ChatClient;

pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
}

impl HistoryEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ROLE_USER.to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ROLE_ASSISTANT.to_string(),
            content: content.into(),
        }
    }
}

/// Body of `POST /api/chat/custom`. The profile is sent as is, in its
/// persisted camelCase shape.
#[derive(Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub student_id: &'a str,
    pub chatbot_config: &'a Profile,
    pub conversation_history: &'a [HistoryEntry],
}

#[derive(Deserialize, Debug)]
pub struct ChatResponse {
    pub response: String,
}

/// Body of `GET /api/health`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// A failed call to the chat service. All variants are transient from the
/// student's point of view.
#[derive(Debug)]
pub enum ChatError {
    Transport(reqwest::Error),
    Status { status: u16, body: String },
    Decode(reqwest::Error),
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::Transport(err) => write!(f, "Could not reach the chat service: {err}"),
            ChatError::Status { status, body } if body.is_empty() => {
                write!(f, "Chat service responded with HTTP {status}")
            }
            ChatError::Status { status, body } => {
                write!(f, "Chat service responded with HTTP {status}: {body}")
            }
            ChatError::Decode(err) => write!(f, "Unexpected response from the chat service: {err}"),
        }
    }
}

impl std::error::Error for ChatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChatError::Transport(err) | ChatError::Decode(err) => Some(err),
            ChatError::Status { .. } => None,
        }
    }
}

/// The service's reply, or the style's canned reply when the call failed or
/// came back blank.
pub fn reply_or_fallback(
    result: Result<ChatResponse, ChatError>,
    style: ConversationStyle,
) -> String {
    match result {
        Ok(reply) if !reply.response.trim().is_empty() => reply.response,
        Ok(_) => {
            tracing::warn!("chat service returned an empty reply, using fallback");
            style.fallback_reply().to_string()
        }
        Err(err) => {
            tracing::warn!("{err}, using fallback reply");
            style.fallback_reply().to_string()
        }
    }
}

/// Join a base URL and an endpoint path without doubling slashes.
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::profile::ColorTheme;
    use chrono::{DateTime, Utc};

    fn sample_profile() -> Profile {
        let stamp = "2024-05-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        Profile {
            id: "bot_1714557600000_k3j9x0a1b".to_string(),
            name: "Max".to_string(),
            personality: "A patient tutor who loves fractions.".to_string(),
            reference_materials: Some("Unit 4 worksheet".to_string()),
            conversation_style: ConversationStyle::Encouraging,
            color_theme: ColorTheme::Teal,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    #[test]
    fn chat_request_matches_service_contract() {
        let profile = sample_profile();
        let history = vec![
            HistoryEntry::assistant(profile.greeting()),
            HistoryEntry::user("What is 1/2 + 1/4?"),
        ];
        let request = ChatRequest {
            message: "And 1/3 + 1/6?",
            student_id: "3f2b9c1a-7d4e-4b8f-9a21-0c6d5e4f3a2b",
            chatbot_config: &profile,
            conversation_history: &history,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["message"], "And 1/3 + 1/6?");
        assert_eq!(value["student_id"], "3f2b9c1a-7d4e-4b8f-9a21-0c6d5e4f3a2b");
        assert_eq!(value["chatbot_config"]["name"], "Max");
        assert_eq!(value["chatbot_config"]["conversationStyle"], "encouraging");
        assert_eq!(value["chatbot_config"]["referenceMaterials"], "Unit 4 worksheet");
        assert_eq!(value["conversation_history"][0]["role"], "assistant");
        assert_eq!(value["conversation_history"][1]["role"], "user");
        assert_eq!(value["conversation_history"][1]["content"], "What is 1/2 + 1/4?");
    }

    #[test]
    fn service_payloads_decode() {
        let reply: ChatResponse =
            serde_json::from_str(r#"{"response": "3/4!", "extra": true}"#).unwrap();
        assert_eq!(reply.response, "3/4!");

        let health: HealthStatus = serde_json::from_str(r#"{"status": "running"}"#).unwrap();
        assert_eq!(health.status, "running");
        assert_eq!(health.model, None);
    }

    #[test]
    fn fallback_used_for_failures_and_blank_replies() {
        let ok = reply_or_fallback(
            Ok(ChatResponse {
                response: "Let's try together.".to_string(),
            }),
            ConversationStyle::Casual,
        );
        assert_eq!(ok, "Let's try together.");

        let blank = reply_or_fallback(
            Ok(ChatResponse {
                response: "  ".to_string(),
            }),
            ConversationStyle::Academic,
        );
        assert_eq!(blank, ConversationStyle::Academic.fallback_reply());

        let failed = reply_or_fallback(
            Err(ChatError::Status {
                status: 500,
                body: String::new(),
            }),
            ConversationStyle::Professional,
        );
        assert_eq!(failed, ConversationStyle::Professional.fallback_reply());
    }

    #[test]
    fn status_error_mentions_body_when_present() {
        let err = ChatError::Status {
            status: 400,
            body: "No message provided".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Chat service responded with HTTP 400: No message provided"
        );
    }

    #[test]
    fn construct_api_url_avoids_double_slashes() {
        assert_eq!(
            construct_api_url("http://localhost:5000/", "/api/chat/custom"),
            "http://localhost:5000/api/chat/custom"
        );
        assert_eq!(
            construct_api_url("https://tutor.example.edu/v2", "api/health"),
            "https://tutor.example.edu/v2/api/health"
        );
    }
}
