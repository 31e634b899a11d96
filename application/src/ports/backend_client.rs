//! Backend client port
//!
//! Defines how the application layer talks to the LLM backend that serves a
//! role. Adapters (OpenAI-compatible HTTP, test doubles) live elsewhere.

use async_trait::async_trait;
use hydra_domain::RoleDefinition;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors returned by a backend call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Rate limited: {message}")]
    RateLimit {
        message: String,
        /// Server-suggested wait, if any
        retry_after: Option<Duration>,
    },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl BackendError {
    /// Transport failures and rate limits are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BackendError::Transport(_) | BackendError::RateLimit { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::Auth(_) => "auth",
            BackendError::Transport(_) => "transport",
            BackendError::RateLimit { .. } => "rate_limit",
            BackendError::Malformed(_) => "malformed",
        }
    }
}

/// Speaker of a chat message on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A message in the request sent to a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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

/// Port for sending a conversation to the backend of a role.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Send `messages` using `role`'s backend settings and return the reply text.
    async fn send(
        &self,
        role: &RoleDefinition,
        messages: &[ChatMessage],
    ) -> Result<String, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(BackendError::Transport("reset".into()).is_retryable());
        assert!(
            BackendError::RateLimit {
                message: "slow down".into(),
                retry_after: None
            }
            .is_retryable()
        );
        assert!(!BackendError::Auth("bad key".into()).is_retryable());
        assert!(!BackendError::Malformed("no choices".into()).is_retryable());
    }

    #[test]
    fn test_chat_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }
}
