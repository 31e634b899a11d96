//! Session parameters: loop control for the collaboration use case.
//!
//! [`SessionParams`] is the immutable snapshot of the knobs that drive
//! [`CollaborateUseCase`](crate::use_cases::collaborate::CollaborateUseCase).
//! Runtime toggles such as `/yes` live in the router's session state instead.

use crate::ports::ui_event::Language;
use hydra_domain::{RoleId, RouterSettings};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionParams {
    /// Role that answers when nothing else holds control.
    pub default_role: RoleId,
    /// Auto-pilot transition cap.
    pub max_transitions: usize,
    /// History messages sent with each backend call.
    pub context_window: usize,
    /// History messages copied into a help request.
    pub help_context_window: usize,
    /// Tool rounds allowed within one role turn.
    pub max_tool_turns: usize,
    /// Attempts for transient backend errors (including the first).
    pub backend_retries: usize,
    /// Initial retry delay, doubled per attempt.
    pub retry_backoff_ms: u64,
    /// Initial global auto-approve flag.
    pub auto_approve: bool,
    /// Working directory for tool execution.
    pub working_dir: Option<String>,
    /// Initial language of session messages; `/lang` switches it.
    #[serde(default)]
    pub language: Language,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            default_role: RoleId::new("fast"),
            max_transitions: 12,
            context_window: 10,
            help_context_window: 6,
            max_tool_turns: 8,
            backend_retries: 3,
            retry_backoff_ms: 500,
            auto_approve: false,
            working_dir: None,
            language: Language::En,
        }
    }
}

impl SessionParams {
    // ==================== Builder Methods ====================

    pub fn with_default_role(mut self, role: impl AsRef<str>) -> Self {
        self.default_role = RoleId::new(role);
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_max_transitions(mut self, max: usize) -> Self {
        self.max_transitions = max;
        self
    }

    pub fn with_context_window(mut self, n: usize) -> Self {
        self.context_window = n;
        self
    }

    pub fn with_help_context_window(mut self, n: usize) -> Self {
        self.help_context_window = n;
        self
    }

    pub fn with_max_tool_turns(mut self, max: usize) -> Self {
        self.max_tool_turns = max;
        self
    }

    pub fn with_backend_retries(mut self, attempts: usize) -> Self {
        self.backend_retries = attempts;
        self
    }

    pub fn with_retry_backoff_ms(mut self, ms: u64) -> Self {
        self.retry_backoff_ms = ms;
        self
    }

    pub fn with_auto_approve(mut self, enabled: bool) -> Self {
        self.auto_approve = enabled;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    // ==================== Derived values ====================

    pub fn router_settings(&self) -> RouterSettings {
        RouterSettings {
            help_context_window: self.help_context_window,
            auto_approve: self.auto_approve,
        }
    }

    /// Delay before retry number `attempt` (1-based): `backoff * 2^(attempt-1)`.
    pub fn retry_delay(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16) as u32;
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(1u64 << exponent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = SessionParams::default();
        assert_eq!(params.default_role.as_str(), "fast");
        assert_eq!(params.max_transitions, 12);
        assert_eq!(params.context_window, 10);
        assert_eq!(params.help_context_window, 6);
        assert_eq!(params.max_tool_turns, 8);
        assert_eq!(params.backend_retries, 3);
        assert!(!params.auto_approve);
        assert!(params.working_dir.is_none());
        assert_eq!(params.language, Language::En);
    }

    #[test]
    fn test_builder() {
        let params = SessionParams::default()
            .with_default_role("Pro")
            .with_max_transitions(4)
            .with_auto_approve(true)
            .with_working_dir("/tmp/test");

        assert_eq!(params.default_role.as_str(), "pro");
        assert_eq!(params.max_transitions, 4);
        assert!(params.router_settings().auto_approve);
        assert_eq!(params.working_dir, Some("/tmp/test".to_string()));
    }

    #[test]
    fn test_retry_delay_doubles() {
        let params = SessionParams::default().with_retry_backoff_ms(100);
        assert_eq!(params.retry_delay(1), Duration::from_millis(100));
        assert_eq!(params.retry_delay(2), Duration::from_millis(200));
        assert_eq!(params.retry_delay(3), Duration::from_millis(400));
    }
}
