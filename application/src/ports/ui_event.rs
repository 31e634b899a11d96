//! UI event types emitted by the session controller for the presentation
//! layer to render.

use hydra_domain::{CollaborationStatus, DelegationFrame, Discovery, HelpFrame, Message, RoleId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Events emitted by `SessionController`
#[derive(Debug, Clone)]
pub enum UiEvent {
    // === Welcome & Info ===
    Welcome(WelcomeInfo),
    Help,
    Roles(Vec<RoleSummary>),
    ConfigDisplay(ConfigSnapshot),

    // === Session state ===
    HistoryCleared,
    ContextDisplay(ContextSnapshot),
    StatusDisplay(StatusSnapshot),
    StatsDisplay(Vec<RoleStats>),
    MemoryDisplay(MemorySnapshot),

    // === Mode changes ===
    RoleSwitched {
        role: RoleId,
        auto_approve: bool,
        abandoned_frames: usize,
    },
    AutopilotEntered {
        role: RoleId,
        max_transitions: usize,
        auto_approve: bool,
    },
    AutoApproveToggled { enabled: bool },
    LanguageChanged(Language),

    // === Request execution ===
    RunFinished(RunSummary),
    RunFailed { error: String, cancelled: bool },

    // === Errors ===
    CommandError { message: String },
    UnknownCommand { command: String },

    Exit,
}

#[derive(Debug, Clone)]
pub struct WelcomeInfo {
    pub version: &'static str,
    pub default_role: RoleId,
    pub roles: Vec<RoleSummary>,
    pub auto_approve: bool,
    pub working_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSummary {
    pub id: RoleId,
    pub display_name: String,
    pub description: String,
    pub model: String,
    pub available: bool,
    pub active: bool,
}

/// Immutable configuration values shown by `/config`.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    pub default_role: RoleId,
    pub max_transitions: usize,
    pub context_window: usize,
    pub help_context_window: usize,
    pub max_tool_turns: usize,
    pub backend_retries: usize,
    pub retry_backoff_ms: u64,
    pub working_dir: Option<String>,
    pub auto_approve: bool,
    pub roles: Vec<RoleSummary>,
}

#[derive(Debug, Clone)]
pub struct ContextSnapshot {
    pub messages: Vec<Message>,
    pub ledger: Vec<Discovery>,
    /// Messages in history, including the ones not shown
    pub total_messages: usize,
}

#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub status: CollaborationStatus,
    pub delegations: Vec<DelegationFrame>,
    pub help_frames: Vec<HelpFrame>,
    /// `(transitions, max)` while auto-pilot is on
    pub autopilot: Option<(usize, usize)>,
    pub global_auto_approve: bool,
    pub auto_approved_roles: Vec<RoleId>,
    pub history_len: usize,
    pub ledger_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleStats {
    pub role: RoleId,
    pub calls: usize,
    pub failures: usize,
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub status: CollaborationStatus,
    pub turns: usize,
    pub transitions: usize,
    /// Set when auto-pilot stopped at the transition cap
    pub diagnostic: Option<String>,
    /// Last text produced by a role
    pub final_text: Option<String>,
}

/// Language of the interactive session's own messages.
///
/// Role replies are not translated; this only covers what the REPL prints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Zh,
            Language::Zh => Language::En,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "zh" | "cn" | "chinese" => Ok(Language::Zh),
            other => Err(format!("unknown language '{}' (expected en or zh)", other)),
        }
    }
}

/// Conversation memory figures shown by `/memory`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySnapshot {
    pub history_len: usize,
    pub ledger_len: usize,
    /// Message count per author, in order of first appearance
    pub by_author: Vec<(String, usize)>,
    /// Rough token estimate of the whole history plus ledger
    pub estimated_tokens: usize,
    pub context_window: usize,
    /// Rough token estimate of the messages a backend call would include
    pub window_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse_and_toggle() {
        assert_eq!("EN".parse::<Language>(), Ok(Language::En));
        assert_eq!(" zh ".parse::<Language>(), Ok(Language::Zh));
        assert!("fr".parse::<Language>().is_err());
        assert_eq!(Language::En.toggled(), Language::Zh);
        assert_eq!(Language::Zh.toggled().to_string(), "en");
    }
}
