//! Collaboration loop configuration from TOML (`[collaboration]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCollaborationConfig {
    /// Auto-pilot transition cap
    pub max_transitions: usize,
    /// History messages sent per backend call
    pub context_window: usize,
    /// History messages seeded into a help request
    pub help_context_window: usize,
    /// Tool rounds per role turn
    pub max_tool_turns: usize,
    /// Attempts for transient backend errors
    pub backend_retries: usize,
    /// Initial backoff, doubled per attempt
    pub retry_backoff_ms: u64,
}

impl Default for FileCollaborationConfig {
    fn default() -> Self {
        Self {
            max_transitions: 12,
            context_window: 10,
            help_context_window: 6,
            max_tool_turns: 8,
            backend_retries: 3,
            retry_backoff_ms: 500,
        }
    }
}
