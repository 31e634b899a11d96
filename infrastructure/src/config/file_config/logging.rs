//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of the session
    pub conversation_log: Option<String>,
    /// Diagnostic log file (daily rolling), in addition to stderr
    pub file: Option<String>,
}
