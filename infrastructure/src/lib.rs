//! Infrastructure layer for hydra-code
//!
//! Adapters for the ports defined in the application layer: the
//! OpenAI-compatible backend client, local tools, the JSONL conversation
//! logger, and configuration file loading.

pub mod backend;
pub mod config;
pub mod logging;
pub mod tools;

pub use backend::OpenAiCompatibleClient;
pub use config::{
    ConfigError, ConfigIssue, ConfigIssueCode, ConfigLoader, FileCollaborationConfig, FileConfig,
    FileLoggingConfig, FileReplConfig, FileRoleConfig, Severity,
};
pub use logging::JsonlConversationLogger;
pub use tools::{LocalToolExecutor, default_tool_spec, read_only_tool_spec};
