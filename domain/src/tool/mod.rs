//! Tool domain module
//!
//! Roles act on the workspace through tools. Every tool is described by a
//! [`ToolDefinition`] (name, parameters, [`ToolKind`]), invoked through a
//! [`ToolCall`] and answered with a [`ToolResult`].
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolSpec     │───▶│ ToolCall     │───▶│ Gatekeeper   │───▶│ ToolResult   │
//! │ (registry)   │    │ (from reply) │    │ (approval)   │    │ (to context) │
//! └──────────────┘    └──────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! # Approval
//!
//! The [`ToolGatekeeper`] decides whether a call may run immediately or needs
//! operator confirmation. Reads and searches always run; writes and command
//! execution run only when auto-approve is on, either globally or for the
//! requesting role.
//!
//! | Kind | Examples | Prompt without auto-approve |
//! |------|----------|-----------------------------|
//! | `file_read` | `read_file`, `list_directory` | No |
//! | `search` | `glob_search`, `grep_search` | No |
//! | `file_write` | `write_file`, `edit_file` | Yes |
//! | `execute` | `run_command` | Yes |
//!
//! # Aliases
//!
//! Models often guess tool names (`bash`, `cat`, `grep`). [`ToolSpec`]
//! resolves aliases to canonical names without another round-trip.

pub mod entities;
pub mod gatekeeper;
pub mod traits;
pub mod value_objects;

pub use entities::{ToolCall, ToolDefinition, ToolKind, ToolParameter, ToolSpec};
pub use gatekeeper::{ApprovalState, GateDecision, ToolGatekeeper};
pub use traits::{DefaultToolValidator, ToolValidator};
pub use value_objects::{ToolError, ToolErrorKind, ToolResult, ToolResultMetadata};
