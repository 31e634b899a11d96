//! Tool results and errors
//!
//! Every tool execution produces a [`ToolResult`]. Results are written back
//! into the shared context so the requesting role can react to them; a
//! declined confirmation is reported the same way, as a failed result of
//! kind [`ToolErrorKind::Declined`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a tool call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolErrorKind {
    /// Missing or malformed arguments; the role can retry with fixed ones
    InvalidArgument,
    /// Unknown tool, missing file or missing program
    NotFound,
    PermissionDenied,
    /// I/O error or other runtime failure
    ExecutionFailed,
    Timeout,
    /// The operator refused the call
    Declined,
}

impl ToolErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ToolErrorKind::NotFound => "NOT_FOUND",
            ToolErrorKind::PermissionDenied => "PERMISSION_DENIED",
            ToolErrorKind::ExecutionFailed => "EXECUTION_FAILED",
            ToolErrorKind::Timeout => "TIMEOUT",
            ToolErrorKind::Declined => "DECLINED",
        }
    }
}

impl fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error that occurred during tool execution. Displays as `[KIND] message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    pub code: ToolErrorKind,
    pub message: String,
}

impl ToolError {
    pub fn new(code: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::new(ToolErrorKind::NotFound, format!("Not found: {}", resource))
    }

    pub fn permission_denied(resource: impl fmt::Display) -> Self {
        Self::new(
            ToolErrorKind::PermissionDenied,
            format!("Permission denied: {}", resource),
        )
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArgument, message)
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::ExecutionFailed, message)
    }

    pub fn timeout(operation: impl fmt::Display) -> Self {
        Self::new(ToolErrorKind::Timeout, format!("Timed out: {}", operation))
    }

    pub fn declined() -> Self {
        Self::new(ToolErrorKind::Declined, "declined by operator")
    }

    pub fn is_declined(&self) -> bool {
        self.code == ToolErrorKind::Declined
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ToolError {}

/// Outcome of one tool call.
///
/// Exactly one of `output` and `error` is set, matching `success`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
    #[serde(default)]
    pub metadata: ToolResultMetadata,
}

/// What the executor measured while running a tool.
///
/// File tools fill `path` and `bytes`, `run_command` fills `duration_ms`
/// and `exit_code`, the search tools and `list_directory` fill
/// `match_count`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResultMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_count: Option<usize>,
}

impl ToolResult {
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: Some(output.into()),
            error: None,
            metadata: ToolResultMetadata::default(),
        }
    }

    pub fn failure(tool_name: impl Into<String>, error: ToolError) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            output: None,
            error: Some(error),
            metadata: ToolResultMetadata::default(),
        }
    }

    /// Synthetic result for a call the operator refused.
    pub fn declined(tool_name: impl Into<String>) -> Self {
        Self::failure(tool_name, ToolError::declined())
    }

    pub fn with_metadata(mut self, metadata: ToolResultMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn error(&self) -> Option<&ToolError> {
        self.error.as_ref()
    }

    /// Kind of failure, if the call failed.
    pub fn error_kind(&self) -> Option<ToolErrorKind> {
        self.error.as_ref().map(|e| e.code)
    }
}
