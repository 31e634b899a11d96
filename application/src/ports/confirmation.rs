//! Tool confirmation port.
//!
//! When the gatekeeper answers `RequirePrompt`, the session loop suspends and
//! asks a [`ConfirmationPort`] whether the call may run.
//!
//! ```text
//! role reply ──▶ ToolCall ──▶ gate(kind) ──RequirePrompt──▶ confirm_tool()
//!                                 │                            │
//!                             ExecuteNow                 Accept / Reject
//!                                 ▼                            ▼
//!                              execute              execute / "declined by operator"
//! ```
//!
//! # Built-in Implementations
//!
//! - [`AutoAcceptConfirmation`] - always accepts (one-shot runs with `-y`)
//! - [`AutoRejectConfirmation`] - always rejects (non-interactive runs)
//!
//! For interactive use, see `InteractiveConfirmation` in the presentation layer,
//! which hands each prompt to the REPL.

use async_trait::async_trait;
use hydra_domain::{RoleId, ToolCall, ToolDefinition};
use thiserror::Error;

/// The operator's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationDecision {
    Accept,
    Reject,
}

/// Failures while asking, as opposed to a rejection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationError {
    #[error("Operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(String),
}

#[async_trait]
pub trait ConfirmationPort: Send + Sync {
    /// Ask whether `role` may run `call`.
    async fn confirm_tool(
        &self,
        role: &RoleId,
        call: &ToolCall,
        definition: &ToolDefinition,
    ) -> Result<ConfirmationDecision, ConfirmationError>;
}

pub struct AutoAcceptConfirmation;

#[async_trait]
impl ConfirmationPort for AutoAcceptConfirmation {
    async fn confirm_tool(
        &self,
        _role: &RoleId,
        _call: &ToolCall,
        _definition: &ToolDefinition,
    ) -> Result<ConfirmationDecision, ConfirmationError> {
        Ok(ConfirmationDecision::Accept)
    }
}

pub struct AutoRejectConfirmation;

#[async_trait]
impl ConfirmationPort for AutoRejectConfirmation {
    async fn confirm_tool(
        &self,
        _role: &RoleId,
        _call: &ToolCall,
        _definition: &ToolDefinition,
    ) -> Result<ConfirmationDecision, ConfirmationError> {
        Ok(ConfirmationDecision::Reject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydra_domain::ToolKind;

    fn write_call() -> (ToolCall, ToolDefinition) {
        (
            ToolCall::new("write_file").with_arg("path", "a.txt"),
            ToolDefinition::new("write_file", "Write a file", ToolKind::FileWrite),
        )
    }

    #[tokio::test]
    async fn test_auto_accept() {
        let (call, definition) = write_call();
        let decision = AutoAcceptConfirmation
            .confirm_tool(&RoleId::new("opus"), &call, &definition)
            .await
            .unwrap();
        assert_eq!(decision, ConfirmationDecision::Accept);
    }

    #[tokio::test]
    async fn test_auto_reject() {
        let (call, definition) = write_call();
        let decision = AutoRejectConfirmation
            .confirm_tool(&RoleId::new("opus"), &call, &definition)
            .await
            .unwrap();
        assert_eq!(decision, ConfirmationDecision::Reject);
    }
}
