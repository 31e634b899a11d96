//! Directives extracted from a role's reply.

use crate::role::RoleId;
use std::fmt;

/// An instruction embedded in role output that changes collaboration state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Ask another role for help; control returns to the requester afterwards.
    RequestHelp {
        target: RoleId,
        question: Option<String>,
    },
    /// Publish a finding to the shared discovery ledger.
    ShareDiscovery { payload: String },
    /// Hand a subtask to another role and resume once it completes.
    Delegate { target: RoleId, subtask: String },
    /// Transfer ownership of the task without expecting a return.
    Handoff { target: RoleId },
    /// Finish the current unit of work.
    Complete,
    /// A marker that could not be honoured; reported, never fatal.
    RecoverableError { message: String },
}

impl Directive {
    /// Directives that move control to another role.
    pub fn is_control_transfer(&self) -> bool {
        matches!(
            self,
            Directive::RequestHelp { .. } | Directive::Delegate { .. } | Directive::Handoff { .. }
        )
    }

    pub fn target(&self) -> Option<&RoleId> {
        match self {
            Directive::RequestHelp { target, .. }
            | Directive::Delegate { target, .. }
            | Directive::Handoff { target } => Some(target),
            _ => None,
        }
    }

    /// Short name used in logs and conversation events.
    pub fn label(&self) -> &'static str {
        match self {
            Directive::RequestHelp { .. } => "request_help",
            Directive::ShareDiscovery { .. } => "share_discovery",
            Directive::Delegate { .. } => "delegate",
            Directive::Handoff { .. } => "handoff",
            Directive::Complete => "complete",
            Directive::RecoverableError { .. } => "recoverable_error",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::RequestHelp {
                target,
                question: Some(q),
            } => write!(f, "request help from {}: {}", target, q),
            Directive::RequestHelp { target, .. } => write!(f, "request help from {}", target),
            Directive::ShareDiscovery { payload } => write!(f, "share discovery: {}", payload),
            Directive::Delegate { target, subtask } => {
                write!(f, "delegate to {}: {}", target, subtask)
            }
            Directive::Handoff { target } => write!(f, "hand off to {}", target),
            Directive::Complete => write!(f, "complete"),
            Directive::RecoverableError { message } => write!(f, "ignored marker: {}", message),
        }
    }
}
