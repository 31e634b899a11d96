//! Collaboration progress port.
//!
//! [`CollaborationProgress`] is an output port the presentation layer
//! implements to show what the roles are doing while a request runs.
//! All callback argument types come from the domain layer.
//!
//! All methods default to no-ops, so implementers only override the
//! callbacks they care about.

use hydra_domain::{Directive, RoleId, ToolCall, ToolResult, Transition};
use std::time::Duration;

pub trait CollaborationProgress: Send + Sync {
    /// A role is about to be called (`round` counts tool rounds, from 1)
    fn on_turn_start(&self, _role: &RoleId, _round: usize) {}

    /// The backend call for a role returned (successfully or not)
    fn on_turn_end(&self, _role: &RoleId) {}

    /// A transient backend failure will be retried after `delay`
    fn on_backend_retry(
        &self,
        _role: &RoleId,
        _attempt: usize,
        _max_attempts: usize,
        _delay: Duration,
        _error: &str,
    ) {
    }

    /// Text a role produced, markers and tool blocks removed
    fn on_role_output(&self, _role: &RoleId, _text: &str) {}

    /// A tool call is about to run
    fn on_tool_call(&self, _role: &RoleId, _call: &ToolCall) {}

    fn on_tool_result(&self, _role: &RoleId, _result: &ToolResult) {}

    /// The operator declined a tool call
    fn on_tool_declined(&self, _role: &RoleId, _call: &ToolCall) {}

    /// A tool call needs confirmation; emitted before the prompt is shown
    fn on_confirmation_required(&self, _role: &RoleId, _call: &ToolCall) {}

    fn on_directive(&self, _role: &RoleId, _directive: &Directive) {}

    fn on_transition(&self, _transition: &Transition) {}

    /// Ignored or superseded directives and other recoverable problems
    fn on_warning(&self, _message: &str) {}
}

/// No-op implementation for headless runs and tests.
pub struct NoProgress;

impl CollaborationProgress for NoProgress {}
