//! Gated tool execution inside a role turn.
//!
//! Read and search tools run at once. Writes and commands run at once only
//! when auto-approve covers the active role; otherwise the operator is asked
//! and a refusal is written back as "declined by operator".

use super::retry::cancellable;
use super::types::CollaborationError;
use crate::ports::confirmation::{ConfirmationDecision, ConfirmationError, ConfirmationPort};
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::progress::CollaborationProgress;
use crate::ports::tool_executor::ToolExecutorPort;
use hydra_domain::core::string::truncate;
use hydra_domain::protocol::MalformedToolBlock;
use hydra_domain::tool::{DefaultToolValidator, ToolValidator};
use hydra_domain::{CollaborationRouter, GateDecision, RoleId, ToolCall, ToolError, ToolResult};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Size cap for tool output written back into history.
const MAX_TOOL_OUTPUT_CHARS: usize = 20_000;

pub(super) struct ToolRunner<'a, T: ToolExecutorPort + ?Sized> {
    pub executor: &'a T,
    pub confirmation: &'a dyn ConfirmationPort,
    pub logger: &'a dyn ConversationLogger,
    pub cancellation: Option<&'a CancellationToken>,
}

impl<T: ToolExecutorPort + ?Sized> ToolRunner<'_, T> {
    /// Run one call for `role` and append its result to history.
    pub async fn run(
        &self,
        router: &mut CollaborationRouter,
        role: &RoleId,
        call: &ToolCall,
        progress: &dyn CollaborationProgress,
    ) -> Result<ToolResult, CollaborationError> {
        let Some(definition) = self.executor.resolve_tool(&call.tool_name).cloned() else {
            warn!(role = %role, tool = %call.tool_name, "Unknown tool requested");
            let result = ToolResult::failure(
                call.tool_name.clone(),
                ToolError::not_found(format!(
                    "tool '{}' (available: {})",
                    call.tool_name,
                    self.executor.available_tools().join(", ")
                )),
            );
            self.finish(router, role, call, "unknown", &result, progress);
            return Ok(result);
        };

        // Aliases resolve to the canonical name before anything else sees the call
        let mut call = call.clone();
        call.tool_name = definition.name.clone();

        if let Err(message) = DefaultToolValidator.validate(&call, &definition) {
            let result =
                ToolResult::failure(call.tool_name.clone(), ToolError::invalid_argument(message));
            self.finish(router, role, &call, "invalid", &result, progress);
            return Ok(result);
        }

        let decision = match router.gate(definition.kind) {
            GateDecision::ExecuteNow => "auto",
            GateDecision::RequirePrompt => {
                progress.on_confirmation_required(role, &call);
                let answer = cancellable(
                    self.cancellation,
                    self.confirmation.confirm_tool(role, &call, &definition),
                )
                .await?;
                match answer {
                    Ok(ConfirmationDecision::Accept) => "accepted",
                    Ok(ConfirmationDecision::Reject) => {
                        info!(role = %role, tool = %call.tool_name, "Tool call declined by operator");
                        progress.on_tool_declined(role, &call);
                        let result = ToolResult::declined(call.tool_name.clone());
                        self.finish(router, role, &call, "declined", &result, progress);
                        return Ok(result);
                    }
                    Err(ConfirmationError::Cancelled) => return Err(CollaborationError::Cancelled),
                    Err(e) => return Err(CollaborationError::Confirmation(e)),
                }
            }
        };

        progress.on_tool_call(role, &call);
        debug!(role = %role, call = %call.summary(), "Executing tool");
        let result = cancellable(self.cancellation, self.executor.execute(&call)).await?;
        self.finish(router, role, &call, decision, &result, progress);
        Ok(result)
    }

    /// Report a tool block that could not be parsed back to the role.
    pub fn reject_malformed(
        &self,
        router: &mut CollaborationRouter,
        role: &RoleId,
        block: &MalformedToolBlock,
        progress: &dyn CollaborationProgress,
    ) {
        let message = format!("invalid tool request: {}", block.reason);
        warn!(role = %role, "{}", message);
        progress.on_warning(&format!("{}: {}", role, message));
        router.record_tool_result("tool", format!("[tool] error: {}", message));
    }

    fn finish(
        &self,
        router: &mut CollaborationRouter,
        role: &RoleId,
        call: &ToolCall,
        decision: &str,
        result: &ToolResult,
        progress: &dyn CollaborationProgress,
    ) {
        self.logger.log(ConversationEvent::new(
            "tool_call",
            serde_json::json!({
                "role": role.as_str(),
                "tool": call.tool_name,
                "args": call.arguments,
                "decision": decision,
            }),
        ));
        self.logger.log(ConversationEvent::new(
            "tool_result",
            serde_json::json!({
                "role": role.as_str(),
                "tool": result.tool_name,
                "success": result.is_success(),
                "output_preview": result.output().map(|o| truncate(o, 200)),
            }),
        ));
        if !result.error().is_some_and(ToolError::is_declined) {
            progress.on_tool_result(role, result);
        }
        router.record_tool_result(&result.tool_name, tool_message(result));
    }
}

/// History entry for a tool result, as the requesting role will read it.
pub fn tool_message(result: &ToolResult) -> String {
    match result.error() {
        None => format!(
            "[tool:{}] ok\n{}",
            result.tool_name,
            truncate(result.output().unwrap_or_default(), MAX_TOOL_OUTPUT_CHARS)
        ),
        Some(error) if error.is_declined() => {
            format!("[tool:{}] declined by operator", result.tool_name)
        }
        Some(error) => format!("[tool:{}] error: {}", result.tool_name, error),
    }
}
