//! Collaborate use case: one operator request, one or more role turns.
//!
//! | Step | What happens |
//! |------|--------------|
//! | 1 | `begin_task` picks the role holding control (default role if none) |
//! | 2 | The operator message is appended to history |
//! | 3 | The active role is called; tool requests run through the gatekeeper and the role is called again, up to `max_tool_turns` rounds |
//! | 4 | The final reply and all directives of the turn are applied by the router in one step |
//! | 5 | In auto-pilot, if control moved, the new role runs at step 3; otherwise the request ends |
//!
//! A failed or cancelled turn applies no transition: directives are only
//! handed to the router once the turn's final reply is in.

mod prompt;
mod retry;
pub mod stats;
mod tools;
mod types;

pub use prompt::{build_messages, render_briefing, system_prompt};
pub use stats::{CallStats, RoleCallStats, estimate_tokens};
pub use tools::tool_message;
pub use types::{CollaborationError, RunReport, SessionState};

use crate::config::SessionParams;
use crate::ports::backend_client::BackendClient;
use crate::ports::confirmation::{AutoRejectConfirmation, ConfirmationPort};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::progress::{CollaborationProgress, NoProgress};
use crate::ports::tool_executor::ToolExecutorPort;
use hydra_domain::{Directive, ParsedOutput, ProtocolParser, RoleId, TurnOutcome};
use retry::{RetryContext, send_with_retry};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tools::ToolRunner;
use tracing::{debug, info, warn};

/// Use case driving role turns against the backend and local tools.
pub struct CollaborateUseCase<B: BackendClient + 'static, T: ToolExecutorPort + 'static> {
    backend: Arc<B>,
    tool_executor: Arc<T>,
    confirmation: Arc<dyn ConfirmationPort>,
    logger: Arc<dyn ConversationLogger>,
    params: SessionParams,
    cancellation_token: Option<CancellationToken>,
}

impl<B, T> Clone for CollaborateUseCase<B, T>
where
    B: BackendClient + 'static,
    T: ToolExecutorPort + 'static,
{
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            tool_executor: self.tool_executor.clone(),
            confirmation: self.confirmation.clone(),
            logger: self.logger.clone(),
            params: self.params.clone(),
            cancellation_token: self.cancellation_token.clone(),
        }
    }
}

impl<B: BackendClient + 'static, T: ToolExecutorPort + 'static> CollaborateUseCase<B, T> {
    /// Without a confirmation handler every gated tool call is declined.
    pub fn new(backend: Arc<B>, tool_executor: Arc<T>, params: SessionParams) -> Self {
        Self {
            backend,
            tool_executor,
            confirmation: Arc::new(AutoRejectConfirmation),
            logger: Arc::new(NoConversationLogger),
            params,
            cancellation_token: None,
        }
    }

    pub fn with_confirmation(mut self, confirmation: Arc<dyn ConfirmationPort>) -> Self {
        self.confirmation = confirmation;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Replace the cancellation token (one token per request in the REPL)
    pub fn set_cancellation(&mut self, token: CancellationToken) {
        self.cancellation_token = Some(token);
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    pub fn tool_executor(&self) -> &T {
        &self.tool_executor
    }

    /// Run a request without progress reporting
    pub async fn execute(
        &self,
        state: &mut SessionState,
        input: &str,
    ) -> Result<RunReport, CollaborationError> {
        self.execute_with_progress(state, input, &NoProgress).await
    }

    pub async fn execute_with_progress(
        &self,
        state: &mut SessionState,
        input: &str,
        progress: &dyn CollaborationProgress,
    ) -> Result<RunReport, CollaborationError> {
        if self.is_cancelled() {
            return Err(CollaborationError::Cancelled);
        }

        let mut role = state.router.begin_task(&self.params.default_role)?;
        info!(role = %role, autopilot = state.router.is_autopilot(), "Starting request");
        state.router.record_user_message(input);
        self.logger.log(ConversationEvent::new(
            "user_message",
            serde_json::json!({ "content": input }),
        ));

        let mut report = RunReport::new(state.router.status().clone());
        loop {
            let (outcome, text) = self.run_role_turn(state, &role, progress).await?;
            report.turns += 1;
            if !text.is_empty() {
                report.final_text = Some(text);
            }

            for warning in &outcome.warnings {
                warn!(role = %role, "{}", warning);
                progress.on_warning(warning);
            }
            for transition in &outcome.transitions {
                info!(status = %outcome.status, "{}", transition);
                progress.on_transition(transition);
                self.logger.log(ConversationEvent::new(
                    "transition",
                    serde_json::json!({
                        "kind": transition.label(),
                        "detail": transition.to_string(),
                        "status": outcome.status.to_string(),
                    }),
                ));
            }

            let moved = outcome.control_moved();
            let complete = outcome.is_complete();
            report.status = outcome.status;
            report.transitions.extend(outcome.transitions);
            report.warnings.extend(outcome.warnings);
            if let Some(diagnostic) = outcome.diagnostic {
                warn!("{}", diagnostic);
                report.diagnostic = Some(diagnostic);
                break;
            }

            if complete || !moved || !state.router.is_autopilot() {
                break;
            }
            match state.router.active_role() {
                Some(next) => role = next.clone(),
                None => break,
            }
        }

        info!(
            status = %report.status,
            turns = report.turns,
            transfers = report.control_transfers(),
            "Request finished"
        );
        Ok(report)
    }

    /// One role turn: backend calls and tool rounds, then a single router step.
    ///
    /// Returns the router outcome and the clean text of the final reply.
    async fn run_role_turn(
        &self,
        state: &mut SessionState,
        role: &RoleId,
        progress: &dyn CollaborationProgress,
    ) -> Result<(TurnOutcome, String), CollaborationError> {
        let definition = state
            .router
            .registry()
            .get(role)
            .cloned()
            .ok_or_else(|| CollaborationError::UnknownRole(role.to_string()))?;
        // Peek only: the briefing is consumed once the turn succeeds
        let briefing = state.router.session().pending_briefing().cloned();

        let retry_ctx = RetryContext {
            params: &self.params,
            cancellation: self.cancellation_token.as_ref(),
            progress,
            logger: self.logger.as_ref(),
        };
        let runner = ToolRunner {
            executor: self.tool_executor.as_ref(),
            confirmation: self.confirmation.as_ref(),
            logger: self.logger.as_ref(),
            cancellation: self.cancellation_token.as_ref(),
        };

        let mut directives: Vec<Directive> = Vec::new();
        let mut round = 0;
        loop {
            round += 1;
            let messages = build_messages(
                &definition,
                state.router.registry(),
                self.tool_executor.tool_spec(),
                state.router.session().context(),
                self.params.context_window,
                briefing.as_ref(),
                round,
            );

            progress.on_turn_start(role, round);
            let reply = send_with_retry(
                self.backend.as_ref(),
                &definition,
                &messages,
                &mut state.stats,
                &retry_ctx,
            )
            .await;
            progress.on_turn_end(role);
            let raw = reply?;

            let parsed = ProtocolParser::new(state.router.registry()).parse(&raw);
            let has_tool_requests = parsed.has_tool_requests();
            let ParsedOutput {
                directives: parsed_directives,
                tool_calls,
                malformed_tool_blocks,
                clean_text,
            } = parsed;

            self.logger.log(ConversationEvent::new(
                "role_response",
                serde_json::json!({
                    "role": role.as_str(),
                    "text": clean_text,
                    "raw_bytes": raw.len(),
                }),
            ));
            for directive in &parsed_directives {
                self.logger.log(ConversationEvent::new(
                    "directive",
                    serde_json::json!({
                        "role": role.as_str(),
                        "kind": directive.label(),
                        "detail": directive.to_string(),
                    }),
                ));
                if !matches!(directive, Directive::RecoverableError { .. }) {
                    debug!(role = %role, "{}", directive);
                    progress.on_directive(role, directive);
                }
            }
            if !clean_text.is_empty() {
                progress.on_role_output(role, &clean_text);
            }
            directives.extend(parsed_directives);

            if has_tool_requests && round <= self.params.max_tool_turns {
                if !clean_text.is_empty() {
                    state.router.record_role_message(role, clean_text)?;
                }
                for block in &malformed_tool_blocks {
                    runner.reject_malformed(&mut state.router, role, block, progress);
                }
                for call in &tool_calls {
                    runner.run(&mut state.router, role, call, progress).await?;
                }
                continue;
            }

            if has_tool_requests {
                let ignored = tool_calls.len() + malformed_tool_blocks.len();
                directives.push(Directive::RecoverableError {
                    message: format!(
                        "tool round limit ({}) reached; {} tool request(s) ignored",
                        self.params.max_tool_turns, ignored
                    ),
                });
            }

            state.router.take_briefing();
            let outcome = state
                .router
                .apply_turn(role, &clean_text, &directives)?;
            return Ok((outcome, clean_text));
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation_token
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}
