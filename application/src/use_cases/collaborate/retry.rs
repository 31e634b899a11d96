//! Backend calls with bounded retries and cancellation.

use super::stats::CallStats;
use super::types::CollaborationError;
use crate::config::SessionParams;
use crate::ports::backend_client::{BackendClient, BackendError, ChatMessage};
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::progress::CollaborationProgress;
use hydra_domain::RoleDefinition;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Await `fut` unless `token` fires first.
pub(super) async fn cancellable<F: Future>(
    token: Option<&CancellationToken>,
    fut: F,
) -> Result<F::Output, CollaborationError> {
    match token {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(CollaborationError::Cancelled),
            output = fut => Ok(output),
        },
        None => Ok(fut.await),
    }
}

pub(super) struct RetryContext<'a> {
    pub params: &'a SessionParams,
    pub cancellation: Option<&'a CancellationToken>,
    pub progress: &'a dyn CollaborationProgress,
    pub logger: &'a dyn ConversationLogger,
}

/// Send `messages` for `role`, retrying transport failures and rate limits.
///
/// Waits `retry_backoff_ms * 2^(attempt-1)` between attempts, or the
/// server's `retry_after` when that is longer.
pub(super) async fn send_with_retry<B: BackendClient + ?Sized>(
    backend: &B,
    role: &RoleDefinition,
    messages: &[ChatMessage],
    stats: &mut CallStats,
    ctx: &RetryContext<'_>,
) -> Result<String, CollaborationError> {
    let max_attempts = ctx.params.backend_retries.max(1);
    let prompt_chars: usize = messages.iter().map(|m| m.content.chars().count()).sum();
    let mut attempt = 1;

    loop {
        debug!(role = %role.id, attempt, "Calling backend");
        let result = cancellable(ctx.cancellation, backend.send(role, messages)).await?;

        let error = match result {
            Ok(text) => {
                stats.record(&role.id, prompt_chars, Some(text.chars().count()));
                return Ok(text);
            }
            Err(error) => error,
        };
        stats.record(&role.id, prompt_chars, None);
        ctx.logger.log(ConversationEvent::new(
            "backend_error",
            serde_json::json!({
                "role": role.id.as_str(),
                "kind": error.kind(),
                "message": error.to_string(),
                "attempt": attempt,
            }),
        ));

        if !error.is_retryable() || attempt >= max_attempts {
            return Err(CollaborationError::Backend {
                role: role.id.clone(),
                source: error,
            });
        }

        let mut delay = ctx.params.retry_delay(attempt);
        if let BackendError::RateLimit {
            retry_after: Some(retry_after),
            ..
        } = &error
        {
            delay = delay.max(*retry_after);
        }
        warn!(
            role = %role.id,
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            "Backend call failed, retrying: {}",
            error
        );
        ctx.progress
            .on_backend_retry(&role.id, attempt, max_attempts, delay, &error.to_string());
        cancellable(ctx.cancellation, tokio::time::sleep(delay)).await?;
        attempt += 1;
    }
}
