//! Port for structured conversation logging.
//!
//! [`ConversationLogger`] records the collaboration transcript (operator
//! messages, role replies, directives, transitions, tool activity) as
//! machine-readable events, typically one JSON object per line.
//!
//! This is separate from `tracing`: tracing carries human-oriented
//! diagnostics, this port carries the full transcript.
//!
//! | Event type | Payload fields |
//! |------------|----------------|
//! | `user_message` | `content` |
//! | `role_response` | `role`, `text`, `raw_bytes` |
//! | `directive` | `role`, `kind`, `detail` |
//! | `transition` | `kind`, `detail`, `status` |
//! | `tool_call` | `role`, `tool`, `args`, `decision` |
//! | `tool_result` | `role`, `tool`, `success`, `output_preview` |
//! | `backend_error` | `role`, `kind`, `message`, `attempt` |

use serde_json::Value;

/// A structured conversation event.
pub struct ConversationEvent {
    /// Event type identifier (see the module table).
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging conversation events.
///
/// `log` is synchronous and infallible; adapters swallow their own I/O errors
/// so that logging never interrupts a session.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
