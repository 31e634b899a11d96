//! Application layer for hydra-code
//!
//! This crate contains use cases, port definitions, and session parameters.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::SessionParams;
pub use ports::{
    backend_client::{BackendClient, BackendError, ChatMessage, ChatRole},
    confirmation::{
        AutoAcceptConfirmation, AutoRejectConfirmation, ConfirmationDecision, ConfirmationError,
        ConfirmationPort,
    },
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    progress::{CollaborationProgress, NoProgress},
    tool_executor::ToolExecutorPort,
    ui_event::{Language, UiEvent},
};
pub use use_cases::collaborate::{
    CallStats, CollaborateUseCase, CollaborationError, RunReport, SessionState,
};
pub use use_cases::commands::{CommandParseError, SlashCommand};
pub use use_cases::controller::{CommandAction, SessionController};
