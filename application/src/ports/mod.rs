//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod backend_client;
pub mod confirmation;
pub mod conversation_logger;
pub mod progress;
pub mod tool_executor;
pub mod ui_event;
