//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Role '{0}' is not available (missing credentials, endpoint or model)")]
    RoleUnavailable(String),

    #[error("No active role")]
    NoActiveRole,

    #[error("Role '{actual}' is not the active role ('{expected}')")]
    NotActiveRole { expected: String, actual: String },

    #[error("Orchestration limit exceeded after {transitions} transitions (max {max})")]
    OrchestrationLimitExceeded { max: usize, transitions: usize },

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}
