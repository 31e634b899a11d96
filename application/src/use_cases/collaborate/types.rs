//! Input/output and error types for the collaboration use case.

use crate::ports::backend_client::BackendError;
use crate::ports::confirmation::ConfirmationError;
use hydra_domain::{CollaborationRouter, CollaborationStatus, DomainError, RoleId, Transition};
use thiserror::Error;

use super::stats::CallStats;

/// Errors that end a request early.
///
/// The router state is left as it was before the failing turn; every turn
/// that completed earlier in the same request stays committed.
#[derive(Error, Debug)]
pub enum CollaborationError {
    #[error("Backend call for role '{role}' failed: {source}")]
    Backend {
        role: RoleId,
        #[source]
        source: BackendError,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("No role is active")]
    NoActiveRole,

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Confirmation failed: {0}")]
    Confirmation(ConfirmationError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl CollaborationError {
    pub fn is_cancelled(&self) -> bool {
        match self {
            CollaborationError::Cancelled => true,
            CollaborationError::Confirmation(ConfirmationError::Cancelled) => true,
            CollaborationError::Domain(e) => e.is_cancelled(),
            _ => false,
        }
    }
}

/// Mutable state of one interactive session.
///
/// The router owns the collaboration state and shared context; the stats
/// count backend calls for `/stats`. Both are reset when the session ends.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub router: CollaborationRouter,
    pub stats: CallStats,
}

impl SessionState {
    pub fn new(router: CollaborationRouter) -> Self {
        Self {
            router,
            stats: CallStats::default(),
        }
    }
}

/// Summary of one operator request.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Role turns applied (tool rounds inside a turn are not counted)
    pub turns: usize,
    pub transitions: Vec<Transition>,
    pub warnings: Vec<String>,
    pub status: CollaborationStatus,
    /// Set when auto-pilot hit the transition cap
    pub diagnostic: Option<DomainError>,
    /// Last non-empty clean text produced by a role
    pub final_text: Option<String>,
}

impl RunReport {
    pub(super) fn new(status: CollaborationStatus) -> Self {
        Self {
            turns: 0,
            transitions: Vec::new(),
            warnings: Vec::new(),
            status,
            diagnostic: None,
            final_text: None,
        }
    }

    /// Role switches during the request
    pub fn control_transfers(&self) -> usize {
        self.transitions.iter().filter(|t| t.moves_control()).count()
    }
}
