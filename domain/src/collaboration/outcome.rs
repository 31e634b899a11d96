//! Results of applying a role turn.

use super::status::CollaborationStatus;
use crate::core::error::DomainError;
use crate::role::RoleId;
use std::fmt;

/// A state change caused by a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    HelpRequested {
        from: RoleId,
        to: RoleId,
    },
    Delegated {
        from: RoleId,
        to: RoleId,
        subtask: String,
    },
    HandedOff {
        from: RoleId,
        to: RoleId,
    },
    /// Control returned to a delegator or help requester.
    Resumed {
        from: RoleId,
        to: RoleId,
    },
    Completed {
        by: RoleId,
    },
    /// Auto-pilot hit its transition cap; remaining frames were dropped.
    LimitExceeded {
        max: usize,
        abandoned_frames: usize,
    },
}

impl Transition {
    /// Transitions after which a different role holds control.
    pub fn moves_control(&self) -> bool {
        matches!(
            self,
            Transition::HelpRequested { .. }
                | Transition::Delegated { .. }
                | Transition::HandedOff { .. }
                | Transition::Resumed { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Transition::HelpRequested { .. } => "help_requested",
            Transition::Delegated { .. } => "delegated",
            Transition::HandedOff { .. } => "handed_off",
            Transition::Resumed { .. } => "resumed",
            Transition::Completed { .. } => "completed",
            Transition::LimitExceeded { .. } => "limit_exceeded",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::HelpRequested { from, to } => write!(f, "{} asked {} for help", from, to),
            Transition::Delegated { from, to, subtask } => {
                write!(f, "{} delegated to {}: {}", from, to, subtask)
            }
            Transition::HandedOff { from, to } => write!(f, "{} handed off to {}", from, to),
            Transition::Resumed { from, to } => write!(f, "{} returned control to {}", from, to),
            Transition::Completed { by } => write!(f, "{} completed the task", by),
            Transition::LimitExceeded {
                max,
                abandoned_frames,
            } => write!(
                f,
                "transition limit of {} reached ({} open frames abandoned)",
                max, abandoned_frames
            ),
        }
    }
}

/// What happened when a turn was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub transitions: Vec<Transition>,
    /// Ignored, superseded or malformed directives.
    pub warnings: Vec<String>,
    /// Payloads added to the discovery ledger this turn.
    pub discoveries: Vec<String>,
    /// Status after the turn.
    pub status: CollaborationStatus,
    /// Set when auto-pilot forced completion.
    pub diagnostic: Option<DomainError>,
}

impl TurnOutcome {
    pub(crate) fn new(status: CollaborationStatus) -> Self {
        Self {
            transitions: Vec::new(),
            warnings: Vec::new(),
            discoveries: Vec::new(),
            status,
            diagnostic: None,
        }
    }

    pub fn control_moved(&self) -> bool {
        self.transitions.iter().any(Transition::moves_control)
    }

    pub fn is_complete(&self) -> bool {
        self.status.is_complete()
    }

    pub fn limit_exceeded(&self) -> bool {
        matches!(
            self.diagnostic,
            Some(DomainError::OrchestrationLimitExceeded { .. })
        )
    }
}
