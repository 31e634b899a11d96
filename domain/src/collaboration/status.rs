//! Collaboration status

use crate::role::RoleId;
use std::fmt;

/// Where the session stands.
///
/// The transient states (`AwaitingHelp`, `Delegated`, `HandedOff`) last until
/// the target role's first reply, after which the status becomes
/// `RoleActive(target)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollaborationStatus {
    Idle,
    RoleActive(RoleId),
    AwaitingHelp { from: RoleId, to: RoleId },
    Delegated { from: RoleId, to: RoleId, subtask: String },
    HandedOff { to: RoleId },
    Complete,
}

impl CollaborationStatus {
    /// The role whose turn it is, if any.
    pub fn active_role(&self) -> Option<&RoleId> {
        match self {
            CollaborationStatus::RoleActive(role)
            | CollaborationStatus::AwaitingHelp { to: role, .. }
            | CollaborationStatus::Delegated { to: role, .. }
            | CollaborationStatus::HandedOff { to: role } => Some(role),
            CollaborationStatus::Idle | CollaborationStatus::Complete => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, CollaborationStatus::Complete)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, CollaborationStatus::Idle)
    }

    pub fn label(&self) -> &'static str {
        match self {
            CollaborationStatus::Idle => "idle",
            CollaborationStatus::RoleActive(_) => "active",
            CollaborationStatus::AwaitingHelp { .. } => "awaiting-help",
            CollaborationStatus::Delegated { .. } => "delegated",
            CollaborationStatus::HandedOff { .. } => "handed-off",
            CollaborationStatus::Complete => "complete",
        }
    }
}

impl fmt::Display for CollaborationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollaborationStatus::Idle => write!(f, "idle"),
            CollaborationStatus::RoleActive(role) => write!(f, "active({})", role),
            CollaborationStatus::AwaitingHelp { from, to } => {
                write!(f, "awaiting-help({} -> {})", from, to)
            }
            CollaborationStatus::Delegated { from, to, .. } => {
                write!(f, "delegated({} -> {})", from, to)
            }
            CollaborationStatus::HandedOff { to } => write!(f, "handed-off(-> {})", to),
            CollaborationStatus::Complete => write!(f, "complete"),
        }
    }
}
