//! Delegation and help frames, and the briefing handed to the next role.

use crate::context::{Discovery, Message};
use crate::role::RoleId;

/// An outstanding `[DELEGATE]`: `delegate` works on `subtask` for `delegator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationFrame {
    pub delegator: RoleId,
    pub delegate: RoleId,
    pub subtask: String,
}

/// An outstanding `[REQUEST_HELP]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpFrame {
    pub requester: RoleId,
    pub helper: RoleId,
    pub question: Option<String>,
}

/// Instruction that leads the next turn of a newly active role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Briefing {
    Help {
        requester: RoleId,
        question: Option<String>,
        /// Requester's recent context at the time of the request
        recent: Vec<Message>,
        ledger: Vec<Discovery>,
    },
    Delegation {
        delegator: RoleId,
        subtask: String,
    },
    /// Control came back after a delegation or help request finished.
    Resume {
        from: RoleId,
        subtask: Option<String>,
    },
    Handoff {
        from: RoleId,
    },
}
