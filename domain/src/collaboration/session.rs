//! Session state owned by the router.

use super::frames::{Briefing, DelegationFrame, HelpFrame};
use super::status::CollaborationStatus;
use crate::context::ContextStore;
use crate::role::RoleId;
use crate::tool::ApprovalState;

/// Auto-pilot budget: role-to-role transfers allowed before forcing completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Autopilot {
    pub max_transitions: usize,
    pub transitions: usize,
}

impl Autopilot {
    pub fn new(max_transitions: usize) -> Self {
        Self {
            max_transitions,
            transitions: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.max_transitions.saturating_sub(self.transitions)
    }
}

/// The part of the session a turn may change. Cloned and committed as a unit.
#[derive(Debug, Clone)]
pub(crate) struct ControlState {
    pub(crate) status: CollaborationStatus,
    pub(crate) delegations: Vec<DelegationFrame>,
    pub(crate) help_frames: Vec<HelpFrame>,
    pub(crate) autopilot: Option<Autopilot>,
    pub(crate) briefing: Option<Briefing>,
    /// Role that held control when the last task completed.
    pub(crate) last_active: Option<RoleId>,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            status: CollaborationStatus::Idle,
            delegations: Vec::new(),
            help_frames: Vec::new(),
            autopilot: None,
            briefing: None,
            last_active: None,
        }
    }
}

/// Read-only view of a collaboration session.
#[derive(Debug, Clone, Default)]
pub struct CollaborationSession {
    pub(crate) control: ControlState,
    pub(crate) context: ContextStore,
    pub(crate) approvals: ApprovalState,
}

impl CollaborationSession {
    pub fn status(&self) -> &CollaborationStatus {
        &self.control.status
    }

    pub fn active_role(&self) -> Option<&RoleId> {
        self.control.status.active_role()
    }

    /// Pending delegations, outermost first.
    pub fn delegation_stack(&self) -> &[DelegationFrame] {
        &self.control.delegations
    }

    pub fn help_frames(&self) -> &[HelpFrame] {
        &self.control.help_frames
    }

    pub fn autopilot(&self) -> Option<&Autopilot> {
        self.control.autopilot.as_ref()
    }

    pub fn pending_briefing(&self) -> Option<&Briefing> {
        self.control.briefing.as_ref()
    }

    pub fn context(&self) -> &ContextStore {
        &self.context
    }

    pub fn approvals(&self) -> &ApprovalState {
        &self.approvals
    }
}
