//! Tool approval decisions.

use super::entities::ToolKind;
use crate::role::RoleId;
use std::collections::BTreeSet;

/// Outcome of gating a tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Run without asking.
    ExecuteNow,
    /// Ask the operator first.
    RequirePrompt,
}

/// Auto-approve flags for the session.
///
/// The global flag comes from `auto_approve` / `-y` / `/yes`; per-role grants
/// come from `/<role> -y`. Grants persist until revoked or the session ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovalState {
    global: bool,
    roles: BTreeSet<RoleId>,
}

impl ApprovalState {
    pub fn new(global: bool) -> Self {
        Self {
            global,
            roles: BTreeSet::new(),
        }
    }

    pub fn global(&self) -> bool {
        self.global
    }

    pub fn set_global(&mut self, enabled: bool) {
        self.global = enabled;
    }

    pub fn grant(&mut self, role: RoleId) {
        self.roles.insert(role);
    }

    pub fn revoke(&mut self, role: &RoleId) {
        self.roles.remove(role);
    }

    pub fn granted_roles(&self) -> impl Iterator<Item = &RoleId> {
        self.roles.iter()
    }

    pub fn is_auto_approved(&self, role: &RoleId) -> bool {
        self.global || self.roles.contains(role)
    }
}

/// Decides whether a tool call runs immediately or needs confirmation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolGatekeeper;

impl ToolGatekeeper {
    pub fn decide(&self, kind: ToolKind, role: &RoleId, approvals: &ApprovalState) -> GateDecision {
        if !kind.mutates() || approvals.is_auto_approved(role) {
            GateDecision::ExecuteNow
        } else {
            GateDecision::RequirePrompt
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_and_searches_never_prompt() {
        let approvals = ApprovalState::default();
        let role = RoleId::new("opus");
        for kind in [ToolKind::FileRead, ToolKind::Search] {
            assert_eq!(
                ToolGatekeeper.decide(kind, &role, &approvals),
                GateDecision::ExecuteNow
            );
        }
    }

    #[test]
    fn test_writes_prompt_without_auto_approve() {
        let approvals = ApprovalState::default();
        let role = RoleId::new("opus");
        for kind in [ToolKind::FileWrite, ToolKind::Execute] {
            assert_eq!(
                ToolGatekeeper.decide(kind, &role, &approvals),
                GateDecision::RequirePrompt
            );
        }
    }

    #[test]
    fn test_global_auto_approve() {
        let approvals = ApprovalState::new(true);
        assert_eq!(
            ToolGatekeeper.decide(ToolKind::Execute, &RoleId::new("fast"), &approvals),
            GateDecision::ExecuteNow
        );
    }

    #[test]
    fn test_per_role_grant_only_covers_that_role() {
        let mut approvals = ApprovalState::default();
        approvals.grant(RoleId::new("opus"));

        assert_eq!(
            ToolGatekeeper.decide(ToolKind::FileWrite, &RoleId::new("opus"), &approvals),
            GateDecision::ExecuteNow
        );
        assert_eq!(
            ToolGatekeeper.decide(ToolKind::FileWrite, &RoleId::new("pro"), &approvals),
            GateDecision::RequirePrompt
        );

        approvals.revoke(&RoleId::new("opus"));
        assert_eq!(
            ToolGatekeeper.decide(ToolKind::FileWrite, &RoleId::new("opus"), &approvals),
            GateDecision::RequirePrompt
        );
    }
}
