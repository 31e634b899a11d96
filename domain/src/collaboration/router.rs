//! Role router: applies role turns to the collaboration state.

use super::frames::{Briefing, DelegationFrame, HelpFrame};
use super::outcome::{Transition, TurnOutcome};
use super::session::{Autopilot, CollaborationSession, ControlState};
use super::status::CollaborationStatus;
use crate::context::Message;
use crate::core::error::DomainError;
use crate::protocol::Directive;
use crate::role::{RoleId, RoleRegistry};
use crate::tool::{ApprovalState, GateDecision, ToolGatekeeper, ToolKind};

/// Router knobs taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterSettings {
    /// History entries copied into a help request's briefing
    pub help_context_window: usize,
    /// Initial global auto-approve flag
    pub auto_approve: bool,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            help_context_window: 6,
            auto_approve: false,
        }
    }
}

/// Owns the collaboration session and is the only writer of its state.
#[derive(Debug, Clone)]
pub struct CollaborationRouter {
    registry: RoleRegistry,
    session: CollaborationSession,
    gatekeeper: ToolGatekeeper,
    help_context_window: usize,
}

impl CollaborationRouter {
    pub fn new(registry: RoleRegistry, settings: RouterSettings) -> Self {
        Self {
            registry,
            session: CollaborationSession {
                approvals: ApprovalState::new(settings.auto_approve),
                ..Default::default()
            },
            gatekeeper: ToolGatekeeper,
            help_context_window: settings.help_context_window,
        }
    }

    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    pub fn session(&self) -> &CollaborationSession {
        &self.session
    }

    pub fn status(&self) -> &CollaborationStatus {
        self.session.status()
    }

    pub fn active_role(&self) -> Option<&RoleId> {
        self.session.active_role()
    }

    /// Operator switch to `role`. Open frames are dropped and auto-pilot ends.
    ///
    /// Returns the number of abandoned frames.
    pub fn activate(&mut self, role: &RoleId, grant_auto_approve: bool) -> Result<usize, DomainError> {
        self.check_target(role)?;
        let control = &mut self.session.control;
        let abandoned = control.delegations.len() + control.help_frames.len();
        control.delegations.clear();
        control.help_frames.clear();
        control.autopilot = None;
        control.briefing = None;
        control.status = CollaborationStatus::RoleActive(role.clone());
        if grant_auto_approve {
            self.session.approvals.grant(role.clone());
        }
        Ok(abandoned)
    }

    pub fn enter_autopilot(&mut self, max_transitions: usize) {
        self.session.control.autopilot = Some(Autopilot::new(max_transitions));
    }

    pub fn exit_autopilot(&mut self) {
        self.session.control.autopilot = None;
    }

    pub fn is_autopilot(&self) -> bool {
        self.session.control.autopilot.is_some()
    }

    /// Make sure a role holds control before a new operator message.
    ///
    /// After `Complete` the role that finished resumes; from `Idle` the
    /// default role starts. The auto-pilot budget is reset.
    pub fn begin_task(&mut self, default_role: &RoleId) -> Result<RoleId, DomainError> {
        if self.session.active_role().is_none() {
            let role = self
                .session
                .control
                .last_active
                .clone()
                .filter(|r| self.registry.is_available(r))
                .unwrap_or_else(|| default_role.clone());
            self.check_target(&role)?;
            self.session.control.status = CollaborationStatus::RoleActive(role);
        }
        if let Some(autopilot) = self.session.control.autopilot.as_mut() {
            autopilot.transitions = 0;
        }
        self.session
            .active_role()
            .cloned()
            .ok_or(DomainError::NoActiveRole)
    }

    pub fn record_user_message(&mut self, content: impl Into<String>) -> u64 {
        self.session.context.append(Message::user(content))
    }

    /// Record intermediate output of the active role (e.g. before tool calls).
    pub fn record_role_message(
        &mut self,
        role: &RoleId,
        content: impl Into<String>,
    ) -> Result<u64, DomainError> {
        self.ensure_active(role)?;
        Ok(self
            .session
            .context
            .append(Message::from_role(role.clone(), content)))
    }

    pub fn record_tool_result(&mut self, tool_name: &str, content: impl Into<String>) -> u64 {
        self.session.context.append(Message::tool(tool_name, content))
    }

    /// Consume the instruction prepared for the active role's next turn.
    pub fn take_briefing(&mut self) -> Option<Briefing> {
        self.session.control.briefing.take()
    }

    pub fn clear_history(&mut self) {
        self.session.context.clear();
    }

    pub fn set_global_auto_approve(&mut self, enabled: bool) {
        self.session.approvals.set_global(enabled);
    }

    pub fn toggle_global_auto_approve(&mut self) -> bool {
        let enabled = !self.session.approvals.global();
        self.session.approvals.set_global(enabled);
        enabled
    }

    /// Approval decision for a tool of `kind` requested by the active role.
    pub fn gate(&self, kind: ToolKind) -> GateDecision {
        match self.active_role() {
            Some(role) => self.gatekeeper.decide(kind, role, &self.session.approvals),
            None if kind.mutates() => GateDecision::RequirePrompt,
            None => GateDecision::ExecuteNow,
        }
    }

    /// Apply one reply of `role` with its parsed directives.
    ///
    /// Discoveries are recorded first, then at most one control transfer
    /// (a `Delegate` wins over other transfers, otherwise the first one),
    /// then `Complete` if no transfer happened. The new state is built on a
    /// copy and committed only at the end.
    pub fn apply_turn(
        &mut self,
        role: &RoleId,
        clean_text: &str,
        directives: &[Directive],
    ) -> Result<TurnOutcome, DomainError> {
        self.ensure_active(role)?;

        let mut state = self.session.control.clone();
        state.status = CollaborationStatus::RoleActive(role.clone());
        let mut outcome = TurnOutcome::new(state.status.clone());

        for directive in directives {
            match directive {
                Directive::ShareDiscovery { payload } => outcome.discoveries.push(payload.clone()),
                Directive::RecoverableError { message } => outcome.warnings.push(message.clone()),
                _ => {}
            }
        }

        let mut transfers: Vec<&Directive> = Vec::new();
        for directive in directives.iter().filter(|d| d.is_control_transfer()) {
            let Some(target) = directive.target() else {
                continue;
            };
            if target == role {
                outcome
                    .warnings
                    .push(format!("{} targets the active role; ignored", directive));
                continue;
            }
            if let Err(e) = self.check_target(target) {
                outcome.warnings.push(format!("{} ignored: {}", directive, e));
                continue;
            }
            transfers.push(directive);
        }

        let chosen = transfers
            .iter()
            .position(|d| matches!(d, Directive::Delegate { .. }))
            .or(if transfers.is_empty() { None } else { Some(0) });
        if let Some(chosen) = chosen {
            for (i, directive) in transfers.iter().enumerate() {
                if i != chosen {
                    outcome.warnings.push(format!(
                        "{} superseded by {}",
                        directive, transfers[chosen]
                    ));
                }
            }
        }
        let completes = directives.iter().any(|d| matches!(d, Directive::Complete));

        let mut help_requested = false;
        match chosen.map(|i| transfers[i]) {
            Some(directive) => {
                if completes {
                    outcome
                        .warnings
                        .push(format!("[COMPLETE] superseded by {}", directive));
                }
                help_requested = matches!(directive, Directive::RequestHelp { .. });
                transfer(&mut state, role, directive, &mut outcome);
            }
            None if completes => complete(&mut state, role, &mut outcome),
            None => {}
        }

        // Commit
        let context = &mut self.session.context;
        if !clean_text.trim().is_empty() {
            context.append(Message::from_role(role.clone(), clean_text));
        }
        for payload in &outcome.discoveries {
            context.record_discovery(role.clone(), payload.clone());
        }
        if help_requested
            && let Some(Briefing::Help { recent, ledger, .. }) = state.briefing.as_mut()
        {
            *recent = context
                .recent_window(self.help_context_window)
                .cloned()
                .collect();
            *ledger = context.ledger_snapshot().to_vec();
        }
        outcome.status = state.status.clone();
        self.session.control = state;
        Ok(outcome)
    }

    fn ensure_active(&self, role: &RoleId) -> Result<(), DomainError> {
        match self.active_role() {
            Some(active) if active == role => Ok(()),
            Some(active) => Err(DomainError::NotActiveRole {
                expected: active.to_string(),
                actual: role.to_string(),
            }),
            None => Err(DomainError::NoActiveRole),
        }
    }

    fn check_target(&self, role: &RoleId) -> Result<(), DomainError> {
        match self.registry.get(role) {
            None => Err(DomainError::UnknownRole(role.to_string())),
            Some(definition) if !definition.is_available() => {
                Err(DomainError::RoleUnavailable(role.to_string()))
            }
            Some(_) => Ok(()),
        }
    }
}

/// Count one role switch against the auto-pilot budget.
///
/// When the budget is spent the session is forced to `Complete`, open frames
/// are dropped and `false` is returned.
fn spend_transition(state: &mut ControlState, outcome: &mut TurnOutcome) -> bool {
    let Some(autopilot) = state.autopilot.as_mut() else {
        return true;
    };
    if autopilot.transitions < autopilot.max_transitions {
        autopilot.transitions += 1;
        return true;
    }

    let (max, transitions) = (autopilot.max_transitions, autopilot.transitions);
    let abandoned_frames = state.delegations.len() + state.help_frames.len();
    if abandoned_frames > 0 {
        outcome.warnings.push(format!(
            "abandoning {} open delegation/help frame(s)",
            abandoned_frames
        ));
    }
    state.delegations.clear();
    state.help_frames.clear();
    state.briefing = None;
    if let Some(active) = state.status.active_role() {
        state.last_active = Some(active.clone());
    }
    state.status = CollaborationStatus::Complete;
    outcome.transitions.push(Transition::LimitExceeded {
        max,
        abandoned_frames,
    });
    outcome.diagnostic = Some(DomainError::OrchestrationLimitExceeded { max, transitions });
    false
}

fn transfer(state: &mut ControlState, from: &RoleId, directive: &Directive, outcome: &mut TurnOutcome) {
    if !spend_transition(state, outcome) {
        return;
    }
    match directive {
        Directive::RequestHelp { target, question } => {
            state.help_frames.push(HelpFrame {
                requester: from.clone(),
                helper: target.clone(),
                question: question.clone(),
            });
            state.status = CollaborationStatus::AwaitingHelp {
                from: from.clone(),
                to: target.clone(),
            };
            // Context is filled in at commit, once this reply is in history.
            state.briefing = Some(Briefing::Help {
                requester: from.clone(),
                question: question.clone(),
                recent: Vec::new(),
                ledger: Vec::new(),
            });
            outcome.transitions.push(Transition::HelpRequested {
                from: from.clone(),
                to: target.clone(),
            });
        }
        Directive::Delegate { target, subtask } => {
            state.delegations.push(DelegationFrame {
                delegator: from.clone(),
                delegate: target.clone(),
                subtask: subtask.clone(),
            });
            state.status = CollaborationStatus::Delegated {
                from: from.clone(),
                to: target.clone(),
                subtask: subtask.clone(),
            };
            state.briefing = Some(Briefing::Delegation {
                delegator: from.clone(),
                subtask: subtask.clone(),
            });
            outcome.transitions.push(Transition::Delegated {
                from: from.clone(),
                to: target.clone(),
                subtask: subtask.clone(),
            });
        }
        Directive::Handoff { target } => {
            if state
                .delegations
                .last()
                .is_some_and(|frame| &frame.delegator == target)
                && let Some(frame) = state.delegations.pop()
            {
                resume(state, from, target, Some(frame.subtask), outcome);
            } else if let Some(pos) = state
                .help_frames
                .iter()
                .rposition(|frame| &frame.requester == target)
            {
                drop_help_frames_from(state, pos, outcome);
                resume(state, from, target, None, outcome);
            } else {
                state.status = CollaborationStatus::HandedOff { to: target.clone() };
                state.briefing = Some(Briefing::Handoff { from: from.clone() });
                outcome.transitions.push(Transition::HandedOff {
                    from: from.clone(),
                    to: target.clone(),
                });
            }
        }
        _ => {}
    }
}

fn complete(state: &mut ControlState, role: &RoleId, outcome: &mut TurnOutcome) {
    if let Some(pos) = state
        .help_frames
        .iter()
        .rposition(|frame| &frame.helper == role)
    {
        if !spend_transition(state, outcome) {
            return;
        }
        let requester = state.help_frames[pos].requester.clone();
        drop_help_frames_from(state, pos, outcome);
        resume(state, role, &requester, None, outcome);
    } else if !state.delegations.is_empty() {
        if !spend_transition(state, outcome) {
            return;
        }
        if let Some(frame) = state.delegations.pop() {
            resume(state, role, &frame.delegator, Some(frame.subtask), outcome);
        }
    } else {
        if !state.help_frames.is_empty() {
            outcome.warnings.push(format!(
                "abandoning {} open help request(s)",
                state.help_frames.len()
            ));
            state.help_frames.clear();
        }
        state.status = CollaborationStatus::Complete;
        state.last_active = Some(role.clone());
        state.briefing = None;
        outcome
            .transitions
            .push(Transition::Completed { by: role.clone() });
    }
}

/// Resolve the help frame at `pos`; frames opened after it are abandoned.
fn drop_help_frames_from(state: &mut ControlState, pos: usize, outcome: &mut TurnOutcome) {
    let nested = state.help_frames.len() - pos - 1;
    if nested > 0 {
        outcome
            .warnings
            .push(format!("abandoning {} nested help request(s)", nested));
    }
    state.help_frames.truncate(pos);
}

fn resume(
    state: &mut ControlState,
    from: &RoleId,
    to: &RoleId,
    subtask: Option<String>,
    outcome: &mut TurnOutcome,
) {
    state.status = CollaborationStatus::RoleActive(to.clone());
    state.briefing = Some(Briefing::Resume {
        from: from.clone(),
        subtask,
    });
    outcome.transitions.push(Transition::Resumed {
        from: from.clone(),
        to: to.clone(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Author;
    use crate::protocol::ProtocolParser;
    use crate::role::{BackendConfig, Credential, RoleDefinition, builtin_roles};

    fn registry() -> RoleRegistry {
        let backend = BackendConfig {
            endpoint: "https://api.example.com/v1".to_string(),
            credential: Credential::new("key"),
            model: "model".to_string(),
            ..Default::default()
        };
        let mut roles: Vec<RoleDefinition> = builtin_roles()
            .into_iter()
            .map(|r| r.with_backend(backend.clone()))
            .collect();
        roles.push(RoleDefinition::new("intern", "Intern"));
        RoleRegistry::from_definitions(roles).unwrap()
    }

    fn router() -> CollaborationRouter {
        CollaborationRouter::new(registry(), RouterSettings::default())
    }

    fn id(s: &str) -> RoleId {
        RoleId::new(s)
    }

    /// Parse `reply` and apply it as a turn of the active role.
    fn turn(router: &mut CollaborationRouter, reply: &str) -> TurnOutcome {
        let role = router.active_role().cloned().unwrap();
        let parsed = ProtocolParser::new(router.registry()).parse(reply);
        router
            .apply_turn(&role, &parsed.clean_text, &parsed.directives)
            .unwrap()
    }

    #[test]
    fn test_begin_task_starts_default_role() {
        let mut router = router();
        assert!(router.status().is_idle());
        let role = router.begin_task(&id("fast")).unwrap();
        assert_eq!(role, id("fast"));
        assert_eq!(router.status(), &CollaborationStatus::RoleActive(id("fast")));
    }

    #[test]
    fn test_begin_task_rejects_unavailable_default() {
        let mut router = router();
        assert_eq!(
            router.begin_task(&id("intern")).unwrap_err(),
            DomainError::RoleUnavailable("intern".to_string())
        );
        assert!(router.status().is_idle());
    }

    #[test]
    fn test_delegate_then_complete_resumes_delegator() {
        let mut router = router();
        router.begin_task(&id("fast")).unwrap();
        router.record_user_message("build feature X");

        let outcome = turn(&mut router, "Splitting work. [DELEGATE: pro] implement X");
        assert_eq!(
            router.status(),
            &CollaborationStatus::Delegated {
                from: id("fast"),
                to: id("pro"),
                subtask: "implement X".to_string()
            }
        );
        assert!(outcome.control_moved());
        assert_eq!(router.session().delegation_stack().len(), 1);
        assert_eq!(
            router.take_briefing(),
            Some(Briefing::Delegation {
                delegator: id("fast"),
                subtask: "implement X".to_string()
            })
        );

        // The delegate's first reply makes it the active role.
        turn(&mut router, "Working on it.");
        assert_eq!(router.status(), &CollaborationStatus::RoleActive(id("pro")));

        let outcome = turn(&mut router, "Implemented. [COMPLETE]");
        assert_eq!(router.status(), &CollaborationStatus::RoleActive(id("fast")));
        assert!(!outcome.is_complete());
        assert!(router.session().delegation_stack().is_empty());
        assert_eq!(
            outcome.transitions,
            vec![Transition::Resumed {
                from: id("pro"),
                to: id("fast")
            }]
        );

        let outcome = turn(&mut router, "All done. [COMPLETE]");
        assert!(outcome.is_complete());
        assert!(router.session().delegation_stack().is_empty());
    }

    #[test]
    fn test_help_request_returns_via_handoff_without_touching_stack() {
        let mut router = router();
        router.activate(&id("pro"), false).unwrap();
        router.record_user_message("why does this hang?");

        turn(&mut router, "Not sure. [REQUEST_HELP: sonnet] check the lock order");
        assert_eq!(
            router.status(),
            &CollaborationStatus::AwaitingHelp {
                from: id("pro"),
                to: id("sonnet")
            }
        );
        assert!(router.session().delegation_stack().is_empty());
        assert_eq!(router.session().help_frames().len(), 1);

        turn(&mut router, "Looking at the locks.");
        assert_eq!(router.status(), &CollaborationStatus::RoleActive(id("sonnet")));

        turn(&mut router, "Lock A before B. [HANDOFF: pro]");
        assert_eq!(router.status(), &CollaborationStatus::RoleActive(id("pro")));
        assert!(router.session().delegation_stack().is_empty());
        assert!(router.session().help_frames().is_empty());
    }

    #[test]
    fn test_helper_complete_returns_to_requester_not_delegator() {
        let mut router = router();
        router.begin_task(&id("fast")).unwrap();
        turn(&mut router, "[DELEGATE: pro] write the parser");
        turn(&mut router, "[REQUEST_HELP: sonnet] grammar question");
        turn(&mut router, "Here is the answer. [COMPLETE]");

        // Back to pro, the delegation from fast is still pending.
        assert_eq!(router.status(), &CollaborationStatus::RoleActive(id("pro")));
        assert_eq!(router.session().delegation_stack().len(), 1);
        assert!(router.session().help_frames().is_empty());

        turn(&mut router, "[COMPLETE]");
        assert_eq!(router.status(), &CollaborationStatus::RoleActive(id("fast")));
    }

    #[test]
    fn test_help_briefing_carries_recent_context_and_ledger() {
        let mut router = CollaborationRouter::new(
            registry(),
            RouterSettings {
                help_context_window: 2,
                auto_approve: false,
            },
        );
        router.begin_task(&id("pro")).unwrap();
        router.record_user_message("first");
        router.record_user_message("second");
        turn(
            &mut router,
            "[SHARE_DISCOVERY] tests use tokio\nStuck here. [REQUEST_HELP: opus] run the tests",
        );

        match router.take_briefing() {
            Some(Briefing::Help {
                requester,
                question,
                recent,
                ledger,
            }) => {
                assert_eq!(requester, id("pro"));
                assert_eq!(question.as_deref(), Some("run the tests"));
                assert_eq!(recent.len(), 2);
                assert_eq!(recent[0].content, "second");
                assert_eq!(recent[1].author, Author::Role(id("pro")));
                assert_eq!(ledger.len(), 1);
                assert_eq!(ledger[0].payload, "tests use tokio");
            }
            other => panic!("unexpected briefing: {:?}", other),
        }
        assert!(router.take_briefing().is_none());
    }

    #[test]
    fn test_handoff_to_delegator_pops_stack() {
        let mut router = router();
        router.begin_task(&id("fast")).unwrap();
        turn(&mut router, "[DELEGATE: pro] do it");
        let outcome = turn(&mut router, "Can't, returning. [HANDOFF: fast]");

        assert_eq!(router.status(), &CollaborationStatus::RoleActive(id("fast")));
        assert!(router.session().delegation_stack().is_empty());
        assert!(matches!(outcome.transitions[0], Transition::Resumed { .. }));
    }

    #[test]
    fn test_plain_handoff_keeps_stack() {
        let mut router = router();
        router.begin_task(&id("fast")).unwrap();
        turn(&mut router, "[DELEGATE: pro] build it");
        turn(&mut router, "[HANDOFF: opus]");
        assert_eq!(router.status(), &CollaborationStatus::HandedOff { to: id("opus") });
        assert_eq!(router.session().delegation_stack().len(), 1);

        // opus finishing pops the frame back to fast
        turn(&mut router, "Validated. [COMPLETE]");
        assert_eq!(router.status(), &CollaborationStatus::RoleActive(id("fast")));
        assert!(router.session().delegation_stack().is_empty());
    }

    #[test]
    fn test_delegate_wins_over_handoff_and_complete() {
        let mut router = router();
        router.begin_task(&id("fast")).unwrap();
        let outcome = turn(
            &mut router,
            "[HANDOFF: opus] first\n[DELEGATE: sonnet] dig in\n[COMPLETE]",
        );

        assert_eq!(outcome.transitions.len(), 1);
        assert!(matches!(
            &outcome.transitions[0],
            Transition::Delegated { to, .. } if to == &id("sonnet")
        ));
        assert!(outcome.warnings.iter().any(|w| w.contains("hand off to opus superseded")));
        assert!(outcome.warnings.iter().any(|w| w.starts_with("[COMPLETE] superseded")));
    }

    #[test]
    fn test_first_transfer_wins_without_delegate() {
        let mut router = router();
        router.begin_task(&id("fast")).unwrap();
        let outcome = turn(&mut router, "[HANDOFF: pro] [REQUEST_HELP: sonnet]");
        assert_eq!(router.status(), &CollaborationStatus::HandedOff { to: id("pro") });
        assert_eq!(outcome.warnings.len(), 1);
        assert!(router.session().help_frames().is_empty());
    }

    #[test]
    fn test_self_target_and_unavailable_target_are_ignored() {
        let mut router = router();
        router.begin_task(&id("fast")).unwrap();
        let outcome = turn(&mut router, "[HANDOFF: fast] [DELEGATE: intern] sort files");

        assert_eq!(router.status(), &CollaborationStatus::RoleActive(id("fast")));
        assert!(outcome.transitions.is_empty());
        assert_eq!(outcome.warnings.len(), 2);
        assert!(outcome.warnings[0].contains("targets the active role"));
        assert!(outcome.warnings[1].contains("not available"));
    }

    #[test]
    fn test_discoveries_are_tagged_with_contributor() {
        let mut router = router();
        router.begin_task(&id("sonnet")).unwrap();
        let outcome = turn(&mut router, "[SHARE_DISCOVERY] the cache is never invalidated");

        assert_eq!(outcome.discoveries, vec!["the cache is never invalidated"]);
        let ledger = router.session().context().ledger_snapshot();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].contributor, id("sonnet"));
    }

    #[test]
    fn test_turn_from_inactive_role_changes_nothing() {
        let mut router = router();
        router.begin_task(&id("fast")).unwrap();
        let before = router.session().context().len();

        let err = router
            .apply_turn(&id("pro"), "hijack", &[Directive::Complete])
            .unwrap_err();
        assert!(matches!(err, DomainError::NotActiveRole { .. }));
        assert_eq!(router.session().context().len(), before);
        assert_eq!(router.status(), &CollaborationStatus::RoleActive(id("fast")));
    }

    #[test]
    fn test_autopilot_limit_forces_complete() {
        let mut router = router();
        router.begin_task(&id("fast")).unwrap();
        router.enter_autopilot(2);

        turn(&mut router, "[HANDOFF: pro]");
        turn(&mut router, "[HANDOFF: sonnet]");
        let outcome = turn(&mut router, "[HANDOFF: opus]");

        assert!(outcome.is_complete());
        assert!(outcome.limit_exceeded());
        assert_eq!(
            outcome.diagnostic,
            Some(DomainError::OrchestrationLimitExceeded {
                max: 2,
                transitions: 2
            })
        );
        assert_eq!(router.status(), &CollaborationStatus::Complete);
    }

    #[test]
    fn test_autopilot_limit_empties_frames() {
        let mut router = router();
        router.begin_task(&id("fast")).unwrap();
        router.enter_autopilot(1);

        turn(&mut router, "[DELEGATE: pro] part one");
        let outcome = turn(&mut router, "[DELEGATE: sonnet] part two");

        assert!(outcome.limit_exceeded());
        assert_eq!(
            outcome.transitions,
            vec![Transition::LimitExceeded {
                max: 1,
                abandoned_frames: 1
            }]
        );
        assert!(router.session().delegation_stack().is_empty());
        assert!(router.take_briefing().is_none());
    }

    #[test]
    fn test_begin_task_after_complete_resumes_last_role_and_resets_budget() {
        let mut router = router();
        router.begin_task(&id("fast")).unwrap();
        router.enter_autopilot(1);
        turn(&mut router, "[HANDOFF: pro]");
        turn(&mut router, "Done. [COMPLETE]");
        assert!(router.status().is_complete());

        let role = router.begin_task(&id("fast")).unwrap();
        assert_eq!(role, id("pro"));
        assert_eq!(router.session().autopilot().unwrap().transitions, 0);
    }

    #[test]
    fn test_activate_drops_frames_and_grants_approval() {
        let mut router = router();
        router.begin_task(&id("fast")).unwrap();
        router.enter_autopilot(5);
        turn(&mut router, "[DELEGATE: pro] x");

        let abandoned = router.activate(&id("opus"), true).unwrap();
        assert_eq!(abandoned, 1);
        assert!(!router.is_autopilot());
        assert!(router.session().delegation_stack().is_empty());
        assert_eq!(router.gate(ToolKind::Execute), GateDecision::ExecuteNow);

        router.activate(&id("pro"), false).unwrap();
        assert_eq!(router.gate(ToolKind::Execute), GateDecision::RequirePrompt);
        assert_eq!(router.gate(ToolKind::FileRead), GateDecision::ExecuteNow);

        assert!(router.toggle_global_auto_approve());
        assert_eq!(router.gate(ToolKind::FileWrite), GateDecision::ExecuteNow);
    }

    #[test]
    fn test_activate_unknown_role() {
        let mut router = router();
        assert_eq!(
            router.activate(&id("gemini"), false).unwrap_err(),
            DomainError::UnknownRole("gemini".to_string())
        );
    }

    #[test]
    fn test_clear_history_keeps_ledger() {
        let mut router = router();
        router.begin_task(&id("pro")).unwrap();
        router.record_user_message("hello");
        turn(&mut router, "[SHARE_DISCOVERY] uses edition 2024");

        router.clear_history();
        assert!(router.session().context().is_empty());
        assert_eq!(router.session().context().ledger_snapshot().len(), 1);
    }
}
