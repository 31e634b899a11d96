//! Session Controller
//!
//! Keeps the REPL thin: slash commands, session state changes and request
//! execution live here. Results are sent as [`UiEvent`]s on a channel for the
//! presentation layer to render.

use crate::ports::backend_client::BackendClient;
use crate::ports::progress::CollaborationProgress;
use crate::ports::tool_executor::ToolExecutorPort;
use crate::ports::ui_event::{
    ConfigSnapshot, ContextSnapshot, Language, MemorySnapshot, RoleStats, RoleSummary, RunSummary,
    StatusSnapshot, UiEvent, WelcomeInfo,
};
use crate::use_cases::collaborate::{CollaborateUseCase, SessionState, estimate_tokens};
use crate::use_cases::commands::{CommandParseError, SlashCommand};
use hydra_domain::{CollaborationRouter, RoleId, RoleRegistry};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Result of handling a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandAction {
    /// Continue the REPL loop
    Continue,
    /// Exit the REPL
    Exit,
}

/// Session controller managing business logic for the REPL
pub struct SessionController<B: BackendClient + 'static, T: ToolExecutorPort + 'static> {
    use_case: CollaborateUseCase<B, T>,
    state: SessionState,
    language: Language,
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl<B: BackendClient + 'static, T: ToolExecutorPort + 'static> SessionController<B, T> {
    pub fn new(
        use_case: CollaborateUseCase<B, T>,
        registry: RoleRegistry,
        tx: mpsc::UnboundedSender<UiEvent>,
    ) -> Self {
        let router = CollaborationRouter::new(registry, use_case.params().router_settings());
        let language = use_case.params().language;
        Self {
            use_case,
            state: SessionState::new(router),
            language,
            tx,
        }
    }

    /// Current language of session messages.
    pub fn language(&self) -> Language {
        self.language
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn set_cancellation(&mut self, token: CancellationToken) {
        self.use_case.set_cancellation(token);
    }

    /// Role that will answer the next message.
    pub fn current_role(&self) -> RoleId {
        let router = &self.state.router;
        router
            .active_role()
            .cloned()
            .unwrap_or_else(|| self.use_case.params().default_role.clone())
    }

    /// Prompt like `pro> `, or `pro[complex]> ` while auto-pilot is on
    pub fn prompt_string(&self) -> String {
        if self.state.router.is_autopilot() {
            format!("{}[complex]> ", self.current_role())
        } else {
            format!("{}> ", self.current_role())
        }
    }

    /// Send the welcome event
    pub fn send_welcome(&self) {
        let params = self.use_case.params();
        let _ = self.tx.send(UiEvent::Welcome(WelcomeInfo {
            version: env!("CARGO_PKG_VERSION"),
            default_role: params.default_role.clone(),
            roles: self.role_summaries(),
            auto_approve: self.state.router.session().approvals().global(),
            working_dir: params.working_dir.clone(),
        }));
    }

    /// Handle a slash command. Returns whether to continue or exit the REPL.
    pub fn handle_command(&mut self, input: &str) -> CommandAction {
        let command = match SlashCommand::parse(input, self.state.router.registry()) {
            Ok(command) => command,
            Err(CommandParseError::Unknown(command)) => {
                let _ = self.tx.send(UiEvent::UnknownCommand { command });
                return CommandAction::Continue;
            }
            Err(e) => {
                let _ = self.tx.send(UiEvent::CommandError {
                    message: e.to_string(),
                });
                return CommandAction::Continue;
            }
        };

        match command {
            SlashCommand::Exit => {
                let _ = self.tx.send(UiEvent::Exit);
                return CommandAction::Exit;
            }
            SlashCommand::Help => {
                let _ = self.tx.send(UiEvent::Help);
            }
            SlashCommand::Roles => {
                let _ = self.tx.send(UiEvent::Roles(self.role_summaries()));
            }
            SlashCommand::Config => {
                let _ = self.tx.send(UiEvent::ConfigDisplay(self.config_snapshot()));
            }
            SlashCommand::Clear => {
                self.state.router.clear_history();
                info!("History cleared");
                let _ = self.tx.send(UiEvent::HistoryCleared);
            }
            SlashCommand::Context => {
                let _ = self
                    .tx
                    .send(UiEvent::ContextDisplay(self.context_snapshot()));
            }
            SlashCommand::Status => {
                let _ = self.tx.send(UiEvent::StatusDisplay(self.status_snapshot()));
            }
            SlashCommand::Stats => {
                let _ = self.tx.send(UiEvent::StatsDisplay(self.role_stats()));
            }
            SlashCommand::Memory => {
                let _ = self.tx.send(UiEvent::MemoryDisplay(self.memory_snapshot()));
            }
            SlashCommand::Lang { language } => {
                self.language = language.unwrap_or_else(|| self.language.toggled());
                info!(language = %self.language, "Session language switched");
                let _ = self.tx.send(UiEvent::LanguageChanged(self.language));
            }
            SlashCommand::Yes => {
                let enabled = self.state.router.toggle_global_auto_approve();
                info!(enabled, "Global auto-approve toggled");
                let _ = self.tx.send(UiEvent::AutoApproveToggled { enabled });
            }
            SlashCommand::Switch { role, auto_approve } => {
                match self.state.router.activate(&role, auto_approve) {
                    Ok(abandoned_frames) => {
                        info!(role = %role, auto_approve, abandoned_frames, "Switched role");
                        let _ = self.tx.send(UiEvent::RoleSwitched {
                            role,
                            auto_approve,
                            abandoned_frames,
                        });
                    }
                    Err(e) => {
                        let _ = self.tx.send(UiEvent::CommandError {
                            message: e.to_string(),
                        });
                    }
                }
            }
            SlashCommand::Complex { auto_approve } => {
                let max_transitions = self.use_case.params().max_transitions;
                self.state.router.enter_autopilot(max_transitions);
                if auto_approve {
                    self.state.router.set_global_auto_approve(true);
                }
                info!(max_transitions, auto_approve, "Auto-pilot enabled");
                let _ = self.tx.send(UiEvent::AutopilotEntered {
                    role: self.current_role(),
                    max_transitions,
                    auto_approve: self.state.router.session().approvals().global(),
                });
            }
        }
        CommandAction::Continue
    }

    /// Run an operator request through the collaboration loop.
    pub async fn process_request(&mut self, request: &str, progress: &dyn CollaborationProgress) {
        match self
            .use_case
            .execute_with_progress(&mut self.state, request, progress)
            .await
        {
            Ok(report) => {
                let _ = self.tx.send(UiEvent::RunFinished(RunSummary {
                    status: report.status.clone(),
                    turns: report.turns,
                    transitions: report.control_transfers(),
                    diagnostic: report.diagnostic.as_ref().map(ToString::to_string),
                    final_text: report.final_text,
                }));
            }
            Err(e) => {
                let _ = self.tx.send(UiEvent::RunFailed {
                    cancelled: e.is_cancelled(),
                    error: e.to_string(),
                });
            }
        }
    }

    // ==================== Snapshots ====================

    fn role_summaries(&self) -> Vec<RoleSummary> {
        let active = self.state.router.active_role();
        self.state
            .router
            .registry()
            .iter()
            .map(|role| RoleSummary {
                id: role.id.clone(),
                display_name: role.display_name.clone(),
                description: role.description.clone(),
                model: role.backend.model.clone(),
                available: role.is_available(),
                active: active == Some(&role.id),
            })
            .collect()
    }

    fn config_snapshot(&self) -> ConfigSnapshot {
        let params = self.use_case.params();
        ConfigSnapshot {
            default_role: params.default_role.clone(),
            max_transitions: params.max_transitions,
            context_window: params.context_window,
            help_context_window: params.help_context_window,
            max_tool_turns: params.max_tool_turns,
            backend_retries: params.backend_retries,
            retry_backoff_ms: params.retry_backoff_ms,
            working_dir: params.working_dir.clone(),
            auto_approve: params.auto_approve,
            roles: self.role_summaries(),
        }
    }

    fn context_snapshot(&self) -> ContextSnapshot {
        let context = self.state.router.session().context();
        ContextSnapshot {
            messages: context
                .recent_window(self.use_case.params().context_window)
                .cloned()
                .collect(),
            ledger: context.ledger_snapshot().to_vec(),
            total_messages: context.len(),
        }
    }

    fn memory_snapshot(&self) -> MemorySnapshot {
        let context = self.state.router.session().context();
        let window = self.use_case.params().context_window;

        let mut by_author: Vec<(String, usize)> = Vec::new();
        for message in context.history() {
            let author = message.author.to_string();
            match by_author.iter_mut().find(|(a, _)| *a == author) {
                Some((_, count)) => *count += 1,
                None => by_author.push((author, 1)),
            }
        }

        let history_chars: usize = context.history().iter().map(|m| m.content.len()).sum();
        let ledger_chars: usize = context
            .ledger_snapshot()
            .iter()
            .map(|d| d.payload.len())
            .sum();
        let window_chars: usize = context.recent_window(window).map(|m| m.content.len()).sum();

        MemorySnapshot {
            history_len: context.len(),
            ledger_len: context.ledger_snapshot().len(),
            by_author,
            estimated_tokens: estimate_tokens(history_chars + ledger_chars),
            context_window: window,
            window_tokens: estimate_tokens(window_chars),
        }
    }

    fn status_snapshot(&self) -> StatusSnapshot {
        let session = self.state.router.session();
        StatusSnapshot {
            status: session.status().clone(),
            delegations: session.delegation_stack().to_vec(),
            help_frames: session.help_frames().to_vec(),
            autopilot: session
                .autopilot()
                .map(|a| (a.transitions, a.max_transitions)),
            global_auto_approve: session.approvals().global(),
            auto_approved_roles: session.approvals().granted_roles().cloned().collect(),
            history_len: session.context().len(),
            ledger_len: session.context().ledger_snapshot().len(),
        }
    }

    fn role_stats(&self) -> Vec<RoleStats> {
        self.state
            .stats
            .iter()
            .map(|(role, stats)| RoleStats {
                role: role.clone(),
                calls: stats.calls,
                failures: stats.failures,
                prompt_tokens: stats.prompt_tokens(),
                completion_tokens: stats.completion_tokens(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionParams;
    use crate::ports::backend_client::{BackendError, ChatMessage};
    use crate::ports::progress::NoProgress;
    use async_trait::async_trait;
    use hydra_domain::{
        BackendConfig, CollaborationStatus, Credential, RoleDefinition, ToolCall, ToolResult,
        ToolSpec, builtin_roles,
    };
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    // === Mock implementations ===

    struct MockBackend {
        replies: Mutex<VecDeque<String>>,
    }

    #[async_trait]
    impl BackendClient for MockBackend {
        async fn send(
            &self,
            _role: &RoleDefinition,
            _messages: &[ChatMessage],
        ) -> Result<String, BackendError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| BackendError::Malformed("no more replies".to_string()))
        }
    }

    struct MockToolExecutor {
        spec: ToolSpec,
    }

    #[async_trait]
    impl ToolExecutorPort for MockToolExecutor {
        fn tool_spec(&self) -> &ToolSpec {
            &self.spec
        }

        async fn execute(&self, call: &ToolCall) -> ToolResult {
            ToolResult::success(call.tool_name.clone(), "")
        }
    }

    fn registry() -> RoleRegistry {
        let backend = BackendConfig {
            endpoint: "https://api.example.com/v1".to_string(),
            credential: Credential::new("key"),
            model: "model".to_string(),
            ..Default::default()
        };
        let roles: Vec<_> = builtin_roles()
            .into_iter()
            .map(|role| {
                if role.id.as_str() == "opus" {
                    role
                } else {
                    role.with_backend(backend.clone())
                }
            })
            .collect();
        RoleRegistry::from_definitions(roles).unwrap()
    }

    fn create_test_controller(
        replies: Vec<&str>,
    ) -> (
        SessionController<MockBackend, MockToolExecutor>,
        mpsc::UnboundedReceiver<UiEvent>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let backend = Arc::new(MockBackend {
            replies: Mutex::new(replies.into_iter().map(String::from).collect()),
        });
        let tools = Arc::new(MockToolExecutor {
            spec: ToolSpec::new(),
        });
        let params = SessionParams::default().with_max_transitions(5);
        let use_case = CollaborateUseCase::new(backend, tools, params);
        (SessionController::new(use_case, registry(), tx), rx)
    }

    #[test]
    fn test_exit_command() {
        let (mut controller, mut rx) = create_test_controller(vec![]);
        assert_eq!(controller.handle_command("/exit"), CommandAction::Exit);
        assert!(matches!(rx.try_recv(), Ok(UiEvent::Exit)));
    }

    #[test]
    fn test_help_and_unknown_command() {
        let (mut controller, mut rx) = create_test_controller(vec![]);
        assert_eq!(controller.handle_command("/help"), CommandAction::Continue);
        assert!(matches!(rx.try_recv(), Ok(UiEvent::Help)));

        controller.handle_command("/dance");
        match rx.try_recv() {
            Ok(UiEvent::UnknownCommand { command }) => assert_eq!(command, "/dance"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_role_switch_grants_auto_approve() {
        let (mut controller, mut rx) = create_test_controller(vec![]);
        controller.handle_command("/pro -y");

        match rx.try_recv() {
            Ok(UiEvent::RoleSwitched {
                role, auto_approve, ..
            }) => {
                assert_eq!(role.as_str(), "pro");
                assert!(auto_approve);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(controller.prompt_string(), "pro> ");
        let approvals = controller.state().router.session().approvals();
        assert!(approvals.is_auto_approved(&RoleId::new("pro")));
        assert!(!approvals.global());
    }

    #[test]
    fn test_switch_to_unavailable_role_is_an_error() {
        let (mut controller, mut rx) = create_test_controller(vec![]);
        controller.handle_command("/opus");
        assert!(matches!(rx.try_recv(), Ok(UiEvent::CommandError { .. })));
        assert_eq!(controller.prompt_string(), "fast> ");
    }

    #[test]
    fn test_complex_enters_autopilot_with_global_approval() {
        let (mut controller, mut rx) = create_test_controller(vec![]);
        controller.handle_command("/complex -y");

        match rx.try_recv() {
            Ok(UiEvent::AutopilotEntered {
                max_transitions,
                auto_approve,
                ..
            }) => {
                assert_eq!(max_transitions, 5);
                assert!(auto_approve);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(controller.state().router.is_autopilot());
        assert_eq!(controller.prompt_string(), "fast[complex]> ");
    }

    #[test]
    fn test_yes_toggles_global_auto_approve() {
        let (mut controller, mut rx) = create_test_controller(vec![]);
        controller.handle_command("/yes");
        assert!(matches!(
            rx.try_recv(),
            Ok(UiEvent::AutoApproveToggled { enabled: true })
        ));
        controller.handle_command("/yes");
        assert!(matches!(
            rx.try_recv(),
            Ok(UiEvent::AutoApproveToggled { enabled: false })
        ));
    }

    #[tokio::test]
    async fn test_process_request_and_stats() {
        let (mut controller, mut rx) =
            create_test_controller(vec!["[SHARE_DISCOVERY] tests live in tests/\nDone."]);

        controller.process_request("where are the tests?", &NoProgress).await;
        match rx.try_recv() {
            Ok(UiEvent::RunFinished(summary)) => {
                assert_eq!(summary.turns, 1);
                assert_eq!(
                    summary.status,
                    CollaborationStatus::RoleActive(RoleId::new("fast"))
                );
            }
            other => panic!("unexpected event: {:?}", other),
        }

        controller.handle_command("/stats");
        match rx.try_recv() {
            Ok(UiEvent::StatsDisplay(stats)) => {
                assert_eq!(stats.len(), 1);
                assert_eq!(stats[0].role.as_str(), "fast");
                assert_eq!(stats[0].calls, 1);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_clear_keeps_ledger() {
        let (mut controller, mut rx) =
            create_test_controller(vec!["[SHARE_DISCOVERY] uses tokio\nok"]);
        controller.process_request("look", &NoProgress).await;
        let _ = rx.try_recv();

        controller.handle_command("/clear");
        assert!(matches!(rx.try_recv(), Ok(UiEvent::HistoryCleared)));

        controller.handle_command("/context");
        match rx.try_recv() {
            Ok(UiEvent::ContextDisplay(snapshot)) => {
                assert!(snapshot.messages.is_empty());
                assert_eq!(snapshot.total_messages, 0);
                assert_eq!(snapshot.ledger.len(), 1);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_request_reports_error() {
        let (mut controller, mut rx) = create_test_controller(vec![]);
        controller.process_request("hello", &NoProgress).await;
        match rx.try_recv() {
            Ok(UiEvent::RunFailed { cancelled, error }) => {
                assert!(!cancelled);
                assert!(error.contains("Malformed response"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_memory_counts_history_and_ledger() {
        let (mut controller, mut rx) =
            create_test_controller(vec!["[SHARE_DISCOVERY] uses tokio\nSure thing."]);
        controller.process_request("check the runtime", &NoProgress).await;
        let _ = rx.try_recv();

        controller.handle_command("/memory");
        match rx.try_recv() {
            Ok(UiEvent::MemoryDisplay(memory)) => {
                assert_eq!(memory.history_len, 2);
                assert_eq!(memory.ledger_len, 1);
                assert_eq!(
                    memory.by_author,
                    vec![("user".to_string(), 1), ("fast".to_string(), 1)]
                );
                assert!(memory.estimated_tokens > 0);
                assert!(memory.window_tokens <= memory.estimated_tokens);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_lang_toggles_and_sets() {
        let (mut controller, mut rx) = create_test_controller(vec![]);
        assert_eq!(controller.language(), Language::En);

        controller.handle_command("/lang");
        assert!(matches!(
            rx.try_recv(),
            Ok(UiEvent::LanguageChanged(Language::Zh))
        ));
        controller.handle_command("/lang zh");
        assert!(matches!(
            rx.try_recv(),
            Ok(UiEvent::LanguageChanged(Language::Zh))
        ));
        controller.handle_command("/lang");
        assert_eq!(controller.language(), Language::En);
    }

    #[test]
    fn test_status_shows_delegation_stack() {
        let (mut controller, mut rx) = create_test_controller(vec![]);
        controller.handle_command("/status");
        match rx.try_recv() {
            Ok(UiEvent::StatusDisplay(snapshot)) => {
                assert_eq!(snapshot.status, CollaborationStatus::Idle);
                assert!(snapshot.delegations.is_empty());
                assert!(snapshot.autopilot.is_none());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
