//! REPL Presenter - Renders UiEvents to the terminal
//!
//! All println!/colored output for the session lives here; the decisions
//! behind each event are made by `SessionController` in the application layer.

use super::texts::{Texts, texts};
use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use hydra_application::ports::ui_event::{
    ConfigSnapshot, ContextSnapshot, MemorySnapshot, RunSummary, StatusSnapshot, WelcomeInfo,
};
use hydra_application::{Language, UiEvent};
use hydra_domain::CollaborationStatus;

/// Renders UiEvents to the terminal for the REPL
pub struct ReplPresenter {
    /// Print the last role reply when no progress reporter showed it live
    echo_final_text: bool,
    language: Language,
}

impl Default for ReplPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplPresenter {
    pub fn new() -> Self {
        Self {
            echo_final_text: false,
            language: Language::En,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    fn texts(&self) -> &'static Texts {
        texts(self.language)
    }

    pub fn with_final_text(mut self, echo: bool) -> Self {
        self.echo_final_text = echo;
        self
    }

    /// Render a single UiEvent to the terminal
    pub fn render(&self, event: &UiEvent) {
        match event {
            UiEvent::Welcome(info) => self.render_welcome(info),
            UiEvent::Help => self.render_help(),
            UiEvent::Roles(roles) => {
                println!();
                println!("{}", "Roles:".bold());
                println!("{}", ConsoleFormatter::role_table(roles));
                println!();
            }
            UiEvent::ConfigDisplay(snapshot) => self.render_config(snapshot),
            UiEvent::HistoryCleared => {
                println!("{}", self.texts().history_cleared.green());
            }
            UiEvent::ContextDisplay(snapshot) => self.render_context(snapshot),
            UiEvent::StatusDisplay(snapshot) => self.render_status(snapshot),
            UiEvent::MemoryDisplay(memory) => self.render_memory(memory),
            UiEvent::StatsDisplay(stats) => {
                println!();
                if stats.is_empty() {
                    println!("{}", self.texts().no_calls);
                } else {
                    println!("{}", ConsoleFormatter::stats_table(stats));
                }
                println!();
            }
            UiEvent::RoleSwitched {
                role,
                auto_approve,
                abandoned_frames,
            } => {
                println!(
                    "Switched to {}{}",
                    ConsoleFormatter::role_label(role),
                    if *auto_approve {
                        " (tools auto-approved)".yellow().to_string()
                    } else {
                        String::new()
                    }
                );
                if *abandoned_frames > 0 {
                    println!(
                        "{} {} open delegation/help frame(s) abandoned",
                        "⚠".yellow(),
                        abandoned_frames
                    );
                }
            }
            UiEvent::AutopilotEntered {
                role,
                max_transitions,
                auto_approve,
            } => {
                println!(
                    "{} Auto-pilot on: {} starts, up to {} transitions per request",
                    "▶".cyan(),
                    ConsoleFormatter::role_label(role),
                    max_transitions
                );
                if *auto_approve {
                    println!("{}", "  Tool calls are auto-approved.".yellow());
                }
            }
            UiEvent::AutoApproveToggled { enabled } => {
                if *enabled {
                    println!("{}", self.texts().auto_approve_on.yellow());
                } else {
                    println!("{}", self.texts().auto_approve_off.green());
                }
            }
            UiEvent::LanguageChanged(language) => {
                println!("{}", texts(*language).language_switched.green());
            }
            UiEvent::RunFinished(summary) => self.render_run_finished(summary),
            UiEvent::RunFailed { error, cancelled } => {
                println!();
                if *cancelled {
                    println!("{}", self.texts().request_cancelled.yellow());
                } else {
                    println!("{} {}", "Error:".red().bold(), error);
                }
                println!();
            }
            UiEvent::CommandError { message } => {
                println!("{} {}", "Error:".red().bold(), message);
            }
            UiEvent::UnknownCommand { command } => {
                println!("{} {} {}", "?".yellow(), self.texts().unknown_command, command);
                println!("{}", self.texts().type_help.dimmed());
            }
            UiEvent::Exit => {
                println!("{}", self.texts().bye);
            }
        }
    }

    fn render_welcome(&self, info: &WelcomeInfo) {
        println!();
        println!("{}", "╭─────────────────────────────────────────────╮".cyan());
        println!(
            "{}",
            format!("│        Hydra Code v{:<25}│", info.version).cyan()
        );
        println!("{}", "╰─────────────────────────────────────────────╯".cyan());
        println!();
        println!("{}", ConsoleFormatter::role_table(&info.roles));
        println!();
        println!(
            "{} {}",
            "Default role:".bold(),
            ConsoleFormatter::role_label(&info.default_role)
        );
        if let Some(ref dir) = info.working_dir {
            println!("{} {}", "Working dir:".bold(), dir);
        }
        if info.auto_approve {
            println!("{}", "Auto-approve is ON".yellow());
        }
        println!();
        println!("{}", self.texts().welcome_hint);
        println!();
    }

    fn render_help(&self) {
        let texts = self.texts();
        println!();
        println!("{}", texts.commands.bold());
        for (command, description) in texts.help {
            println!("  {:<20} - {}", command, description);
        }
        println!();
        println!("{}", texts.markers.bold());
        println!("  [REQUEST_HELP: role] question    [DELEGATE: role] subtask");
        println!("  [HANDOFF: role]    [SHARE_DISCOVERY] fact    [COMPLETE]");
        println!();
        println!("{}", texts.cancel_hint);
        println!();
    }

    fn render_memory(&self, memory: &MemorySnapshot) {
        let texts = self.texts();
        println!();
        println!("{}", texts.memory_title.bold());
        println!("  {:<18} {}", texts.memory_messages, memory.history_len);
        for (author, count) in &memory.by_author {
            println!("    {:<16} {}", author, count);
        }
        println!("  {:<18} {}", texts.memory_discoveries, memory.ledger_len);
        println!("  {:<18} ~{}", texts.memory_tokens, memory.estimated_tokens);
        println!(
            "  {:<18} ~{} ({} msgs)",
            texts.memory_window, memory.window_tokens, memory.context_window
        );
        println!();
    }

    fn render_config(&self, snapshot: &ConfigSnapshot) {
        println!();
        println!("{}", "Current Configuration:".bold().cyan());
        println!("  Default role:        {}", snapshot.default_role);
        println!("  Max transitions:     {}", snapshot.max_transitions);
        println!("  Context window:      {}", snapshot.context_window);
        println!("  Help context window: {}", snapshot.help_context_window);
        println!("  Max tool turns:      {}", snapshot.max_tool_turns);
        println!(
            "  Backend retries:     {} (backoff {} ms)",
            snapshot.backend_retries, snapshot.retry_backoff_ms
        );
        println!(
            "  Working dir:         {}",
            snapshot.working_dir.as_deref().unwrap_or("(current directory)")
        );
        println!(
            "  Auto-approve:        {}",
            if snapshot.auto_approve { "ON" } else { "OFF" }
        );
        println!();
        println!("{}", ConsoleFormatter::role_table(&snapshot.roles));
        println!();
    }

    fn render_context(&self, snapshot: &ContextSnapshot) {
        println!();
        println!(
            "{} (last {} of {})",
            "History:".bold(),
            snapshot.messages.len(),
            snapshot.total_messages
        );
        for message in &snapshot.messages {
            println!("{}", ConsoleFormatter::message_line(message));
        }
        if !snapshot.ledger.is_empty() {
            println!();
            println!("{}", "Discoveries:".bold());
            for discovery in &snapshot.ledger {
                println!(
                    "  {} {}: {}",
                    "◆".magenta(),
                    ConsoleFormatter::role_label(&discovery.contributor),
                    discovery.payload
                );
            }
        }
        println!();
    }

    fn render_status(&self, snapshot: &StatusSnapshot) {
        println!();
        for line in ConsoleFormatter::status_lines(snapshot) {
            println!("{}", line);
        }
        println!();
    }

    fn render_run_finished(&self, summary: &RunSummary) {
        println!();
        if self.echo_final_text
            && let Some(ref text) = summary.final_text
        {
            println!("{}", text.trim_end());
            println!();
        }
        if let Some(ref diagnostic) = summary.diagnostic {
            println!("{} {}", "■".red(), diagnostic.red());
        }
        let status = match &summary.status {
            CollaborationStatus::Complete => "complete".green().to_string(),
            other => other.to_string(),
        };
        println!(
            "{}",
            format!(
                "[{} turn(s), {} transfer(s), {}]",
                summary.turns, summary.transitions, status
            )
            .dimmed()
        );
        println!();
    }
}
