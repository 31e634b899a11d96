//! Progress reporting for collaboration runs.
//!
//! [`ProgressReporter`] shows an indicatif spinner while a role is thinking
//! and prints role output, tool activity and transitions above it.
//! [`SimpleProgress`] prints the same events as plain lines for
//! non-interactive output.

use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use hydra_application::CollaborationProgress;
use hydra_domain::core::string::truncate;
use hydra_domain::{Directive, RoleId, ToolCall, ToolResult, Transition};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "{spinner:.green} {prefix:.bold.cyan} {msg} {elapsed:.dim}";
const TICK: Duration = Duration::from_millis(100);

/// Spinner-based progress for interactive terminals
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
    verbose: bool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            verbose: false,
        }
    }

    /// Also show tool output previews
    pub fn verbose() -> Self {
        Self {
            spinner: Mutex::new(None),
            verbose: true,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template(SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn clear_spinner(&self) {
        if let Ok(mut guard) = self.spinner.lock()
            && let Some(pb) = guard.take()
        {
            pb.finish_and_clear();
        }
    }

    /// Print a line without tearing the spinner.
    fn print(&self, line: String) {
        match self.spinner.lock() {
            Ok(guard) => match guard.as_ref() {
                Some(pb) => pb.suspend(|| println!("{}", line)),
                None => println!("{}", line),
            },
            Err(_) => println!("{}", line),
        }
    }

    fn set_message(&self, message: String) {
        if let Ok(guard) = self.spinner.lock()
            && let Some(pb) = guard.as_ref()
        {
            pb.set_message(message);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CollaborationProgress for ProgressReporter {
    fn on_turn_start(&self, role: &RoleId, round: usize) {
        self.clear_spinner();
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(role.to_string());
        pb.set_message(if round > 1 {
            format!("thinking (tool round {})", round)
        } else {
            "thinking".to_string()
        });
        pb.enable_steady_tick(TICK);
        if let Ok(mut guard) = self.spinner.lock() {
            *guard = Some(pb);
        }
    }

    fn on_turn_end(&self, _role: &RoleId) {
        self.clear_spinner();
    }

    fn on_backend_retry(
        &self,
        role: &RoleId,
        attempt: usize,
        max_attempts: usize,
        delay: Duration,
        error: &str,
    ) {
        self.print(format!(
            "  {} {} attempt {}/{} failed: {} (retrying in {:.1}s)",
            "↻".yellow(),
            role.to_string().bold(),
            attempt,
            max_attempts,
            truncate(error, 120),
            delay.as_secs_f32()
        ));
        self.set_message("retrying".to_string());
    }

    fn on_role_output(&self, role: &RoleId, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        self.print(ConsoleFormatter::role_block(role, text));
    }

    fn on_tool_call(&self, role: &RoleId, call: &ToolCall) {
        self.print(ConsoleFormatter::tool_call_line(role, call));
        self.set_message(format!("running {}", call.tool_name));
    }

    fn on_tool_result(&self, _role: &RoleId, result: &ToolResult) {
        self.print(ConsoleFormatter::tool_result_line(result, self.verbose));
    }

    fn on_tool_declined(&self, _role: &RoleId, call: &ToolCall) {
        self.print(format!("  {} {} declined", "✗".red(), call.tool_name));
    }

    fn on_confirmation_required(&self, _role: &RoleId, _call: &ToolCall) {
        // The prompt needs a clean line
        self.clear_spinner();
    }

    fn on_directive(&self, role: &RoleId, directive: &Directive) {
        if let Directive::ShareDiscovery { payload } = directive {
            self.print(format!(
                "  {} {} {}",
                "◆".magenta(),
                role.to_string().bold(),
                truncate(payload, 160)
            ));
        }
    }

    fn on_transition(&self, transition: &Transition) {
        self.print(ConsoleFormatter::transition_line(transition));
    }

    fn on_warning(&self, message: &str) {
        self.print(format!("  {} {}", "⚠".yellow(), message.yellow()));
    }
}

/// Plain line-based progress (no spinner)
pub struct SimpleProgress;

impl CollaborationProgress for SimpleProgress {
    fn on_turn_start(&self, role: &RoleId, round: usize) {
        if round == 1 {
            println!("{} {}", "->".cyan(), role.to_string().bold());
        }
    }

    fn on_backend_retry(
        &self,
        role: &RoleId,
        attempt: usize,
        max_attempts: usize,
        _delay: Duration,
        error: &str,
    ) {
        println!("  retry {}/{} for {}: {}", attempt, max_attempts, role, error);
    }

    fn on_role_output(&self, role: &RoleId, text: &str) {
        if !text.trim().is_empty() {
            println!("{}", ConsoleFormatter::role_block(role, text));
        }
    }

    fn on_tool_call(&self, role: &RoleId, call: &ToolCall) {
        println!("{}", ConsoleFormatter::tool_call_line(role, call));
    }

    fn on_tool_result(&self, _role: &RoleId, result: &ToolResult) {
        println!("{}", ConsoleFormatter::tool_result_line(result, false));
    }

    fn on_transition(&self, transition: &Transition) {
        println!("{}", ConsoleFormatter::transition_line(transition));
    }

    fn on_warning(&self, message: &str) {
        println!("  warning: {}", message);
    }
}
