//! Console formatting for collaboration output
//!
//! Pure string builders shared by the progress reporters and the REPL
//! presenter. Nothing here prints.

use colored::{ColoredString, Colorize};
use hydra_application::ports::ui_event::{RoleStats, RoleSummary, StatusSnapshot};
use hydra_domain::core::string::truncate;
use hydra_domain::{Author, Message, RoleId, ToolCall, ToolResult, Transition};

/// Preview length for tool output in verbose mode
const TOOL_PREVIEW_CHARS: usize = 400;

/// Preview length for messages in `/context`
const MESSAGE_PREVIEW_CHARS: usize = 240;

pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Stable per-role colour so interleaved output stays readable.
    pub fn role_label(role: &RoleId) -> ColoredString {
        let name = role.as_str();
        match name {
            "fast" => name.green().bold(),
            "pro" => name.blue().bold(),
            "sonnet" => name.magenta().bold(),
            "opus" => name.yellow().bold(),
            _ => name.cyan().bold(),
        }
    }

    /// A role's reply with a header line.
    pub fn role_block(role: &RoleId, text: &str) -> String {
        format!(
            "\n{} {}\n{}\n",
            "──".dimmed(),
            Self::role_label(role),
            text.trim_end()
        )
    }

    pub fn tool_call_line(role: &RoleId, call: &ToolCall) -> String {
        format!(
            "  {} {} {}",
            "⚙".cyan(),
            Self::role_label(role),
            call.summary().dimmed()
        )
    }

    pub fn tool_result_line(result: &ToolResult, verbose: bool) -> String {
        let mut line = if result.is_success() {
            let size = result.output().map(str::len).unwrap_or(0);
            format!("    {} {} ({} bytes)", "✓".green(), result.tool_name, size)
        } else {
            let error = result
                .error()
                .map(ToString::to_string)
                .unwrap_or_else(|| "unknown error".to_string());
            format!("    {} {} {}", "✗".red(), result.tool_name, error.red())
        };
        if verbose && let Some(output) = result.output() {
            for preview in truncate(output, TOOL_PREVIEW_CHARS).lines() {
                line.push_str(&format!("\n      {}", preview.dimmed()));
            }
        }
        line
    }

    pub fn transition_line(transition: &Transition) -> String {
        let text = transition.to_string();
        match transition {
            Transition::Completed { .. } => format!("  {} {}", "✔".green(), text.green()),
            Transition::LimitExceeded { .. } => format!("  {} {}", "■".red(), text.red()),
            _ => format!("  {} {}", "→".cyan(), text.cyan()),
        }
    }

    pub fn role_table(roles: &[RoleSummary]) -> String {
        let width = roles.iter().map(|r| r.id.as_str().len()).max().unwrap_or(4);
        roles
            .iter()
            .map(|role| {
                let marker = if role.active { "*" } else { " " };
                let availability = if role.available {
                    role.model.normal()
                } else {
                    "not configured".red()
                };
                format!(
                    " {} {:<width$}  {:<10} {}  {}",
                    marker,
                    role.id.as_str(),
                    role.display_name,
                    availability,
                    role.description.dimmed(),
                    width = width
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn message_line(message: &Message) -> String {
        let author = match &message.author {
            Author::Role(id) => Self::role_label(id).to_string(),
            Author::User => "you".bold().to_string(),
            other => other.to_string().dimmed().to_string(),
        };
        let preview = truncate(&message.content.replace('\n', " "), MESSAGE_PREVIEW_CHARS);
        format!("  #{:<4} {}: {}", message.seq, author, preview)
    }

    pub fn status_lines(status: &StatusSnapshot) -> Vec<String> {
        let mut lines = vec![format!("  Status:        {}", status.status)];
        match status.autopilot {
            Some((used, max)) => {
                lines.push(format!("  Auto-pilot:    on ({}/{} transitions)", used, max))
            }
            None => lines.push("  Auto-pilot:    off".to_string()),
        }
        lines.push(format!(
            "  Auto-approve:  {}",
            if status.global_auto_approve {
                "all roles".to_string()
            } else if status.auto_approved_roles.is_empty() {
                "off".to_string()
            } else {
                status
                    .auto_approved_roles
                    .iter()
                    .map(RoleId::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        ));
        for frame in &status.delegations {
            lines.push(format!(
                "  Delegation:    {} -> {}: {}",
                frame.delegator,
                frame.delegate,
                truncate(&frame.subtask, 80)
            ));
        }
        for frame in &status.help_frames {
            lines.push(format!("  Help:          {} -> {}", frame.requester, frame.helper));
        }
        lines.push(format!(
            "  History:       {} messages, {} discoveries",
            status.history_len, status.ledger_len
        ));
        lines
    }

    pub fn stats_table(stats: &[RoleStats]) -> String {
        let mut lines = vec![format!(
            "  {:<10} {:>6} {:>9} {:>12} {:>12}",
            "role", "calls", "failures", "~prompt tok", "~reply tok"
        )];
        for row in stats {
            lines.push(format!(
                "  {:<10} {:>6} {:>9} {:>12} {:>12}",
                row.role.as_str(),
                row.calls,
                row.failures,
                row.prompt_tokens,
                row.completion_tokens
            ));
        }
        lines.join("\n")
    }
}
