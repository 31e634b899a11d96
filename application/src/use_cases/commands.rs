//! Slash command parsing for the interactive session.

use crate::ports::ui_event::Language;
use hydra_domain::{RoleId, RoleRegistry};
use thiserror::Error;

/// A parsed `/command`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Roles,
    Config,
    Clear,
    Context,
    Status,
    Stats,
    Memory,
    /// `/lang [en|zh]`: set the session language, or toggle without argument
    Lang { language: Option<Language> },
    /// Toggle global auto-approve
    Yes,
    Exit,
    /// `/<role> [-y]`: operator switch to a role
    Switch { role: RoleId, auto_approve: bool },
    /// `/complex [-y]`: auto-pilot
    Complex { auto_approve: bool },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("Not a command")]
    NotACommand,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(String),
}

impl SlashCommand {
    /// Parse `input`; role names are looked up in `registry`.
    pub fn parse(input: &str, registry: &RoleRegistry) -> Result<Self, CommandParseError> {
        let input = input.trim();
        let Some(body) = input.strip_prefix('/') else {
            return Err(CommandParseError::NotACommand);
        };
        let mut parts = body.split_whitespace();
        let name = parts.next().unwrap_or("").to_lowercase();
        let args: Vec<&str> = parts.collect();

        let command = match name.as_str() {
            "help" | "h" | "?" => SlashCommand::Help,
            "roles" => SlashCommand::Roles,
            "config" => SlashCommand::Config,
            "clear" => SlashCommand::Clear,
            "context" => SlashCommand::Context,
            "status" => SlashCommand::Status,
            "stats" => SlashCommand::Stats,
            "memory" | "mem" => SlashCommand::Memory,
            "yes" => SlashCommand::Yes,
            "exit" | "quit" | "q" => SlashCommand::Exit,
            "lang" | "language" => {
                let language = match args.as_slice() {
                    [] => None,
                    [code] => Some(
                        code.parse::<Language>()
                            .map_err(|_| CommandParseError::Usage("/lang [en|zh]".to_string()))?,
                    ),
                    _ => return Err(CommandParseError::Usage("/lang [en|zh]".to_string())),
                };
                return Ok(SlashCommand::Lang { language });
            }
            "complex" => {
                let auto_approve = parse_yes_flag(&args)
                    .ok_or_else(|| CommandParseError::Usage("/complex [-y]".to_string()))?;
                return Ok(SlashCommand::Complex { auto_approve });
            }
            "" => return Err(CommandParseError::Unknown("/".to_string())),
            other => {
                let Some(role) = registry.resolve(other) else {
                    return Err(CommandParseError::Unknown(format!("/{}", other)));
                };
                let auto_approve = parse_yes_flag(&args)
                    .ok_or_else(|| CommandParseError::Usage(format!("/{} [-y]", role.id)))?;
                return Ok(SlashCommand::Switch {
                    role: role.id.clone(),
                    auto_approve,
                });
            }
        };

        if args.is_empty() {
            Ok(command)
        } else {
            Err(CommandParseError::Usage(format!("/{} takes no arguments", name)))
        }
    }
}

/// `Some(true)` for `-y`/`--yes`, `Some(false)` for no arguments, `None` otherwise.
fn parse_yes_flag(args: &[&str]) -> Option<bool> {
    match args {
        [] => Some(false),
        [flag] if *flag == "-y" || *flag == "--yes" => Some(true),
        _ => None,
    }
}
