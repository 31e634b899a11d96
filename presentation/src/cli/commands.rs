//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for hydra-code
#[derive(Parser, Debug)]
#[command(name = "hydra-code")]
#[command(author, version, about = "Multi-role LLM collaboration for coding tasks")]
#[command(long_about = r#"
Hydra Code routes a coding conversation between several LLM roles.

Roles hand work to each other with in-band markers such as
[DELEGATE: sonnet | subtask], [REQUEST_HELP: pro], [HANDOFF: opus] and
[TASK_COMPLETE]. Local tools (file access, shell commands, search) are
available to every role; writes and commands need your approval unless
auto-approve is on.

Configuration files are loaded from (in priority order):
1. --config <path>                          Explicit config file
2. HYDRA_* environment variables            e.g. HYDRA_DEFAULT_ROLE=pro
3. ./hydra.toml or ./.hydra.toml            Project-level config
4. ~/.config/hydra-code/config.toml         Global config

Examples:
  hydra-code                                Start the interactive REPL
  hydra-code --role pro                     Start with `pro` answering
  hydra-code "Explain src/main.rs"          One-shot request
  hydra-code --complex -y "Add a CLI flag"  One-shot auto-pilot, tools auto-approved
"#)]
pub struct Cli {
    /// Run a single request and exit (starts the REPL when omitted)
    pub prompt: Option<String>,

    /// Role that answers first (default: config `default_role`)
    #[arg(short, long, value_name = "ROLE")]
    pub role: Option<String>,

    /// Run in auto-pilot: roles keep collaborating until the task completes
    #[arg(long)]
    pub complex: bool,

    /// Auto-approve file writes and shell commands
    #[arg(short = 'y', long = "yes")]
    pub auto_approve: bool,

    /// Working directory for tools (default: config or current directory)
    #[arg(short = 'C', long, value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_one_shot() {
        let cli = Cli::parse_from(["hydra-code", "--complex", "-y", "-vv", "--role", "pro", "fix it"]);
        assert_eq!(cli.prompt.as_deref(), Some("fix it"));
        assert_eq!(cli.role.as_deref(), Some("pro"));
        assert!(cli.complex);
        assert!(cli.auto_approve);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_repl_defaults() {
        let cli = Cli::parse_from(["hydra-code"]);
        assert!(cli.prompt.is_none());
        assert!(!cli.complex);
        assert!(!cli.auto_approve);
        assert!(!cli.no_config);
        assert_eq!(cli.verbose, 0);
    }
}
