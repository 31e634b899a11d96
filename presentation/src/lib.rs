//! Presentation layer for hydra-code
//!
//! This crate contains the CLI definition, terminal formatters, progress
//! reporters, the interactive confirmation prompt and the REPL.

pub mod cli;
pub mod config;
pub mod confirmation;
pub mod output;
pub mod progress;
pub mod repl;

// Re-export commonly used types
pub use cli::commands::Cli;
pub use config::ReplConfig;
pub use confirmation::InteractiveConfirmation;
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
pub use repl::{Repl, ReplPresenter};
