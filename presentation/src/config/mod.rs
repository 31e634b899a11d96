//! Presentation-level configuration
//!
//! REPL behaviour, filled in by the binary from the `[repl]` config table.

use std::path::PathBuf;

/// REPL configuration for the presentation layer
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Show spinners and live role output while a request runs
    pub show_progress: bool,
    /// Also print tool output previews
    pub verbose_tools: bool,
    /// History file override (default: platform data dir)
    pub history_file: Option<PathBuf>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            verbose_tools: false,
            history_file: None,
        }
    }
}

impl ReplConfig {
    pub fn with_show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn with_verbose_tools(mut self, verbose: bool) -> Self {
        self.verbose_tools = verbose;
        self
    }

    pub fn with_history_file(mut self, path: Option<PathBuf>) -> Self {
        self.history_file = path;
        self
    }

    /// Where REPL history is read from and saved to.
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("hydra-code").join("history.txt")))
    }
}
