//! Configuration file loading for hydra-code
//!
//! This module handles file I/O, merging of configuration from multiple
//! sources, validation, and conversion into the role registry and session
//! parameters. The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. `HYDRA_*` environment variables
//! 3. Project root: `./hydra.toml` or `./.hydra.toml`
//! 4. Global: `$XDG_CONFIG_HOME/hydra-code/config.toml`
//! 5. Default values

mod file_config;
mod loader;
mod validation;

pub use file_config::{
    FileCollaborationConfig, FileConfig, FileLoggingConfig, FileReplConfig, FileRoleConfig,
    KNOWN_PROVIDERS,
};
pub use loader::{ConfigError, ConfigLoader};
pub use validation::{ConfigIssue, ConfigIssueCode, Severity};
