//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Project-level config file names, checked in order.
const PROJECT_FILES: &[&str] = &["hydra.toml", ".hydra.toml"];

/// Environment variable prefix; nested keys are split on `__`.
const ENV_PREFIX: &str = "HYDRA_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit config path (if provided)
    /// 2. `HYDRA_*` environment variables (`HYDRA_COLLABORATION__MAX_TRANSITIONS`)
    /// 3. Project root: `./hydra.toml` or `./.hydra.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/hydra-code/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        if let Some(path) = config_path
            && !path.exists()
        {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Self::figment(config_path)
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// The merged provider chain, without extracting it.
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }
        figment
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("hydra-code").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config sources, highest priority first (for `--show-config`)
    pub fn describe_sources(config_path: Option<&Path>) -> Vec<String> {
        let mark = |found: bool| if found { "[FOUND]" } else { "[     ]" };
        let mut lines = Vec::new();

        if let Some(path) = config_path {
            lines.push(format!(
                "  {} Explicit: {}",
                mark(path.exists()),
                path.display()
            ));
        }

        let env_vars: Vec<String> = std::env::vars()
            .map(|(key, _)| key)
            .filter(|key| key.starts_with(ENV_PREFIX))
            .collect();
        if env_vars.is_empty() {
            lines.push(format!("  {} Env:      {}*", mark(false), ENV_PREFIX));
        } else {
            lines.push(format!("  {} Env:      {}", mark(true), env_vars.join(", ")));
        }

        match Self::project_config_path() {
            Some(path) => lines.push(format!("  {} Project:  {}", mark(true), path.display())),
            None => lines.push(format!(
                "  {} Project:  ./hydra.toml or ./.hydra.toml",
                mark(false)
            )),
        }

        if let Some(path) = Self::global_config_path() {
            lines.push(format!(
                "  {} Global:   {}",
                mark(path.exists()),
                path.display()
            ));
        }

        lines.push("  [     ] Default:  built-in defaults".to_string());
        lines
    }
}
