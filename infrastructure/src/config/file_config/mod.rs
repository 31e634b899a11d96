//! Raw TOML configuration data types
//!
//! These structs mirror the structure of the TOML config file. They are
//! deserialized directly and converted to domain/application types with
//! [`FileConfig::to_role_registry`] and [`FileConfig::to_session_params`].

mod collaboration;
mod logging;
mod repl;
mod roles;

pub use collaboration::FileCollaborationConfig;
pub use logging::FileLoggingConfig;
pub use repl::FileReplConfig;
pub use roles::{FileRoleConfig, KNOWN_PROVIDERS, RoleDefaults};

use super::validation::{ConfigIssue, ConfigIssueCode};
use hydra_application::{Language, SessionParams};
use hydra_domain::role::entities::is_role_name;
use hydra_domain::{RoleDefinition, RoleId, RoleRegistry, RoleRegistryError, builtin_roles};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Role that answers when nothing else holds control
    pub default_role: String,
    /// Fallback for roles without `max_tokens`
    pub max_tokens: u32,
    /// Fallback for roles without `temperature`
    pub temperature: f32,
    /// Start with global auto-approve on
    pub auto_approve: bool,
    /// Info-level logging without `-v`
    pub verbose: bool,
    /// Working directory for tools (default: current directory)
    pub working_directory: Option<String>,
    /// Language of REPL messages (`en` or `zh`)
    pub language: Language,
    pub collaboration: FileCollaborationConfig,
    pub logging: FileLoggingConfig,
    pub repl: FileReplConfig,
    /// `[roles.<id>]` tables, keyed by role id
    pub roles: BTreeMap<String, FileRoleConfig>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            default_role: "fast".to_string(),
            max_tokens: 4096,
            temperature: 0.0,
            auto_approve: false,
            verbose: false,
            working_directory: None,
            language: Language::En,
            collaboration: FileCollaborationConfig::default(),
            logging: FileLoggingConfig::default(),
            repl: FileReplConfig::default(),
            roles: BTreeMap::new(),
        }
    }
}

impl FileConfig {
    fn role_defaults(&self) -> RoleDefaults {
        RoleDefaults {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    /// Role definitions: built-ins first (with any overrides), then custom
    /// roles in id order.
    pub fn role_definitions(
        &self,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Vec<RoleDefinition>, RoleRegistryError> {
        let defaults = self.role_defaults();
        let mut definitions = Vec::new();
        let mut consumed: Vec<RoleId> = Vec::new();

        for builtin in builtin_roles() {
            let overrides = self
                .roles
                .iter()
                .find(|(key, _)| RoleId::new(key.as_str()) == builtin.id);
            consumed.push(builtin.id.clone());
            definitions.push(match overrides {
                Some((_, table)) => table.apply(builtin, defaults, env),
                None => FileRoleConfig::default().apply(builtin, defaults, env),
            });
        }

        for (key, table) in &self.roles {
            let id = RoleId::new(key.as_str());
            if consumed.contains(&id) {
                continue;
            }
            if !is_role_name(key.trim()) {
                return Err(RoleRegistryError::InvalidId(key.clone()));
            }
            let display_name = capitalize(id.as_str());
            definitions.push(table.apply(RoleDefinition::new(key, display_name), defaults, env));
        }
        Ok(definitions)
    }

    pub fn to_role_registry(
        &self,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<RoleRegistry, RoleRegistryError> {
        RoleRegistry::from_definitions(self.role_definitions(env)?)
    }

    pub fn to_session_params(&self) -> SessionParams {
        let c = &self.collaboration;
        let mut params = SessionParams::default()
            .with_default_role(&self.default_role)
            .with_max_transitions(c.max_transitions)
            .with_context_window(c.context_window)
            .with_help_context_window(c.help_context_window)
            .with_max_tool_turns(c.max_tool_turns)
            .with_backend_retries(c.backend_retries)
            .with_retry_backoff_ms(c.retry_backoff_ms)
            .with_auto_approve(self.auto_approve)
            .with_language(self.language);
        if let Some(dir) = &self.working_directory {
            params = params.with_working_dir(dir.clone());
        }
        params
    }

    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks, in order:
    /// 1. `[roles.<id>]` keys and providers
    /// 2. Roles without complete backend settings (warning)
    /// 3. `default_role` exists and is callable
    /// 4. Collaboration limits
    pub fn validate(&self, env: &dyn Fn(&str) -> Option<String>) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for (key, table) in &self.roles {
            if !is_role_name(key.trim()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidRoleId { role: key.clone() },
                    format!(
                        "roles.{}: role ids may only contain letters, digits, '-' and '_'",
                        key
                    ),
                ));
            }
            let provider = table.provider().to_lowercase();
            if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::UnknownProvider {
                        role: key.clone(),
                        provider: provider.clone(),
                    },
                    format!(
                        "roles.{}.provider: unknown value '{}', requests use the openai shape",
                        key, provider
                    ),
                ));
            }
        }

        // Registry-level checks need valid ids
        let definitions = match self.role_definitions(env) {
            Ok(definitions) => definitions,
            Err(_) => return issues,
        };

        for role in &definitions {
            let missing = role.backend.missing_fields();
            if !missing.is_empty() {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::RoleUnavailable {
                        role: role.id.to_string(),
                        missing: missing.clone(),
                    },
                    format!(
                        "role '{}' is unavailable: missing {}",
                        role.id,
                        missing.join(", ")
                    ),
                ));
            }
        }

        let default_role = RoleId::new(&self.default_role);
        match definitions.iter().find(|r| r.id == default_role) {
            None => issues.push(ConfigIssue::error(
                ConfigIssueCode::UnknownDefaultRole {
                    role: self.default_role.clone(),
                },
                format!("default_role: unknown role '{}'", self.default_role),
            )),
            Some(role) if !role.is_available() => issues.push(ConfigIssue::warning(
                ConfigIssueCode::DefaultRoleUnavailable {
                    role: role.id.to_string(),
                },
                format!(
                    "default_role '{}' is not configured; requests will fail until it is",
                    role.id
                ),
            )),
            Some(_) => {}
        }

        if self.collaboration.max_transitions == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroMaxTransitions,
                "collaboration.max_transitions must be at least 1",
            ));
        }
        if self.collaboration.context_window == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroContextWindow,
                "collaboration.context_window is 0: roles will not see the conversation",
            ));
        }

        issues
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
