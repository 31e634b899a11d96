//! Role configuration from TOML (`[roles.<id>]` tables)

use hydra_domain::{BackendConfig, Credential, RoleDefinition};
use serde::{Deserialize, Serialize};

/// Providers the OpenAI-compatible backend client understands.
pub const KNOWN_PROVIDERS: &[&str] = &["openai", "azure"];

/// One `[roles.<id>]` table. Every field is optional: built-in roles only
/// need backend settings, custom roles usually also set `name` and
/// `description`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRoleConfig {
    /// `openai` (default) or `azure`
    pub provider: Option<String>,
    pub base_url: Option<String>,
    /// Direct API key (prefer `api_key_env`)
    pub api_key: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    pub model_name: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Display name override
    pub name: Option<String>,
    /// Description override
    pub description: Option<String>,
    pub responsibilities: Option<Vec<String>>,
}

/// Global fallbacks for per-role settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleDefaults {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl FileRoleConfig {
    /// API key from `api_key`, or from the variable named by `api_key_env`.
    pub fn resolve_api_key(&self, env: &dyn Fn(&str) -> Option<String>) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                self.api_key_env
                    .as_deref()
                    .and_then(env)
                    .filter(|k| !k.trim().is_empty())
            })
    }

    pub fn provider(&self) -> &str {
        self.provider.as_deref().unwrap_or("openai")
    }

    /// Apply this table on top of `base` (a built-in role or a bare custom one).
    pub fn apply(
        &self,
        mut base: RoleDefinition,
        defaults: RoleDefaults,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> RoleDefinition {
        if let Some(name) = self.name.as_ref().filter(|n| !n.trim().is_empty()) {
            base.display_name = name.clone();
        }
        if let Some(description) = &self.description {
            base.description = description.clone();
        }
        if let Some(responsibilities) = &self.responsibilities {
            base.responsibilities = responsibilities.clone();
        }
        base.backend = BackendConfig {
            provider: self.provider().to_lowercase(),
            endpoint: self.base_url.clone().unwrap_or_default(),
            credential: Credential::new(self.resolve_api_key(env).unwrap_or_default()),
            model: self.model_name.clone().unwrap_or_default(),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
        };
        base
    }
}
