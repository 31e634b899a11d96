//! Role entities and value objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a role (e.g. `fast`, `pro`).
///
/// Ids are normalised to lowercase so that `[DELEGATE: Pro]` and
/// `[DELEGATE: pro]` address the same role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(String);

impl RoleId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id only uses characters allowed in protocol markers.
    pub fn is_valid(&self) -> bool {
        is_role_name(&self.0)
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoleId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Characters accepted in a role reference: `[A-Za-z0-9_-]+`.
pub fn is_role_name(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Opaque API credential.
///
/// Never printed: `Debug` is redacted and there is no `Display`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("Credential(<unset>)")
        } else {
            f.write_str("Credential(<redacted>)")
        }
    }
}

/// Connection settings for the LLM backend that serves a role.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    /// Provider flavour (`openai`, `azure`, ...). Only affects request shape.
    pub provider: String,
    /// Base URL of the OpenAI-compatible API
    pub endpoint: String,
    pub credential: Credential,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            endpoint: String::new(),
            credential: Credential::default(),
            model: String::new(),
            temperature: 0.0,
            max_tokens: 4096,
        }
    }
}

impl BackendConfig {
    /// A backend can only be called when endpoint, credential and model are set.
    pub fn is_complete(&self) -> bool {
        !self.endpoint.trim().is_empty() && !self.credential.is_empty() && !self.model.trim().is_empty()
    }

    /// Names of the settings that are still missing.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.credential.is_empty() {
            missing.push("api_key");
        }
        if self.endpoint.trim().is_empty() {
            missing.push("base_url");
        }
        if self.model.trim().is_empty() {
            missing.push("model_name");
        }
        missing
    }
}

/// A named persona with its own backend and responsibilities.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleDefinition {
    pub id: RoleId,
    pub display_name: String,
    pub description: String,
    pub responsibilities: Vec<String>,
    pub backend: BackendConfig,
}

impl RoleDefinition {
    pub fn new(id: impl AsRef<str>, display_name: impl Into<String>) -> Self {
        Self {
            id: RoleId::new(id),
            display_name: display_name.into(),
            description: String::new(),
            responsibilities: Vec::new(),
            backend: BackendConfig::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_responsibility(mut self, responsibility: impl Into<String>) -> Self {
        self.responsibilities.push(responsibility.into());
        self
    }

    pub fn with_backend(mut self, backend: BackendConfig) -> Self {
        self.backend = backend;
        self
    }

    /// Whether this role can be called right now.
    pub fn is_available(&self) -> bool {
        self.backend.is_complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_id_normalises_case_and_whitespace() {
        assert_eq!(RoleId::new(" Pro "), RoleId::new("pro"));
        assert_eq!(RoleId::new("SONNET").as_str(), "sonnet");
    }

    #[test]
    fn test_role_name_charset() {
        assert!(is_role_name("code-reviewer_2"));
        assert!(!is_role_name(""));
        assert!(!is_role_name("two words"));
        assert!(!is_role_name("pro!"));
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let cred = Credential::new("sk-secret");
        let printed = format!("{:?}", cred);
        assert!(!printed.contains("sk-secret"));
        assert_eq!(printed, "Credential(<redacted>)");
        assert_eq!(format!("{:?}", Credential::default()), "Credential(<unset>)");
    }

    #[test]
    fn test_backend_missing_fields() {
        let backend = BackendConfig {
            model: "gpt-4o".to_string(),
            ..Default::default()
        };
        assert!(!backend.is_complete());
        assert_eq!(backend.missing_fields(), vec!["api_key", "base_url"]);

        let complete = BackendConfig {
            endpoint: "https://api.example.com/v1".to_string(),
            credential: Credential::new("k"),
            model: "gpt-4o".to_string(),
            ..Default::default()
        };
        assert!(complete.is_complete());
        assert!(complete.missing_fields().is_empty());
    }
}
