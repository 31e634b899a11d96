//! Role registry: the read-only catalogue of roles for a session.

use super::entities::{RoleDefinition, RoleId};
use thiserror::Error;

/// Errors raised while building a [`RoleRegistry`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoleRegistryError {
    #[error("Duplicate role id: {0}")]
    Duplicate(String),

    #[error("Invalid role id '{0}': use letters, digits, '-' or '_'")]
    InvalidId(String),

    #[error("Role registry is empty")]
    Empty,
}

/// Catalogue of roles, preserving registration order.
///
/// Role lookups by id are exact (ids are already lowercase); lookups by
/// free-form name through [`resolve`](Self::resolve) also accept display
/// names, case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    roles: Vec<RoleDefinition>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry, rejecting duplicate or malformed ids.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = RoleDefinition>,
    ) -> Result<Self, RoleRegistryError> {
        let mut registry = Self::new();
        for definition in definitions {
            registry.insert(definition)?;
        }
        if registry.is_empty() {
            return Err(RoleRegistryError::Empty);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, definition: RoleDefinition) -> Result<(), RoleRegistryError> {
        if !definition.id.is_valid() {
            return Err(RoleRegistryError::InvalidId(definition.id.to_string()));
        }
        if self.contains(&definition.id) {
            return Err(RoleRegistryError::Duplicate(definition.id.to_string()));
        }
        self.roles.push(definition);
        Ok(())
    }

    pub fn get(&self, id: &RoleId) -> Option<&RoleDefinition> {
        self.roles.iter().find(|r| &r.id == id)
    }

    pub fn contains(&self, id: &RoleId) -> bool {
        self.get(id).is_some()
    }

    /// Resolve a role reference by id or display name, case-insensitively.
    pub fn resolve(&self, name: &str) -> Option<&RoleDefinition> {
        let name = name.trim();
        self.roles
            .iter()
            .find(|r| r.id.as_str().eq_ignore_ascii_case(name))
            .or_else(|| {
                self.roles
                    .iter()
                    .find(|r| r.display_name.eq_ignore_ascii_case(name))
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoleDefinition> {
        self.roles.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &RoleId> {
        self.roles.iter().map(|r| &r.id)
    }

    /// Roles whose backend is fully configured.
    pub fn available(&self) -> impl Iterator<Item = &RoleDefinition> {
        self.roles.iter().filter(|r| r.is_available())
    }

    pub fn is_available(&self, id: &RoleId) -> bool {
        self.get(id).is_some_and(|r| r.is_available())
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// The four built-in roles, without backend settings.
pub fn builtin_roles() -> Vec<RoleDefinition> {
    vec![
        RoleDefinition::new("fast", "Fast")
            .with_description("Quick responses, triage and dispatch")
            .with_responsibility("Classify the operator's intent quickly")
            .with_responsibility("Answer simple questions directly")
            .with_responsibility("Split complex work and delegate it to the right role"),
        RoleDefinition::new("pro", "Pro")
            .with_description("Planning and core implementation")
            .with_responsibility("Draft the overall plan and architecture")
            .with_responsibility("Write the core code")
            .with_responsibility("Integrate results produced by other roles"),
        RoleDefinition::new("sonnet", "Sonnet")
            .with_description("Deep reasoning and problem solving")
            .with_responsibility("Solve hard algorithmic problems")
            .with_responsibility("Diagnose and fix deep bugs")
            .with_responsibility("Review complex logic"),
        RoleDefinition::new("opus", "Opus")
            .with_description("Tool calls and validation")
            .with_responsibility("Run local tools and inspect the workspace")
            .with_responsibility("Validate the output of other roles")
            .with_responsibility("Produce final reports"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::entities::{BackendConfig, Credential};

    fn complete_backend() -> BackendConfig {
        BackendConfig {
            endpoint: "https://api.example.com/v1".to_string(),
            credential: Credential::new("key"),
            model: "model-a".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_builtin_registry() {
        let registry = RoleRegistry::from_definitions(builtin_roles()).unwrap();
        assert_eq!(registry.len(), 4);
        let ids: Vec<&str> = registry.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["fast", "pro", "sonnet", "opus"]);
        // No backends configured yet
        assert_eq!(registry.available().count(), 0);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = RoleRegistry::from_definitions(vec![
            RoleDefinition::new("pro", "Pro"),
            RoleDefinition::new("PRO", "Another Pro"),
        ]);
        assert_eq!(result.unwrap_err(), RoleRegistryError::Duplicate("pro".to_string()));
    }

    #[test]
    fn test_invalid_id_rejected() {
        let mut registry = RoleRegistry::new();
        let err = registry
            .insert(RoleDefinition::new("code reviewer", "Reviewer"))
            .unwrap_err();
        assert!(matches!(err, RoleRegistryError::InvalidId(_)));
    }

    #[test]
    fn test_empty_registry_rejected() {
        let result = RoleRegistry::from_definitions(Vec::new());
        assert_eq!(result.unwrap_err(), RoleRegistryError::Empty);
    }

    #[test]
    fn test_resolve_by_id_or_display_name() {
        let registry = RoleRegistry::from_definitions(vec![
            RoleDefinition::new("pro", "Pro"),
            RoleDefinition::new("reviewer", "Code-Reviewer"),
        ])
        .unwrap();

        assert_eq!(registry.resolve("PRO").unwrap().id.as_str(), "pro");
        assert_eq!(registry.resolve("code-reviewer").unwrap().id.as_str(), "reviewer");
        assert!(registry.resolve("sonnet").is_none());
    }

    #[test]
    fn test_availability() {
        let registry = RoleRegistry::from_definitions(vec![
            RoleDefinition::new("fast", "Fast").with_backend(complete_backend()),
            RoleDefinition::new("pro", "Pro"),
        ])
        .unwrap();

        assert!(registry.is_available(&RoleId::new("fast")));
        assert!(!registry.is_available(&RoleId::new("pro")));
        assert!(!registry.is_available(&RoleId::new("missing")));
        assert_eq!(registry.available().count(), 1);
    }
}
