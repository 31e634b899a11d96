//! Role domain module
//!
//! A **role** is a named LLM persona with its own backend configuration and
//! responsibilities. The four built-in roles mirror the cost/capability
//! ladder a coding session needs:
//!
//! | Role | Responsibility |
//! |------|----------------|
//! | `fast` | Triage, quick answers, dispatching work to other roles |
//! | `pro` | Planning and core implementation |
//! | `sonnet` | Deep reasoning, debugging, reviews |
//! | `opus` | Tool-heavy work, validation, final checks |
//!
//! Custom roles may be added through configuration. Every role is looked up
//! through the [`RoleRegistry`], which is validated once at load time and then
//! treated as read-only for the rest of the session.

pub mod entities;
pub mod registry;

pub use entities::{BackendConfig, Credential, RoleDefinition, RoleId};
pub use registry::{RoleRegistry, RoleRegistryError, builtin_roles};
