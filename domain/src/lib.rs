//! Domain layer for hydra-code
//!
//! This crate contains the core collaboration logic: roles, the marker
//! protocol, the shared context and the router state machine. It has no
//! dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Roles
//!
//! Several LLM personas (`fast`, `pro`, `sonnet`, `opus`, plus any custom
//! role) work on one task. Each role has its own backend settings and is
//! looked up through the [`RoleRegistry`].
//!
//! ## Protocol
//!
//! Roles coordinate by writing markers such as `[DELEGATE: pro]` in their
//! replies. The [`ProtocolParser`] turns a reply into [`Directive`]s, tool
//! requests and clean display text.
//!
//! ## Router
//!
//! The [`CollaborationRouter`] applies directives to the session: it keeps
//! the delegation stack, help requests, the shared [`ContextStore`] and the
//! tool approval flags, and decides which role speaks next.

pub mod collaboration;
pub mod context;
pub mod core;
pub mod protocol;
pub mod role;
pub mod tool;

// Re-export commonly used types
pub use collaboration::{
    Autopilot, Briefing, CollaborationRouter, CollaborationSession, CollaborationStatus,
    DelegationFrame, HelpFrame, RouterSettings, Transition, TurnOutcome,
};
pub use context::{Author, ContextStore, Discovery, Message};
pub use core::error::DomainError;
pub use protocol::{Directive, ParsedOutput, ProtocolParser};
pub use role::{
    BackendConfig, Credential, RoleDefinition, RoleId, RoleRegistry, RoleRegistryError,
    builtin_roles,
};
pub use tool::{
    ApprovalState, GateDecision, ToolCall, ToolDefinition, ToolError, ToolGatekeeper, ToolKind,
    ToolErrorKind, ToolParameter, ToolResult, ToolResultMetadata, ToolSpec,
};
