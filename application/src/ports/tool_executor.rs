//! Tool Executor port
//!
//! Defines the interface for executing tools (file operations, commands, searches).

use async_trait::async_trait;
use hydra_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolSpec},
    value_objects::ToolResult,
};

/// Port for tool execution
///
/// Implementations (adapters) live in the infrastructure layer. Approval is
/// not the executor's concern: by the time `execute` is called the gatekeeper
/// and, if needed, the operator have already allowed the call.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Get the specification of all available tools
    fn tool_spec(&self) -> &ToolSpec;

    /// Definition by canonical name or alias
    fn resolve_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tool_spec().get_resolved(name)
    }

    /// Get names of all available tools, sorted
    fn available_tools(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tool_spec().names().collect();
        names.sort_unstable();
        names
    }

    /// Execute a tool call. Failures are reported in the result, never panics.
    async fn execute(&self, call: &ToolCall) -> ToolResult;
}
