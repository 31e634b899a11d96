//! Local tool executor, the concrete [`ToolExecutorPort`].
//!
//! Relative paths in tool arguments are resolved against the executor's
//! working directory, so a session started with `working_directory = "/repo"`
//! reads `src/lib.rs` as `/repo/src/lib.rs` regardless of the process cwd.
//!
//! ```text
//! ToolExecutorPort::execute()
//!   ├─ resolve alias → canonical name
//!   ├─ DefaultToolValidator (required / unknown / typed args)
//!   ├─ run_command           → async (tokio::process, timeout)
//!   └─ file / search tools   → synchronous std::fs
//! ```

use async_trait::async_trait;
use hydra_application::ports::tool_executor::ToolExecutorPort;
use hydra_domain::tool::{
    entities::{ToolCall, ToolSpec},
    traits::{DefaultToolValidator, ToolValidator},
    value_objects::{ToolError, ToolErrorKind, ToolResult},
};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{command, file, manage, search};

/// Executor that runs tools on the local machine.
#[derive(Debug, Clone)]
pub struct LocalToolExecutor {
    tool_spec: ToolSpec,
    working_dir: PathBuf,
}

impl LocalToolExecutor {
    /// All built-in tools, rooted at the process working directory.
    pub fn new() -> Self {
        Self::with_tools(super::default_tool_spec())
    }

    /// Only the tools that never need approval (reads and searches).
    pub fn read_only() -> Self {
        Self::with_tools(super::read_only_tool_spec())
    }

    pub fn with_tools(tool_spec: ToolSpec) -> Self {
        Self {
            tool_spec,
            working_dir: PathBuf::from("."),
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

impl Default for LocalToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutorPort for LocalToolExecutor {
    fn tool_spec(&self) -> &ToolSpec {
        &self.tool_spec
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        let Some(definition) = self.tool_spec.get_resolved(&call.tool_name) else {
            return ToolResult::failure(
                &call.tool_name,
                ToolError::new(
                    ToolErrorKind::NotFound,
                    format!("Unknown tool: {}", call.tool_name),
                ),
            );
        };
        if let Err(e) = DefaultToolValidator.validate(call, definition) {
            return ToolResult::failure(&definition.name, ToolError::invalid_argument(e));
        }

        debug!(tool = %definition.name, "Executing tool");
        let base = self.working_dir.as_path();
        match definition.name.as_str() {
            file::READ_FILE => file::execute_read_file(call, base),
            file::LIST_DIRECTORY => file::execute_list_directory(call, base),
            file::WRITE_FILE => file::execute_write_file(call, base),
            file::EDIT_FILE => file::execute_edit_file(call, base),
            manage::DELETE_FILE => manage::execute_delete_file(call, base),
            manage::CREATE_DIRECTORY => manage::execute_create_directory(call, base),
            manage::MOVE_FILE => manage::execute_move_file(call, base),
            manage::COPY_FILE => manage::execute_copy_file(call, base),
            manage::GET_FILE_INFO => manage::execute_get_file_info(call, base),
            command::RUN_COMMAND => command::execute_run_command(call, base).await,
            search::GLOB_SEARCH => search::execute_glob_search(call, base),
            search::GREP_SEARCH => search::execute_grep_search(call, base),
            other => ToolResult::failure(
                other,
                ToolError::new(
                    ToolErrorKind::NotFound,
                    format!("No local implementation for tool: {}", other),
                ),
            ),
        }
    }
}
