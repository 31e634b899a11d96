//! Command execution tool: run_command

use super::resolve_path;
use hydra_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolKind, ToolParameter},
    value_objects::{ToolError, ToolErrorKind, ToolResult, ToolResultMetadata},
};
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

pub const RUN_COMMAND: &str = "run_command";

/// Default timeout for command execution (60 seconds)
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Upper bound for a caller-supplied timeout (10 minutes)
const MAX_TIMEOUT_SECS: u64 = 600;

/// Maximum output size (1 MB)
const MAX_OUTPUT_SIZE: usize = 1024 * 1024;

pub fn run_command_definition() -> ToolDefinition {
    ToolDefinition::new(
        RUN_COMMAND,
        "Run a shell command in the working directory and return its output",
        ToolKind::Execute,
    )
    .with_parameter(
        ToolParameter::new("command", "The command to execute", true).with_type("string"),
    )
    .with_parameter(
        ToolParameter::new("working_dir", "Directory to run in, relative to the working directory", false)
            .with_type("path"),
    )
    .with_parameter(
        ToolParameter::new("timeout_secs", "Timeout in seconds (default: 60)", false)
            .with_type("number"),
    )
}

fn shell(command: &str) -> Command {
    if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", command]);
        c
    } else {
        let mut c = Command::new("sh");
        c.args(["-c", command]);
        c
    }
}

fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);

    let mut combined = stdout.into_owned();
    if !stderr.is_empty() {
        if !combined.is_empty() {
            combined.push_str("\n--- stderr ---\n");
        }
        combined.push_str(&stderr);
    }

    if combined.len() > MAX_OUTPUT_SIZE {
        let mut cut = MAX_OUTPUT_SIZE;
        while !combined.is_char_boundary(cut) {
            cut -= 1;
        }
        combined.truncate(cut);
        combined.push_str("\n... (output truncated)");
    }
    combined
}

/// Run the command; a non-zero exit is still a successful tool result so the
/// role can read the failure output.
pub async fn execute_run_command(call: &ToolCall, base: &Path) -> ToolResult {
    let start = Instant::now();

    let command = match call.require_string("command") {
        Ok(c) => c,
        Err(e) => return ToolResult::failure(RUN_COMMAND, ToolError::invalid_argument(e)),
    };

    let dir = match call.get_string("working_dir") {
        Some(raw) => {
            let dir = resolve_path(base, raw);
            if !dir.is_dir() {
                return ToolResult::failure(
                    RUN_COMMAND,
                    ToolError::new(
                        ToolErrorKind::NotFound,
                        format!("Working directory does not exist: {}", raw),
                    ),
                );
            }
            dir
        }
        None => base.to_path_buf(),
    };

    let timeout_secs = call
        .get_i64("timeout_secs")
        .map(|t| t.clamp(1, MAX_TIMEOUT_SECS as i64) as u64)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    let mut cmd = shell(command);
    cmd.current_dir(&dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            return ToolResult::failure(
                RUN_COMMAND,
                ToolError::execution_failed(format!("Failed to spawn command: {}", e)),
            );
        }
    };

    // Dropping the future on timeout kills the child
    let output = match tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        child.wait_with_output(),
    )
    .await
    {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return ToolResult::failure(
                RUN_COMMAND,
                ToolError::execution_failed(format!("Failed to wait for command: {}", e)),
            );
        }
        Err(_) => {
            return ToolResult::failure(
                RUN_COMMAND,
                ToolError::timeout(format!("`{}` after {} seconds", command, timeout_secs)),
            );
        }
    };

    let exit_code = output.status.code().unwrap_or(-1);
    let combined = combine_output(&output.stdout, &output.stderr);
    let metadata = ToolResultMetadata {
        duration_ms: Some(start.elapsed().as_millis() as u64),
        bytes: Some(combined.len()),
        exit_code: Some(exit_code),
        ..Default::default()
    };

    let text = if output.status.success() {
        combined
    } else {
        format!("Command exited with code {}\n{}", exit_code, combined)
    };
    ToolResult::success(RUN_COMMAND, text).with_metadata(metadata)
}
