//! File management tools: delete_file, create_directory, move_file,
//! copy_file, get_file_info
//!
//! Everything here except `get_file_info` changes the tree and is gated as
//! [`ToolKind::FileWrite`]. Directories are handled recursively; the working
//! directory itself can never be deleted, moved or copied into itself.

use super::file::{file_metadata, io_failure};
use super::resolve_path;
use chrono::{DateTime, Local};
use hydra_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolKind, ToolParameter},
    value_objects::{ToolError, ToolResult, ToolResultMetadata},
};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub const DELETE_FILE: &str = "delete_file";
pub const CREATE_DIRECTORY: &str = "create_directory";
pub const MOVE_FILE: &str = "move_file";
pub const COPY_FILE: &str = "copy_file";
pub const GET_FILE_INFO: &str = "get_file_info";

pub fn delete_file_definition() -> ToolDefinition {
    ToolDefinition::new(
        DELETE_FILE,
        "Delete a file, or a directory with everything in it",
        ToolKind::FileWrite,
    )
    .with_parameter(ToolParameter::new("path", "File or directory to delete", true).with_type("path"))
}

pub fn create_directory_definition() -> ToolDefinition {
    ToolDefinition::new(
        CREATE_DIRECTORY,
        "Create a directory and any missing parents",
        ToolKind::FileWrite,
    )
    .with_parameter(ToolParameter::new("path", "Directory to create", true).with_type("path"))
}

pub fn move_file_definition() -> ToolDefinition {
    ToolDefinition::new(
        MOVE_FILE,
        "Move or rename a file or directory. Moving onto an existing directory moves into it.",
        ToolKind::FileWrite,
    )
    .with_parameter(ToolParameter::new("source", "Path to move", true).with_type("path"))
    .with_parameter(ToolParameter::new("destination", "New path", true).with_type("path"))
}

pub fn copy_file_definition() -> ToolDefinition {
    ToolDefinition::new(
        COPY_FILE,
        "Copy a file or directory. Missing parent directories of the destination are created.",
        ToolKind::FileWrite,
    )
    .with_parameter(ToolParameter::new("source", "Path to copy", true).with_type("path"))
    .with_parameter(ToolParameter::new("destination", "Target path", true).with_type("path"))
}

pub fn get_file_info_definition() -> ToolDefinition {
    ToolDefinition::new(
        GET_FILE_INFO,
        "Show type, size, timestamps and permissions of a file or directory",
        ToolKind::FileRead,
    )
    .with_parameter(ToolParameter::new("path", "File or directory to inspect", true).with_type("path"))
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Whether `inner` lies inside `outer` (or is `outer`).
fn is_within(inner: &Path, outer: &Path) -> bool {
    let outer = outer.canonicalize().unwrap_or_else(|_| outer.to_path_buf());
    // The destination may not exist yet; check its closest existing ancestor
    let mut existing = inner.to_path_buf();
    let mut rest = Vec::new();
    while !existing.exists() {
        match (existing.file_name().map(|n| n.to_os_string()), existing.parent()) {
            (Some(name), Some(parent)) => {
                rest.push(name);
                existing = parent.to_path_buf();
            }
            _ => break,
        }
    }
    let mut resolved = existing.canonicalize().unwrap_or(existing);
    for name in rest.into_iter().rev() {
        resolved.push(name);
    }
    resolved.starts_with(&outer)
}

fn invalid(tool: &str, message: String) -> ToolResult {
    ToolResult::failure(tool, ToolError::invalid_argument(message))
}

fn source_and_destination<'a>(
    tool: &str,
    call: &'a ToolCall,
) -> Result<(&'a str, &'a str), ToolResult> {
    match (call.require_string("source"), call.require_string("destination")) {
        (Ok(s), Ok(d)) => Ok((s, d)),
        (Err(e), _) | (_, Err(e)) => Err(invalid(tool, e)),
    }
}

pub fn execute_delete_file(call: &ToolCall, base: &Path) -> ToolResult {
    let path_str = match call.require_string("path") {
        Ok(p) => p,
        Err(e) => return invalid(DELETE_FILE, e),
    };
    let path = resolve_path(base, path_str);
    if same_path(&path, base) || path.parent().is_none() {
        return ToolResult::failure(
            DELETE_FILE,
            ToolError::permission_denied(format!("{} (refusing to delete this directory)", path_str)),
        );
    }

    let metadata = match fs::symlink_metadata(&path) {
        Ok(m) => m,
        Err(e) => return io_failure(DELETE_FILE, path_str, "delete", e),
    };
    let (removed, what) = if metadata.is_dir() {
        (fs::remove_dir_all(&path), "directory")
    } else {
        (fs::remove_file(&path), "file")
    };
    if let Err(e) = removed {
        return io_failure(DELETE_FILE, path_str, "delete", e);
    }

    ToolResult::success(DELETE_FILE, format!("Deleted {} {}", what, path_str)).with_metadata(
        ToolResultMetadata {
            path: Some(path_str.to_string()),
            ..Default::default()
        },
    )
}

pub fn execute_create_directory(call: &ToolCall, base: &Path) -> ToolResult {
    let path_str = match call.require_string("path") {
        Ok(p) => p,
        Err(e) => return invalid(CREATE_DIRECTORY, e),
    };
    let path = resolve_path(base, path_str);
    if path.is_file() {
        return invalid(CREATE_DIRECTORY, format!("'{}' exists and is a file", path_str));
    }

    let existed = path.is_dir();
    if let Err(e) = fs::create_dir_all(&path) {
        return io_failure(CREATE_DIRECTORY, path_str, "create", e);
    }

    let output = if existed {
        format!("Directory already exists: {}", path_str)
    } else {
        format!("Created directory {}", path_str)
    };
    ToolResult::success(CREATE_DIRECTORY, output).with_metadata(ToolResultMetadata {
        path: Some(path_str.to_string()),
        ..Default::default()
    })
}

pub fn execute_move_file(call: &ToolCall, base: &Path) -> ToolResult {
    let (source_str, dest_str) = match source_and_destination(MOVE_FILE, call) {
        Ok(pair) => pair,
        Err(result) => return result,
    };
    let source = resolve_path(base, source_str);
    let mut dest = resolve_path(base, dest_str);

    if let Err(e) = fs::symlink_metadata(&source) {
        return io_failure(MOVE_FILE, source_str, "move", e);
    }
    if same_path(&source, base) {
        return ToolResult::failure(
            MOVE_FILE,
            ToolError::permission_denied(format!("{} (refusing to move this directory)", source_str)),
        );
    }
    if dest.is_dir()
        && let Some(name) = source.file_name()
    {
        dest = dest.join(name);
    }
    if dest.exists() {
        return invalid(MOVE_FILE, format!("Destination already exists: {}", dest.display()));
    }
    if source.is_dir() && is_within(&dest, &source) {
        return invalid(MOVE_FILE, format!("Cannot move {} into itself", source_str));
    }

    let moved = match fs::rename(&source, &dest) {
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            copy_recursive(&source, &dest).and_then(|_| remove_any(&source))
        }
        other => other,
    };
    if let Err(e) = moved {
        return io_failure(MOVE_FILE, source_str, "move", e);
    }

    ToolResult::success(
        MOVE_FILE,
        format!("Moved {} to {}", source_str, dest.display()),
    )
    .with_metadata(ToolResultMetadata {
        path: Some(dest.display().to_string()),
        ..Default::default()
    })
}

pub fn execute_copy_file(call: &ToolCall, base: &Path) -> ToolResult {
    let (source_str, dest_str) = match source_and_destination(COPY_FILE, call) {
        Ok(pair) => pair,
        Err(result) => return result,
    };
    let source = resolve_path(base, source_str);
    let dest = resolve_path(base, dest_str);

    let metadata = match fs::metadata(&source) {
        Ok(m) => m,
        Err(e) => return io_failure(COPY_FILE, source_str, "copy", e),
    };
    if metadata.is_dir() {
        if dest.exists() {
            return invalid(COPY_FILE, format!("Destination already exists: {}", dest_str));
        }
        if is_within(&dest, &source) {
            return invalid(COPY_FILE, format!("Cannot copy {} into itself", source_str));
        }
    }
    if let Some(parent) = dest.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        return io_failure(COPY_FILE, dest_str, "create parent of", e);
    }

    match copy_recursive(&source, &dest) {
        Ok(bytes) => ToolResult::success(
            COPY_FILE,
            format!("Copied {} to {} ({} bytes)", source_str, dest_str, bytes),
        )
        .with_metadata(file_metadata(dest_str, bytes as usize)),
        Err(e) => io_failure(COPY_FILE, source_str, "copy", e),
    }
}

/// Copy a file or a directory tree; returns the number of bytes copied.
fn copy_recursive(source: &Path, dest: &Path) -> io::Result<u64> {
    if !source.is_dir() {
        return fs::copy(source, dest);
    }
    fs::create_dir_all(dest)?;
    let mut total = 0;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        total += copy_recursive(&entry.path(), &dest.join(entry.file_name()))?;
    }
    Ok(total)
}

fn remove_any(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

fn format_time(time: io::Result<SystemTime>) -> String {
    match time {
        Ok(time) => DateTime::<Local>::from(time).to_rfc3339(),
        Err(_) => "unavailable".to_string(),
    }
}

#[cfg(unix)]
fn permissions(metadata: &fs::Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    format!("{:o}", metadata.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn permissions(metadata: &fs::Metadata) -> String {
    if metadata.permissions().readonly() {
        "read-only".to_string()
    } else {
        "read-write".to_string()
    }
}

pub fn execute_get_file_info(call: &ToolCall, base: &Path) -> ToolResult {
    let path_str = match call.require_string("path") {
        Ok(p) => p,
        Err(e) => return invalid(GET_FILE_INFO, e),
    };
    let path: PathBuf = resolve_path(base, path_str);

    let metadata = match fs::metadata(&path) {
        Ok(m) => m,
        Err(e) => return io_failure(GET_FILE_INFO, path_str, "inspect", e),
    };

    let kind = if metadata.is_dir() { "directory" } else { "file" };
    let mut lines = vec![
        format!("Path: {}", path.display()),
        format!("Type: {}", kind),
        format!("Size: {} bytes", metadata.len()),
        format!("Created: {}", format_time(metadata.created())),
        format!("Modified: {}", format_time(metadata.modified())),
        format!("Accessed: {}", format_time(metadata.accessed())),
        format!("Permissions: {}", permissions(&metadata)),
    ];
    if metadata.is_file()
        && let Some(ext) = path.extension()
    {
        lines.push(format!("Extension: {}", ext.to_string_lossy()));
    }

    ToolResult::success(GET_FILE_INFO, lines.join("\n"))
        .with_metadata(file_metadata(path_str, metadata.len() as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydra_domain::tool::value_objects::ToolErrorKind;
    use tempfile::tempdir;

    #[test]
    fn test_delete_file_and_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "x").unwrap();
        fs::create_dir_all(dir.path().join("build/out")).unwrap();
        fs::write(dir.path().join("build/out/app"), "bin").unwrap();

        let file = ToolCall::new(DELETE_FILE).with_arg("path", "a.txt");
        assert!(execute_delete_file(&file, dir.path()).is_success());
        assert!(!dir.path().join("a.txt").exists());

        let tree = ToolCall::new(DELETE_FILE).with_arg("path", "build");
        let result = execute_delete_file(&tree, dir.path());
        assert_eq!(result.output(), Some("Deleted directory build"));
        assert!(!dir.path().join("build").exists());

        let missing = execute_delete_file(&file, dir.path());
        assert_eq!(missing.error_kind(), Some(ToolErrorKind::NotFound));
    }

    #[test]
    fn test_delete_refuses_working_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("keep.txt"), "x").unwrap();

        let call = ToolCall::new(DELETE_FILE).with_arg("path", ".");
        let result = execute_delete_file(&call, dir.path());

        assert_eq!(result.error_kind(), Some(ToolErrorKind::PermissionDenied));
        assert!(dir.path().join("keep.txt").exists());
    }

    #[test]
    fn test_create_directory_with_parents() {
        let dir = tempdir().unwrap();
        let call = ToolCall::new(CREATE_DIRECTORY).with_arg("path", "src/protocol/tests");

        let result = execute_create_directory(&call, dir.path());
        assert!(result.is_success());
        assert!(dir.path().join("src/protocol/tests").is_dir());

        let again = execute_create_directory(&call, dir.path());
        assert_eq!(again.output(), Some("Directory already exists: src/protocol/tests"));

        fs::write(dir.path().join("file"), "").unwrap();
        let onto_file = ToolCall::new(CREATE_DIRECTORY).with_arg("path", "file");
        assert_eq!(
            execute_create_directory(&onto_file, dir.path()).error_kind(),
            Some(ToolErrorKind::InvalidArgument)
        );
    }

    #[test]
    fn test_move_renames_and_moves_into_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("old.rs"), "fn a() {}").unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();

        let rename = ToolCall::new(MOVE_FILE)
            .with_arg("source", "old.rs")
            .with_arg("destination", "new.rs");
        assert!(execute_move_file(&rename, dir.path()).is_success());
        assert_eq!(fs::read_to_string(dir.path().join("new.rs")).unwrap(), "fn a() {}");

        let into_dir = ToolCall::new(MOVE_FILE)
            .with_arg("source", "new.rs")
            .with_arg("destination", "src");
        assert!(execute_move_file(&into_dir, dir.path()).is_success());
        assert!(dir.path().join("src/new.rs").is_file());
        assert!(!dir.path().join("new.rs").exists());
    }

    #[test]
    fn test_move_rejects_overwrite_and_self_nesting() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::create_dir(dir.path().join("pkg")).unwrap();

        let overwrite = ToolCall::new(MOVE_FILE)
            .with_arg("source", "a.txt")
            .with_arg("destination", "b.txt");
        assert_eq!(
            execute_move_file(&overwrite, dir.path()).error_kind(),
            Some(ToolErrorKind::InvalidArgument)
        );
        assert_eq!(fs::read_to_string(dir.path().join("b.txt")).unwrap(), "b");

        let nested = ToolCall::new(MOVE_FILE)
            .with_arg("source", "pkg")
            .with_arg("destination", "pkg/inner/pkg");
        assert_eq!(
            execute_move_file(&nested, dir.path()).error_kind(),
            Some(ToolErrorKind::InvalidArgument)
        );

        let missing = ToolCall::new(MOVE_FILE)
            .with_arg("source", "ghost.txt")
            .with_arg("destination", "c.txt");
        assert_eq!(
            execute_move_file(&missing, dir.path()).error_kind(),
            Some(ToolErrorKind::NotFound)
        );
    }

    #[test]
    fn test_copy_file_and_tree() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("templates/partials")).unwrap();
        fs::write(dir.path().join("templates/base.html"), "<html>").unwrap();
        fs::write(dir.path().join("templates/partials/nav.html"), "<nav>").unwrap();

        let file = ToolCall::new(COPY_FILE)
            .with_arg("source", "templates/base.html")
            .with_arg("destination", "backup/base.html");
        let result = execute_copy_file(&file, dir.path());
        assert!(result.is_success());
        assert_eq!(result.metadata.bytes, Some(6));
        assert_eq!(
            fs::read_to_string(dir.path().join("backup/base.html")).unwrap(),
            "<html>"
        );

        let tree = ToolCall::new(COPY_FILE)
            .with_arg("source", "templates")
            .with_arg("destination", "themes/default");
        assert!(execute_copy_file(&tree, dir.path()).is_success());
        assert_eq!(
            fs::read_to_string(dir.path().join("themes/default/partials/nav.html")).unwrap(),
            "<nav>"
        );
        assert!(dir.path().join("templates/base.html").exists());

        let into_itself = ToolCall::new(COPY_FILE)
            .with_arg("source", "templates")
            .with_arg("destination", "templates/copy");
        assert_eq!(
            execute_copy_file(&into_itself, dir.path()).error_kind(),
            Some(ToolErrorKind::InvalidArgument)
        );
    }

    #[test]
    fn test_get_file_info() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Cargo.toml"), "[package]\n").unwrap();

        let call = ToolCall::new(GET_FILE_INFO).with_arg("path", "Cargo.toml");
        let result = execute_get_file_info(&call, dir.path());

        let output = result.output().unwrap();
        assert!(output.contains("Type: file"));
        assert!(output.contains("Size: 10 bytes"));
        assert!(output.contains("Extension: toml"));
        assert!(output.contains("Modified: "));
        assert_eq!(result.metadata.bytes, Some(10));

        let dir_info = execute_get_file_info(
            &ToolCall::new(GET_FILE_INFO).with_arg("path", "."),
            dir.path(),
        );
        assert!(dir_info.output().unwrap().contains("Type: directory"));

        let missing = ToolCall::new(GET_FILE_INFO).with_arg("path", "nope");
        assert_eq!(
            execute_get_file_info(&missing, dir.path()).error_kind(),
            Some(ToolErrorKind::NotFound)
        );
    }
}
