//! File tools: read_file, list_directory, write_file, edit_file

use super::resolve_path;
use hydra_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolKind, ToolParameter},
    value_objects::{ToolError, ToolErrorKind, ToolResult, ToolResultMetadata},
};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub const READ_FILE: &str = "read_file";
pub const LIST_DIRECTORY: &str = "list_directory";
pub const WRITE_FILE: &str = "write_file";
pub const EDIT_FILE: &str = "edit_file";

/// Maximum file size to read (10 MB)
const MAX_READ_SIZE: u64 = 10 * 1024 * 1024;

/// Maximum entries returned by list_directory
const MAX_ENTRIES: usize = 500;

pub fn read_file_definition() -> ToolDefinition {
    ToolDefinition::new(
        READ_FILE,
        "Read a text file. Relative paths are resolved against the working directory.",
        ToolKind::FileRead,
    )
    .with_parameter(ToolParameter::new("path", "Path to the file to read", true).with_type("path"))
    .with_parameter(
        ToolParameter::new("offset", "Line number to start reading from (0-indexed)", false)
            .with_type("number"),
    )
    .with_parameter(
        ToolParameter::new("limit", "Maximum number of lines to read", false).with_type("number"),
    )
}

pub fn list_directory_definition() -> ToolDefinition {
    ToolDefinition::new(
        LIST_DIRECTORY,
        "List the entries of a directory, directories first",
        ToolKind::FileRead,
    )
    .with_parameter(
        ToolParameter::new("path", "Directory to list (default: working directory)", false)
            .with_type("path"),
    )
}

pub fn write_file_definition() -> ToolDefinition {
    ToolDefinition::new(
        WRITE_FILE,
        "Create or overwrite a file with the given content",
        ToolKind::FileWrite,
    )
    .with_parameter(ToolParameter::new("path", "Path to the file to write", true).with_type("path"))
    .with_parameter(
        ToolParameter::new("content", "Full content of the file", true).with_type("string"),
    )
    .with_parameter(
        ToolParameter::new("create_dirs", "Create missing parent directories", false)
            .with_type("boolean"),
    )
}

pub fn edit_file_definition() -> ToolDefinition {
    ToolDefinition::new(
        EDIT_FILE,
        "Replace an exact snippet of a file. old_text must occur exactly once unless replace_all is true.",
        ToolKind::FileWrite,
    )
    .with_parameter(ToolParameter::new("path", "Path to the file to edit", true).with_type("path"))
    .with_parameter(
        ToolParameter::new("old_text", "Exact text to replace", true).with_type("string"),
    )
    .with_parameter(
        ToolParameter::new("new_text", "Replacement text", true).with_type("string"),
    )
    .with_parameter(
        ToolParameter::new("replace_all", "Replace every occurrence", false).with_type("boolean"),
    )
}

pub(super) fn io_failure(tool: &str, path: &str, action: &str, e: std::io::Error) -> ToolResult {
    let error = match e.kind() {
        ErrorKind::NotFound => ToolError::not_found(path),
        ErrorKind::PermissionDenied => ToolError::permission_denied(path),
        _ => ToolError::execution_failed(format!("Failed to {} {}: {}", action, path, e)),
    };
    ToolResult::failure(tool, error)
}

pub(super) fn file_metadata(path_str: &str, bytes: usize) -> ToolResultMetadata {
    ToolResultMetadata {
        bytes: Some(bytes),
        path: Some(path_str.to_string()),
        ..Default::default()
    }
}

pub fn execute_read_file(call: &ToolCall, base: &Path) -> ToolResult {
    let path_str = match call.require_string("path") {
        Ok(p) => p,
        Err(e) => return ToolResult::failure(READ_FILE, ToolError::invalid_argument(e)),
    };
    let path = resolve_path(base, path_str);

    let metadata = match fs::metadata(&path) {
        Ok(m) => m,
        Err(e) => return io_failure(READ_FILE, path_str, "read", e),
    };
    if !metadata.is_file() {
        return ToolResult::failure(
            READ_FILE,
            ToolError::invalid_argument(format!("'{}' is not a file", path_str)),
        );
    }
    if metadata.len() > MAX_READ_SIZE {
        return ToolResult::failure(
            READ_FILE,
            ToolError::invalid_argument(format!(
                "File too large ({} bytes). Maximum size is {} bytes",
                metadata.len(),
                MAX_READ_SIZE
            )),
        );
    }

    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            return ToolResult::failure(
                READ_FILE,
                ToolError::invalid_argument(format!("'{}' is not valid UTF-8 text", path_str)),
            );
        }
        Err(e) => return io_failure(READ_FILE, path_str, "read", e),
    };

    let offset = call.get_i64("offset").unwrap_or(0).max(0) as usize;
    let limit = call.get_i64("limit").map(|l| l.max(0) as usize);
    let output = if offset > 0 || limit.is_some() {
        let lines = content.lines().skip(offset);
        match limit {
            Some(limit) => lines.take(limit).collect::<Vec<_>>().join("\n"),
            None => lines.collect::<Vec<_>>().join("\n"),
        }
    } else {
        content
    };

    let bytes = output.len();
    ToolResult::success(READ_FILE, output).with_metadata(file_metadata(path_str, bytes))
}

pub fn execute_list_directory(call: &ToolCall, base: &Path) -> ToolResult {
    let path_str = call.get_string("path").unwrap_or(".");
    let path = resolve_path(base, path_str);

    if path.is_file() {
        return ToolResult::failure(
            LIST_DIRECTORY,
            ToolError::invalid_argument(format!("'{}' is not a directory", path_str)),
        );
    }
    let entries = match fs::read_dir(&path) {
        Ok(entries) => entries,
        Err(e) => return io_failure(LIST_DIRECTORY, path_str, "list", e),
    };

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        match entry.file_type() {
            Ok(t) if t.is_dir() => dirs.push(format!("{}/", name)),
            _ => files.push(name),
        }
    }
    dirs.sort();
    files.sort();

    let total = dirs.len() + files.len();
    let mut lines: Vec<String> = dirs.into_iter().chain(files).take(MAX_ENTRIES).collect();
    if total > MAX_ENTRIES {
        lines.push(format!("... ({} more entries)", total - MAX_ENTRIES));
    }
    let output = if lines.is_empty() {
        "(empty directory)".to_string()
    } else {
        lines.join("\n")
    };

    ToolResult::success(LIST_DIRECTORY, output).with_metadata(ToolResultMetadata {
        path: Some(path_str.to_string()),
        match_count: Some(total),
        ..Default::default()
    })
}

pub fn execute_write_file(call: &ToolCall, base: &Path) -> ToolResult {
    let path_str = match call.require_string("path") {
        Ok(p) => p,
        Err(e) => return ToolResult::failure(WRITE_FILE, ToolError::invalid_argument(e)),
    };
    let content = match call.require_string("content") {
        Ok(c) => c,
        Err(e) => return ToolResult::failure(WRITE_FILE, ToolError::invalid_argument(e)),
    };
    let path = resolve_path(base, path_str);

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        if !call.get_bool("create_dirs").unwrap_or(false) {
            return ToolResult::failure(
                WRITE_FILE,
                ToolError::new(
                    ToolErrorKind::NotFound,
                    format!("Parent directory does not exist: {}", parent.display()),
                ),
            );
        }
        if let Err(e) = fs::create_dir_all(parent) {
            return io_failure(WRITE_FILE, path_str, "create parent of", e);
        }
    }

    if let Err(e) = fs::write(&path, content) {
        return io_failure(WRITE_FILE, path_str, "write", e);
    }

    let bytes = content.len();
    ToolResult::success(
        WRITE_FILE,
        format!("Wrote {} bytes to {}", bytes, path_str),
    )
    .with_metadata(file_metadata(path_str, bytes))
}

pub fn execute_edit_file(call: &ToolCall, base: &Path) -> ToolResult {
    let (path_str, old_text, new_text) = match (
        call.require_string("path"),
        call.require_string("old_text"),
        call.require_string("new_text"),
    ) {
        (Ok(p), Ok(o), Ok(n)) => (p, o, n),
        (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
            return ToolResult::failure(EDIT_FILE, ToolError::invalid_argument(e));
        }
    };
    if old_text.is_empty() {
        return ToolResult::failure(
            EDIT_FILE,
            ToolError::invalid_argument("old_text must not be empty"),
        );
    }
    let path = resolve_path(base, path_str);

    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => return io_failure(EDIT_FILE, path_str, "read", e),
    };

    let occurrences = content.matches(old_text).count();
    let replace_all = call.get_bool("replace_all").unwrap_or(false);
    match occurrences {
        0 => {
            return ToolResult::failure(
                EDIT_FILE,
                ToolError::invalid_argument(format!("old_text not found in {}", path_str)),
            );
        }
        n if n > 1 && !replace_all => {
            return ToolResult::failure(
                EDIT_FILE,
                ToolError::invalid_argument(format!(
                    "old_text occurs {} times in {}; add context or set replace_all",
                    n, path_str
                )),
            );
        }
        _ => {}
    }

    let updated = if replace_all {
        content.replace(old_text, new_text)
    } else {
        content.replacen(old_text, new_text, 1)
    };
    if let Err(e) = fs::write(&path, &updated) {
        return io_failure(EDIT_FILE, path_str, "write", e);
    }

    ToolResult::success(
        EDIT_FILE,
        format!("Replaced {} occurrence(s) in {}", occurrences, path_str),
    )
    .with_metadata(file_metadata(path_str, updated.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_file_relative_to_base() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "Hello, World!\n").unwrap();

        let call = ToolCall::new(READ_FILE).with_arg("path", "notes.txt");
        let result = execute_read_file(&call, dir.path());

        assert!(result.is_success());
        assert!(result.output().unwrap().contains("Hello, World!"));
        assert_eq!(result.metadata.path.as_deref(), Some("notes.txt"));
    }

    #[test]
    fn test_read_file_not_found() {
        let dir = tempdir().unwrap();
        let call = ToolCall::new(READ_FILE).with_arg("path", "missing.txt");
        let result = execute_read_file(&call, dir.path());

        assert!(!result.is_success());
        assert_eq!(result.error_kind(), Some(ToolErrorKind::NotFound));
    }

    #[test]
    fn test_read_file_with_offset_and_limit() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("lines.txt"), "line1\nline2\nline3\nline4\nline5\n").unwrap();

        let call = ToolCall::new(READ_FILE)
            .with_arg("path", "lines.txt")
            .with_arg("offset", 1i64)
            .with_arg("limit", 2i64);
        let result = execute_read_file(&call, dir.path());

        assert_eq!(result.output(), Some("line2\nline3"));
    }

    #[test]
    fn test_read_directory_is_invalid() {
        let dir = tempdir().unwrap();
        let call = ToolCall::new(READ_FILE).with_arg("path", ".");
        let result = execute_read_file(&call, dir.path());

        assert_eq!(result.error_kind(), Some(ToolErrorKind::InvalidArgument));
    }

    #[test]
    fn test_list_directory_dirs_first() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("Cargo.toml"), "").unwrap();
        fs::write(dir.path().join("README.md"), "").unwrap();

        let call = ToolCall::new(LIST_DIRECTORY);
        let result = execute_list_directory(&call, dir.path());

        assert_eq!(result.output(), Some("src/\nCargo.toml\nREADME.md"));
        assert_eq!(result.metadata.match_count, Some(3));
    }

    #[test]
    fn test_list_empty_directory() {
        let dir = tempdir().unwrap();
        let result = execute_list_directory(&ToolCall::new(LIST_DIRECTORY), dir.path());
        assert_eq!(result.output(), Some("(empty directory)"));
    }

    #[test]
    fn test_write_file_success() {
        let dir = tempdir().unwrap();
        let call = ToolCall::new(WRITE_FILE)
            .with_arg("path", "out.txt")
            .with_arg("content", "Hello");
        let result = execute_write_file(&call, dir.path());

        assert!(result.is_success());
        assert_eq!(fs::read_to_string(dir.path().join("out.txt")).unwrap(), "Hello");
    }

    #[test]
    fn test_write_file_parent_handling() {
        let dir = tempdir().unwrap();
        let call = ToolCall::new(WRITE_FILE)
            .with_arg("path", "sub/out.txt")
            .with_arg("content", "x");
        let result = execute_write_file(&call, dir.path());
        assert_eq!(result.error_kind(), Some(ToolErrorKind::NotFound));

        let call = call.with_arg("create_dirs", true);
        let result = execute_write_file(&call, dir.path());
        assert!(result.is_success());
        assert!(dir.path().join("sub/out.txt").exists());
    }

    #[test]
    fn test_edit_file_single_occurrence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("main.rs");
        fs::write(&path, "fn main() {\n    old();\n}\n").unwrap();

        let call = ToolCall::new(EDIT_FILE)
            .with_arg("path", "main.rs")
            .with_arg("old_text", "old();")
            .with_arg("new_text", "new();");
        let result = execute_edit_file(&call, dir.path());

        assert!(result.is_success());
        assert_eq!(fs::read_to_string(&path).unwrap(), "fn main() {\n    new();\n}\n");
    }

    #[test]
    fn test_edit_file_ambiguous_or_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "x x").unwrap();

        let ambiguous = ToolCall::new(EDIT_FILE)
            .with_arg("path", "a.txt")
            .with_arg("old_text", "x")
            .with_arg("new_text", "y");
        let result = execute_edit_file(&ambiguous, dir.path());
        assert_eq!(result.error_kind(), Some(ToolErrorKind::InvalidArgument));
        assert_eq!(fs::read_to_string(&path).unwrap(), "x x");

        let all = ambiguous.with_arg("replace_all", true);
        assert!(execute_edit_file(&all, dir.path()).is_success());
        assert_eq!(fs::read_to_string(&path).unwrap(), "y y");

        let missing = ToolCall::new(EDIT_FILE)
            .with_arg("path", "a.txt")
            .with_arg("old_text", "zzz")
            .with_arg("new_text", "y");
        assert!(!execute_edit_file(&missing, dir.path()).is_success());
    }
}
