//! Search tools: glob_search, grep_search

use super::resolve_path;
use glob::{MatchOptions, Pattern};
use hydra_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolKind, ToolParameter},
    value_objects::{ToolError, ToolResult, ToolResultMetadata},
};
use regex::RegexBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const GLOB_SEARCH: &str = "glob_search";
pub const GREP_SEARCH: &str = "grep_search";

/// Maximum number of results to return
const MAX_RESULTS: usize = 1000;

/// Maximum file size for grep (5 MB)
const MAX_GREP_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Directories never worth searching
const SKIPPED_DIRS: &[&str] = &[".git", "target", "node_modules"];

pub fn glob_search_definition() -> ToolDefinition {
    ToolDefinition::new(
        GLOB_SEARCH,
        "Find files matching a glob pattern (e.g. '**/*.rs', 'src/*.toml')",
        ToolKind::Search,
    )
    .with_parameter(
        ToolParameter::new("pattern", "Glob pattern to match files", true).with_type("string"),
    )
    .with_parameter(
        ToolParameter::new("base_dir", "Directory to search from (default: working directory)", false)
            .with_type("path"),
    )
    .with_parameter(
        ToolParameter::new("max_results", "Maximum number of results (default: 1000)", false)
            .with_type("number"),
    )
}

pub fn grep_search_definition() -> ToolDefinition {
    ToolDefinition::new(
        GREP_SEARCH,
        "Search file contents with a regular expression",
        ToolKind::Search,
    )
    .with_parameter(
        ToolParameter::new("pattern", "Regex pattern to search for", true).with_type("string"),
    )
    .with_parameter(
        ToolParameter::new("path", "File or directory to search (default: working directory)", false)
            .with_type("path"),
    )
    .with_parameter(
        ToolParameter::new("file_pattern", "Glob filter on file names (e.g. '*.rs')", false)
            .with_type("string"),
    )
    .with_parameter(
        ToolParameter::new("context_lines", "Lines of context before and after each match", false)
            .with_type("number"),
    )
    .with_parameter(
        ToolParameter::new("case_insensitive", "Case-insensitive matching", false)
            .with_type("boolean"),
    )
}

/// Display a path relative to the search root when possible.
fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

pub fn execute_glob_search(call: &ToolCall, base: &Path) -> ToolResult {
    let start = Instant::now();

    let pattern = match call.require_string("pattern") {
        Ok(p) => p,
        Err(e) => return ToolResult::failure(GLOB_SEARCH, ToolError::invalid_argument(e)),
    };
    let root = resolve_path(base, call.get_string("base_dir").unwrap_or("."));
    let max_results = call
        .get_i64("max_results")
        .map(|n| n.max(1) as usize)
        .unwrap_or(MAX_RESULTS)
        .min(MAX_RESULTS);

    let full_pattern = if Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        format!("{}/{}", root.display(), pattern)
    };
    let entries = match glob::glob(&full_pattern) {
        Ok(paths) => paths,
        Err(e) => {
            return ToolResult::failure(
                GLOB_SEARCH,
                ToolError::invalid_argument(format!("Invalid glob pattern: {}", e)),
            );
        }
    };

    let mut results = Vec::new();
    let mut truncated = false;
    for path in entries.flatten() {
        if results.len() >= max_results {
            truncated = true;
            break;
        }
        results.push(display_relative(&path, &root));
    }

    let match_count = results.len();
    let output = if results.is_empty() {
        "No files found matching the pattern".to_string()
    } else {
        let mut output = results.join("\n");
        if truncated {
            output.push_str(&format!("\n... (limited to {} results)", max_results));
        }
        output
    };

    ToolResult::success(GLOB_SEARCH, output).with_metadata(ToolResultMetadata {
        duration_ms: Some(start.elapsed().as_millis() as u64),
        match_count: Some(match_count),
        ..Default::default()
    })
}

pub fn execute_grep_search(call: &ToolCall, base: &Path) -> ToolResult {
    let start = Instant::now();

    let pattern = match call.require_string("pattern") {
        Ok(p) => p,
        Err(e) => return ToolResult::failure(GREP_SEARCH, ToolError::invalid_argument(e)),
    };
    let path_str = call.get_string("path").unwrap_or(".");
    let root = resolve_path(base, path_str);
    if !root.exists() {
        return ToolResult::failure(GREP_SEARCH, ToolError::not_found(path_str));
    }

    let regex = match RegexBuilder::new(pattern)
        .case_insensitive(call.get_bool("case_insensitive").unwrap_or(false))
        .build()
    {
        Ok(r) => r,
        Err(e) => {
            return ToolResult::failure(
                GREP_SEARCH,
                ToolError::invalid_argument(format!("Invalid regex pattern: {}", e)),
            );
        }
    };
    let file_filter = match call.get_string("file_pattern").map(Pattern::new).transpose() {
        Ok(filter) => filter,
        Err(e) => {
            return ToolResult::failure(
                GREP_SEARCH,
                ToolError::invalid_argument(format!("Invalid file pattern: {}", e)),
            );
        }
    };
    let context_lines = call.get_i64("context_lines").unwrap_or(0).max(0) as usize;

    let (files, display_root) = if root.is_file() {
        let parent = root.parent().map(Path::to_path_buf).unwrap_or_default();
        (vec![root.clone()], parent)
    } else {
        let mut files = Vec::new();
        collect_files(&root, file_filter.as_ref(), &mut files);
        files.sort();
        (files, root.clone())
    };

    let mut results = Vec::new();
    let mut total_matches = 0;
    'files: for file in &files {
        if fs::metadata(file).is_ok_and(|m| m.len() > MAX_GREP_FILE_SIZE) {
            continue;
        }
        let Ok(content) = fs::read_to_string(file) else {
            continue;
        };
        let lines: Vec<&str> = content.lines().collect();
        let shown = display_relative(file, &display_root);

        for (idx, line) in lines.iter().enumerate() {
            if !regex.is_match(line) {
                continue;
            }
            if total_matches >= MAX_RESULTS {
                break 'files;
            }
            total_matches += 1;

            if context_lines == 0 {
                results.push(format!("{}:{}: {}", shown, idx + 1, line));
                continue;
            }
            let from = idx.saturating_sub(context_lines);
            let to = (idx + context_lines + 1).min(lines.len());
            let mut block = format!("{}:", shown);
            for (offset, ctx) in lines[from..to].iter().enumerate() {
                let n = from + offset;
                let marker = if n == idx { ">" } else { " " };
                block.push_str(&format!("\n{}{}: {}", marker, n + 1, ctx));
            }
            results.push(block);
        }
    }

    let output = if results.is_empty() {
        "No matches found".to_string()
    } else {
        let mut output = results.join("\n");
        if total_matches >= MAX_RESULTS {
            output.push_str(&format!("\n... (limited to {} matches)", MAX_RESULTS));
        }
        output
    };

    ToolResult::success(GREP_SEARCH, output).with_metadata(ToolResultMetadata {
        duration_ms: Some(start.elapsed().as_millis() as u64),
        match_count: Some(total_matches),
        path: Some(path_str.to_string()),
        ..Default::default()
    })
}

/// Walk `dir` recursively, skipping hidden and build directories.
fn collect_files(dir: &Path, filter: Option<&Pattern>, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let options = MatchOptions::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        match entry.file_type() {
            Ok(t) if t.is_dir() => {
                if !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_str()) {
                    collect_files(&path, filter, out);
                }
            }
            Ok(t) if t.is_file() => {
                if filter.is_none_or(|p| p.matches_with(&name, options)) {
                    out.push(path);
                }
            }
            _ => {}
        }
    }
}
