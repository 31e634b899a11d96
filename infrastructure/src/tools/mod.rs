//! Local tools: file access, file management, shell commands and search.
//!
//! | Tool | Kind | Aliases |
//! |------|------|---------|
//! | `read_file` | FileRead | `cat`, `read`, `view` |
//! | `list_directory` | FileRead | `ls`, `list_dir` |
//! | `write_file` | FileWrite | `write`, `create_file` |
//! | `edit_file` | FileWrite | `edit`, `str_replace` |
//! | `delete_file` | FileWrite | `rm`, `delete` |
//! | `create_directory` | FileWrite | `mkdir` |
//! | `move_file` | FileWrite | `mv`, `rename` |
//! | `copy_file` | FileWrite | `cp` |
//! | `get_file_info` | FileRead | `stat`, `file_info` |
//! | `run_command` | Execute | `bash`, `sh`, `shell`, `exec` |
//! | `glob_search` | Search | `glob`, `find` |
//! | `grep_search` | Search | `grep`, `rg`, `search` |

pub mod command;
pub mod file;
pub mod manage;
pub mod search;

mod executor;

pub use executor::LocalToolExecutor;

use hydra_domain::tool::entities::ToolSpec;
use std::path::{Path, PathBuf};

const READ_ALIASES: &[(&str, &str)] = &[
    ("cat", file::READ_FILE),
    ("read", file::READ_FILE),
    ("view", file::READ_FILE),
    ("ls", file::LIST_DIRECTORY),
    ("list_dir", file::LIST_DIRECTORY),
    ("stat", manage::GET_FILE_INFO),
    ("file_info", manage::GET_FILE_INFO),
    ("glob", search::GLOB_SEARCH),
    ("find", search::GLOB_SEARCH),
    ("grep", search::GREP_SEARCH),
    ("rg", search::GREP_SEARCH),
    ("search", search::GREP_SEARCH),
];

const WRITE_ALIASES: &[(&str, &str)] = &[
    ("write", file::WRITE_FILE),
    ("create_file", file::WRITE_FILE),
    ("edit", file::EDIT_FILE),
    ("str_replace", file::EDIT_FILE),
    ("rm", manage::DELETE_FILE),
    ("delete", manage::DELETE_FILE),
    ("mkdir", manage::CREATE_DIRECTORY),
    ("mv", manage::MOVE_FILE),
    ("rename", manage::MOVE_FILE),
    ("cp", manage::COPY_FILE),
    ("bash", command::RUN_COMMAND),
    ("sh", command::RUN_COMMAND),
    ("shell", command::RUN_COMMAND),
    ("exec", command::RUN_COMMAND),
];

/// All built-in tools with their aliases.
pub fn default_tool_spec() -> ToolSpec {
    read_only_tool_spec()
        .register(file::write_file_definition())
        .register(file::edit_file_definition())
        .register(manage::delete_file_definition())
        .register(manage::create_directory_definition())
        .register(manage::move_file_definition())
        .register(manage::copy_file_definition())
        .register(command::run_command_definition())
        .register_aliases(WRITE_ALIASES.iter().copied())
}

/// Reads and searches only.
pub fn read_only_tool_spec() -> ToolSpec {
    ToolSpec::new()
        .register(file::read_file_definition())
        .register(file::list_directory_definition())
        .register(manage::get_file_info_definition())
        .register(search::glob_search_definition())
        .register(search::grep_search_definition())
        .register_aliases(READ_ALIASES.iter().copied())
}

/// Resolve a tool path argument against the working directory.
pub(crate) fn resolve_path(base: &Path, raw: &str) -> PathBuf {
    let raw = raw.trim();
    let path = Path::new(raw);
    if raw.is_empty() || raw == "." {
        base.to_path_buf()
    } else if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path() {
        let base = Path::new("/work");
        assert_eq!(resolve_path(base, "."), PathBuf::from("/work"));
        assert_eq!(resolve_path(base, "src/lib.rs"), PathBuf::from("/work/src/lib.rs"));
        assert_eq!(resolve_path(base, "/etc/hosts"), PathBuf::from("/etc/hosts"));
    }

    #[test]
    fn test_every_alias_targets_a_registered_tool() {
        let spec = default_tool_spec();
        for (alias, canonical) in READ_ALIASES.iter().chain(WRITE_ALIASES) {
            assert_eq!(spec.resolve(alias), Some(*canonical), "alias {alias}");
            assert!(spec.get(canonical).is_some());
        }
    }
}
