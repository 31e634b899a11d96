//! Context entities

use crate::role::RoleId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Author {
    User,
    Role(RoleId),
    /// Tool output, named after the tool.
    Tool(String),
    System,
}

impl Author {
    pub fn role(&self) -> Option<&RoleId> {
        match self {
            Author::Role(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Author::User => write!(f, "user"),
            Author::Role(id) => write!(f, "{}", id),
            Author::Tool(name) => write!(f, "tool:{}", name),
            Author::System => write!(f, "system"),
        }
    }
}

/// One entry of the conversation history.
///
/// `seq` is assigned by the store on append; messages are immutable after that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub seq: u64,
    pub author: Author,
    pub content: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
}

impl Message {
    pub fn new(author: Author, content: impl Into<String>) -> Self {
        Self {
            seq: 0,
            author,
            content: content.into(),
            timestamp: crate::core::time::current_timestamp(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Author::User, content)
    }

    pub fn from_role(role: RoleId, content: impl Into<String>) -> Self {
        Self::new(Author::Role(role), content)
    }

    pub fn tool(tool_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(Author::Tool(tool_name.into()), content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Author::System, content)
    }
}

/// A finding published to the shared ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovery {
    pub seq: u64,
    pub contributor: RoleId,
    pub payload: String,
    pub timestamp: u64,
}
