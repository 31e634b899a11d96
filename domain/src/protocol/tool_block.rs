//! Fenced tool requests.
//!
//! Roles request tools with a fenced block tagged `tool`:
//!
//! ````text
//! ```tool
//! {"tool": "read_file", "args": {"path": "src/main.rs"}}
//! ```
//! ````
//!
//! `name`/`arguments` are accepted as synonyms for `tool`/`args`.

use crate::tool::ToolCall;
use serde_json::Value;

/// A closed tool block whose body could not be turned into a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedToolBlock {
    pub body: String,
    pub reason: String,
}

/// Result of pulling tool blocks out of a reply.
#[derive(Debug, Clone, Default)]
pub struct ToolBlocks {
    /// The reply with every closed tool block removed.
    pub remaining: String,
    pub calls: Vec<ToolCall>,
    pub malformed: Vec<MalformedToolBlock>,
}

/// Remove closed ```` ```tool ```` blocks from `text`.
///
/// An unterminated block is left in place as ordinary text.
pub fn extract_tool_blocks(text: &str) -> ToolBlocks {
    let mut blocks = ToolBlocks::default();
    let mut kept: Vec<&str> = Vec::new();
    let lines: Vec<&str> = text.split('\n').collect();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].trim() == "```tool"
            && let Some(close) = lines[i + 1..].iter().position(|l| l.trim() == "```")
        {
            let body = lines[i + 1..i + 1 + close].join("\n");
            match parse_tool_call(&body) {
                Ok(call) => blocks.calls.push(call),
                Err(reason) => blocks.malformed.push(MalformedToolBlock {
                    body: body.trim().to_string(),
                    reason,
                }),
            }
            i += close + 2;
            continue;
        }
        kept.push(lines[i]);
        i += 1;
    }

    blocks.remaining = kept.join("\n");
    blocks
}

fn parse_tool_call(body: &str) -> Result<ToolCall, String> {
    let value: Value =
        serde_json::from_str(body.trim()).map_err(|e| format!("invalid JSON: {}", e))?;
    let object = value
        .as_object()
        .ok_or_else(|| "tool block must be a JSON object".to_string())?;

    let name = object
        .get("tool")
        .or_else(|| object.get("name"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "missing \"tool\" name".to_string())?;

    let mut call = ToolCall::new(name);
    match object.get("args").or_else(|| object.get("arguments")) {
        None | Some(Value::Null) => {}
        Some(Value::Object(args)) => {
            for (key, value) in args {
                call = call.with_arg(key.clone(), value.clone());
            }
        }
        Some(_) => return Err("\"args\" must be a JSON object".to_string()),
    }
    if let Some(reason) = object
        .get("reasoning")
        .or_else(|| object.get("reason"))
        .and_then(Value::as_str)
    {
        call = call.with_reasoning(reason);
    }
    Ok(call)
}
