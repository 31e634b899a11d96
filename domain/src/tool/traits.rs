//! Pure validation of tool calls against their definitions.
//! The async `ToolExecutorPort` lives in the application layer.

use super::entities::{ToolCall, ToolDefinition, ToolParameter};
use serde_json::Value;

/// Validator for tool calls requested by a role.
pub trait ToolValidator {
    /// Check a call against its definition, describing the first problem found.
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), String>;
}

/// Checks required parameters, unknown parameters and type hints.
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator;

impl ToolValidator for DefaultToolValidator {
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), String> {
        if let Some(missing) = definition
            .parameters
            .iter()
            .find(|p| p.required && !call.arguments.contains_key(&p.name))
        {
            return Err(format!(
                "Missing required parameter '{}' for tool '{}'",
                missing.name, definition.name
            ));
        }

        let mut names: Vec<&String> = call.arguments.keys().collect();
        names.sort();
        for name in names {
            let Some(param) = definition.parameters.iter().find(|p| &p.name == name) else {
                return Err(format!(
                    "Unknown parameter '{}' for tool '{}'",
                    name, definition.name
                ));
            };
            check_type(param, &call.arguments[name])
                .map_err(|expected| {
                    format!(
                        "Parameter '{}' of tool '{}' must be a {}",
                        name, definition.name, expected
                    )
                })?;
        }

        Ok(())
    }
}

fn check_type(param: &ToolParameter, value: &Value) -> Result<(), &'static str> {
    match param.param_type.as_str() {
        "number" | "integer" if !value.is_number() => Err("number"),
        "boolean" if !value.is_boolean() => Err("boolean"),
        "string" | "path" if !value.is_string() => Err("string"),
        _ => Ok(()),
    }
}
