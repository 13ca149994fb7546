//! Core types for tool calls crossing the model boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─────────────────────
// Tool Calling
// ─────────────────────

/// Definition of a tool that can be called by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Name of the tool (e.g., `get_weather`, `search_database`).
    pub name: String,
    /// Human-readable description of what the tool does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema defining the tool's parameters.
    ///
    /// Usually an object schema with one property per parameter:
    /// ```json
    /// {
    ///   "description": "Look up the weather.",
    ///   "additionalProperties": false,
    ///   "properties": {
    ///     "city": {"type": "string", "description": "City name"}
    ///   },
    ///   "required": ["city"],
    ///   "type": "object"
    /// }
    /// ```
    pub parameters: Value,
}

/// A tool call request from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call.
    pub id: String,
    /// The name of the tool to call.
    pub name: String,
    /// The arguments to pass to the tool.
    ///
    /// Either a JSON object or a string containing one; providers differ.
    pub arguments: Value,
}

impl ToolCall {
    /// Creates a new tool call.
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Status of a tool result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolResultStatus {
    /// The tool executed successfully.
    #[default]
    Success,
    /// The call failed and the model is asked to try again.
    Error,
}

/// Result of a tool call, sent back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Identifier linking this result to the original tool call.
    pub id: String,
    /// Name of the tool that was called.
    pub tool_name: String,
    /// The serialized result, or the retry feedback for an error.
    pub content: String,
    /// Whether this result represents a success or error.
    #[serde(default)]
    pub status: ToolResultStatus,
}

impl ToolResult {
    /// Creates a successful result answering `call`.
    pub fn success(call: &ToolCall, content: impl Into<String>) -> Self {
        Self {
            id: call.id.clone(),
            tool_name: call.name.clone(),
            content: content.into(),
            status: ToolResultStatus::Success,
        }
    }

    /// Creates an error result answering `call`.
    pub fn error(call: &ToolCall, content: impl Into<String>) -> Self {
        Self {
            id: call.id.clone(),
            tool_name: call.name.clone(),
            content: content.into(),
            status: ToolResultStatus::Error,
        }
    }

    /// Returns `true` if this result reports an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == ToolResultStatus::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn definition_omits_missing_description() {
        let definition = ToolDefinition {
            name: "ping".into(),
            description: None,
            parameters: json!({"type": "object"}),
        };
        assert_eq!(
            serde_json::to_value(&definition).unwrap(),
            json!({"name": "ping", "parameters": {"type": "object"}})
        );
    }

    #[test]
    fn result_status_wire_format() {
        let call = ToolCall::new("c1", "ping", json!({}));
        let value = serde_json::to_value(ToolResult::error(&call, "retry")).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["id"], "c1");

        let parsed: ToolResult =
            serde_json::from_value(json!({"id": "c1", "tool_name": "ping", "content": "pong"})).unwrap();
        assert_eq!(parsed.status, ToolResultStatus::Success);
    }
}
