//! Model-boundary types for Sextant.
//!
//! The tool layer talks to language models through a narrow interface: it
//! hands the model a list of [`ToolDefinition`](llm::ToolDefinition)s, receives
//! [`ToolCall`](llm::ToolCall)s back, and answers each call with a
//! [`ToolResult`](llm::ToolResult). Provider clients live elsewhere and only
//! depend on this crate.
//!
//! # Example
//!
//! ```
//! use sextant_models::llm::{ToolCall, ToolResult};
//!
//! let call = ToolCall::new("call_1", "get_weather", serde_json::json!({"city": "Oslo"}));
//! let result = ToolResult::success(&call, "sunny");
//! assert_eq!(result.tool_name, "get_weather");
//! ```

pub mod llm;
