//! Tool-calling types exchanged with an LLM.

mod types;

pub use types::{ToolCall, ToolDefinition, ToolResult, ToolResultStatus};
