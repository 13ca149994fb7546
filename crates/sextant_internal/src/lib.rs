//! # Sextant Internal Library
//!
//! Re-exports the core Sextant crates for convenience.

/// Types crossing the model boundary.
pub use sextant_models;

/// Tool definition, validation and execution.
pub use sextant_tools;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use sextant_models::llm::{ToolCall, ToolDefinition, ToolResult, ToolResultStatus};
    pub use sextant_tools::{
        CallOutcome, ConfigError, Kwargs, RunContext, RunState, Tool, ToolError, ToolExecutor,
        ToolOutput, ToolRegistry, ToolsConfig, tool,
    };
}
