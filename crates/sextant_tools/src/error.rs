//! Error types for tool construction and execution.
//!
//! [`ConfigError`] is raised while an agent is being assembled (building a
//! [`Tool`](crate::Tool) or registering it). [`ToolError`] is raised while a
//! run is calling tools.

use thiserror::Error;

/// Errors raised while building or registering tools.
///
/// These are always fatal: an agent with an invalid tool cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The function's signature violates the context-parameter rules.
    ///
    /// Every violated rule is listed, one per line.
    #[error("Error generating schema for {function}:\n  {}", .errors.join("\n  "))]
    Signature {
        /// Name of the offending function.
        function: String,
        /// Violated rules, in parameter order.
        errors: Vec<String>,
    },

    /// A tool with this name is already registered.
    #[error("Tool name conflicts with existing tool: '{0}'")]
    DuplicateTool(String),

    /// The tool name collides with the configured result-schema tool name.
    #[error("Tool name conflicts with result schema name: '{0}'")]
    ResultNameConflict(String),
}

/// Errors raised while serializing a tool's return value.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// Binary output that is not valid UTF-8.
    #[error("{0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// A value with no known serialization strategy.
    #[error("Unable to serialize unknown type: {0}")]
    UnknownType(&'static str),

    /// A structured value that `serde_json` refused to serialize.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during tool execution.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool asked the model to try again with different arguments.
    ///
    /// Counts against the tool's retry budget like a validation failure.
    #[error("{0}")]
    ModelRetry(String),

    /// Error during parameter extraction after validation.
    #[error("Parameter error: {0}")]
    ParameterError(String),

    /// Error during tool function execution.
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// The model called a tool that is not registered.
    #[error("Unknown tool name: '{name}'. Available tools: {available}")]
    UnknownTool {
        /// The requested name.
        name: String,
        /// Comma-separated registered names.
        available: String,
    },

    /// The tool failed more often than its retry budget allows.
    #[error("Tool exceeded max retries count of {max_retries}")]
    RetriesExhausted {
        /// Name of the tool.
        tool_name: String,
        /// The exhausted budget.
        max_retries: u32,
        /// The feedback that would have been sent for the last failure.
        last_error: String,
    },

    /// The tool's return value could not be serialized.
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// The surrounding run was cancelled while the tool was running.
    #[error("Tool call '{0}' was abandoned because the run was cancelled")]
    Cancelled(String),
}

impl ToolError {
    /// Creates a [`ModelRetry`](Self::ModelRetry).
    pub fn retry(msg: impl Into<String>) -> Self {
        Self::ModelRetry(msg.into())
    }

    /// Creates a [`ParameterError`](Self::ParameterError).
    pub fn parameter_error(msg: impl Into<String>) -> Self {
        Self::ParameterError(msg.into())
    }

    /// Creates an [`ExecutionError`](Self::ExecutionError).
    pub fn execution_error(msg: impl Into<String>) -> Self {
        Self::ExecutionError(msg.into())
    }

    /// Returns `true` if the model may be asked to try again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ModelRetry(_) | Self::ParameterError(_))
    }
}
