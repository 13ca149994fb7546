//! Tool calling for Sextant agents.
//!
//! Tools are plain Rust functions. Their parameters and documentation become a
//! JSON schema advertised to the model; the model's arguments are validated
//! against it, the function runs, and its return value is serialized back.
//! Failed calls are reported to the model as retry prompts until the tool's
//! retry budget runs out.
//!
//! # Quick Start
//!
//! ```ignore
//! use sextant_tools::{tool, RunContext, RunState, Tool, ToolError, ToolExecutor, ToolRegistry};
//!
//! #[tool]
//! /// Search for documents matching a query.
//! ///
//! /// Args:
//! ///     query: The search query.
//! async fn search(
//!     ctx: &RunContext<Index>,
//!     query: String,
//!     /// Max results to return.
//!     #[default(10)]
//!     limit: usize,
//! ) -> Result<Vec<String>, ToolError> {
//!     ctx.deps().search(&query, limit).await
//! }
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(Tool::new(search())?)?;
//! let executor = ToolExecutor::new(registry);
//!
//! let mut run = RunState::new(index);
//! for call in response.tool_calls {
//!     let result = executor.execute(&mut run, &call).await.into_result()?;
//! }
//! ```
//!
//! # Architecture
//!
//! - [`FunctionSignature`] / [`analyze`]: parameter description and context rules
//! - [`parse_docstring`]: Google, Sphinx and NumPy documentation
//! - [`build_schema`]: JSON schema derivation
//! - [`Tool`]: function, schema and retry budget
//! - [`ToolRegistry`]: name-conflict checks at assembly time
//! - [`ToolExecutor`] / [`RunState`]: validation, invocation, retries

// Self-reference so `#[tool]`-generated code can use `sextant_tools::` paths within this crate.
extern crate self as sextant_tools;

pub mod config;
pub mod context;
pub mod docstring;
pub mod error;
pub mod executor;
pub mod output;
pub mod param;
pub mod registry;
pub mod retry;
pub mod schema;
pub mod signature;
pub mod tool;

// Re-export core types at crate root.
pub use config::{DEFAULT_MAX_RETRIES, ToolsConfig};
pub use context::{RunContext, RunId};
pub use docstring::{DocstringStyle, ParsedDocstring, parse_docstring};
pub use error::{ConfigError, SerializationError, ToolError};
pub use executor::{CallOutcome, RunState, ToolExecutor};
pub use output::ToolOutput;
pub use param::{CallArgs, FunctionParam, Kwargs, ValidationIssue, validate_arguments};
pub use registry::ToolRegistry;
pub use retry::{RetryFeedback, RetryLedger};
pub use schema::{JsonSchemaType, StructuredSchema, TypeRef, TypeSchemaProvider, build_schema};
pub use signature::{
    AnalyzedSignature, FunctionSignature, ParamDescriptor, ParamKind, ParamSpec, ParamTag, analyze,
};
pub use tool::{FnTool, Tool, ToolFunction, ToolFuture, run_blocking};

// Re-export proc macros.
pub use tool_macros::tool;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
