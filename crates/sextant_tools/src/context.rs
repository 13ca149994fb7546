//! Run-scoped context handed to tools.
//!
//! A [`RunContext`] is built by the executor for every call. Tools that want
//! access to the run's dependencies declare it as their first parameter:
//!
//! ```ignore
//! #[tool]
//! /// Look up the current user's balance.
//! async fn balance(ctx: &RunContext<Bank>, account: String) -> Result<u64, ToolError> {
//!     ctx.deps().balance(&account).await
//! }
//! ```

use core::fmt;
use std::sync::Arc;

/// Identifier of a single agent run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunId(String);

impl RunId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(nanoid::nanoid!())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RunId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Information about the current call, injected into tools that take context.
///
/// Cloning is cheap: the dependencies are shared behind an [`Arc`].
#[derive(Debug)]
pub struct RunContext<D> {
    deps: Arc<D>,
    retry: u32,
    tool_name: String,
    run_id: RunId,
}

impl<D> Clone for RunContext<D> {
    fn clone(&self) -> Self {
        Self {
            deps: Arc::clone(&self.deps),
            retry: self.retry,
            tool_name: self.tool_name.clone(),
            run_id: self.run_id.clone(),
        }
    }
}

impl<D> RunContext<D> {
    /// Creates a context for one call of `tool_name`.
    pub fn new(deps: Arc<D>, run_id: RunId, tool_name: impl Into<String>, retry: u32) -> Self {
        Self {
            deps,
            retry,
            tool_name: tool_name.into(),
            run_id,
        }
    }

    /// The dependencies supplied when the run started.
    #[must_use]
    pub fn deps(&self) -> &D {
        &self.deps
    }

    /// How many times this tool has already failed in the current run.
    #[must_use]
    pub fn retry(&self) -> u32 {
        self.retry
    }

    /// Name of the tool being called.
    #[must_use]
    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    /// The run this call belongs to.
    #[must_use]
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }
}
