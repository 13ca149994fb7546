//! Tool functions and the [`Tool`] wrapper built around them.
//!
//! A [`ToolFunction`] is the callable part: its signature plus an async
//! `call`. The `#[tool]` macro generates one for every annotated function;
//! [`FnTool`] builds one from a closure. [`Tool`] analyzes the signature once,
//! derives the schema, and carries the per-tool settings.

use crate::config::DEFAULT_MAX_RETRIES;
use crate::context::RunContext;
use crate::docstring::{ParsedDocstring, parse_docstring};
use crate::error::{ConfigError, ToolError};
use crate::output::ToolOutput;
use crate::param::{CallArgs, ValidationIssue, validate_arguments};
use crate::retry::{RetryFeedback, RetryLedger};
use crate::schema::{StructuredSchema, build_schema};
use crate::signature::{AnalyzedSignature, FunctionSignature, analyze};
use sextant_models::llm::ToolDefinition;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Future returned by [`ToolFunction::call`].
pub type ToolFuture<'a> = Pin<Box<dyn Future<Output = Result<ToolOutput, ToolError>> + Send + 'a>>;

/// A function the model can call.
///
/// `D` is the type of the run's dependencies. Functions that ignore the
/// context implement this for every `D`.
pub trait ToolFunction<D>: Send + Sync + 'static {
    /// Describes the function's name, documentation and parameters.
    fn signature(&self) -> FunctionSignature;

    /// Invokes the function with validated arguments.
    fn call<'a>(&'a self, ctx: &'a RunContext<D>, args: CallArgs) -> ToolFuture<'a>;
}

/// A [`ToolFunction`] backed by a synchronous closure.
///
/// The closure runs inline on the executor's task, so it should not block.
pub struct FnTool<F> {
    signature: FunctionSignature,
    func: F,
}

impl<F> FnTool<F> {
    /// Pairs a hand-written signature with the closure implementing it.
    pub fn new(signature: FunctionSignature, func: F) -> Self {
        Self { signature, func }
    }
}

impl<D, F> ToolFunction<D> for FnTool<F>
where
    D: 'static,
    F: Fn(&RunContext<D>, &CallArgs) -> Result<ToolOutput, ToolError> + Send + Sync + 'static,
{
    fn signature(&self) -> FunctionSignature {
        self.signature.clone()
    }

    fn call<'a>(&'a self, ctx: &'a RunContext<D>, args: CallArgs) -> ToolFuture<'a> {
        let result = (self.func)(ctx, &args);
        Box::pin(async move { result })
    }
}

/// Runs a blocking tool body on tokio's blocking pool.
#[doc(hidden)]
pub async fn run_blocking<F, T>(f: F) -> Result<T, ToolError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| ToolError::execution_error(format!("blocking tool task failed: {err}")))
}

/// A registered tool: function, derived schema and settings.
pub struct Tool<D> {
    name: String,
    function: Arc<dyn ToolFunction<D>>,
    signature: AnalyzedSignature,
    schema: StructuredSchema,
    max_retries: Option<u32>,
}

impl<D> Clone for Tool<D> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            function: Arc::clone(&self.function),
            signature: self.signature.clone(),
            schema: self.schema.clone(),
            max_retries: self.max_retries,
        }
    }
}

impl<D> core::fmt::Debug for Tool<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("takes_context", &self.signature.takes_context)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl<D: 'static> Tool<D> {
    /// Builds a tool, inferring from the first parameter whether it takes context.
    pub fn new(function: impl ToolFunction<D>) -> Result<Self, ConfigError> {
        Self::build(function, None)
    }

    /// Builds a tool whose first parameter must be the run context.
    pub fn with_context(function: impl ToolFunction<D>) -> Result<Self, ConfigError> {
        Self::build(function, Some(true))
    }

    /// Builds a tool that must not take the run context.
    pub fn plain(function: impl ToolFunction<D>) -> Result<Self, ConfigError> {
        Self::build(function, Some(false))
    }

    fn build(function: impl ToolFunction<D>, takes_context: Option<bool>) -> Result<Self, ConfigError> {
        let declared = function.signature();
        let signature = analyze(&declared, takes_context)?;
        let docs = declared
            .doc
            .as_deref()
            .map_or_else(ParsedDocstring::empty, parse_docstring);
        let schema = build_schema(&signature, &docs);

        tracing::debug!(
            tool = %declared.name,
            takes_context = signature.takes_context,
            docstring = ?docs.style,
            "derived tool schema"
        );

        Ok(Self {
            name: declared.name,
            function: Arc::new(function),
            signature,
            schema,
            max_retries: None,
        })
    }

    /// Overrides the name the model sees.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets this tool's retry budget.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// The name the model calls this tool by.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Function-level description from the documentation.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.schema.description()
    }

    /// Whether the function receives the run context.
    #[must_use]
    pub fn takes_context(&self) -> bool {
        self.signature.takes_context
    }

    /// The analyzed signature.
    #[must_use]
    pub fn signature(&self) -> &AnalyzedSignature {
        &self.signature
    }

    /// The derived input schema.
    #[must_use]
    pub fn schema(&self) -> &StructuredSchema {
        &self.schema
    }

    /// Retry budget, falling back to the default.
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
    }

    pub(crate) fn explicit_max_retries(&self) -> Option<u32> {
        self.max_retries
    }

    /// The definition advertised to the model.
    #[must_use]
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description().map(str::to_string),
            parameters: self.schema.to_value(),
        }
    }

    /// Validates the model's raw arguments.
    pub fn validate(&self, raw: &Value) -> Result<CallArgs, Vec<ValidationIssue>> {
        validate_arguments(&self.signature, &self.schema, raw)
    }

    /// Invokes the underlying function.
    pub fn call<'a>(&'a self, ctx: &'a RunContext<D>, args: CallArgs) -> ToolFuture<'a> {
        self.function.call(ctx, args)
    }

    /// Records a failed call in `ledger`.
    ///
    /// Returns the feedback to send back while the budget lasts, and
    /// [`ToolError::RetriesExhausted`] once the failure count exceeds it.
    pub fn on_failure(
        &self,
        ledger: &mut RetryLedger,
        feedback: RetryFeedback,
    ) -> Result<RetryFeedback, ToolError> {
        let count = ledger.record_failure(&self.name);
        if count > self.max_retries() {
            return Err(ToolError::RetriesExhausted {
                tool_name: self.name.clone(),
                max_retries: self.max_retries(),
                last_error: feedback.model_response(),
            });
        }
        Ok(feedback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::ParamSpec;
    use serde_json::json;

    fn doubler() -> FnTool<impl Fn(&RunContext<()>, &CallArgs) -> Result<ToolOutput, ToolError>> {
        let signature = FunctionSignature::new("double")
            .with_doc("Double a number.\n\nArgs:\n    x: The number.")
            .param(ParamSpec::of::<i64>("x"));
        FnTool::new(signature, |_ctx: &RunContext<()>, args: &CallArgs| -> Result<ToolOutput, ToolError> {
            let x: i64 = args.get("x")?;
            Ok(ToolOutput::structured(&(x * 2))?)
        })
    }

    #[test]
    fn definition_carries_name_description_and_schema() {
        let tool = Tool::new(doubler()).unwrap().with_name("twice");
        let definition = tool.definition();
        assert_eq!(definition.name, "twice");
        assert_eq!(definition.description.as_deref(), Some("Double a number."));
        assert_eq!(definition.parameters["properties"]["x"]["description"], "The number.");
        assert_eq!(tool.max_retries(), 1);
        assert!(!tool.takes_context());
    }

    #[test]
    fn declared_context_is_checked() {
        let err = Tool::with_context(doubler()).unwrap_err();
        assert!(matches!(err, ConfigError::Signature { .. }));
    }

    #[test]
    fn failures_exhaust_budget() {
        let tool = Tool::new(doubler()).unwrap().with_max_retries(2);
        let mut ledger = RetryLedger::new();
        let feedback = || RetryFeedback::Message("again".into());

        assert!(tool.on_failure(&mut ledger, feedback()).is_ok());
        assert!(tool.on_failure(&mut ledger, feedback()).is_ok());
        let err = tool.on_failure(&mut ledger, feedback()).unwrap_err();
        assert_eq!(err.to_string(), "Tool exceeded max retries count of 2");
    }

    #[tokio::test]
    async fn closure_tools_run() {
        let tool = Tool::new(doubler()).unwrap();
        let ctx = RunContext::new(Arc::new(()), "run".into(), "double", 0);
        let args = tool.validate(&json!({"x": 21})).unwrap();
        let output = tool.call(&ctx, args).await.unwrap();
        assert_eq!(output.serialize().unwrap(), "42");
    }
}
