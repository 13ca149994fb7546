//! Executing model tool calls against a frozen registry.
//!
//! Each run owns a [`RunState`]: its dependencies, identifier, retry ledger
//! and cancellation token. The [`ToolExecutor`] is shared and immutable, so
//! one executor serves any number of concurrent runs.

use crate::context::{RunContext, RunId};
use crate::error::ToolError;
use crate::registry::ToolRegistry;
use crate::retry::{RetryFeedback, RetryLedger};
use crate::tool::Tool;
use futures::future::join_all;
use sextant_models::llm::{ToolCall, ToolDefinition, ToolResult};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// State owned by a single agent run.
#[derive(Debug)]
pub struct RunState<D> {
    run_id: RunId,
    deps: Arc<D>,
    retries: RetryLedger,
    cancellation: CancellationToken,
}

impl<D> RunState<D> {
    /// Starts a run with fresh identifier and counters.
    pub fn new(deps: D) -> Self {
        Self::from_shared(Arc::new(deps))
    }

    /// Starts a run sharing dependencies with other runs.
    pub fn from_shared(deps: Arc<D>) -> Self {
        Self {
            run_id: RunId::generate(),
            deps,
            retries: RetryLedger::new(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Replaces the generated run identifier.
    #[must_use]
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = run_id;
        self
    }

    /// This run's identifier.
    #[must_use]
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// The run's dependencies.
    #[must_use]
    pub fn deps(&self) -> &D {
        &self.deps
    }

    /// Failure counts recorded so far.
    #[must_use]
    pub fn retries(&self) -> &RetryLedger {
        &self.retries
    }

    /// A token that cancels this run when triggered.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Cancels every in-flight call of this run.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Returns `true` once the run has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// What happened to one tool call.
#[derive(Debug)]
pub enum CallOutcome {
    /// The tool returned; the result carries its serialized output.
    Success(ToolResult),
    /// The call failed within budget; the result carries feedback for the model.
    Retry(ToolResult),
    /// The run cannot continue.
    Fatal(ToolError),
}

impl CallOutcome {
    /// Returns `true` for [`CallOutcome::Fatal`].
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    /// The message to send back to the model, or the fatal error.
    pub fn into_result(self) -> Result<ToolResult, ToolError> {
        match self {
            Self::Success(result) | Self::Retry(result) => Ok(result),
            Self::Fatal(err) => Err(err),
        }
    }
}

enum Attempt<'a, D> {
    Done(String),
    Retry(&'a Tool<D>, RetryFeedback),
    Fatal(ToolError),
}

/// Runs tool calls for any number of runs.
pub struct ToolExecutor<D> {
    registry: Arc<ToolRegistry<D>>,
}

impl<D> Clone for ToolExecutor<D> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<D> core::fmt::Debug for ToolExecutor<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ToolExecutor")
            .field("registry", &self.registry)
            .finish()
    }
}

impl<D: Send + Sync + 'static> ToolExecutor<D> {
    /// Freezes `registry`; no tools can be added afterwards.
    #[must_use]
    pub fn new(registry: ToolRegistry<D>) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// The frozen registry.
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry<D> {
        &self.registry
    }

    /// Definitions of every registered tool, in registration order.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    /// Executes one call and updates the run's retry ledger.
    pub async fn execute(&self, run: &mut RunState<D>, call: &ToolCall) -> CallOutcome {
        let attempt = self.attempt(run, call).await;
        self.settle(run, call, attempt)
    }

    /// Executes several calls from one model response concurrently.
    ///
    /// Outcomes are returned in call order. Retry counts are updated in that
    /// order once every call has finished.
    pub async fn execute_all(&self, run: &mut RunState<D>, calls: &[ToolCall]) -> Vec<CallOutcome> {
        let shared: &RunState<D> = run;
        let attempts = join_all(calls.iter().map(|call| self.attempt(shared, call))).await;

        calls
            .iter()
            .zip(attempts)
            .map(|(call, attempt)| self.settle(run, call, attempt))
            .collect()
    }

    async fn attempt<'a>(&'a self, run: &RunState<D>, call: &ToolCall) -> Attempt<'a, D> {
        let span = tracing::info_span!(
            "tool_call",
            tool = %call.name,
            call_id = %call.id,
            run_id = %run.run_id,
        );
        self.attempt_inner(run, call).instrument(span).await
    }

    async fn attempt_inner<'a>(&'a self, run: &RunState<D>, call: &ToolCall) -> Attempt<'a, D> {
        let Some(tool) = self.registry.get(&call.name) else {
            return Attempt::Fatal(ToolError::UnknownTool {
                name: call.name.clone(),
                available: self.registry.names().join(", "),
            });
        };

        let args = match tool.validate(&call.arguments) {
            Ok(args) => args,
            Err(issues) => {
                tracing::debug!(issues = issues.len(), "arguments failed validation");
                return Attempt::Retry(tool, RetryFeedback::Issues(issues));
            }
        };

        let ctx = RunContext::new(
            Arc::clone(&run.deps),
            run.run_id.clone(),
            tool.name(),
            run.retries.get(tool.name()),
        );

        let result = tokio::select! {
            biased;
            () = run.cancellation.cancelled() => {
                return Attempt::Fatal(ToolError::Cancelled(tool.name().to_string()));
            }
            result = tool.call(&ctx, args) => result,
        };

        match result {
            Ok(output) => match output.serialize() {
                Ok(content) => Attempt::Done(content),
                Err(err) => Attempt::Fatal(err.into()),
            },
            Err(err) if err.is_retryable() => Attempt::Retry(tool, RetryFeedback::Message(err.to_string())),
            Err(err) => Attempt::Fatal(err),
        }
    }

    fn settle(&self, run: &mut RunState<D>, call: &ToolCall, attempt: Attempt<'_, D>) -> CallOutcome {
        match attempt {
            Attempt::Done(content) => {
                run.retries.reset(&call.name);
                tracing::debug!(tool = %call.name, call_id = %call.id, "tool call succeeded");
                CallOutcome::Success(ToolResult::success(call, content))
            }
            Attempt::Retry(tool, feedback) => match tool.on_failure(&mut run.retries, feedback) {
                Ok(feedback) => {
                    tracing::warn!(
                        tool = %call.name,
                        call_id = %call.id,
                        retry = run.retries.get(&call.name),
                        max_retries = tool.max_retries(),
                        "tool call failed, asking model to retry"
                    );
                    CallOutcome::Retry(ToolResult::error(call, feedback.model_response()))
                }
                Err(err) => {
                    tracing::error!(tool = %call.name, call_id = %call.id, error = %err, "tool retries exhausted");
                    CallOutcome::Fatal(err)
                }
            },
            Attempt::Fatal(err) => {
                tracing::error!(tool = %call.name, call_id = %call.id, error = %err, "tool call failed");
                CallOutcome::Fatal(err)
            }
        }
    }
}
