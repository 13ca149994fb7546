//! Per-run retry bookkeeping.

use crate::param::ValidationIssue;
use std::collections::HashMap;

/// Consecutive-failure counts for each tool within one run.
///
/// A count grows by one on every failed call and returns to zero on success.
#[derive(Debug, Clone, Default)]
pub struct RetryLedger {
    counts: HashMap<String, u32>,
}

impl RetryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current failure count for `tool`.
    #[must_use]
    pub fn get(&self, tool: &str) -> u32 {
        self.counts.get(tool).copied().unwrap_or(0)
    }

    /// Records a failure and returns the new count.
    pub fn record_failure(&mut self, tool: &str) -> u32 {
        let count = self.counts.entry(tool.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Resets the count for `tool` after a successful call.
    pub fn reset(&mut self, tool: &str) {
        self.counts.remove(tool);
    }

    /// Forgets every count.
    pub fn clear(&mut self) {
        self.counts.clear();
    }
}

/// Why a call failed in a way the model can correct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryFeedback {
    /// The arguments did not validate.
    Issues(Vec<ValidationIssue>),
    /// The tool itself asked for a retry.
    Message(String),
}

impl RetryFeedback {
    /// Text sent back to the model as the retry prompt.
    #[must_use]
    pub fn model_response(&self) -> String {
        let description = match self {
            Self::Message(message) => message.clone(),
            Self::Issues(issues) => {
                let json = serde_json::to_string_pretty(issues).unwrap_or_default();
                format!("{} validation errors: {json}", issues.len())
            }
        };
        format!("{description}\n\nFix the errors and try again.")
    }
}
