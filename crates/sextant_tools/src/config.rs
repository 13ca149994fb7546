//! Registry-wide settings.

use serde::{Deserialize, Serialize};

/// Retry budget applied to tools that do not set their own.
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Settings shared by every tool in a [`ToolRegistry`](crate::ToolRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Retry budget for tools without an explicit one.
    pub default_max_retries: u32,
    /// Name reserved for the agent's final-result tool.
    pub result_tool_name: Option<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            default_max_retries: DEFAULT_MAX_RETRIES,
            result_tool_name: None,
        }
    }
}

impl ToolsConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default retry budget.
    #[must_use]
    pub fn with_default_max_retries(mut self, max_retries: u32) -> Self {
        self.default_max_retries = max_retries;
        self
    }

    /// Reserves `name` for the final-result tool.
    #[must_use]
    pub fn with_result_tool_name(mut self, name: impl Into<String>) -> Self {
        self.result_tool_name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config: ToolsConfig = serde_json::from_str(r#"{"result_tool_name": "final_result"}"#).unwrap();
        assert_eq!(config.default_max_retries, 1);
        assert_eq!(config.result_tool_name.as_deref(), Some("final_result"));
    }
}
