//! Tool registry.
//!
//! The [`ToolRegistry`] collects tools while an agent is being assembled and
//! rejects name conflicts. Once handed to a
//! [`ToolExecutor`](crate::ToolExecutor) it is frozen behind an `Arc`.
//!
//! # Usage
//!
//! ```ignore
//! use sextant_tools::{Tool, ToolRegistry, ToolsConfig, ToolExecutor};
//!
//! let mut registry = ToolRegistry::with_config(
//!     ToolsConfig::new().with_result_tool_name("final_result"),
//! );
//! registry.register(Tool::new(get_weather())?)?;
//! registry.register(Tool::new(lookup_user())?.with_max_retries(3))?;
//!
//! let executor = ToolExecutor::new(registry);
//! ```

use crate::config::ToolsConfig;
use crate::error::ConfigError;
use crate::tool::Tool;
use indexmap::IndexMap;
use sextant_models::llm::ToolDefinition;

/// Registry of available tools, keyed by name in registration order.
pub struct ToolRegistry<D> {
    tools: IndexMap<String, Tool<D>>,
    config: ToolsConfig,
}

impl<D> Default for ToolRegistry<D> {
    fn default() -> Self {
        Self {
            tools: IndexMap::new(),
            config: ToolsConfig::default(),
        }
    }
}

impl<D> core::fmt::Debug for ToolRegistry<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}

impl<D: 'static> ToolRegistry<D> {
    /// Creates an empty registry with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with the given settings.
    #[must_use]
    pub fn with_config(config: ToolsConfig) -> Self {
        Self {
            tools: IndexMap::new(),
            config,
        }
    }

    /// The registry's settings.
    #[must_use]
    pub fn config(&self) -> &ToolsConfig {
        &self.config
    }

    /// Registers a tool.
    ///
    /// Tools without their own retry budget get the configured default.
    ///
    /// # Errors
    ///
    /// [`ConfigError::DuplicateTool`] if the name is taken, checked first;
    /// [`ConfigError::ResultNameConflict`] if it equals the result tool name.
    pub fn register(&mut self, tool: Tool<D>) -> Result<(), ConfigError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(ConfigError::DuplicateTool(name));
        }
        if self.config.result_tool_name.as_deref() == Some(name.as_str()) {
            return Err(ConfigError::ResultNameConflict(name));
        }

        let tool = match tool.explicit_max_retries() {
            Some(_) => tool,
            None => tool.with_max_retries(self.config.default_max_retries),
        };
        tracing::debug!(tool = %name, max_retries = tool.max_retries(), "registered tool");
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Registers several tools, stopping at the first conflict.
    pub fn register_all(
        &mut self,
        tools: impl IntoIterator<Item = Tool<D>>,
    ) -> Result<(), ConfigError> {
        tools.into_iter().try_for_each(|tool| self.register(tool))
    }

    /// Reserves `name` for the final-result tool.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ResultNameConflict`] if a tool already uses the name.
    pub fn set_result_tool_name(&mut self, name: impl Into<String>) -> Result<(), ConfigError> {
        let name = name.into();
        if self.tools.contains_key(&name) {
            return Err(ConfigError::ResultNameConflict(name));
        }
        self.config.result_tool_name = Some(name);
        Ok(())
    }

    /// Returns tool definitions for all registered tools.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(Tool::definition).collect()
    }

    /// Returns a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Tool<D>> {
        self.tools.get(name)
    }

    /// Returns whether a tool with the given name is registered.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Returns the names of all registered tools.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RunContext;
    use crate::error::ToolError;
    use crate::output::ToolOutput;
    use crate::param::CallArgs;
    use crate::signature::FunctionSignature;
    use crate::tool::FnTool;

    fn named(name: &str) -> Tool<()> {
        let function = FnTool::new(
            FunctionSignature::new(name),
            |_: &RunContext<()>, _: &CallArgs| -> Result<ToolOutput, ToolError> { Ok("ok".into()) },
        );
        Tool::new(function).unwrap()
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(named("search")).unwrap();
        let err = registry.register(named("search")).unwrap_err();
        assert_eq!(err.to_string(), "Tool name conflicts with existing tool: 'search'");
        assert_eq!(registry.names(), ["search"]);
    }

    #[test]
    fn result_name_is_reserved_both_ways() {
        let mut registry = ToolRegistry::with_config(ToolsConfig::new().with_result_tool_name("final_result"));
        let err = registry.register(named("final_result")).unwrap_err();
        assert_eq!(err, ConfigError::ResultNameConflict("final_result".into()));

        let mut registry = ToolRegistry::new();
        registry.register(named("answer")).unwrap();
        assert!(registry.set_result_tool_name("answer").is_err());
        assert!(registry.set_result_tool_name("final_result").is_ok());
    }

    #[test]
    fn duplicate_is_checked_before_result_name() {
        let mut registry = ToolRegistry::new();
        registry.register(named("final_result")).unwrap();
        registry.config.result_tool_name = Some("final_result".into());
        let err = registry.register(named("final_result")).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateTool(_)));
    }

    #[test]
    fn default_retries_come_from_config() {
        let mut registry = ToolRegistry::with_config(ToolsConfig::new().with_default_max_retries(4));
        registry.register(named("a")).unwrap();
        registry.register(named("b").with_max_retries(0)).unwrap();
        assert_eq!(registry.get("a").unwrap().max_retries(), 4);
        assert_eq!(registry.get("b").unwrap().max_retries(), 0);
        assert_eq!(registry.definitions().len(), 2);
    }
}
