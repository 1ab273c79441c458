//! Tool registry for managing available tools

use crate::tools::{Tool, ToolContext, ToolExecutor};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registry for managing tool creation and registration
pub struct ToolRegistry {
    factories: BTreeMap<String, Box<dyn ToolFactory>>,
}

/// Factory trait for creating tools
pub trait ToolFactory: Send + Sync {
    /// Create a new instance of the tool
    fn create(&self) -> Box<dyn Tool>;

    /// Get the name of the tool this factory creates
    fn tool_name(&self) -> &str;
}

impl ToolRegistry {
    /// Create an empty tool registry
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry holding every built-in market data tool
    pub fn with_builtin_tools(context: Arc<ToolContext>) -> Self {
        use crate::tools::builtin::{
            GetHistoricalDataToolFactory, GetIndicatorsToolFactory,
            GetSpecificIndicatorsToolFactory,
        };

        let mut registry = Self::new();
        registry.register_factory(Box::new(GetIndicatorsToolFactory::new(context.clone())));
        registry.register_factory(Box::new(GetSpecificIndicatorsToolFactory::new(
            context.clone(),
        )));
        registry.register_factory(Box::new(GetHistoricalDataToolFactory::new(context)));
        registry
    }

    /// Register a tool factory
    pub fn register_factory(&mut self, factory: Box<dyn ToolFactory>) {
        self.factories
            .insert(factory.tool_name().to_string(), factory);
    }

    /// Create a tool executor with all available tools
    pub fn create_executor_with_all(&self) -> ToolExecutor {
        let mut executor = ToolExecutor::new();

        for factory in self.factories.values() {
            executor.register_tool(factory.create());
        }

        executor
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Macro to help implement tool factories for tools built from a shared [`ToolContext`]
#[macro_export]
macro_rules! impl_tool_factory {
    ($factory:ident, $tool:ident, $name:expr) => {
        pub struct $factory {
            context: std::sync::Arc<$crate::tools::ToolContext>,
        }

        impl $factory {
            pub fn new(context: std::sync::Arc<$crate::tools::ToolContext>) -> Self {
                Self { context }
            }
        }

        impl $crate::tools::ToolFactory for $factory {
            fn create(&self) -> Box<dyn $crate::tools::Tool> {
                Box::new($tool::new(self.context.clone()))
            }

            fn tool_name(&self) -> &str {
                $name
            }
        }
    };
}
