//! Name-keyed tool registry.

use std::collections::HashMap;
use std::sync::Arc;

use atlas_core::tools::ToolDefinition;

use crate::traits::ChatTool;

/// Maps tool names to executors.
///
/// The registry performs no retries and no argument validation of its
/// own; resolution is the whole job. Callers validate arguments against
/// the resolved tool's declared schema before invoking it.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ChatTool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its own name. Re-registering a name
    /// replaces the previous executor.
    pub fn register(&mut self, tool: Arc<dyn ChatTool>) {
        let _ = self.tools.insert(tool.name().to_owned(), tool);
    }

    /// Look up an executor by name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn ChatTool>> {
        self.tools.get(name).cloned()
    }

    /// Declared contracts of every registered tool, sorted by name for
    /// deterministic request building.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> =
            self.tools.values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
