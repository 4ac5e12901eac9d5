//! Builder for tool argument schemas.

use serde_json::Value;

use atlas_core::tools::{ToolDefinition, ToolParameterSchema};

/// Fluent builder for [`ToolDefinition`]s.
///
/// Keeps `definition()` implementations free of `Map::new()` + `insert`
/// boilerplate:
///
/// ```ignore
/// ToolSchemaBuilder::new("search_flights", "Search for flights")
///     .required("origin", json!({"type": "string"}))
///     .optional("limit", json!({"type": "integer"}))
///     .build()
/// ```
pub struct ToolSchemaBuilder {
    name: String,
    description: String,
    properties: serde_json::Map<String, Value>,
    required: Vec<String>,
}

impl ToolSchemaBuilder {
    /// Start a schema for the named tool.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            properties: serde_json::Map::new(),
            required: Vec::new(),
        }
    }

    /// Declare a required argument.
    #[must_use]
    pub fn required(mut self, name: &str, schema: Value) -> Self {
        let _ = self.properties.insert(name.into(), schema);
        self.required.push(name.into());
        self
    }

    /// Declare an optional argument.
    #[must_use]
    pub fn optional(mut self, name: &str, schema: Value) -> Self {
        let _ = self.properties.insert(name.into(), schema);
        self
    }

    /// Finish the definition.
    #[must_use]
    pub fn build(self) -> ToolDefinition {
        ToolDefinition {
            name: self.name,
            description: self.description,
            parameters: ToolParameterSchema {
                schema_type: "object".into(),
                properties: if self.properties.is_empty() {
                    None
                } else {
                    Some(self.properties)
                },
                required: if self.required.is_empty() {
                    None
                } else {
                    Some(self.required)
                },
            },
        }
    }
}
