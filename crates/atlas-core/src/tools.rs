//! Tool definition types.
//!
//! A [`ToolDefinition`] is the declared contract a tool presents to the
//! generation backend: a name, a description the model reads, and a JSON
//! Schema for its arguments. Registries validate incoming arguments
//! against this schema before a tool runs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON Schema for a tool's argument object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolParameterSchema {
    /// Always `"object"` for tool arguments.
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Per-field schemas keyed by argument name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
    /// Names of required arguments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

/// A tool's declared contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Registered tool name.
    pub name: String,
    /// Description surfaced to the generation backend.
    pub description: String,
    /// Argument schema.
    pub parameters: ToolParameterSchema,
}

impl ToolDefinition {
    /// Names of required arguments (empty when none declared).
    #[must_use]
    pub fn required_fields(&self) -> &[String] {
        self.parameters.required.as_deref().unwrap_or(&[])
    }

    /// Whether the schema declares an argument with this name.
    #[must_use]
    pub fn declares(&self, field: &str) -> bool {
        self.parameters
            .properties
            .as_ref()
            .is_some_and(|p| p.contains_key(field))
    }
}
