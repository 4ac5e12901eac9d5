//! Argument validation helpers.
//!
//! Two layers: [`validate_arguments`] enforces a tool's declared schema
//! before execution (missing required fields are an infrastructure-level
//! [`ToolError`]); the typed getters below extract individual values and
//! report problems as user-facing strings the tool folds into its result
//! text.

use serde_json::{Map, Value};

use atlas_core::tools::ToolDefinition;

use crate::errors::ToolError;

/// Check `args` against the tool's declared schema.
///
/// Every required field must be present and non-null. Extra fields are
/// tolerated — models routinely add ones the schema never declared.
pub fn validate_arguments(
    definition: &ToolDefinition,
    args: &Map<String, Value>,
) -> Result<(), ToolError> {
    let missing: Vec<&str> = definition
        .required_fields()
        .iter()
        .filter(|field| matches!(args.get(field.as_str()), None | Some(Value::Null)))
        .map(String::as_str)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ToolError::InvalidArguments(format!(
            "missing required arguments for {}: {}",
            definition.name,
            missing.join(", ")
        )))
    }
}

/// Extract a required non-empty string, with a user-facing error message.
pub fn require_string(args: &Value, name: &str) -> Result<String, String> {
    match args.get(name) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_) | Value::Null) | None => {
            Err(format!("Error: Missing required parameter '{name}'."))
        }
        Some(_) => Err(format!("Error: Parameter '{name}' must be a string.")),
    }
}

/// Extract an optional string.
#[must_use]
pub fn optional_string(args: &Value, name: &str) -> Option<String> {
    args.get(name).and_then(Value::as_str).map(str::to_owned)
}

/// Extract an optional integer (accepts JSON numbers with no fraction).
#[must_use]
pub fn optional_i64(args: &Value, name: &str) -> Option<i64> {
    args.get(name).and_then(Value::as_i64)
}

/// Extract an optional float (integers widen).
#[must_use]
pub fn optional_f64(args: &Value, name: &str) -> Option<f64> {
    args.get(name).and_then(Value::as_f64)
}
