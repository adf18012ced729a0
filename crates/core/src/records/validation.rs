//! Schema-driven record validation
//!
//! Runs synchronously before any network call. All violations are collected
//! into one error keyed by field label; submission is blocked while any
//! remain.

use serde_json::{Map, Value};
use staffdesk_domain::{FieldKind, FormSchema};
use thiserror::Error;

/// A single field-level violation, keyed by the field's label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub label: String,
    pub message: String,
}

/// Collected validation failures for one record
#[derive(Debug, Clone, Error)]
#[error("validation failed for {} field(s)", errors.len())]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Violations for one label
    pub fn for_label(&self, label: &str) -> Vec<&FieldError> {
        self.errors.iter().filter(|e| e.label == label).collect()
    }
}

/// Validate entered data against the active schema
///
/// Checks, per field:
/// - `required`: the value keyed by the field's label must be present and
///   non-blank after trimming whitespace.
/// - `number` kind: a present, non-blank value must parse as a number.
///
/// Violations are collected across all fields rather than failing on the
/// first.
pub fn validate_record(schema: &FormSchema, data: &Map<String, Value>) -> Result<(), ValidationError> {
    let mut errors = Vec::new();

    for field in &schema.fields {
        let value = data.get(&field.label);

        if field.required && is_blank(value) {
            errors.push(FieldError {
                label: field.label.clone(),
                message: format!("{} is required", field.label),
            });
            continue;
        }

        if field.kind == FieldKind::Number && !is_blank(value) && !is_numeric(value) {
            errors.push(FieldError {
                label: field.label.clone(),
                message: "Must be a number".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { errors })
    }
}

/// Drop data keys that are not labels of the schema
///
/// The backend discards unknown keys on write; pruning client-side keeps the
/// payload in step with what will actually be stored.
pub fn prune_unknown_keys(schema: &FormSchema, data: &Map<String, Value>) -> Map<String, Value> {
    data.iter()
        .filter(|(key, _)| schema.labels().any(|label| label == key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

fn is_numeric(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Number(_)) => true,
        Some(Value::String(s)) => s.trim().parse::<f64>().is_ok(),
        _ => false,
    }
}
