//! Employee record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An employee record created against a form schema
///
/// `data` maps field labels to entered values. Its keys should be a subset
/// of the referenced schema's labels, but the backend does not enforce this
/// retroactively if the schema changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: i64,
    /// Backend id of the form schema this record was created against
    pub form_id: i64,
    /// Denormalized form name served by the backend on reads
    pub form_name: Option<String>,
    pub data: Map<String, Value>,
    /// Soft-delete flag; inactive records are hidden, never hard-deleted
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl EmployeeRecord {
    /// Value stored under a field label, if any
    pub fn value(&self, label: &str) -> Option<&Value> {
        self.data.get(label)
    }
}
