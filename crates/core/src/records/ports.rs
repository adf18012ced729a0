//! Port interfaces for employee record persistence

use async_trait::async_trait;
use serde_json::{Map, Value};
use staffdesk_domain::{EmployeeRecord, Result};

/// Server-side list filter: field label to expected value
///
/// Each pair becomes a query-string parameter on the list endpoint; the
/// backend matches record values by label.
#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    pub fields: Vec<(String, String)>,
}

impl EmployeeFilter {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Add a label/value pair; blank values are ignored
    pub fn field(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.fields.push((label.into(), value));
        }
        self
    }
}

/// A validated record payload ready for submission
#[derive(Debug, Clone)]
pub struct EmployeeSubmission {
    pub form_id: i64,
    pub data: Map<String, Value>,
    pub is_active: bool,
}

/// Trait for the employee record endpoints
#[async_trait]
pub trait EmployeeGateway: Send + Sync {
    /// List records, optionally filtered server-side by field labels
    async fn list_employees(&self, filter: &EmployeeFilter) -> Result<Vec<EmployeeRecord>>;

    /// Fetch a single record by id
    async fn fetch_employee(&self, id: i64) -> Result<EmployeeRecord>;

    /// Create a new record
    async fn create_employee(&self, submission: &EmployeeSubmission) -> Result<EmployeeRecord>;

    /// Replace an existing record at its id
    async fn update_employee(
        &self,
        id: i64,
        submission: &EmployeeSubmission,
    ) -> Result<EmployeeRecord>;

    /// Mark a record inactive rather than hard-deleting it
    async fn soft_delete_employee(&self, id: i64) -> Result<()>;
}
