//! Record submission and listing
//!
//! Validation gates every submission; nothing is considered saved until the
//! backend confirms.

use std::sync::Arc;

use serde_json::{Map, Value};
use staffdesk_domain::{EmployeeRecord, FormSchema, Result, StaffDeskError};
use thiserror::Error;
use tracing::{info, warn};

use super::ports::{EmployeeFilter, EmployeeGateway, EmployeeSubmission};
use super::validation::{prune_unknown_keys, validate_record, ValidationError};

/// Why a submission did not reach, or was rejected by, the backend
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Local, field-level failures; no network call was made
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Network or server failure; no partial state was kept
    #[error(transparent)]
    Backend(#[from] StaffDeskError),
}

/// Employee record operations over the gateway port
pub struct RecordService {
    gateway: Arc<dyn EmployeeGateway>,
}

impl RecordService {
    pub fn new(gateway: Arc<dyn EmployeeGateway>) -> Self {
        Self { gateway }
    }

    /// Validate and create a new record against `schema`
    ///
    /// The schema must already be saved (carry a backend id). Unknown keys
    /// are pruned before submission; records always submit active.
    pub async fn submit_new(
        &self,
        schema: &FormSchema,
        data: Map<String, Value>,
    ) -> std::result::Result<EmployeeRecord, SubmitError> {
        let submission = self.prepare(schema, data)?;
        let record = self.gateway.create_employee(&submission).await.map_err(|err| {
            warn!(error = %err, "employee create failed");
            err
        })?;
        info!(id = record.id, form = record.form_id, "employee created");
        Ok(record)
    }

    /// Validate and replace the record at `id`
    pub async fn submit_update(
        &self,
        schema: &FormSchema,
        id: i64,
        data: Map<String, Value>,
    ) -> std::result::Result<EmployeeRecord, SubmitError> {
        let submission = self.prepare(schema, data)?;
        let record = self.gateway.update_employee(id, &submission).await.map_err(|err| {
            warn!(error = %err, id, "employee update failed");
            err
        })?;
        info!(id = record.id, "employee updated");
        Ok(record)
    }

    /// List records, with optional server-side label filters
    pub async fn list(&self, filter: &EmployeeFilter) -> Result<Vec<EmployeeRecord>> {
        self.gateway.list_employees(filter).await
    }

    /// Fetch one record for editing
    pub async fn fetch(&self, id: i64) -> Result<EmployeeRecord> {
        self.gateway.fetch_employee(id).await
    }

    /// Soft-delete: mark the record inactive
    pub async fn deactivate(&self, id: i64) -> Result<()> {
        self.gateway.soft_delete_employee(id).await?;
        info!(id, "employee soft-deleted");
        Ok(())
    }

    fn prepare(
        &self,
        schema: &FormSchema,
        data: Map<String, Value>,
    ) -> std::result::Result<EmployeeSubmission, SubmitError> {
        let form_id = schema.id.remote().ok_or_else(|| {
            SubmitError::Backend(StaffDeskError::InvalidInput(
                "form must be saved before records can be submitted against it".to_string(),
            ))
        })?;

        validate_record(schema, &data)?;

        Ok(EmployeeSubmission { form_id, data: prune_unknown_keys(schema, &data), is_active: true })
    }
}

/// Client-side search over an already-loaded record list
///
/// Restricts to one form when `form_id` is given, then keeps records where
/// any value contains `term` (case-insensitive). A blank term matches
/// everything.
pub fn search_employees<'a>(
    records: &'a [EmployeeRecord],
    form_id: Option<i64>,
    term: &str,
) -> Vec<&'a EmployeeRecord> {
    let needle = term.trim().to_lowercase();
    records
        .iter()
        .filter(|r| form_id.map_or(true, |id| r.form_id == id))
        .filter(|r| {
            needle.is_empty()
                || r.data.values().any(|v| match v {
                    Value::String(s) => s.to_lowercase().contains(&needle),
                    other => other.to_string().to_lowercase().contains(&needle),
                })
        })
        .collect()
}
