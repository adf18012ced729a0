//! Port interfaces for form schema persistence

use async_trait::async_trait;
use staffdesk_domain::{FormSchema, Result};

/// Trait for the form schema endpoints
#[async_trait]
pub trait FormsGateway: Send + Sync {
    /// List all form schemas
    async fn list_forms(&self) -> Result<Vec<FormSchema>>;

    /// Create a new form schema, returning it with its backend-assigned id
    async fn create_form(&self, form: &FormSchema) -> Result<FormSchema>;

    /// Replace an existing form schema at its backend id
    async fn update_form(&self, id: i64, form: &FormSchema) -> Result<FormSchema>;
}
