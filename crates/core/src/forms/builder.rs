//! Form builder state and operations
//!
//! Holds the form collection plus the form currently being edited. All
//! mutations are local until `save`, which creates or updates against the
//! backend depending on whether the form still carries a local id.

use std::sync::Arc;

use staffdesk_domain::{FieldDefinition, FieldKind, FormId, FormSchema, Result, StaffDeskError};
use tracing::{debug, info};
use uuid::Uuid;

use super::ports::FormsGateway;

/// User input for a new or edited field
///
/// The builder assigns the field id; `options` is honored only for kinds
/// that carry one (`select`).
#[derive(Debug, Clone)]
pub struct FieldDraft {
    pub kind: FieldKind,
    pub label: String,
    pub placeholder: Option<String>,
    pub required: bool,
    pub options: Option<Vec<String>>,
}

/// Parse select options from line-delimited input
///
/// One option per line; surrounding whitespace is trimmed and blank lines
/// are discarded. Order is preserved.
pub fn parse_select_options(input: &str) -> Vec<String> {
    input.lines().map(str::trim).filter(|line| !line.is_empty()).map(String::from).collect()
}

/// Builder over the client's form schema collection
pub struct FormBuilder {
    gateway: Arc<dyn FormsGateway>,
    forms: Vec<FormSchema>,
    current: Option<FormId>,
}

impl FormBuilder {
    pub fn new(gateway: Arc<dyn FormsGateway>) -> Self {
        Self { gateway, forms: Vec::new(), current: None }
    }

    /// Load the form collection from the backend, replacing local state
    pub async fn load(&mut self) -> Result<()> {
        self.forms = self.gateway.list_forms().await?;
        debug!(count = self.forms.len(), "loaded form schemas");
        if let Some(id) = self.current {
            if !self.forms.iter().any(|f| f.id == id) {
                self.current = None;
            }
        }
        Ok(())
    }

    /// All known forms, in load/creation order
    pub fn forms(&self) -> &[FormSchema] {
        &self.forms
    }

    /// The form currently being edited, if any
    pub fn current(&self) -> Option<&FormSchema> {
        let id = self.current?;
        self.forms.iter().find(|f| f.id == id)
    }

    /// Select a form for editing
    pub fn select(&mut self, id: FormId) -> Result<()> {
        if !self.forms.iter().any(|f| f.id == id) {
            return Err(StaffDeskError::NotFound(format!("form {id}")));
        }
        self.current = Some(id);
        Ok(())
    }

    /// Create a new form with a local id and select it
    ///
    /// The name must be non-empty after trimming.
    pub fn create(&mut self, name: &str) -> Result<FormId> {
        let name = non_empty(name, "form name")?;
        let id = FormId::new_local();
        self.forms.push(FormSchema { id, name, fields: Vec::new(), updated_at: None });
        self.current = Some(id);
        debug!(form = %id, "created local form");
        Ok(id)
    }

    /// Rename the current form
    pub fn rename(&mut self, name: &str) -> Result<()> {
        let name = non_empty(name, "form name")?;
        self.current_mut()?.name = name;
        Ok(())
    }

    /// Append a field to the current form, returning its generated id
    ///
    /// Labels double as record storage keys, so they must be unique within
    /// the form.
    pub fn add_field(&mut self, draft: FieldDraft) -> Result<Uuid> {
        let field = build_field(Uuid::new_v4(), draft)?;
        let form = self.current_mut()?;
        ensure_unique_label(form, &field.label, None)?;
        let id = field.id;
        form.fields.push(field);
        Ok(id)
    }

    /// Replace an existing field, keeping its id and position
    pub fn edit_field(&mut self, field_id: Uuid, draft: FieldDraft) -> Result<()> {
        let field = build_field(field_id, draft)?;
        let form = self.current_mut()?;
        ensure_unique_label(form, &field.label, Some(field_id))?;
        let slot = form
            .fields
            .iter_mut()
            .find(|f| f.id == field_id)
            .ok_or_else(|| StaffDeskError::NotFound(format!("field {field_id}")))?;
        *slot = field;
        Ok(())
    }

    /// Remove a field from the current form
    pub fn remove_field(&mut self, field_id: Uuid) -> Result<()> {
        let form = self.current_mut()?;
        let before = form.fields.len();
        form.fields.retain(|f| f.id != field_id);
        if form.fields.len() == before {
            return Err(StaffDeskError::NotFound(format!("field {field_id}")));
        }
        Ok(())
    }

    /// Move the field at `from` to position `to`
    ///
    /// Drag-to-reorder semantics: the field is removed from its position and
    /// reinserted, preserving the relative order of all other fields.
    pub fn move_field(&mut self, from: usize, to: usize) -> Result<()> {
        let form = self.current_mut()?;
        let len = form.fields.len();
        if from >= len || to >= len {
            return Err(StaffDeskError::InvalidInput(format!(
                "field index out of range ({from} -> {to}, {len} fields)"
            )));
        }
        if from != to {
            let field = form.fields.remove(from);
            form.fields.insert(to, field);
        }
        Ok(())
    }

    /// Save the current form against the backend
    ///
    /// A form still carrying a local id is created; the backend-assigned id
    /// then replaces the local one everywhere in client state. A form with a
    /// backend id is updated in place.
    pub async fn save(&mut self) -> Result<FormId> {
        let form = self
            .current()
            .ok_or_else(|| StaffDeskError::InvalidInput("no form selected".to_string()))?
            .clone();

        let saved = match form.id.remote() {
            None => {
                let saved = self.gateway.create_form(&form).await?;
                info!(form = %saved.id, name = %saved.name, "form created");
                saved
            }
            Some(remote_id) => {
                let saved = self.gateway.update_form(remote_id, &form).await?;
                info!(form = %saved.id, name = %saved.name, "form updated");
                saved
            }
        };

        let new_id = saved.id;
        if let Some(slot) = self.forms.iter_mut().find(|f| f.id == form.id) {
            *slot = saved;
        }
        self.current = Some(new_id);
        Ok(new_id)
    }
}

impl FormBuilder {
    fn current_mut(&mut self) -> Result<&mut FormSchema> {
        let id = self
            .current
            .ok_or_else(|| StaffDeskError::InvalidInput("no form selected".to_string()))?;
        self.forms
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| StaffDeskError::NotFound(format!("form {id}")))
    }
}

fn build_field(id: Uuid, draft: FieldDraft) -> Result<FieldDefinition> {
    let label = non_empty(&draft.label, "field label")?;
    let options = if draft.kind.has_options() {
        Some(draft.options.unwrap_or_default())
    } else {
        None
    };
    Ok(FieldDefinition {
        id,
        kind: draft.kind,
        label,
        placeholder: draft.placeholder.filter(|p| !p.trim().is_empty()),
        required: draft.required,
        options,
    })
}

fn ensure_unique_label(form: &FormSchema, label: &str, exclude: Option<Uuid>) -> Result<()> {
    let taken = form.fields.iter().any(|f| Some(f.id) != exclude && f.label == label);
    if taken {
        return Err(StaffDeskError::InvalidInput(format!(
            "a field labeled \"{label}\" already exists in this form"
        )));
    }
    Ok(())
}

fn non_empty(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StaffDeskError::InvalidInput(format!("{what} must not be empty")));
    }
    Ok(trimmed.to_string())
}
