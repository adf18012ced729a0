//! Form schema types
//!
//! A form is an ordered list of user-authored field definitions. The field
//! order determines render and edit order; reordering is a first-class
//! operation in the builder.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Input kind of a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Email,
    Password,
    Date,
    Textarea,
    Select,
}

impl FieldKind {
    /// Whether this kind carries an options list
    pub fn has_options(self) -> bool {
        matches!(self, Self::Select)
    }
}

/// A single user-authored field definition
///
/// `label` doubles as the storage key for record values, so labels must be
/// unique within a form. Renaming a label orphans values previously stored
/// under the old key; no migration is performed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Client-generated identifier, stable across edits and reorders
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Ordered option list, present only for `select` fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// Identity of a form schema
///
/// A form created locally and not yet saved carries a `Local` id; the
/// backend assigns a `Remote` id on first save, which replaces the local id
/// everywhere the client references it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum FormId {
    Local(Uuid),
    Remote(i64),
}

impl FormId {
    /// Mint a fresh local id for a not-yet-saved form
    pub fn new_local() -> Self {
        Self::Local(Uuid::new_v4())
    }

    /// Whether this form has not been saved to the backend yet
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    /// Backend-assigned identifier, if any
    pub fn remote(&self) -> Option<i64> {
        match self {
            Self::Remote(id) => Some(*id),
            Self::Local(_) => None,
        }
    }
}

impl std::fmt::Display for FormId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local(uuid) => write!(f, "temp-{uuid}"),
            Self::Remote(id) => write!(f, "{id}"),
        }
    }
}

/// A named, ordered form schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSchema {
    pub id: FormId,
    pub name: String,
    pub fields: Vec<FieldDefinition>,
    /// Last server-side modification, absent for unsaved forms
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl FormSchema {
    /// Find a field by its client-generated id
    pub fn field(&self, field_id: Uuid) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == field_id)
    }

    /// Ordered labels of all fields
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.label.as_str())
    }
}
