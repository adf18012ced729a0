//! Wire shapes for the backend REST API
//!
//! Backend response shapes are normalized into domain types here, at the
//! adapter boundary, so nothing above this module handles envelope
//! variations or backend field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use staffdesk_core::EmployeeSubmission;
use staffdesk_domain::{EmployeeRecord, FieldDefinition, FormId, FormSchema, UserProfile};

/// List endpoints return either a bare array or a `{results: [...]}`
/// pagination envelope; both normalize to the same `Vec`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Paginated<T> {
    Envelope { results: Vec<T> },
    Bare(Vec<T>),
}

impl<T> Paginated<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Envelope { results } => results,
            Self::Bare(items) => items,
        }
    }
}

// ---- Auth ----

#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RefreshResponse {
    pub access: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Stored server-side as the first name
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileDto {
    #[serde(default)]
    pub username: String,
    pub full_name: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
}

impl From<ProfileDto> for UserProfile {
    fn from(dto: ProfileDto) -> Self {
        let display_name =
            dto.full_name.or(dto.name).unwrap_or_else(|| dto.username.clone());
        Self {
            username: dto.username,
            display_name,
            email: dto.email,
            phone: dto.phone,
            avatar: dto.avatar,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ProfileUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

// ---- Forms ----

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SchemaDto {
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FormPayload {
    pub name: String,
    pub schema: SchemaDto,
    pub is_active: bool,
}

impl FormPayload {
    pub fn from_schema(form: &FormSchema) -> Self {
        Self {
            name: form.name.clone(),
            schema: SchemaDto { fields: form.fields.clone() },
            is_active: true,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FormDto {
    pub id: i64,
    pub name: String,
    pub schema: Option<SchemaDto>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<FormDto> for FormSchema {
    fn from(dto: FormDto) -> Self {
        Self {
            id: FormId::Remote(dto.id),
            name: dto.name,
            fields: dto.schema.map(|s| s.fields).unwrap_or_default(),
            updated_at: dto.updated_at,
        }
    }
}

// ---- Employees ----

#[derive(Debug, Serialize)]
pub(crate) struct EmployeePayload {
    pub form: i64,
    pub data: Map<String, Value>,
    pub is_active: bool,
}

impl From<&EmployeeSubmission> for EmployeePayload {
    fn from(submission: &EmployeeSubmission) -> Self {
        Self {
            form: submission.form_id,
            data: submission.data.clone(),
            is_active: submission.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmployeeDto {
    pub id: i64,
    pub form: i64,
    pub form_name: Option<String>,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl From<EmployeeDto> for EmployeeRecord {
    fn from(dto: EmployeeDto) -> Self {
        Self {
            id: dto.id,
            form_id: dto.form,
            form_name: dto.form_name,
            data: dto.data,
            is_active: dto.is_active,
            updated_at: dto.updated_at,
        }
    }
}
