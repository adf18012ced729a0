//! Form schema builder: authoring, reordering, and saving form templates

mod builder;
pub mod ports;

pub use builder::{parse_select_options, FieldDraft, FormBuilder};
