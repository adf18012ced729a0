//! Backend API access
//!
//! The request pipeline, refresh coordination, wire-shape normalization,
//! and the gateway implementations consumed by the core services.

mod client;
mod errors;
mod refresh;
mod wire;

pub use client::ApiClient;
pub use errors::{ApiError, ApiErrorCategory};
