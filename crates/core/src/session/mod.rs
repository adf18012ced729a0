//! Session lifecycle: bootstrap, login, logout, profile management

pub mod ports;
mod service;

pub use service::SessionService;
