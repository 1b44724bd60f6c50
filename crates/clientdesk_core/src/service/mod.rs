//! Use-case services.
//!
//! # Responsibility
//! - Enforce business rules above the repository layer.
//! - Translate storage-level `NotFound` into use-case specific errors.

pub mod client_service;
pub mod project_service;
pub mod user_service;
