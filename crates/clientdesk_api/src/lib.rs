//! Resource handlers for clients and projects.
//!
//! # Responsibility
//! - Turn parsed request bodies into core service calls.
//! - Map service outcomes onto status codes and JSON bodies.
//!
//! # Invariants
//! - Handlers never panic; storage failures become `500` responses.
//! - The requester always comes from [`RequestContext`], never from input.

pub mod context;
mod input;
pub mod resources;
pub mod response;

pub use context::RequestContext;
pub use resources::client::ClientResource;
pub use resources::project::ProjectResource;
pub use response::{ApiResponse, Status};
