//! Project model.
//!
//! # Invariants
//! - A project belongs to exactly one client for its whole lifetime.
//! - `users` is a set: ids are unique and kept in ascending order.

use super::client::ClientId;
use super::user::UserId;
use serde::Serialize;

/// Store-assigned project identifier.
pub type ProjectId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub id: ProjectId,
    pub project_name: String,
    /// Serialized as `client` to match the resource payload naming.
    #[serde(rename = "client")]
    pub client_id: ClientId,
    /// Assigned user ids, ascending.
    pub users: Vec<UserId>,
    pub created_by: UserId,
    pub created_at: i64,
}
