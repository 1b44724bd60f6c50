//! User identity reference.
//!
//! Users are provisioned by the identity side of the system. Clients and
//! projects only ever point at them.

use serde::Serialize;

/// Store-assigned user identifier.
pub type UserId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}
