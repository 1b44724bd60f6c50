//! Domain model for users, clients and projects.
//!
//! # Invariants
//! - Every record is identified by a store-assigned integer id that never
//!   changes after creation.
//! - Timestamps are Unix epoch milliseconds.

use std::time::{SystemTime, UNIX_EPOCH};

pub mod client;
pub mod project;
pub mod user;

/// Returns the current wall-clock time in epoch milliseconds.
///
/// A clock set before the epoch yields `0`.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}
