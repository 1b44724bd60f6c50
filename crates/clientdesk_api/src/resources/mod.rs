//! Resource handlers, one per collection.

pub mod client;
pub mod project;
