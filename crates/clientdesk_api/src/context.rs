//! Per-request identity.

use clientdesk_core::UserId;
use uuid::Uuid;

/// Explicit request scope passed into every handler operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    /// Authenticated user issuing the request.
    pub requester: UserId,
    /// Correlates the log events of one request.
    pub request_id: Uuid,
}

impl RequestContext {
    pub fn new(requester: UserId) -> Self {
        Self {
            requester,
            request_id: Uuid::new_v4(),
        }
    }
}
