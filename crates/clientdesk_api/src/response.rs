//! Response envelope returned by every handler.

use log::error;
use serde::Serialize;
use serde_json::{json, Value};

/// Outcome class of a handled request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Created,
    NoContent,
    BadRequest,
    NotFound,
    InternalError,
}

impl Status {
    /// HTTP status code for this outcome.
    pub fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Created => 201,
            Self::NoContent => 204,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::InternalError => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: Status,
    /// `None` only for `204 No Content`.
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn no_content() -> Self {
        Self {
            status: Status::NoContent,
            body: None,
        }
    }

    pub fn bad_request(body: Value) -> Self {
        Self {
            status: Status::BadRequest,
            body: Some(body),
        }
    }

    /// `400` with the `{"error": ...}` shape used by business-rule failures.
    pub fn error_message(message: impl Into<String>) -> Self {
        Self::bad_request(json!({ "error": message.into() }))
    }

    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            body: Some(json!({ "detail": "Not found." })),
        }
    }

    pub fn internal_error() -> Self {
        Self {
            status: Status::InternalError,
            body: Some(json!({ "detail": "Internal server error." })),
        }
    }

    /// Serializes `value` as the body of a `status` response.
    pub(crate) fn serialized<T: Serialize + ?Sized>(status: Status, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self {
                status,
                body: Some(body),
            },
            Err(err) => {
                error!("event=serialize module=api status=error error={err}");
                Self::internal_error()
            }
        }
    }
}
