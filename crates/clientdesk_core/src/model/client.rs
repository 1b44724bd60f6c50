//! Client (customer organization) model.
//!
//! # Invariants
//! - `client_name` is trimmed, non-blank and at most
//!   `CLIENT_NAME_MAX_CHARS` characters.
//! - `updated_at` is never earlier than `created_at` and strictly increases
//!   on every update.

use super::user::UserId;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned client identifier.
pub type ClientId = i64;

/// Upper bound for `client_name`, counted in characters.
pub const CLIENT_NAME_MAX_CHARS: usize = 255;

/// Client record as stored and serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Client {
    pub id: ClientId,
    pub client_name: String,
    /// Requester that created the client. Never taken from input.
    pub created_by: UserId,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Client {
    /// Advances `updated_at` to `now_ms`, or by one millisecond when the
    /// clock has not moved past the previous value.
    pub fn refresh_updated_at(&mut self, now_ms: i64) {
        self.updated_at = now_ms.max(self.updated_at.saturating_add(1));
    }
}

/// Field-level validation failure for `client_name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientValidationError {
    MissingName,
    BlankName,
    NameTooLong { max_chars: usize },
}

impl Display for ClientValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "client_name is required"),
            Self::BlankName => write!(f, "client_name must not be blank"),
            Self::NameTooLong { max_chars } => {
                write!(f, "client_name must have at most {max_chars} characters")
            }
        }
    }
}

impl Error for ClientValidationError {}

/// Normalizes and validates a client name.
///
/// Surrounding whitespace is trimmed before the blank and length checks;
/// the trimmed value is returned.
pub fn validate_client_name(name: Option<&str>) -> Result<String, ClientValidationError> {
    let trimmed = name.ok_or(ClientValidationError::MissingName)?.trim();
    if trimmed.is_empty() {
        return Err(ClientValidationError::BlankName);
    }
    if trimmed.chars().count() > CLIENT_NAME_MAX_CHARS {
        return Err(ClientValidationError::NameTooLong {
            max_chars: CLIENT_NAME_MAX_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{validate_client_name, Client, ClientValidationError, CLIENT_NAME_MAX_CHARS};

    fn client(updated_at: i64) -> Client {
        Client {
            id: 1,
            client_name: "Acme".to_string(),
            created_by: 1,
            created_at: 100,
            updated_at,
        }
    }

    #[test]
    fn name_is_trimmed() {
        assert_eq!(validate_client_name(Some("  Acme  ")).unwrap(), "Acme");
    }

    #[test]
    fn missing_and_blank_names_are_rejected() {
        assert_eq!(
            validate_client_name(None),
            Err(ClientValidationError::MissingName)
        );
        assert_eq!(
            validate_client_name(Some(" \t ")),
            Err(ClientValidationError::BlankName)
        );
    }

    #[test]
    fn length_limit_counts_characters() {
        let at_limit = "é".repeat(CLIENT_NAME_MAX_CHARS);
        assert!(validate_client_name(Some(&at_limit)).is_ok());

        let over = "x".repeat(CLIENT_NAME_MAX_CHARS + 1);
        assert_eq!(
            validate_client_name(Some(&over)),
            Err(ClientValidationError::NameTooLong {
                max_chars: CLIENT_NAME_MAX_CHARS
            })
        );
    }

    #[test]
    fn refresh_updated_at_uses_clock_when_it_moved_forward() {
        let mut record = client(100);
        record.refresh_updated_at(500);
        assert_eq!(record.updated_at, 500);
    }

    #[test]
    fn refresh_updated_at_always_advances() {
        let mut record = client(500);
        record.refresh_updated_at(500);
        assert_eq!(record.updated_at, 501);
        record.refresh_updated_at(10);
        assert_eq!(record.updated_at, 502);
    }
}
