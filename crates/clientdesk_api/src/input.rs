//! Field extraction from already-parsed request bodies.
//!
//! Truthiness follows the usual JSON-API convention: `null`, `false`, `0`,
//! `""`, `[]` and `{}` all count as "not supplied".

use clientdesk_core::{ProjectInput, UserRef};
use serde_json::Value;

/// Why a supplied field could not be read as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldError {
    Null,
    NotString,
}

impl FieldError {
    pub(crate) fn message(self) -> &'static str {
        match self {
            Self::Null => "This field may not be null.",
            Self::NotString => "Not a valid string.",
        }
    }
}

/// Reads an optional string field; absent is `Ok(None)`.
pub(crate) fn optional_string<'a>(input: &'a Value, key: &str) -> Result<Option<&'a str>, FieldError> {
    match input.get(key) {
        None => Ok(None),
        Some(Value::Null) => Err(FieldError::Null),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(_) => Err(FieldError::NotString),
    }
}

/// Extracts `project_name` and `users` for the project workflow.
pub(crate) fn project_input(input: &Value) -> ProjectInput {
    ProjectInput {
        project_name: input
            .get("project_name")
            .and_then(Value::as_str)
            .map(str::to_string),
        users: input
            .get("users")
            .filter(|value| is_truthy(value))
            .map(user_refs),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

// A supplied value that is not a list cannot carry user ids at all.
fn user_refs(value: &Value) -> Vec<UserRef> {
    match value.as_array() {
        Some(entries) => entries.iter().map(user_ref).collect(),
        None => vec![UserRef::Malformed],
    }
}

fn user_ref(entry: &Value) -> UserRef {
    let id = match entry.get("id") {
        Some(Value::Null) => return UserRef::NullId,
        Some(Value::Number(number)) => number.as_i64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    };
    id.map_or(UserRef::Malformed, UserRef::Id)
}

#[cfg(test)]
mod tests {
    use super::{optional_string, project_input, FieldError};
    use clientdesk_core::UserRef;
    use serde_json::json;

    #[test]
    fn optional_string_distinguishes_absent_null_and_wrong_type() {
        let body = json!({ "a": "x", "b": null, "c": 3 });
        assert_eq!(optional_string(&body, "a"), Ok(Some("x")));
        assert_eq!(optional_string(&body, "missing"), Ok(None));
        assert_eq!(optional_string(&body, "b"), Err(FieldError::Null));
        assert_eq!(optional_string(&body, "c"), Err(FieldError::NotString));
    }

    #[test]
    fn falsy_users_values_count_as_missing() {
        for users in [json!(null), json!([]), json!(""), json!({}), json!(0), json!(false)] {
            let parsed = project_input(&json!({ "project_name": "p", "users": users }));
            assert_eq!(parsed.users, None, "users={users}");
        }
    }

    #[test]
    fn user_entries_parse_numbers_and_numeric_strings() {
        let parsed = project_input(&json!({
            "users": [{ "id": 5 }, { "id": " 7 " }, { "name": "x" }, 9, { "id": 1.5 }, { "id": null }]
        }));
        assert_eq!(
            parsed.users,
            Some(vec![
                UserRef::Id(5),
                UserRef::Id(7),
                UserRef::Malformed,
                UserRef::Malformed,
                UserRef::Malformed,
                UserRef::NullId,
            ])
        );
    }

    #[test]
    fn scalar_users_value_is_one_malformed_entry() {
        let parsed = project_input(&json!({ "users": "alice" }));
        assert_eq!(parsed.users, Some(vec![UserRef::Malformed]));
    }

    #[test]
    fn non_string_project_name_is_dropped() {
        let parsed = project_input(&json!({ "project_name": 12 }));
        assert_eq!(parsed.project_name, None);
    }
}
