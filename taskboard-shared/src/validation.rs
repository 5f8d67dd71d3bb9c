/// Input rules shared by the request handlers
///
/// Handlers check fields in a fixed order and report only the first failure,
/// so every helper here yields a single human-readable message.

use serde_json::Value;
use validator::ValidationErrors;

use crate::models::status::Status;

/// A rejected input, carrying the message shown to the client
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Returns the value if it is present and not empty
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Returns all values if every one is present and not empty
///
/// `message` is reported as soon as any value is missing.
pub fn require_all<'a, const N: usize>(
    values: [&'a Option<String>; N],
    message: &str,
) -> Result<[&'a str; N], ValidationError> {
    let mut out = [""; N];
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = non_empty(value).ok_or_else(|| ValidationError::new(message))?;
    }
    Ok(out)
}

/// Picks the first failing field's message out of a `validator` result
///
/// `order` decides which field wins when several fail.
pub fn first_message(errors: &ValidationErrors, order: &[&str]) -> ValidationError {
    let field_errors = errors.field_errors();

    order
        .iter()
        .filter_map(|field| field_errors.get(*field))
        .chain(field_errors.values())
        .flat_map(|errs| errs.iter())
        .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .map(ValidationError)
        .unwrap_or_else(|| ValidationError::new("Submitted data was invalid"))
}

/// Parses a status, rejecting anything outside the three accepted values
pub fn parse_status(value: &str) -> Result<Status, ValidationError> {
    value
        .parse::<Status>()
        .map_err(|e| ValidationError(e.to_string()))
}

/// Coerces a foreign key given as a JSON number or numeric string
///
/// Returns None when the value is absent, null or an empty string.
pub fn coerce_id(value: Option<&Value>, field: &str) -> Result<Option<i32>, ValidationError> {
    let invalid = || ValidationError::new(format!("{} must be a numeric id", field));

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<i32>().map(Some).map_err(|_| invalid()),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(Some)
            .ok_or_else(invalid),
        Some(_) => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use validator::Validate;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(&Some("x".to_string())), Some("x"));
        assert_eq!(non_empty(&Some(String::new())), None);
        assert_eq!(non_empty(&None), None);
    }

    #[test]
    fn test_require_all() {
        let name = Some("alice".to_string());
        let email = Some("a@example.com".to_string());
        let missing = None;

        let [n, e] = require_all([&name, &email], "missing").unwrap();
        assert_eq!((n, e), ("alice", "a@example.com"));

        let err = require_all([&name, &missing], "Please provide name and email").unwrap_err();
        assert_eq!(err.0, "Please provide name and email");
    }

    #[derive(Validate)]
    struct Sample {
        #[validate(email(message = "bad email"))]
        email: Option<String>,

        #[validate(length(min = 5, message = "short name"))]
        name: Option<String>,
    }

    #[test]
    fn test_first_message_respects_order() {
        let sample = Sample {
            email: Some("nope".to_string()),
            name: Some("abc".to_string()),
        };
        let errors = sample.validate().unwrap_err();

        assert_eq!(first_message(&errors, &["email", "name"]).0, "bad email");
        assert_eq!(first_message(&errors, &["name", "email"]).0, "short name");
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("Completed").unwrap(), Status::Completed);

        let err = parse_status("Done").unwrap_err();
        assert!(err.0.contains("'Not Started', 'In Progress', or 'Completed'"));
    }

    #[test]
    fn test_coerce_id() {
        assert_eq!(coerce_id(Some(&json!(7)), "projectId").unwrap(), Some(7));
        assert_eq!(coerce_id(Some(&json!("12")), "projectId").unwrap(), Some(12));
        assert_eq!(coerce_id(Some(&json!(" 3 ")), "projectId").unwrap(), Some(3));
        assert_eq!(coerce_id(Some(&json!("")), "projectId").unwrap(), None);
        assert_eq!(coerce_id(Some(&Value::Null), "projectId").unwrap(), None);
        assert_eq!(coerce_id(None, "projectId").unwrap(), None);

        assert!(coerce_id(Some(&json!("abc")), "userId").is_err());
        assert!(coerce_id(Some(&json!(1.5)), "userId").is_err());
        assert!(coerce_id(Some(&json!(true)), "userId").is_err());
        assert!(coerce_id(Some(&json!(i64::MAX)), "userId").is_err());
    }
}
