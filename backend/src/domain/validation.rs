//! Field-level validation failures shared by domain modules.

use serde_json::{Value, json};

use crate::domain::Error;

/// Build an `invalid_request` error with `{field, code, value?}` details.
///
/// # Examples
/// ```
/// use anilink::domain::{ErrorCode, invalid_field};
///
/// let err = invalid_field("qty", "out_of_range", "qty must be at least 1", Some("0".into()));
/// assert_eq!(err.code(), ErrorCode::InvalidRequest);
/// assert_eq!(err.details().expect("details")["field"], "qty");
/// ```
pub fn invalid_field(
    field: &str,
    code: &str,
    message: impl Into<String>,
    value: Option<Value>,
) -> Error {
    let mut details = json!({ "field": field, "code": code });
    if let (Some(value), Some(map)) = (value, details.as_object_mut()) {
        map.insert("value".to_owned(), value);
    }
    Error::invalid_request(message).with_details(details)
}

/// Trim `raw` and require between `min` and `max` characters.
pub fn bounded_text(field: &str, raw: &str, min: usize, max: usize) -> Result<String, Error> {
    let trimmed = raw.trim();
    let length = trimmed.chars().count();
    if length < min || length > max {
        let message = if min > 0 && length == 0 {
            format!("{field} must not be empty")
        } else {
            format!("{field} must be between {min} and {max} characters")
        };
        return Err(invalid_field(field, "length", message, None));
    }
    Ok(trimmed.to_owned())
}

/// Trim optional text, turning blank values into `None`.
pub fn optional_text(field: &str, raw: Option<&str>, max: usize) -> Result<Option<String>, Error> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => bounded_text(field, text, 1, max).map(Some),
    }
}
