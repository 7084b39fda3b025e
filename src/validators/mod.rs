//! Reusable JSON assertion primitives.
//!
//! Every failure names the offending field and carries the expected and
//! actual values, so a mismatch is diagnosable from the error message alone.
//! "Key absent", "key null" and "key present with the wrong type/value" are
//! three distinct failures, and the post-deletion check insists on a literal
//! JSON `null` body rather than any falsy-looking response.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssertionError {
    #[error("response body is not valid JSON ({detail}): {body}")]
    InvalidJson { detail: String, body: String },

    #[error("expected a JSON array, got {actual}")]
    NotAnArray { actual: String },

    #[error("expected a non-empty array for `{field}`")]
    EmptyArray { field: String },

    #[error("field `{field}` is absent")]
    AbsentField { field: String },

    #[error("field `{field}` is null")]
    NullField { field: String },

    #[error("field `{field}` is empty")]
    EmptyValue { field: String },

    #[error("field `{field}`: expected {expected}, got {actual}")]
    WrongType {
        field: String,
        expected: &'static str,
        actual: String,
    },

    #[error("field `{field}`: expected `{expected}`, actual `{actual}`")]
    ValueMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("array `{field}`: expected {expected} elements, actual {actual}")]
    LengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("expected status {expected}, got {actual} (body: {body})")]
    UnexpectedStatus {
        expected: String,
        actual: String,
        body: String,
    },

    #[error("no element matching {what} found in `{field}`")]
    ElementNotFound { field: String, what: String },

    #[error("element matching {what} unexpectedly present in `{field}`")]
    ElementStillPresent { field: String, what: String },

    #[error("expected literal null body, got: {0}")]
    NotNull(String),
}

impl AssertionError {
    /// Re-labels the offending field with an enclosing path, e.g. `name`
    /// inside `ingredients[0]` becomes `ingredients[0].name`.
    pub fn prefixed(mut self, prefix: &str) -> Self {
        match &mut self {
            Self::EmptyArray { field }
            | Self::AbsentField { field }
            | Self::NullField { field }
            | Self::EmptyValue { field }
            | Self::WrongType { field, .. }
            | Self::ValueMismatch { field, .. }
            | Self::LengthMismatch { field, .. }
            | Self::ElementNotFound { field, .. }
            | Self::ElementStillPresent { field, .. } => {
                *field = format!("{}.{}", prefix, field);
            }
            _ => {}
        }
        self
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Looks a key up, distinguishing an absent key from an explicit null.
pub fn lookup<'a>(json: &'a Value, key: &str) -> Result<&'a Value, AssertionError> {
    match json.get(key) {
        None => Err(AssertionError::AbsentField {
            field: key.to_string(),
        }),
        Some(Value::Null) => Err(AssertionError::NullField {
            field: key.to_string(),
        }),
        Some(value) => Ok(value),
    }
}

/// The field must exist, be non-null, and a string/array/object value must
/// additionally be non-empty.
pub fn non_empty<'a>(json: &'a Value, key: &str) -> Result<&'a Value, AssertionError> {
    let value = lookup(json, key)?;
    let empty = match value {
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    };
    if empty {
        return Err(AssertionError::EmptyValue {
            field: key.to_string(),
        });
    }
    Ok(value)
}

pub fn string_field<'a>(json: &'a Value, key: &str) -> Result<&'a str, AssertionError> {
    let value = lookup(json, key)?;
    value.as_str().ok_or_else(|| AssertionError::WrongType {
        field: key.to_string(),
        expected: "string",
        actual: type_name(value).to_string(),
    })
}

pub fn non_empty_string<'a>(json: &'a Value, key: &str) -> Result<&'a str, AssertionError> {
    let value = string_field(json, key)?;
    if value.is_empty() {
        return Err(AssertionError::EmptyValue {
            field: key.to_string(),
        });
    }
    Ok(value)
}

pub fn int_field(json: &Value, key: &str) -> Result<i64, AssertionError> {
    let value = lookup(json, key)?;
    value.as_i64().ok_or_else(|| AssertionError::WrongType {
        field: key.to_string(),
        expected: "integer",
        actual: type_name(value).to_string(),
    })
}

pub fn array_field<'a>(json: &'a Value, key: &str) -> Result<&'a [Value], AssertionError> {
    let value = lookup(json, key)?;
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| AssertionError::WrongType {
            field: key.to_string(),
            expected: "array",
            actual: type_name(value).to_string(),
        })
}

/// The whole value must be a JSON array.
pub fn as_array(json: &Value) -> Result<&[Value], AssertionError> {
    json.as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| AssertionError::NotAnArray {
            actual: type_name(json).to_string(),
        })
}

pub fn expect_str(json: &Value, key: &str, expected: &str) -> Result<(), AssertionError> {
    let actual = string_field(json, key)?;
    if actual != expected {
        return Err(AssertionError::ValueMismatch {
            field: key.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

pub fn expect_int(json: &Value, key: &str, expected: i64) -> Result<(), AssertionError> {
    let actual = int_field(json, key)?;
    if actual != expected {
        return Err(AssertionError::ValueMismatch {
            field: key.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

pub fn expect_len(json: &Value, key: &str, expected: usize) -> Result<(), AssertionError> {
    let array = array_field(json, key)?;
    if array.len() != expected {
        return Err(AssertionError::LengthMismatch {
            field: key.to_string(),
            expected,
            actual: array.len(),
        });
    }
    Ok(())
}

/// Asserts that the raw body is the literal JSON `null`.
///
/// An empty body, an empty object and an empty array all fail: only the
/// parsed `null` value passes, since that is how the server encodes
/// "not found" under its success-status contract.
pub fn expect_null_body(body: &str) -> Result<(), AssertionError> {
    match serde_json::from_str::<Value>(body.trim()) {
        Ok(Value::Null) => Ok(()),
        _ => Err(AssertionError::NotNull(body.to_string())),
    }
}
