//! Shape checks on incoming batch requests.

use serde_json::Value;
use thiserror::Error;

use crate::model::AssignmentBatch;

/// Ways a batch request body can be malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The body is not valid JSON.
    #[error("request body is not valid JSON: {0}")]
    MalformedJson(String),
    /// The body is JSON but not an object.
    #[error("request body must be a JSON object")]
    NotAnObject,
    /// `assignments` is absent or null.
    #[error("missing `assignments` field")]
    MissingAssignments,
    /// `assignments` is present but not an array.
    #[error("`assignments` must be an array (found {0})")]
    AssignmentsNotArray(&'static str),
}

/// Parses `body` and returns the batch it carries.
///
/// Only the envelope is checked: the body must be an object whose
/// `assignments` key holds an array. Element contents pass through as-is
/// and an empty array is accepted.
pub fn parse_batch(body: &[u8]) -> Result<AssignmentBatch, ValidationError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ValidationError::MalformedJson(e.to_string()))?;
    batch_from_value(value)
}

/// Same as [`parse_batch`] for an already decoded value.
pub fn batch_from_value(value: Value) -> Result<AssignmentBatch, ValidationError> {
    let Value::Object(mut obj) = value else {
        return Err(ValidationError::NotAnObject);
    };
    match obj.remove("assignments") {
        None | Some(Value::Null) => Err(ValidationError::MissingAssignments),
        Some(Value::Array(items)) => Ok(AssignmentBatch::new(items)),
        Some(other) => Err(ValidationError::AssignmentsNotArray(json_kind(&other))),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
