//! Reshaping of upstream plan responses.

use serde_json::Value;
use thiserror::Error;

use crate::model::StudyPlanResult;
use crate::validation::json_kind;

/// Upstream body did not have the expected plan shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Not valid JSON at all.
    #[error("upstream body is not valid JSON: {0}")]
    MalformedJson(String),
    /// Valid JSON, but the top level is not an array.
    #[error("upstream body must be an array (found {0})")]
    NotAnArray(&'static str),
    /// One entry could not be read as a plan.
    #[error("upstream entry {index} is not a study plan: {reason}")]
    Entry {
        /// Position of the entry in the upstream array.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },
}

/// Decodes an upstream response body into plans.
pub fn decode_plans(body: &[u8]) -> Result<Vec<StudyPlanResult>, DecodeError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| DecodeError::MalformedJson(e.to_string()))?;
    reshape_plans(value)
}

/// Reduces every upstream entry to `title`, `studyPlan`, `dueDate` and
/// `type`, keeping order. Any other field is dropped.
pub fn reshape_plans(value: Value) -> Result<Vec<StudyPlanResult>, DecodeError> {
    let Value::Array(entries) = value else {
        return Err(DecodeError::NotAnArray(json_kind(&value)));
    };
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            if !entry.is_object() {
                return Err(DecodeError::Entry {
                    index,
                    reason: format!("expected object, found {}", json_kind(&entry)),
                });
            }
            serde_json::from_value::<StudyPlanResult>(entry).map_err(|e| DecodeError::Entry {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}
