//! Wire shapes exchanged between clients, the relay and the generator.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One assignment a client wants a study plan for.
///
/// The relay never builds this type: it forwards the raw JSON element
/// untouched. The generator reads it through [`AssignmentRequest::from_value`],
/// which accepts whatever the client sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    /// Assignment title.
    #[serde(default)]
    pub title: Option<String>,
    /// Due date as the client formatted it; never parsed.
    #[serde(default)]
    pub due_date: Option<String>,
    /// Assignment category, e.g. "Homework" or "Exam".
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Free-form assignment body.
    #[serde(default)]
    pub content: Option<String>,
}

impl AssignmentRequest {
    /// Reads an assignment from an arbitrary JSON value.
    ///
    /// Missing and null fields become `None`. Non-string scalars are kept in
    /// their JSON rendering so `{"title": 7}` still yields `"7"`. A value that
    /// is not an object yields an empty assignment.
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| match value.get(name) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };
        Self {
            title: field("title"),
            due_date: field("dueDate"),
            kind: field("type"),
            content: field("content"),
        }
    }
}

/// Request body shared by the relay and the generator.
///
/// Elements stay as raw JSON so the relay forwards exactly what it received.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AssignmentBatch {
    /// Ordered assignments.
    pub assignments: Vec<Value>,
}

impl AssignmentBatch {
    /// Wraps already validated assignments.
    pub fn new(assignments: Vec<Value>) -> Self {
        Self { assignments }
    }

    /// Number of assignments in the batch.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// True when the batch holds no assignments.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// Study plan for one assignment, as returned to clients.
///
/// Exactly these four keys are serialized. Unknown keys are ignored when
/// decoding, which is how the relay drops upstream extras.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanResult {
    /// Title echoed from the assignment. Null when the client sent none.
    #[serde(default)]
    pub title: Option<String>,
    /// Plan steps, in order.
    pub study_plan: Vec<String>,
    /// Due date echoed from the assignment.
    #[serde(default)]
    pub due_date: Option<String>,
    /// Assignment category echoed from the assignment.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl StudyPlanResult {
    /// Builds a plan for `assignment` with the given steps.
    pub fn for_assignment(assignment: &AssignmentRequest, study_plan: Vec<String>) -> Self {
        Self {
            title: assignment.title.clone(),
            study_plan,
            due_date: assignment.due_date.clone(),
            kind: assignment.kind.clone(),
        }
    }
}
