use studyplan_core::AssignmentRequest;

/// Fallback step when the model answers without any choice.
pub const NO_RESPONSE_STEP: &str = "No response from the model.";

/// Single-message prompt asking for a dateless study plan.
///
/// Absent fields are rendered as `None`.
pub fn study_plan_prompt(assignment: &AssignmentRequest, max_tokens: u32) -> String {
    let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "None".to_string());
    format!(
        "I have an assignment titled '{title}', which is a {kind}. \
         The due date is {due}. The assignment content is: {content}. \
         Can you create a study plan that outlines tasks but includes no dates? \
         Your token limit is {max_tokens}.",
        title = show(&assignment.title),
        kind = show(&assignment.kind),
        due = show(&assignment.due_date),
        content = show(&assignment.content),
    )
}
