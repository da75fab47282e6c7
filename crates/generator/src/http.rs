use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use studyplan_core::{AssignmentRequest, StudyPlanResult};
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::openai::ChatClient;
use crate::prompt::{study_plan_prompt, NO_RESPONSE_STEP};

#[derive(Clone)]
pub struct AppState {
    chat: Arc<ChatClient>,
}

pub fn router(chat: Arc<ChatClient>) -> Router {
    let state = AppState { chat };
    Router::new()
        .route("/healthz", get(healthz))
        .route("/generate-plan", post(generate_plan))
        .layer(TraceLayer::new_for_http().make_span_with(|req: &Request| {
            tracing::info_span!(
                "request",
                request_id = %Uuid::new_v4(),
                method = %req.method(),
                uri = %req.uri(),
            )
        }))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Invalid format: request body must be a JSON object.")]
    NotAnObject,
    #[error("Invalid format: assignments should be a list.")]
    AssignmentsNotList,
}

impl IntoResponse for BatchError {
    fn into_response(self) -> Response {
        warn!(error = %self, "rejected batch");
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

/// A missing `assignments` key is an empty batch; any other non-list
/// value is rejected.
fn assignments_of(body: &[u8]) -> Result<Vec<Value>, BatchError> {
    let Ok(Value::Object(mut obj)) = serde_json::from_slice::<Value>(body) else {
        return Err(BatchError::NotAnObject);
    };
    match obj.remove("assignments") {
        None => Ok(vec![]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(BatchError::AssignmentsNotList),
    }
}

async fn generate_plan(
    State(st): State<AppState>,
    body: Bytes,
) -> Result<Json<Vec<StudyPlanResult>>, BatchError> {
    let assignments = assignments_of(&body)?;
    info!(assignments = assignments.len(), "generating study plans");

    let mut plans = Vec::with_capacity(assignments.len());
    for raw in &assignments {
        let assignment = AssignmentRequest::from_value(raw);
        let step = plan_text(&st.chat, &assignment).await;
        plans.push(StudyPlanResult::for_assignment(&assignment, vec![step]));
    }

    Ok(Json(plans))
}

/// Model failures become the plan text so one bad call never fails the
/// batch.
async fn plan_text(chat: &ChatClient, assignment: &AssignmentRequest) -> String {
    let prompt = study_plan_prompt(assignment, chat.max_tokens());
    match chat.complete(&prompt).await {
        Ok(Some(text)) => text,
        Ok(None) => NO_RESPONSE_STEP.to_string(),
        Err(e) => {
            warn!(error = %e, title = ?assignment.title, "chat completion failed");
            format!("Error: {e}")
        }
    }
}
