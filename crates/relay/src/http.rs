use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Request, State},
    routing::{get, post},
    Json, Router,
};
use studyplan_core::{decode_plans, parse_batch, StudyPlanResult};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use uuid::Uuid;

use crate::{error::RelayError, upstream::PlanUpstream};

pub struct AppState<U> {
    upstream: Arc<U>,
}

impl<U> Clone for AppState<U> {
    fn clone(&self) -> Self {
        Self {
            upstream: Arc::clone(&self.upstream),
        }
    }
}

pub fn router<U: PlanUpstream>(upstream: Arc<U>) -> Router {
    let state = AppState { upstream };
    Router::new()
        .route("/healthz", get(healthz))
        .route("/generate-plan", post(generate_plan::<U>))
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

/// Body is taken as raw bytes so that a wrong content type or broken JSON
/// ends up as the same 400 as a missing `assignments` field.
async fn generate_plan<U: PlanUpstream>(
    State(st): State<AppState<U>>,
    body: Bytes,
) -> Result<Json<Vec<StudyPlanResult>>, RelayError> {
    let batch = parse_batch(&body)?;
    info!(assignments = batch.len(), "received batch");

    let raw = st.upstream.generate(&batch).await?;
    let plans = decode_plans(&raw).map_err(|source| RelayError::Decode {
        source,
        body: String::from_utf8_lossy(&raw).into_owned(),
    })?;

    info!(plans = plans.len(), "returning study plans");
    Ok(Json(plans))
}
