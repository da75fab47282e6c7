use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use studyplan_core::{DecodeError, ValidationError};
use thiserror::Error;
use tracing::{error, warn};

/// Body returned for any malformed batch.
pub const INVALID_BATCH_MESSAGE: &str = "Invalid format: assignments should be an array.";

/// Body returned for every upstream or decode failure. Upstream detail is
/// only logged.
pub const GENERATION_FAILED_MESSAGE: &str = "Error generating study plan";

/// Upstream bodies longer than this are cut before they are logged.
const LOGGED_BODY_LIMIT: usize = 2048;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned status {status}")]
    Status { status: u16, body: String },
}

/// Terminal outcome of a failed relay request.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("{source}")]
    Decode {
        #[source]
        source: DecodeError,
        /// Raw upstream body, kept for the log line.
        body: String,
    },
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) | Self::Decode { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Validation(e) => {
                warn!(error = %e, "rejected batch");
                INVALID_BATCH_MESSAGE
            }
            Self::Upstream(UpstreamError::Status { status, body }) => {
                error!(status, upstream_body = %log_snippet(body), "upstream returned an error");
                GENERATION_FAILED_MESSAGE
            }
            Self::Upstream(e) => {
                error!(error = %e, "upstream unreachable");
                GENERATION_FAILED_MESSAGE
            }
            Self::Decode { source, body } => {
                error!(error = %source, upstream_body = %log_snippet(body), "could not decode upstream plans");
                GENERATION_FAILED_MESSAGE
            }
        };
        (self.status(), message).into_response()
    }
}

fn log_snippet(body: &str) -> std::borrow::Cow<'_, str> {
    if body.len() <= LOGGED_BODY_LIMIT {
        return body.into();
    }
    let mut end = LOGGED_BODY_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... ({} bytes total)", &body[..end], body.len()).into()
}
