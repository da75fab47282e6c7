//! Client side of the plan generator.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use studyplan_core::AssignmentBatch;

use crate::error::{RelayError, UpstreamError};

/// Something that turns an assignment batch into a raw plan response.
///
/// Implementations return the body of a successful response untouched;
/// reshaping happens in the handler.
pub trait PlanUpstream: Send + Sync + 'static {
    fn generate(
        &self,
        batch: &AssignmentBatch,
    ) -> impl Future<Output = Result<Vec<u8>, RelayError>> + Send;
}

/// Plan generator reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPlanUpstream {
    client: Client,
    endpoint: String,
}

impl HttpPlanUpstream {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/generate-plan", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl PlanUpstream for HttpPlanUpstream {
    async fn generate(&self, batch: &AssignmentBatch) -> Result<Vec<u8>, RelayError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(batch)
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let body = resp.bytes().await.map_err(UpstreamError::Transport)?;
        Ok(body.to_vec())
    }
}
