//! Relay service: validates assignment batches, forwards them to the plan
//! generator and returns the reshaped plans.

pub mod config;
pub mod error;
pub mod http;
pub mod upstream;

pub use config::RelayConfig;
pub use error::{RelayError, UpstreamError};
pub use http::router;
pub use upstream::{HttpPlanUpstream, PlanUpstream};
