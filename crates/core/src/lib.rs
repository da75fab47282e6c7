#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Wire types and request/response shaping shared by the study-plan relay
//! and the plan generator.

pub mod model;
pub mod plan;
pub mod validation;

pub use model::*;
pub use plan::*;
pub use validation::*;
