//! Plan generator: asks a chat-completion model for one study plan per
//! assignment.

pub mod config;
pub mod http;
pub mod openai;
pub mod prompt;

pub use config::GeneratorConfig;
pub use http::router;
pub use openai::{ChatClient, ChatError};
