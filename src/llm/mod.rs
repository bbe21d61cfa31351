//! Chat completion client, wire types and retry policy.

pub mod client;
pub mod generator;
pub mod retry;
pub mod types;

pub use client::CompletionClient;
pub use generator::MessageGenerator;
pub use retry::{LinearBackoff, retry_with_backoff};
pub use types::{ChatMessage, CompletionRequest, CompletionResponse, Role};
