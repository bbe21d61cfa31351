//! Seam between the confirmation loop and the completion backend.

use async_trait::async_trait;

use crate::error::CompletionError;

use super::client::CompletionClient;
use super::types::ChatMessage;

/// Produces a candidate commit message from a prompt.
///
/// This abstraction allows mocking the completion endpoint in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageGenerator: Send + Sync {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, CompletionError>;
}

#[async_trait]
impl MessageGenerator for CompletionClient {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        self.complete(messages).await
    }
}
