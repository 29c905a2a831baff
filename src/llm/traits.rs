use super::types::{ConversationTurn, ProviderResponse};
use crate::error::LlmError;
use async_trait::async_trait;

/// A text-generation backend. Tool calls travel inside the returned text.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider identifier (e.g. "ollama", "gemini").
    fn name(&self) -> &str;

    /// Produce the next assistant reply for the conversation so far.
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ConversationTurn],
    ) -> Result<ProviderResponse, LlmError>;

    /// Check that the backend is reachable and configured.
    async fn health_check(&self) -> Result<(), LlmError> {
        Ok(())
    }
}
