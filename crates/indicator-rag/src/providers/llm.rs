//! Chat model trait backing the local generation path

use async_trait::async_trait;
use crate::error::Result;

/// A model that completes a system + user message pair
///
/// Implementations:
/// - `OllamaChat`: Local Ollama server (`/api/chat`)
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Complete a conversation made of one system and one user message
    async fn complete(&self, system_message: &str, user_message: &str) -> Result<String>;

    /// Check if the model is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
