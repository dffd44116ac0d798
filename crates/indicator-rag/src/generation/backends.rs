//! Generation backends: the local chat model and caller-supplied external endpoints

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

use crate::providers::ChatModel;

use super::prompt::{PromptBuilder, EXTERNAL_SYSTEM_MESSAGE};

/// Returned when retrieval finds nothing to ground an answer on
pub const NO_CONTEXT_FALLBACK: &str = "I couldn't find any relevant macroeconomic data for your query. Please try rephrasing your question or check if the data has been loaded.";

/// Returned when the local backend or retrieval fails on the local path
pub const LOCAL_ERROR_FALLBACK: &str =
    "I encountered an error while processing your request. Please try again later.";

/// Returned when an external endpoint or retrieval fails on the external path
pub const EXTERNAL_ERROR_FALLBACK: &str =
    "I encountered an error while calling the external LLM. Please check the URL and try again.";

/// Returned when an external endpoint answers without a `response` key
pub const UNEXPECTED_FORMAT_FALLBACK: &str = "External LLM returned an unexpected response format.";

/// Why a backend produced no completion
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Transport failure, non-2xx status or undecodable body
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Well-formed reply that carries no completion
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// Query plus assembled context handed to a backend
#[derive(Debug, Clone)]
pub struct GenerationPrompt {
    /// The user's question, verbatim
    pub user_query: String,
    /// Assembled retrieval context, never empty
    pub context: String,
}

/// A completion backend
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Produce a completion for the prompt
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String, BackendError>;

    /// Fallback text reported when this backend (or retrieval before it) fails
    fn error_fallback(&self) -> &'static str;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Local backend: system prompt with the context, the query as the user turn
pub struct LocalBackend {
    model: Arc<dyn ChatModel>,
}

impl LocalBackend {
    /// Wrap a chat model
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl GenerationBackend for LocalBackend {
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String, BackendError> {
        let system_message = PromptBuilder::build_system_prompt(&prompt.context);

        let start = Instant::now();
        let answer = self
            .model
            .complete(&system_message, &prompt.user_query)
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        tracing::info!(
            "{} ({}) answered in {}ms",
            self.model.name(),
            self.model.model(),
            start.elapsed().as_millis()
        );
        Ok(answer)
    }

    fn error_fallback(&self) -> &'static str {
        LOCAL_ERROR_FALLBACK
    }

    fn name(&self) -> &str {
        "local"
    }
}

#[derive(Serialize)]
struct ExternalRequest<'a> {
    prompt: &'a str,
    context: &'a str,
    system_message: &'a str,
}

/// External backend: a single JSON POST to a caller-chosen URL
pub struct ExternalBackend {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

impl ExternalBackend {
    /// Target `endpoint` with a shared client
    pub fn new(client: reqwest::Client, endpoint: reqwest::Url) -> Self {
        Self { client, endpoint }
    }

    /// Pull the completion out of a decoded reply
    fn extract_response(body: Value) -> Result<String, BackendError> {
        match body {
            Value::Object(mut map) => match map.remove("response") {
                Some(Value::String(text)) => Ok(text),
                Some(other) => Ok(other.to_string()),
                None => Err(BackendError::UnexpectedFormat(Value::Object(map).to_string())),
            },
            other => Err(BackendError::UnexpectedFormat(other.to_string())),
        }
    }
}

#[async_trait]
impl GenerationBackend for ExternalBackend {
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String, BackendError> {
        let payload = ExternalRequest {
            prompt: &prompt.user_query,
            context: &prompt.context,
            system_message: EXTERNAL_SYSTEM_MESSAGE,
        };

        tracing::info!("Sending request to external LLM at {}", self.endpoint);
        let start = Instant::now();

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Unavailable(format!(
                "{} returned {}",
                self.endpoint, status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        tracing::info!(
            "External LLM call completed in {}ms",
            start.elapsed().as_millis()
        );

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(BackendError::UnexpectedFormat("empty body".to_string()));
        }

        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| BackendError::Unavailable(format!("invalid JSON reply: {}", e)))?;

        Self::extract_response(body)
    }

    fn error_fallback(&self) -> &'static str {
        EXTERNAL_ERROR_FALLBACK
    }

    fn name(&self) -> &str {
        "external"
    }
}
