//! Answer endpoints for the local and external backends

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::generation::Backend;
use crate::server::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl AskRequest {
    fn prompt(&self) -> Result<&str> {
        match self.prompt.as_deref() {
            Some(p) if !p.trim().is_empty() => Ok(p),
            _ => Err(Error::validation("Prompt cannot be empty")),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub status: &'static str,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    pub response: String,
}

/// POST /api/rag/ask - Answer with the local model
pub async fn ask(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>> {
    let Json(request) = payload?;
    let prompt = request.prompt()?;
    tracing::info!("Processing RAG request: \"{}\"", prompt);

    let result = state.service().ask(prompt, &Backend::Local).await;

    Ok(Json(AskResponse {
        status: "success",
        prompt: prompt.to_string(),
        external_url: None,
        response: result.into(),
    }))
}

/// POST /api/rag/ask-external - Answer with a caller-chosen endpoint
pub async fn ask_external(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>> {
    let Json(request) = payload?;
    let prompt = request.prompt()?;
    let url = request.url.as_deref().unwrap_or_default();
    let backend = Backend::external(url)?;
    tracing::info!("Processing external LLM request: \"{}\" to {}", prompt, url);

    let result = state.service().ask(prompt, &backend).await;

    Ok(Json(AskResponse {
        status: "success",
        prompt: prompt.to_string(),
        external_url: Some(url.to_string()),
        response: result.into(),
    }))
}
