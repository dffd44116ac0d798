//! API routes for the RAG server

pub mod ask;
pub mod search;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::error::Result;
use crate::server::state::AppState;

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "Indicator RAG Service";

/// Build all `/api/rag` routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/load-data", post(load_data))
        .route("/search", post(search::search))
        .route("/search-by-year", post(search::search_by_year))
        .route("/ask", post(ask::ask))
        .route("/ask-external", post(ask::ask_external))
        .route("/health", get(health))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadDataResponse {
    pub status: &'static str,
    pub message: String,
    pub units_stored: usize,
}

/// POST /api/rag/load-data - Load the configured CSV into the store
pub async fn load_data(State(state): State<AppState>) -> Result<Json<LoadDataResponse>> {
    let stored = state.service().load_default().await?;

    Ok(Json(LoadDataResponse {
        status: "success",
        message: "Data successfully loaded into the vector store".to_string(),
        units_stored: stored,
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// GET /api/rag/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
    })
}
