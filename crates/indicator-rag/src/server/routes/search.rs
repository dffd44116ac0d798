//! Search endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{Match, Metadata, SearchParams};

/// Body of `POST /search` and `POST /search-by-year`. Numeric parameters may
/// arrive as JSON strings or numbers.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub top_k: Option<Value>,
    #[serde(default)]
    pub similarity_threshold: Option<Value>,
}

impl SearchRequest {
    fn query(&self) -> Result<&str> {
        match self.query.as_deref() {
            Some(q) if !q.trim().is_empty() => Ok(q),
            _ => Err(Error::validation("Query cannot be empty")),
        }
    }

    /// `topK` alone; filtered search always uses the configured threshold
    fn top_k(&self, max_top_k: usize) -> Result<Option<usize>> {
        let top_k = raw_param("topK", self.top_k.as_ref())?;
        Ok(SearchParams::parse(top_k.as_deref(), None, max_top_k)?.top_k)
    }

    fn params(&self, max_top_k: usize) -> Result<SearchParams> {
        let top_k = raw_param("topK", self.top_k.as_ref())?;
        let threshold = raw_param("similarityThreshold", self.similarity_threshold.as_ref())?;
        SearchParams::parse(top_k.as_deref(), threshold.as_deref(), max_top_k)
    }
}

/// Normalize a string-or-number JSON parameter to its text form
fn raw_param(name: &str, value: Option<&Value>) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(Error::validation(format!(
            "{} must be a number, got {}",
            name, other
        ))),
    }
}

#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub content: String,
    pub metadata: Metadata,
    pub score: f32,
}

impl From<Match> for SearchHit {
    fn from(m: Match) -> Self {
        Self {
            content: m.content,
            metadata: m.metadata,
            score: m.score,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub status: &'static str,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    pub total_results: usize,
    pub results: Vec<SearchHit>,
}

impl SearchResponse {
    fn new(query: &str, year: Option<&str>, matches: Vec<Match>) -> Self {
        Self {
            status: "success",
            query: query.to_string(),
            year: year.map(str::to_string),
            total_results: matches.len(),
            results: matches.into_iter().map(SearchHit::from).collect(),
        }
    }
}

/// POST /api/rag/search - Open similarity search
pub async fn search(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>> {
    let Json(request) = payload?;
    let query = request.query()?;
    let params = request.params(state.config().retrieval.max_top_k)?;

    tracing::info!("Searching for: \"{}\"", query);
    let matches = state.service().search(query, params).await?;

    Ok(Json(SearchResponse::new(query, None, matches)))
}

/// POST /api/rag/search-by-year - Similarity search within one period
pub async fn search_by_year(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>> {
    let Json(request) = payload?;
    let query = request.query()?;
    let year = match request.year.as_deref() {
        Some(y) if !y.trim().is_empty() => y,
        _ => return Err(Error::validation("Year cannot be empty")),
    };
    let top_k = request.top_k(state.config().retrieval.max_top_k)?;

    let matches = state.service().search_filtered(query, year, top_k).await?;

    Ok(Json(SearchResponse::new(query, Some(year), matches)))
}
