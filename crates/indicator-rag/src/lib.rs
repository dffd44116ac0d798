//! indicator-rag: retrieval-augmented answers over macroeconomic indicator records
//!
//! Indicator rows are loaded from CSV, normalized into short sentences with
//! metadata, embedded and indexed. Questions are answered by retrieving the
//! closest rows and handing them as context to a local Ollama model or to a
//! caller-supplied HTTP endpoint, falling back to fixed messages when either
//! step fails.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod service;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use generation::Backend;
pub use service::RagService;
pub use types::{
    GenerationResult, IndexableUnit, IndicatorRecord, Match, MetadataFilter, ResultKind,
    SearchParams, SearchQuery,
};
