//! Core types for the RAG system

pub mod query;
pub mod record;
pub mod response;

pub use query::{FilterOp, MetadataFilter, SearchParams, SearchQuery};
pub use record::{IndexableUnit, IndicatorRecord, Metadata};
pub use response::{GenerationResult, Match, ResultKind};
