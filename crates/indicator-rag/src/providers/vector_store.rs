//! Vector store provider trait for storing and searching indicator units

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{IndexableUnit, Match, SearchQuery};

/// Trait for vector storage and similarity search
///
/// Embedding happens inside the store as a side effect of `add` and
/// `similarity_search`; callers treat both as network calls that can fail.
///
/// Implementations:
/// - `InMemoryVectorStore`: brute-force cosine index over an `EmbeddingProvider`
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Store units in one all-or-nothing call; ownership moves to the store
    async fn add(&self, units: Vec<IndexableUnit>) -> Result<()>;

    /// Return at most `query.top_k` matches with `score >= query.similarity_threshold`
    /// that satisfy `query.filter`, best first
    async fn similarity_search(&self, query: &SearchQuery) -> Result<Vec<Match>>;

    /// Get total number of units stored
    async fn len(&self) -> Result<usize>;

    /// Check if store is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Get provider name for logging
    fn name(&self) -> &str;
}
