//! Local in-process vector store
//!
//! Exact cosine search over every stored unit. Suitable for the indicator
//! corpus, which is a few thousand short sentences.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{IndexableUnit, Match, Metadata, SearchQuery};

use super::embedding::EmbeddingProvider;
use super::vector_store::VectorStoreProvider;

struct StoredUnit {
    content: String,
    metadata: Metadata,
    embedding: Vec<f32>,
}

/// In-memory vector store that embeds units on `add`
pub struct InMemoryVectorStore {
    embedder: Arc<dyn EmbeddingProvider>,
    units: RwLock<Vec<StoredUnit>>,
}

impl InMemoryVectorStore {
    /// Create an empty store backed by `embedder`
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            units: RwLock::new(Vec::new()),
        }
    }

    /// Dimensionality of stored vectors, if any unit is stored
    fn dimensions(&self) -> Option<usize> {
        self.units.read().first().map(|u| u.embedding.len())
    }
}

#[async_trait]
impl VectorStoreProvider for InMemoryVectorStore {
    async fn add(&self, units: Vec<IndexableUnit>) -> Result<()> {
        if units.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = units.iter().map(|u| u.content().to_string()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != units.len() {
            return Err(Error::vector_store(format!(
                "Embedder returned {} vectors for {} units",
                embeddings.len(),
                units.len()
            )));
        }

        let expected = self
            .dimensions()
            .or_else(|| embeddings.first().map(Vec::len))
            .unwrap_or(0);
        if expected == 0 || embeddings.iter().any(|e| e.len() != expected) {
            return Err(Error::vector_store(
                "Embeddings have inconsistent or zero dimensions",
            ));
        }

        let stored: Vec<StoredUnit> = units
            .into_iter()
            .zip(embeddings)
            .map(|(unit, embedding)| {
                let (content, metadata) = unit.into_parts();
                StoredUnit {
                    content,
                    metadata,
                    embedding,
                }
            })
            .collect();

        let count = stored.len();
        self.units.write().extend(stored);
        tracing::debug!("Stored {} units in {}", count, self.name());

        Ok(())
    }

    async fn similarity_search(&self, query: &SearchQuery) -> Result<Vec<Match>> {
        let query_embedding = self.embedder.embed(&query.text).await?;

        let units = self.units.read();
        let mut matches: Vec<Match> = units
            .iter()
            .filter(|u| {
                query
                    .filter
                    .as_ref()
                    .map_or(true, |f| f.matches(&u.metadata))
            })
            .filter_map(|u| {
                let score = cosine_similarity(&query_embedding, &u.embedding)?;
                (score >= query.similarity_threshold)
                    .then(|| Match::new(u.content.clone(), u.metadata.clone(), score))
            })
            .collect();
        drop(units);

        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        matches.truncate(query.top_k);

        Ok(matches)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.units.read().len())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

/// Cosine similarity; `None` for mismatched or zero-length vectors
fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let x = f64::from(x);
        let y = f64::from(y);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        return None;
    }
    Some((dot / denom) as f32)
}
