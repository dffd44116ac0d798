//! Similarity search over the indicator store

use std::sync::Arc;
use std::time::Instant;

use crate::config::RetrievalConfig;
use crate::error::{Error, Result};
use crate::providers::VectorStoreProvider;
use crate::types::record::keys;
use crate::types::{Match, MetadataFilter, SearchParams, SearchQuery};

/// Issues open and filtered similarity queries against the vector store
pub struct Retriever {
    store: Arc<dyn VectorStoreProvider>,
    config: RetrievalConfig,
}

impl Retriever {
    /// Create a retriever over `store`
    pub fn new(store: Arc<dyn VectorStoreProvider>, config: RetrievalConfig) -> Self {
        Self { store, config }
    }

    /// Search defaults
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Run a validated query. The store's ranking is kept as-is; anything it
    /// returns below the threshold or past `top_k` is dropped.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Match>> {
        query.validate()?;

        let start = Instant::now();
        let mut matches = self.store.similarity_search(query).await.map_err(|e| match e {
            Error::VectorStore(_) => e,
            other => Error::vector_store(other.to_string()),
        })?;

        let returned = matches.len();
        matches.retain(|m| m.score >= query.similarity_threshold);
        matches.truncate(query.top_k);
        if matches.len() < returned {
            tracing::debug!(
                "{} returned {} matches outside top_k/threshold; dropped",
                self.store.name(),
                returned - matches.len()
            );
        }

        tracing::info!(
            "Found {} matches for \"{}\" in {}ms",
            matches.len(),
            query.text,
            start.elapsed().as_millis()
        );

        Ok(matches)
    }

    /// Open search with caller-supplied (already parsed) parameters
    pub async fn search_open(&self, text: &str, params: SearchParams) -> Result<Vec<Match>> {
        let query = SearchQuery {
            text: text.to_string(),
            top_k: params.top_k.unwrap_or(self.config.default_top_k),
            similarity_threshold: params.threshold.unwrap_or(self.config.search_threshold),
            filter: None,
        };
        self.search(&query).await
    }

    /// Search restricted to one reporting period
    pub async fn search_by_period(
        &self,
        text: &str,
        period: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<Match>> {
        if period.trim().is_empty() {
            return Err(Error::validation("Year cannot be empty"));
        }
        tracing::info!("Searching for \"{}\" in period {}", text, period);

        let query = SearchQuery {
            text: text.to_string(),
            top_k: top_k.unwrap_or(self.config.default_top_k),
            similarity_threshold: self.config.filtered_threshold,
            filter: Some(MetadataFilter::eq(keys::YEAR, period.trim())),
        };
        self.search(&query).await
    }

    /// Retrieval used to build generation context
    pub async fn retrieve_context(&self, text: &str) -> Result<Vec<Match>> {
        let query = SearchQuery {
            text: text.to_string(),
            top_k: self.config.generation_top_k,
            similarity_threshold: self.config.generation_threshold,
            filter: None,
        };
        self.search(&query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use crate::types::{IndexableUnit, Metadata};

    /// Returns canned matches regardless of the query and records calls
    #[derive(Default)]
    struct CannedStore {
        matches: Vec<Match>,
        fail: bool,
        calls: Mutex<Vec<SearchQuery>>,
    }

    impl CannedStore {
        fn with_scores(scores: &[f32]) -> Self {
            let matches = scores
                .iter()
                .enumerate()
                .map(|(i, &s)| Match::new(format!("unit {}", i), Metadata::new(), s))
                .collect();
            Self {
                matches,
                ..Default::default()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl VectorStoreProvider for CannedStore {
        async fn add(&self, _units: Vec<IndexableUnit>) -> Result<()> {
            Ok(())
        }

        async fn similarity_search(&self, query: &SearchQuery) -> Result<Vec<Match>> {
            self.calls.lock().push(query.clone());
            if self.fail {
                return Err(Error::vector_store("connection refused"));
            }
            Ok(self.matches.clone())
        }

        async fn len(&self) -> Result<usize> {
            Ok(self.matches.len())
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    fn retriever(store: &Arc<CannedStore>) -> Retriever {
        Retriever::new(store.clone(), RetrievalConfig::default())
    }

    #[tokio::test]
    async fn test_threshold_and_order() {
        let store = Arc::new(CannedStore::with_scores(&[0.9, 0.8, 0.6]));
        let query = SearchQuery::new("revenue").with_top_k(3).with_threshold(0.75);

        let matches = retriever(&store).search(&query).await.unwrap();

        let scores: Vec<f32> = matches.iter().map(|m| m.score).collect();
        assert_eq!(scores, vec![0.9, 0.8]);
        assert_eq!(matches[0].content, "unit 0");
    }

    #[tokio::test]
    async fn test_store_order_is_not_resorted() {
        let store = Arc::new(CannedStore::with_scores(&[0.8, 0.95, 0.85]));
        let query = SearchQuery::new("revenue").with_top_k(2).with_threshold(0.5);

        let matches = retriever(&store).search(&query).await.unwrap();
        let contents: Vec<&str> = matches.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["unit 0", "unit 1"]);
    }

    #[tokio::test]
    async fn test_blank_text_never_reaches_store() {
        let store = Arc::new(CannedStore::with_scores(&[0.9]));
        for text in ["", "   ", "\n"] {
            let err = retriever(&store).search(&SearchQuery::new(text)).await.unwrap_err();
            assert!(err.is_validation());
        }
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_zero_matches_is_ok() {
        let store = Arc::new(CannedStore::default());
        let matches = retriever(&store).search(&SearchQuery::new("debt")).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_store_error() {
        let store = Arc::new(CannedStore {
            fail: true,
            ..Default::default()
        });
        let err = retriever(&store).search(&SearchQuery::new("debt")).await.unwrap_err();
        assert!(matches!(err, Error::VectorStore(_)));
    }

    #[tokio::test]
    async fn test_open_search_defaults() {
        let store = Arc::new(CannedStore::default());
        retriever(&store)
            .search_open("revenue", SearchParams::default())
            .await
            .unwrap();

        let calls = store.calls.lock();
        assert_eq!(calls[0].top_k, 5);
        assert_eq!(calls[0].similarity_threshold, 0.75);
        assert!(calls[0].filter.is_none());
    }

    #[tokio::test]
    async fn test_period_search_builds_structured_filter() {
        let store = Arc::new(CannedStore::default());
        retriever(&store)
            .search_by_period("revenue", "2007/08' OR '1'='1", Some(3))
            .await
            .unwrap();

        let calls = store.calls.lock();
        assert_eq!(calls[0].top_k, 3);
        assert_eq!(calls[0].similarity_threshold, 0.7);
        assert_eq!(
            calls[0].filter,
            Some(MetadataFilter::eq("year", "2007/08' OR '1'='1"))
        );
    }

    #[tokio::test]
    async fn test_period_search_requires_period() {
        let store = Arc::new(CannedStore::default());
        let err = retriever(&store)
            .search_by_period("revenue", " ", None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Year cannot be empty");
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_context_retrieval_defaults() {
        let store = Arc::new(CannedStore::default());
        retriever(&store).retrieve_context("revenue").await.unwrap();

        let calls = store.calls.lock();
        assert_eq!(calls[0].top_k, 5);
        assert_eq!(calls[0].similarity_threshold, 0.6);
    }
}
