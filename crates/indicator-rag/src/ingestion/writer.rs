//! Bulk writes of normalized units into the vector store

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::providers::VectorStoreProvider;
use crate::types::IndicatorRecord;

use super::csv_loader::load_csv;
use super::normalizer::normalize_all;

/// Normalizes rows and hands the survivors to the store in one call
pub struct IndexWriter {
    store: Arc<dyn VectorStoreProvider>,
}

impl IndexWriter {
    /// Create a writer over `store`
    pub fn new(store: Arc<dyn VectorStoreProvider>) -> Self {
        Self { store }
    }

    /// Store every valid row tagged with `source`; returns the stored count
    pub async fn ingest(&self, rows: &[IndicatorRecord], source: &str) -> Result<usize> {
        let batch = normalize_all(rows, source);
        let count = batch.units.len();

        tracing::info!(
            "Processing {} valid indicators ({} rejected) from {}",
            count,
            batch.rejected,
            source
        );

        if count == 0 {
            return Ok(0);
        }

        let start = Instant::now();
        self.store
            .add(batch.units)
            .await
            .map_err(|e| Error::ingest(source, e.to_string()))?;

        tracing::info!(
            "Stored {} units in {} in {}ms",
            count,
            self.store.name(),
            start.elapsed().as_millis()
        );

        Ok(count)
    }

    /// Load a CSV file and ingest it, tagging units with the file name
    pub async fn ingest_csv(&self, path: &Path) -> Result<usize> {
        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let rows = load_csv(path).map_err(|e| match e {
            Error::Ingest { .. } => e,
            other => Error::ingest(source.as_str(), other.to_string()),
        })?;

        self.ingest(&rows, &source).await
    }
}
