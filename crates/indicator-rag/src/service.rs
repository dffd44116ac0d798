//! The RAG service: ingestion, search and grounded answers over one store

use std::path::Path;
use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::generation::{Backend, GenerationDispatcher, LocalBackend};
use crate::ingestion::IndexWriter;
use crate::providers::{
    ChatModel, EmbeddingProvider, InMemoryVectorStore, OllamaProvider, VectorStoreProvider,
};
use crate::retrieval::Retriever;
use crate::types::{GenerationResult, IndicatorRecord, Match, SearchParams};

/// Entry point shared by the HTTP layer and the startup loader
pub struct RagService {
    config: RagConfig,
    store: Arc<dyn VectorStoreProvider>,
    chat: Arc<dyn ChatModel>,
    writer: IndexWriter,
    retriever: Arc<Retriever>,
    dispatcher: GenerationDispatcher,
}

impl RagService {
    /// Wire the service against Ollama and an in-memory store
    pub fn from_config(config: RagConfig) -> Result<Self> {
        let (embedder, chat) = OllamaProvider::new(&config.llm)?.split();
        tracing::info!(
            "Ollama providers ready (embed: {}, chat: {})",
            config.llm.embed_model,
            config.llm.generate_model
        );

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(embedder);
        let store = Arc::new(InMemoryVectorStore::new(embedder));
        Self::new(config, store, Arc::new(chat))
    }

    /// Wire the service against explicit providers
    pub fn new(
        config: RagConfig,
        store: Arc<dyn VectorStoreProvider>,
        chat: Arc<dyn ChatModel>,
    ) -> Result<Self> {
        let retriever = Arc::new(Retriever::new(Arc::clone(&store), config.retrieval.clone()));
        let dispatcher = GenerationDispatcher::new(
            Arc::clone(&retriever),
            Arc::new(LocalBackend::new(Arc::clone(&chat))),
            &config.external,
        )?;

        Ok(Self {
            writer: IndexWriter::new(Arc::clone(&store)),
            config,
            store,
            chat,
            retriever,
            dispatcher,
        })
    }

    /// Service configuration
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Load the configured data file
    pub async fn load_default(&self) -> Result<usize> {
        self.ingest_path(&self.config.ingest.data_path).await
    }

    /// Load a CSV file; returns the number of units stored
    pub async fn ingest_path(&self, path: &Path) -> Result<usize> {
        tracing::info!("Loading indicator data from {}", path.display());
        self.writer.ingest_csv(path).await
    }

    /// Store already-parsed rows tagged with `source`
    pub async fn ingest(&self, rows: &[IndicatorRecord], source: &str) -> Result<usize> {
        self.writer.ingest(rows, source).await
    }

    /// Open similarity search
    pub async fn search(&self, query: &str, params: SearchParams) -> Result<Vec<Match>> {
        self.retriever.search_open(query, params).await
    }

    /// Similarity search restricted to one reporting period
    pub async fn search_filtered(
        &self,
        query: &str,
        year: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<Match>> {
        self.retriever.search_by_period(query, year, top_k).await
    }

    /// Answer a prompt. Never fails: a blank prompt, a retrieval failure or a
    /// backend failure each come back as a fallback result.
    pub async fn ask(&self, prompt: &str, backend: &Backend) -> GenerationResult {
        tracing::info!("Answering prompt with {:?} backend", backend);

        let result = self.dispatcher.generate(prompt, backend).await;
        if result.is_fallback() {
            tracing::warn!("Answer fell back ({:?})", result.kind);
        }
        result
    }

    /// Whether the local chat model answers its health check
    pub async fn llm_available(&self) -> bool {
        match self.chat.health_check().await {
            Ok(ok) => ok,
            Err(e) => {
                tracing::debug!("{} health check failed: {}", self.chat.name(), e);
                false
            }
        }
    }

    /// Number of stored units
    pub async fn stored_units(&self) -> Result<usize> {
        self.store.len().await
    }
}
