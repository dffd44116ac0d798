//! Retrieval-grounded generation with graceful fallbacks

use std::sync::Arc;
use std::time::Duration;

use crate::config::ExternalLlmConfig;
use crate::error::{Error, Result};
use crate::retrieval::Retriever;
use crate::types::{GenerationResult, ResultKind};

use super::backends::{
    BackendError, ExternalBackend, GenerationBackend, GenerationPrompt, NO_CONTEXT_FALLBACK,
    UNEXPECTED_FORMAT_FALLBACK,
};
use super::prompt::PromptBuilder;

/// Which backend answers a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// The configured local chat model
    Local,
    /// A caller-chosen HTTP endpoint
    External {
        /// Absolute http(s) URL
        endpoint: reqwest::Url,
    },
}

impl Backend {
    /// Parse and check a caller-supplied external URL
    pub fn external(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::validation("External LLM URL cannot be empty"));
        }
        let endpoint = reqwest::Url::parse(url)
            .map_err(|e| Error::validation(format!("Invalid external LLM URL: {}", e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::validation(format!(
                "Invalid external LLM URL: unsupported scheme '{}'",
                endpoint.scheme()
            )));
        }
        Ok(Self::External { endpoint })
    }
}

/// Runs retrieve → assemble → generate and always yields a text answer
pub struct GenerationDispatcher {
    retriever: Arc<Retriever>,
    local: Arc<dyn GenerationBackend>,
    http: reqwest::Client,
}

impl GenerationDispatcher {
    /// Create a dispatcher; `config` bounds every external call
    pub fn new(
        retriever: Arc<Retriever>,
        local: Arc<dyn GenerationBackend>,
        config: &ExternalLlmConfig,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            retriever,
            local,
            http,
        })
    }

    /// Answer `query` with the chosen backend. Failures become fallback
    /// texts; a backend is called at most once and only with non-empty context.
    pub async fn generate(&self, query: &str, backend: &Backend) -> GenerationResult {
        match backend {
            Backend::Local => self.run(query, self.local.as_ref()).await,
            Backend::External { endpoint } => {
                let external = ExternalBackend::new(self.http.clone(), endpoint.clone());
                self.run(query, &external).await
            }
        }
    }

    async fn run(&self, query: &str, backend: &dyn GenerationBackend) -> GenerationResult {
        let matches = match self.retriever.retrieve_context(query).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::error!("Retrieval for {} backend failed: {}", backend.name(), e);
                return GenerationResult::fallback(ResultKind::Error, backend.error_fallback());
            }
        };

        if matches.is_empty() {
            tracing::info!("No relevant data for \"{}\"; skipping {} backend", query, backend.name());
            return GenerationResult::fallback(ResultKind::NoContext, NO_CONTEXT_FALLBACK);
        }

        let prompt = GenerationPrompt {
            user_query: query.to_string(),
            context: PromptBuilder::assemble(&matches),
        };
        tracing::debug!("Context for {} backend:\n{}", backend.name(), prompt.context);

        match backend.generate(&prompt).await {
            Ok(text) => GenerationResult::completion(text),
            Err(BackendError::UnexpectedFormat(body)) => {
                tracing::warn!("{} backend reply had no completion: {}", backend.name(), body);
                GenerationResult::fallback(ResultKind::UnexpectedFormat, UNEXPECTED_FORMAT_FALLBACK)
            }
            Err(e) => {
                tracing::error!("{} backend failed: {}", backend.name(), e);
                GenerationResult::fallback(ResultKind::Error, backend.error_fallback())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetrievalConfig;
    use crate::generation::backends::LOCAL_ERROR_FALLBACK;
    use crate::providers::VectorStoreProvider;
    use crate::types::{IndexableUnit, Match, Metadata, SearchQuery};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedStore {
        matches: Vec<Match>,
        fail: bool,
    }

    #[async_trait]
    impl VectorStoreProvider for FixedStore {
        async fn add(&self, _units: Vec<IndexableUnit>) -> Result<()> {
            Ok(())
        }

        async fn similarity_search(&self, _query: &SearchQuery) -> Result<Vec<Match>> {
            if self.fail {
                return Err(Error::vector_store("connection refused"));
            }
            Ok(self.matches.clone())
        }

        async fn len(&self) -> Result<usize> {
            Ok(self.matches.len())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[derive(Default)]
    struct CountingBackend {
        calls: AtomicUsize,
        prompts: Mutex<Vec<GenerationPrompt>>,
        fail: bool,
    }

    #[async_trait]
    impl GenerationBackend for CountingBackend {
        async fn generate(&self, prompt: &GenerationPrompt) -> std::result::Result<String, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().push(prompt.clone());
            if self.fail {
                return Err(BackendError::Unavailable("timeout".to_string()));
            }
            Ok("answer".to_string())
        }

        fn error_fallback(&self) -> &'static str {
            LOCAL_ERROR_FALLBACK
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn dispatcher(store: FixedStore, backend: Arc<CountingBackend>) -> GenerationDispatcher {
        let retriever = Arc::new(Retriever::new(Arc::new(store), RetrievalConfig::default()));
        GenerationDispatcher::new(retriever, backend, &ExternalLlmConfig::default()).unwrap()
    }

    fn revenue_match() -> Match {
        let mut metadata = Metadata::new();
        metadata.insert("indicator".to_string(), "Revenues".to_string());
        Match::new("In 2007/08, Revenues was 22.7 %", metadata, 0.9)
    }

    #[tokio::test]
    async fn test_completion_with_context() {
        let backend = Arc::new(CountingBackend::default());
        let store = FixedStore {
            matches: vec![revenue_match()],
            fail: false,
        };

        let result = dispatcher(store, backend.clone())
            .generate("revenues?", &Backend::Local)
            .await;

        assert_eq!(result, GenerationResult::completion("answer"));
        let prompts = backend.prompts.lock();
        assert_eq!(prompts[0].user_query, "revenues?");
        assert_eq!(
            prompts[0].context,
            "In 2007/08, Revenues was 22.7 % (Indicator: Revenues)"
        );
    }

    #[tokio::test]
    async fn test_no_context_never_calls_backend() {
        let backend = Arc::new(CountingBackend::default());
        let store = FixedStore {
            matches: Vec::new(),
            fail: false,
        };

        let result = dispatcher(store, backend.clone())
            .generate("revenues?", &Backend::Local)
            .await;

        assert_eq!(result.kind, ResultKind::NoContext);
        assert_eq!(result.text, NO_CONTEXT_FALLBACK);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_is_called_once() {
        let backend = Arc::new(CountingBackend {
            fail: true,
            ..Default::default()
        });
        let store = FixedStore {
            matches: vec![revenue_match()],
            fail: false,
        };

        let result = dispatcher(store, backend.clone())
            .generate("revenues?", &Backend::Local)
            .await;

        assert_eq!(result.kind, ResultKind::Error);
        assert_eq!(result.text, LOCAL_ERROR_FALLBACK);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retrieval_failure_uses_backend_fallback() {
        let backend = Arc::new(CountingBackend::default());
        let store = FixedStore {
            matches: Vec::new(),
            fail: true,
        };

        let result = dispatcher(store, backend.clone())
            .generate("revenues?", &Backend::Local)
            .await;

        assert_eq!(result.kind, ResultKind::Error);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_external_url_validation() {
        assert!(matches!(
            Backend::external("http://localhost:9000/generate"),
            Ok(Backend::External { .. })
        ));
        assert_eq!(
            Backend::external("  ").unwrap_err().to_string(),
            "External LLM URL cannot be empty"
        );
        assert!(Backend::external("not a url").unwrap_err().is_validation());
        assert!(Backend::external("ftp://host/file").unwrap_err().is_validation());
    }
}
