//! Configuration for the RAG system

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main RAG system configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Ollama/LLM configuration (local backend and embeddings)
    pub llm: LlmConfig,
    /// External LLM backend configuration
    pub external: ExternalLlmConfig,
    /// Search defaults per call site
    pub retrieval: RetrievalConfig,
    /// Data loading configuration
    pub ingest: IngestConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    /// Load from `RAG_CONFIG` (if set), then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("RAG_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("RAG_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("RAG_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("RAG_PORT is not a valid port: {}", port)))?;
        }
        if let Ok(url) = std::env::var("OLLAMA_BASE_URL") {
            self.llm.base_url = url;
        }
        Ok(())
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.llm.max_retries > MAX_LLM_RETRIES {
            return Err(Error::Config(format!(
                "llm.max_retries must be at most {}, got {}",
                MAX_LLM_RETRIES, self.llm.max_retries
            )));
        }

        let r = &self.retrieval;
        for (name, value) in [
            ("search_threshold", r.search_threshold),
            ("filtered_threshold", r.filtered_threshold),
            ("generation_threshold", r.generation_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "retrieval.{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if r.default_top_k == 0 || r.generation_top_k == 0 || r.max_top_k == 0 {
            return Err(Error::Config("retrieval top_k values must be positive".to_string()));
        }
        if r.default_top_k > r.max_top_k || r.generation_top_k > r.max_top_k {
            return Err(Error::Config(format!(
                "retrieval top_k defaults cannot exceed max_top_k ({})",
                r.max_top_k
            )));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Upper bound on `llm.max_retries`
pub const MAX_LLM_RETRIES: u32 = 10;

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Chat model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            generate_model: "llama3.2:3b".to_string(),
            temperature: 0.3,
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

/// External LLM endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalLlmConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ExternalLlmConfig {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}

/// Search defaults. Thresholds differ by call site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// top_k when the caller gives none
    pub default_top_k: usize,
    /// Largest top_k a caller may request
    pub max_top_k: usize,
    /// Threshold for open search
    pub search_threshold: f32,
    /// Threshold for period-filtered search
    pub filtered_threshold: f32,
    /// top_k for generation-context retrieval
    pub generation_top_k: usize,
    /// Threshold for generation-context retrieval
    pub generation_threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_top_k: 5,
            max_top_k: 100,
            search_threshold: 0.75,
            filtered_threshold: 0.7,
            generation_top_k: 5,
            generation_threshold: 0.6,
        }
    }
}

/// Data loading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// CSV file loaded by `POST /api/rag/load-data` and on startup
    pub data_path: PathBuf,
    /// Ingest `data_path` before the server starts accepting requests
    pub load_on_startup: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/macroeconimic-indicator-2007-2017-by-monetary-sector.csv"),
            load_on_startup: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_call_sites() {
        let config = RagConfig::default();
        assert_eq!(config.retrieval.default_top_k, 5);
        assert_eq!(config.retrieval.search_threshold, 0.75);
        assert_eq!(config.retrieval.filtered_threshold, 0.7);
        assert_eq!(config.retrieval.generation_threshold, 0.6);
        assert!(!config.ingest.load_on_startup);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 9090\n\n[retrieval]\nsearch_threshold = 0.5").unwrap();

        let config = RagConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.retrieval.search_threshold, 0.5);
        assert_eq!(config.retrieval.filtered_threshold, 0.7);
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let mut config = RagConfig::default();
        config.retrieval.generation_threshold = 1.5;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_excessive_retries_rejected() {
        let mut config = RagConfig::default();
        config.llm.max_retries = 64;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.llm.max_retries = MAX_LLM_RETRIES;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_top_k_above_max_rejected() {
        let mut config = RagConfig::default();
        config.retrieval.max_top_k = 3;
        assert!(config.validate().is_err());
    }
}
