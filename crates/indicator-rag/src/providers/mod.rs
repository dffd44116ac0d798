//! Provider abstractions for embeddings, chat models and vector storage
//!
//! Trait objects let the service run against Ollama and the in-memory store
//! in production and against fakes in tests.

pub mod embedding;
pub mod llm;
pub mod local;
pub mod ollama;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use llm::ChatModel;
pub use local::InMemoryVectorStore;
pub use ollama::{OllamaChat, OllamaEmbedder, OllamaProvider};
pub use vector_store::VectorStoreProvider;
