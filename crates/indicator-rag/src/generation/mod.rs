//! Answer generation: context assembly, backends and the fallback dispatcher

pub mod backends;
pub mod dispatcher;
pub mod ollama;
pub mod prompt;

pub use backends::{
    BackendError, ExternalBackend, GenerationBackend, GenerationPrompt, LocalBackend,
    EXTERNAL_ERROR_FALLBACK, LOCAL_ERROR_FALLBACK, NO_CONTEXT_FALLBACK,
    UNEXPECTED_FORMAT_FALLBACK,
};
pub use dispatcher::{Backend, GenerationDispatcher};
pub use ollama::OllamaClient;
pub use prompt::PromptBuilder;
