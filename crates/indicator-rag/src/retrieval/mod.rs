//! Vector retrieval

pub mod search;

pub use search::Retriever;
