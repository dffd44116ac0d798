//! Indicator ingestion: CSV parsing, normalization and bulk indexing

pub mod csv_loader;
pub mod normalizer;
mod writer;

pub use csv_loader::{load_csv, read_records};
pub use normalizer::{normalize, Rejected};
pub use writer::IndexWriter;
