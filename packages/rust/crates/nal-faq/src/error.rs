//! Error types for the FAQ pipeline.
//!
//! Library crates use `thiserror` for explicit error enums; the service crate
//! wraps these in `anyhow` at the process boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Error types for knowledge loading, dictionary loading and embedding.
#[derive(Error, Debug)]
pub enum FaqError {
    /// Knowledge source file does not exist.
    #[error("Knowledge file not found: {}", .0.display())]
    KnowledgeNotFound(PathBuf),

    /// Knowledge source could not be decoded as CSV.
    #[error("Knowledge file could not be decoded: {0}")]
    Csv(#[from] csv::Error),

    /// Knowledge header lacks a required column.
    #[error("Knowledge file is missing required column `{0}`")]
    MissingColumn(&'static str),

    /// A knowledge row has an empty question or answer.
    #[error("Knowledge row {row} has a blank `{column}`")]
    BlankField {
        /// 1-based data row (header excluded).
        row: usize,
        /// Column name.
        column: &'static str,
    },

    /// Knowledge source contains a header but no rows.
    #[error("Knowledge file contains no rows")]
    EmptyKnowledge,

    /// Embedding provider failed or was unreachable.
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// Embedding provider returned a different number of vectors than requested.
    #[error("Embedding count mismatch: expected {expected}, got {actual}")]
    EmbeddingCount {
        /// Number of texts sent.
        expected: usize,
        /// Number of vectors received.
        actual: usize,
    },

    /// Low-level I/O error from std::io.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for the FAQ pipeline.
pub type Result<T> = std::result::Result<T, FaqError>;
