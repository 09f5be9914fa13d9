//! Embedding provider seam.
//!
//! The pipeline treats the embedding model as a black box that maps text to a
//! fixed-length vector. Implementations must be deterministic for a given model
//! and return exactly one vector per input text.

use async_trait::async_trait;

use crate::error::{FaqError, Result};

/// Maps text to fixed-length float vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Short provider label (`http`, `tfidf`, ...) for logs and health output.
    fn name(&self) -> &str;

    /// Embed many texts; the result is index-aligned with `texts`.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let vectors = self.embed_batch(&texts).await?;
        let actual = vectors.len();
        let mut vectors = vectors.into_iter();
        match (vectors.next(), actual) {
            (Some(vector), 1) => Ok(vector),
            _ => Err(FaqError::EmbeddingCount {
                expected: 1,
                actual,
            }),
        }
    }
}
