//! Embedding provider abstraction and built-in providers.

mod hashing;
mod openai;

pub use hashing::HashingEmbedder;
pub use openai::OpenAiEmbedder;

use crate::error::MemoryError;
use async_trait::async_trait;

#[async_trait]
/// Turns text into fixed-length vectors.
///
/// Implementations must be deterministic for identical input within a
/// session. Failures are reported as [`MemoryError::Embedding`] and are not
/// retried by the memory store.
pub trait Embedder: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError>;
}
