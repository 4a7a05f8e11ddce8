//! Semantic memory for conversational agents.
//!
//! Text is split into sentence-aligned chunks, embedded and persisted in a
//! per-agent vector collection. Queries embed the input, fetch candidates from
//! the index and re-score them locally with cosine similarity.

pub mod chunker;
pub mod collection;
pub mod embedder;
pub mod error;
pub mod index;
pub mod model;
pub mod recall;
pub mod segmenter;
pub mod similarity;
pub mod store;

/// Chunking entry points.
pub use chunker::{Chunk, chunk_content, chunk_document};
/// Collection naming helpers.
pub use collection::{camel_to_snake, collection_name};
/// Embedding providers.
pub use embedder::{Embedder, HashingEmbedder, OpenAiEmbedder};
/// Memory error types.
pub use error::{IndexError, MemoryError};
/// Vector index interface and built-in indexes.
pub use index::{
    CollectionHandle, CollectionStatus, FileIndex, InMemoryIndex, IndexEntry, VectorIndex,
};
/// Memory record model.
pub use model::{MemoryRecord, ScoredMemory};
/// Recall options.
pub use recall::QueryOptions;
/// Linguistic segmentation.
pub use segmenter::{PartOfSpeech, RuleSegmenter, Segmentation, Segmenter, Sentence, Token};
/// Similarity scoring.
pub use similarity::cosine_similarity_scores;
/// Memory store.
pub use store::{MemoryStore, MemoryStoreConfig};
