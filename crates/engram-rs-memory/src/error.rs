//! Error types for memory operations.

/// Errors returned by the memory store and its helpers.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The segmenter could not load or failed to segment text.
    #[error("segmenter error: {0}")]
    Segmenter(String),
    /// The embedding provider failed.
    #[error("embedding error: {0}")]
    Embedding(String),
    /// No non-zero query/candidate pair exists to score.
    #[error("invalid vectors, cannot compute cosine similarity scores for zero vectors")]
    DegenerateVectors,
    /// A candidate embedding does not match the query dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// Vector index error.
    #[error("index error: {0}")]
    Index(#[from] IndexError),
    /// A stored entry is missing required metadata.
    #[error("corrupt record: {0}")]
    CorruptRecord(String),
}

/// Errors returned by vector index implementations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The backing index could not be reached.
    #[error("index unreachable: {0}")]
    Unreachable(String),
    /// The collection name cannot be used by this index.
    #[error("invalid collection name: {0}")]
    InvalidName(String),
    /// The named collection does not exist.
    #[error("collection not found: {0}")]
    CollectionNotFound(String),
    /// No record with the given id exists in the collection.
    #[error("record not found: {0}")]
    RecordNotFound(String),
    /// A record with the given id already exists in the collection.
    #[error("duplicate record id: {0}")]
    DuplicateId(String),
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
