//! Vector index abstraction and built-in implementations.
//!
//! The index owns physical storage and candidate selection. Candidate order is
//! advisory: the memory store always re-scores what the index returns.

mod file;
mod memory;

pub use file::FileIndex;
pub use memory::InMemoryIndex;

use crate::error::IndexError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Storage-boundary form of a memory record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexEntry {
    /// Record identifier, unique within a collection.
    pub id: String,
    /// Stored document text.
    pub document: String,
    /// Stored embedding.
    pub embedding: Vec<f32>,
    /// String-typed metadata.
    pub metadata: BTreeMap<String, String>,
}

/// Handle to a collection inside an index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionHandle {
    name: String,
}

impl CollectionHandle {
    /// Create a handle for the named collection.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Outcome of a create-if-absent collection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// The collection did not exist and was created.
    Created,
    /// The collection already existed.
    AlreadyExists,
}

#[async_trait]
/// Persistent vector index used by the memory store.
pub trait VectorIndex: Send + Sync {
    /// Create the named collection unless it already exists.
    async fn create_collection_if_absent(
        &self,
        name: &str,
    ) -> Result<(CollectionHandle, CollectionStatus), IndexError>;

    /// Add one entry to a collection.
    async fn add(&self, collection: &CollectionHandle, entry: IndexEntry)
    -> Result<(), IndexError>;

    /// Return up to `top_k` nearest entries, including vectors, metadata and documents.
    async fn query(
        &self,
        collection: &CollectionHandle,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<IndexEntry>, IndexError>;

    /// Delete one entry by id.
    async fn delete(&self, collection: &CollectionHandle, id: &str) -> Result<(), IndexError>;

    /// Delete a whole collection, returning whether it existed.
    async fn delete_collection(&self, name: &str) -> Result<bool, IndexError>;
}

/// Squared euclidean distance, the native metric of the built-in indexes.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}

/// Brute-force nearest-neighbour selection over a slice of entries.
///
/// Entries whose width differs from the query are not candidates.
fn nearest(entries: &[IndexEntry], query: &[f32], top_k: usize) -> Vec<IndexEntry> {
    let mut ranked: Vec<(f32, &IndexEntry)> = entries
        .iter()
        .filter(|entry| entry.embedding.len() == query.len())
        .map(|entry| (squared_l2(query, &entry.embedding), entry))
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
    ranked
        .into_iter()
        .take(top_k)
        .map(|(_, entry)| entry.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(id: &str, embedding: Vec<f32>) -> IndexEntry {
        IndexEntry {
            id: id.to_string(),
            document: id.to_string(),
            embedding,
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn nearest_orders_by_distance_and_truncates() {
        let entries = vec![
            entry("far", vec![10.0, 10.0]),
            entry("near", vec![1.0, 1.0]),
            entry("mid", vec![3.0, 3.0]),
        ];
        let ids: Vec<String> = nearest(&entries, &[0.0, 0.0], 2)
            .into_iter()
            .map(|entry| entry.id)
            .collect();
        assert_eq!(ids, vec!["near".to_string(), "mid".to_string()]);
    }

    #[test]
    fn nearest_skips_mismatched_dimensions() {
        let entries = vec![
            entry("short", vec![0.0]),
            entry("ok", vec![9.0, 9.0]),
            entry("long", vec![0.0, 0.0, 0.0]),
        ];
        let ids: Vec<String> = nearest(&entries, &[0.0, 0.0], 3)
            .into_iter()
            .map(|entry| entry.id)
            .collect();
        assert_eq!(ids, vec!["ok".to_string()]);
    }
}
