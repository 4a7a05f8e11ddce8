//! Process-local vector index.

use super::{CollectionHandle, CollectionStatus, IndexEntry, VectorIndex, nearest};
use crate::error::IndexError;
use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory index keeping each collection as an insertion-ordered list.
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    collections: RwLock<HashMap<String, Vec<IndexEntry>>>,
}

impl InMemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in a collection, or None when it does not exist.
    pub fn entry_count(&self, name: &str) -> Option<usize> {
        self.collections.read().get(name).map(Vec::len)
    }

    /// Whether the named collection exists.
    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.read().contains_key(name)
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn create_collection_if_absent(
        &self,
        name: &str,
    ) -> Result<(CollectionHandle, CollectionStatus), IndexError> {
        let mut collections = self.collections.write();
        let status = if collections.contains_key(name) {
            CollectionStatus::AlreadyExists
        } else {
            collections.insert(name.to_string(), Vec::new());
            CollectionStatus::Created
        };
        Ok((CollectionHandle::new(name), status))
    }

    async fn add(
        &self,
        collection: &CollectionHandle,
        entry: IndexEntry,
    ) -> Result<(), IndexError> {
        let mut collections = self.collections.write();
        let entries = collections
            .get_mut(collection.name())
            .ok_or_else(|| IndexError::CollectionNotFound(collection.name().to_string()))?;
        if entries.iter().any(|existing| existing.id == entry.id) {
            return Err(IndexError::DuplicateId(entry.id));
        }
        entries.push(entry);
        Ok(())
    }

    async fn query(
        &self,
        collection: &CollectionHandle,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<IndexEntry>, IndexError> {
        let collections = self.collections.read();
        let entries = collections
            .get(collection.name())
            .ok_or_else(|| IndexError::CollectionNotFound(collection.name().to_string()))?;
        let results = nearest(entries, query, top_k);
        debug!(
            "in-memory query (collection={}, size={}, returned={})",
            collection.name(),
            entries.len(),
            results.len()
        );
        Ok(results)
    }

    async fn delete(&self, collection: &CollectionHandle, id: &str) -> Result<(), IndexError> {
        let mut collections = self.collections.write();
        let entries = collections
            .get_mut(collection.name())
            .ok_or_else(|| IndexError::CollectionNotFound(collection.name().to_string()))?;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Err(IndexError::RecordNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<bool, IndexError> {
        Ok(self.collections.write().remove(name).is_some())
    }
}
