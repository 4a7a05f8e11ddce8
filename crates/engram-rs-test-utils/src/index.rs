use async_trait::async_trait;
use chrono::Utc;
use engram_rs_memory::{
    CollectionHandle, CollectionStatus, InMemoryIndex, IndexEntry, IndexError, MemoryRecord,
    VectorIndex,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Build a well-formed stored entry for `text` with a chosen embedding.
pub fn memory_entry(text: &str, embedding: Vec<f32>) -> IndexEntry {
    MemoryRecord::new(text, embedding, "test", false, Utc::now()).to_entry()
}

/// One call observed by [`RecordingIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexCall {
    CreateCollection(String),
    Add { collection: String, id: String },
    Query { collection: String, top_k: usize },
    Delete { collection: String, id: String },
    DeleteCollection(String),
}

/// In-memory index that records every call made against it.
#[derive(Debug, Default)]
pub struct RecordingIndex {
    inner: InMemoryIndex,
    calls: Arc<Mutex<Vec<IndexCall>>>,
}

impl RecordingIndex {
    pub fn new() -> (Self, Arc<Mutex<Vec<IndexCall>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                inner: InMemoryIndex::new(),
                calls: calls.clone(),
            },
            calls,
        )
    }

    pub fn inner(&self) -> &InMemoryIndex {
        &self.inner
    }
}

#[async_trait]
impl VectorIndex for RecordingIndex {
    async fn create_collection_if_absent(
        &self,
        name: &str,
    ) -> Result<(CollectionHandle, CollectionStatus), IndexError> {
        self.calls
            .lock()
            .push(IndexCall::CreateCollection(name.to_string()));
        self.inner.create_collection_if_absent(name).await
    }

    async fn add(
        &self,
        collection: &CollectionHandle,
        entry: IndexEntry,
    ) -> Result<(), IndexError> {
        self.calls.lock().push(IndexCall::Add {
            collection: collection.name().to_string(),
            id: entry.id.clone(),
        });
        self.inner.add(collection, entry).await
    }

    async fn query(
        &self,
        collection: &CollectionHandle,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<IndexEntry>, IndexError> {
        self.calls.lock().push(IndexCall::Query {
            collection: collection.name().to_string(),
            top_k,
        });
        self.inner.query(collection, query, top_k).await
    }

    async fn delete(&self, collection: &CollectionHandle, id: &str) -> Result<(), IndexError> {
        self.calls.lock().push(IndexCall::Delete {
            collection: collection.name().to_string(),
            id: id.to_string(),
        });
        self.inner.delete(collection, id).await
    }

    async fn delete_collection(&self, name: &str) -> Result<bool, IndexError> {
        self.calls
            .lock()
            .push(IndexCall::DeleteCollection(name.to_string()));
        self.inner.delete_collection(name).await
    }
}

/// Index whose queries always return the same candidates, in the given order.
#[derive(Debug, Clone, Default)]
pub struct StaticIndex {
    entries: Vec<IndexEntry>,
}

impl StaticIndex {
    pub fn new(entries: Vec<IndexEntry>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl VectorIndex for StaticIndex {
    async fn create_collection_if_absent(
        &self,
        name: &str,
    ) -> Result<(CollectionHandle, CollectionStatus), IndexError> {
        Ok((CollectionHandle::new(name), CollectionStatus::AlreadyExists))
    }

    async fn add(
        &self,
        _collection: &CollectionHandle,
        _entry: IndexEntry,
    ) -> Result<(), IndexError> {
        Ok(())
    }

    async fn query(
        &self,
        _collection: &CollectionHandle,
        _query: &[f32],
        _top_k: usize,
    ) -> Result<Vec<IndexEntry>, IndexError> {
        Ok(self.entries.clone())
    }

    async fn delete(&self, _collection: &CollectionHandle, _id: &str) -> Result<(), IndexError> {
        Ok(())
    }

    async fn delete_collection(&self, _name: &str) -> Result<bool, IndexError> {
        Ok(true)
    }
}

/// Index that fails every call as unreachable.
#[derive(Debug, Clone, Default)]
pub struct UnreachableIndex;

impl UnreachableIndex {
    fn error() -> IndexError {
        IndexError::Unreachable("connection refused".to_string())
    }
}

#[async_trait]
impl VectorIndex for UnreachableIndex {
    async fn create_collection_if_absent(
        &self,
        _name: &str,
    ) -> Result<(CollectionHandle, CollectionStatus), IndexError> {
        Err(Self::error())
    }

    async fn add(
        &self,
        _collection: &CollectionHandle,
        _entry: IndexEntry,
    ) -> Result<(), IndexError> {
        Err(Self::error())
    }

    async fn query(
        &self,
        _collection: &CollectionHandle,
        _query: &[f32],
        _top_k: usize,
    ) -> Result<Vec<IndexEntry>, IndexError> {
        Err(Self::error())
    }

    async fn delete(&self, _collection: &CollectionHandle, _id: &str) -> Result<(), IndexError> {
        Err(Self::error())
    }

    async fn delete_collection(&self, _name: &str) -> Result<bool, IndexError> {
        Err(Self::error())
    }
}
