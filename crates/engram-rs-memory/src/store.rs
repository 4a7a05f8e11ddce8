//! Agent-scoped memory store: write, query, delete and wipe.

use crate::chunker::chunk_content;
use crate::collection::collection_name;
use crate::embedder::Embedder;
use crate::error::MemoryError;
use crate::index::{CollectionHandle, CollectionStatus, VectorIndex};
use crate::model::{MemoryRecord, ScoredMemory};
use crate::recall::QueryOptions;
use crate::segmenter::Segmenter;
use crate::similarity::cosine_similarity_scores;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt::Display;
use std::sync::Arc;

/// Default token budget per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// Identity and chunking settings for one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStoreConfig {
    /// Agent the memories belong to.
    pub agent_name: String,
    /// Partition number; 0 means the agent's primary collection.
    pub collection_number: u32,
    /// Maximum tokens per chunk.
    pub chunk_size: usize,
}

impl MemoryStoreConfig {
    /// Settings for the primary collection of `agent_name`.
    pub fn new(agent_name: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            collection_number: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Select a collection partition.
    pub fn with_collection_number(mut self, collection_number: u32) -> Self {
        self.collection_number = collection_number;
        self
    }

    /// Set the chunk token budget.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Collection name derived from the agent name and partition.
    pub fn collection_name(&self) -> String {
        collection_name(&self.agent_name, self.collection_number)
    }
}

/// Memory store bound to one agent collection.
///
/// The store owns no vectors itself. It chunks and embeds text on write, and
/// on query it re-scores whatever candidates the index returns with cosine
/// similarity before filtering and ranking.
pub struct MemoryStore {
    config: MemoryStoreConfig,
    collection_name: String,
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
    segmenter: Arc<dyn Segmenter>,
    last_timestamp: Mutex<Option<DateTime<Utc>>>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("config", &self.config)
            .field("collection_name", &self.collection_name)
            .field("embedder", &self.embedder.name())
            .finish_non_exhaustive()
    }
}

impl MemoryStore {
    /// Create a store over the given collaborators.
    pub fn new(
        config: MemoryStoreConfig,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
        segmenter: Arc<dyn Segmenter>,
    ) -> Self {
        let collection_name = config.collection_name();
        debug!(
            "created memory store (agent={}, collection={}, embedder={}, chunk_size={})",
            config.agent_name,
            collection_name,
            embedder.name(),
            config.chunk_size
        );
        Self {
            config,
            collection_name,
            index,
            embedder,
            segmenter,
            last_timestamp: Mutex::new(None),
        }
    }

    pub fn agent_name(&self) -> &str {
        &self.config.agent_name
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size
    }

    /// Open the agent's collection, creating it on first use.
    pub async fn ensure_collection(&self) -> Result<CollectionHandle, MemoryError> {
        let (handle, status) = self
            .index
            .create_collection_if_absent(&self.collection_name)
            .await?;
        if status == CollectionStatus::Created {
            info!(
                "created memory collection (agent={}, collection={})",
                self.config.agent_name, self.collection_name
            );
        }
        Ok(handle)
    }

    /// Chunk, embed and persist conversational text.
    ///
    /// Records written before a failure stay in the index.
    pub async fn write(&self, source_label: &str, text: impl Display) -> Result<(), MemoryError> {
        self.write_chunks(source_label, text.to_string(), false)
            .await
    }

    /// Like [`MemoryStore::write`] but marks the records as reference material.
    pub async fn write_reference(
        &self,
        source_label: &str,
        text: impl Display,
    ) -> Result<(), MemoryError> {
        self.write_chunks(source_label, text.to_string(), true)
            .await
    }

    async fn write_chunks(
        &self,
        source_label: &str,
        text: String,
        is_reference: bool,
    ) -> Result<(), MemoryError> {
        if text.trim().is_empty() {
            debug!(
                "skipped empty memory write (collection={}, source={})",
                self.collection_name, source_label
            );
            return Ok(());
        }
        let collection = self.ensure_collection().await?;
        let chunks = chunk_content(self.segmenter.as_ref(), &text, self.config.chunk_size)?;
        for chunk in &chunks {
            let embedding = self.embedder.embed(chunk).await?;
            let record = MemoryRecord::new(
                chunk,
                embedding,
                source_label,
                is_reference,
                self.next_timestamp(),
            );
            self.index.add(&collection, record.to_entry()).await?;
            debug!(
                "stored memory (collection={}, id={}, chars={})",
                self.collection_name,
                record.id,
                chunk.chars().count()
            );
        }
        info!(
            "wrote memories (collection={}, source={}, reference={}, chunks={})",
            self.collection_name,
            source_label,
            is_reference,
            chunks.len()
        );
        Ok(())
    }

    /// Recall the records most similar to `user_input`, best first.
    pub async fn query(
        &self,
        user_input: &str,
        options: QueryOptions,
    ) -> Result<Vec<ScoredMemory>, MemoryError> {
        if user_input.trim().is_empty() || options.limit == 0 {
            return Ok(Vec::new());
        }
        let embedding = self.embedder.embed(user_input).await?;
        let collection = self.ensure_collection().await?;
        let entries = self
            .index
            .query(&collection, &embedding, options.limit)
            .await?;
        if entries.is_empty() {
            warn!(
                "memory collection is empty (collection={})",
                self.collection_name
            );
            return Ok(Vec::new());
        }

        let records = entries
            .into_iter()
            .map(MemoryRecord::from_entry)
            .collect::<Result<Vec<_>, _>>()?;
        let (records, stale): (Vec<_>, Vec<_>) = records
            .into_iter()
            .partition(|record| record.embedding.len() == embedding.len());
        if !stale.is_empty() {
            warn!(
                "skipping memories embedded at another width (collection={}, skipped={}, expected_dims={})",
                self.collection_name,
                stale.len(),
                embedding.len()
            );
        }
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let candidates: Vec<&[f32]> = records
            .iter()
            .map(|record| record.embedding.as_slice())
            .collect();
        let scores = cosine_similarity_scores(&embedding, &candidates)?;
        let candidate_count = records.len();

        let mut scored: Vec<ScoredMemory> = records
            .into_iter()
            .zip(scores)
            .map(|(record, score)| ScoredMemory { record, score })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.retain(|memory| memory.score >= options.min_relevance_score);
        scored.truncate(options.limit);
        debug!(
            "recalled memories (collection={}, candidates={}, returned={}, min_score={})",
            self.collection_name,
            candidate_count,
            scored.len(),
            options.min_relevance_score
        );
        Ok(scored)
    }

    /// Recall payload strings, dropping repeats while keeping rank order.
    pub async fn query_payloads(
        &self,
        user_input: &str,
        options: QueryOptions,
    ) -> Result<Vec<String>, MemoryError> {
        let memories = self.query(user_input, options).await?;
        let mut seen = HashSet::new();
        Ok(memories
            .into_iter()
            .map(|memory| memory.record.additional_metadata)
            .filter(|payload| seen.insert(payload.clone()))
            .collect())
    }

    /// Delete one record by id. Any failure is logged and reported as `false`.
    pub async fn delete(&self, id: &str) -> bool {
        let collection = match self.ensure_collection().await {
            Ok(collection) => collection,
            Err(err) => {
                warn!(
                    "failed to open memory collection for delete (collection={}, id={}, error={})",
                    self.collection_name, id, err
                );
                return false;
            }
        };
        match self.index.delete(&collection, id).await {
            Ok(()) => {
                info!(
                    "deleted memory (collection={}, id={})",
                    self.collection_name, id
                );
                true
            }
            Err(err) => {
                warn!(
                    "failed to delete memory (collection={}, id={}, error={})",
                    self.collection_name, id, err
                );
                false
            }
        }
    }

    /// Drop the agent's whole collection. Wiping a missing collection succeeds.
    pub async fn wipe(&self) -> Result<(), MemoryError> {
        let existed = self
            .index
            .delete_collection(&self.collection_name)
            .await?;
        info!(
            "wiped memory collection (collection={}, existed={})",
            self.collection_name, existed
        );
        Ok(())
    }

    /// Current time, nudged forward so ids stay unique within this store.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let mut last = self.last_timestamp.lock();
        let current = Utc::now();
        let now = match *last {
            Some(previous) if current <= previous => previous + Duration::nanoseconds(1),
            _ => current,
        };
        *last = Some(now);
        now
    }
}
