//! Memory record model and its storage-boundary encoding.

use crate::error::MemoryError;
use crate::index::IndexEntry;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Metadata key for the ISO-8601 creation time.
pub const META_TIMESTAMP: &str = "timestamp";
/// Metadata key for the string-encoded reference flag.
pub const META_IS_REFERENCE: &str = "is_reference";
/// Metadata key for the provenance label.
pub const META_EXTERNAL_SOURCE_NAME: &str = "external_source_name";
/// Metadata key for the provenance label, stored a second time.
pub const META_DESCRIPTION: &str = "description";
/// Metadata key for the chunk payload surfaced on recall.
pub const META_ADDITIONAL_METADATA: &str = "additional_metadata";
/// Metadata key for the content-addressed id.
pub const META_ID: &str = "id";

/// Persisted memory record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    /// Content-addressed identifier (chunk text salted with the write time).
    pub id: String,
    /// Chunk body stored as the index document.
    pub text: String,
    /// Embedding computed for `text`.
    pub embedding: Vec<f32>,
    /// Caller-supplied provenance label.
    pub source_label: String,
    /// Whether the record holds externally sourced reference material.
    pub is_reference: bool,
    /// Chunk payload returned to callers on recall.
    pub additional_metadata: String,
    /// Creation timestamp.
    pub timestamp: DateTime<Utc>,
}

impl MemoryRecord {
    /// Build a new record for a chunk written at `timestamp`.
    pub fn new(
        chunk: &str,
        embedding: Vec<f32>,
        source_label: &str,
        is_reference: bool,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: record_id(chunk, &format_timestamp(&timestamp)),
            text: chunk.to_string(),
            embedding,
            source_label: source_label.to_string(),
            is_reference,
            additional_metadata: chunk.to_string(),
            timestamp,
        }
    }

    /// Encode the record as an index entry with string-typed metadata.
    pub fn to_entry(&self) -> IndexEntry {
        let mut metadata = BTreeMap::new();
        metadata.insert(
            META_TIMESTAMP.to_string(),
            format_timestamp(&self.timestamp),
        );
        metadata.insert(
            META_IS_REFERENCE.to_string(),
            encode_bool(self.is_reference).to_string(),
        );
        metadata.insert(
            META_EXTERNAL_SOURCE_NAME.to_string(),
            self.source_label.clone(),
        );
        metadata.insert(META_DESCRIPTION.to_string(), self.source_label.clone());
        metadata.insert(
            META_ADDITIONAL_METADATA.to_string(),
            self.additional_metadata.clone(),
        );
        metadata.insert(META_ID.to_string(), self.id.clone());
        IndexEntry {
            id: self.id.clone(),
            document: self.text.clone(),
            embedding: self.embedding.clone(),
            metadata,
        }
    }

    /// Decode a record from an index entry returned by a query.
    pub fn from_entry(entry: IndexEntry) -> Result<Self, MemoryError> {
        let IndexEntry {
            id,
            document,
            embedding,
            mut metadata,
        } = entry;
        let mut take = |key: &str| {
            metadata
                .remove(key)
                .ok_or_else(|| MemoryError::CorruptRecord(format!("{id}: missing `{key}`")))
        };
        let timestamp_raw = take(META_TIMESTAMP)?;
        let is_reference = take(META_IS_REFERENCE)? == encode_bool(true);
        let source_label = take(META_EXTERNAL_SOURCE_NAME)?;
        let additional_metadata = take(META_ADDITIONAL_METADATA)?;
        let record_id = take(META_ID)?;
        let timestamp = parse_timestamp(&timestamp_raw).ok_or_else(|| {
            MemoryError::CorruptRecord(format!("{id}: invalid timestamp `{timestamp_raw}`"))
        })?;
        Ok(Self {
            id: record_id,
            text: document,
            embedding,
            source_label,
            is_reference,
            additional_metadata,
            timestamp,
        })
    }
}

/// A recalled record paired with its locally recomputed similarity score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredMemory {
    /// Recalled record.
    pub record: MemoryRecord,
    /// Cosine similarity against the query embedding.
    pub score: f32,
}

/// Derive the content-addressed id for a chunk written at `timestamp`.
pub fn record_id(chunk: &str, timestamp: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(chunk.as_bytes());
    hasher.update(timestamp.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Render a timestamp as ISO-8601 with nanosecond precision.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse an ISO-8601 timestamp, accepting offset-less values as UTC.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Python-style boolean spelling used by persisted metadata.
fn encode_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}
