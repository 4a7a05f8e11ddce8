//! Configuration schema for Engram.

use serde::{Deserialize, Serialize};

/// Root config for an Engram memory store.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EngramConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub embedder: EmbedderConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub segmenter: SegmenterConfig,
}

impl EngramConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> EngramConfigBuilder {
        EngramConfigBuilder::new()
    }
}

/// Builder for assembling an `EngramConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct EngramConfigBuilder {
    config: EngramConfig,
}

impl EngramConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: EngramConfig::default(),
        }
    }

    /// Replace the memory store configuration.
    pub fn memory(mut self, memory: MemoryConfig) -> Self {
        self.config.memory = memory;
        self
    }

    /// Replace the embedder configuration.
    pub fn embedder(mut self, embedder: EmbedderConfig) -> Self {
        self.config.embedder = embedder;
        self
    }

    /// Replace the vector index configuration.
    pub fn index(mut self, index: IndexConfig) -> Self {
        self.config.index = index;
        self
    }

    /// Replace the segmenter configuration.
    pub fn segmenter(mut self, segmenter: SegmenterConfig) -> Self {
        self.config.segmenter = segmenter;
        self
    }

    /// Finalize the builder into a config instance.
    pub fn build(self) -> EngramConfig {
        self.config
    }
}

/// Agent identity, chunking and recall defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryConfig {
    #[serde(default = "default_agent_name")]
    pub agent_name: String,
    #[serde(default)]
    pub collection_number: u32,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_recall_limit")]
    pub recall_limit: usize,
    #[serde(default)]
    pub min_relevance_score: f32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            agent_name: default_agent_name(),
            collection_number: 0,
            chunk_size: default_chunk_size(),
            recall_limit: default_recall_limit(),
            min_relevance_score: 0.0,
        }
    }
}

fn default_agent_name() -> String {
    "AGiXT".to_string()
}

fn default_chunk_size() -> usize {
    256
}

fn default_recall_limit() -> usize {
    5
}

/// Embedding provider selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderProvider {
    /// Offline feature-hashing embedder.
    #[default]
    Hashing,
    /// OpenAI-compatible HTTP endpoint.
    Openai,
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedderConfig {
    #[serde(default)]
    pub provider: EmbedderProvider,
    /// Vector width for the hashing embedder.
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            provider: EmbedderProvider::default(),
            dimensions: default_dimensions(),
            model: default_embedding_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_dimensions() -> usize {
    256
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

/// Vector index backend selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IndexProvider {
    /// Process-local index, lost on exit.
    Memory,
    /// JSONL files under a root directory.
    #[default]
    File,
}

/// Vector index settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct IndexConfig {
    #[serde(default)]
    pub provider: IndexProvider,
    /// Root directory for the file index; defaults to `./memories`.
    #[serde(default)]
    pub path: Option<String>,
}

/// Segmenter settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SegmenterConfig {
    /// Optional JSON `{ "word": "TAG" }` file extending the built-in lexicon.
    #[serde(default)]
    pub lexicon: Option<String>,
}
