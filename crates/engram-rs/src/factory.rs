//! Builds a memory store and its collaborators from config.

use crate::EngramError;
use engram_rs_config::{
    EmbedderConfig, EmbedderProvider, EngramConfig, IndexConfig, IndexProvider, MemoryConfig,
    SegmenterConfig,
};
use engram_rs_memory::{
    Embedder, FileIndex, HashingEmbedder, InMemoryIndex, MemoryStore, MemoryStoreConfig,
    OpenAiEmbedder, QueryOptions, RuleSegmenter, Segmenter, VectorIndex,
};
use log::info;
use std::sync::Arc;

/// Root directory of the file index when none is configured.
pub const DEFAULT_INDEX_PATH: &str = "memories";

/// Constructs memory stores from an [`EngramConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreFactory;

impl StoreFactory {
    /// Build a store with every collaborator described by `config`.
    pub fn from_config(config: &EngramConfig) -> Result<MemoryStore, EngramError> {
        config.validate()?;
        let segmenter = Self::segmenter(&config.segmenter)?;
        let embedder = Self::embedder(&config.embedder)?;
        let index = Self::index(&config.index)?;
        info!(
            "built memory store (agent={}, embedder={}, index={:?})",
            config.memory.agent_name,
            embedder.name(),
            config.index.provider
        );
        Ok(MemoryStore::new(
            Self::store_config(&config.memory),
            index,
            embedder,
            segmenter,
        ))
    }

    /// Store identity and chunking settings.
    pub fn store_config(memory: &MemoryConfig) -> MemoryStoreConfig {
        MemoryStoreConfig::new(memory.agent_name.clone())
            .with_collection_number(memory.collection_number)
            .with_chunk_size(memory.chunk_size)
    }

    /// Default recall options.
    pub fn query_options(memory: &MemoryConfig) -> QueryOptions {
        QueryOptions::new(memory.recall_limit).with_min_relevance(memory.min_relevance_score)
    }

    /// Load the segmenter once, with an optional lexicon extension.
    pub fn segmenter(config: &SegmenterConfig) -> Result<Arc<dyn Segmenter>, EngramError> {
        let segmenter = match config.lexicon.as_deref() {
            Some(path) => RuleSegmenter::load_with_lexicon(path)?,
            None => RuleSegmenter::load(),
        };
        Ok(Arc::new(segmenter))
    }

    pub fn embedder(config: &EmbedderConfig) -> Result<Arc<dyn Embedder>, EngramError> {
        Ok(match config.provider {
            EmbedderProvider::Hashing => Arc::new(HashingEmbedder::new(config.dimensions)),
            EmbedderProvider::Openai => Arc::new(
                OpenAiEmbedder::from_env(&config.api_key_env)?
                    .with_model(config.model.clone())
                    .with_base_url(&config.base_url),
            ),
        })
    }

    pub fn index(config: &IndexConfig) -> Result<Arc<dyn VectorIndex>, EngramError> {
        Ok(match config.provider {
            IndexProvider::Memory => Arc::new(InMemoryIndex::new()),
            IndexProvider::File => {
                let root = config.path.as_deref().unwrap_or(DEFAULT_INDEX_PATH);
                Arc::new(FileIndex::open(root)?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engram_rs_memory::MemoryError;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn file_config(root: &std::path::Path) -> EngramConfig {
        EngramConfig::builder()
            .memory(MemoryConfig {
                agent_name: "Librarian".to_string(),
                collection_number: 1,
                chunk_size: 32,
                ..MemoryConfig::default()
            })
            .index(IndexConfig {
                provider: IndexProvider::File,
                path: Some(root.to_string_lossy().to_string()),
            })
            .build()
    }

    #[test]
    fn store_uses_configured_identity() {
        let temp = tempdir().expect("tempdir");
        let store = StoreFactory::from_config(&file_config(temp.path())).expect("store");
        assert_eq!(store.agent_name(), "Librarian");
        assert_eq!(store.collection_name(), "librarian_1");
        assert_eq!(store.chunk_size(), 32);
    }

    #[test]
    fn query_options_follow_memory_config() {
        let memory = MemoryConfig {
            recall_limit: 9,
            min_relevance_score: 0.3,
            ..MemoryConfig::default()
        };
        let options = StoreFactory::query_options(&memory);
        assert_eq!(options.limit, 9);
        assert_eq!(options.min_relevance_score, 0.3);
    }

    #[test]
    fn openai_without_key_is_an_error() {
        let config = EmbedderConfig {
            provider: EmbedderProvider::Openai,
            api_key_env: "ENGRAM_FACTORY_TEST_UNSET_KEY".to_string(),
            ..EmbedderConfig::default()
        };
        let err = StoreFactory::embedder(&config).err().expect("expected error");
        assert!(matches!(err, EngramError::Memory(MemoryError::Embedding(_))));
    }

    #[test]
    fn missing_lexicon_is_an_error() {
        let temp = tempdir().expect("tempdir");
        let config = SegmenterConfig {
            lexicon: Some(temp.path().join("absent.json").to_string_lossy().to_string()),
        };
        let err = StoreFactory::segmenter(&config).err().expect("expected error");
        assert!(matches!(err, EngramError::Memory(MemoryError::Segmenter(_))));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = EngramConfig::default();
        config.memory.chunk_size = 0;
        let err = StoreFactory::from_config(&config).unwrap_err();
        assert!(matches!(err, EngramError::Config(_)));
    }

    #[tokio::test]
    async fn built_store_round_trips_through_files() {
        let temp = tempdir().expect("tempdir");
        let config = file_config(temp.path());
        let store = StoreFactory::from_config(&config).expect("store");
        store
            .write("user", "The release train leaves every Tuesday.")
            .await
            .expect("write");

        let reopened = StoreFactory::from_config(&config).expect("store");
        let payloads = reopened
            .query_payloads(
                "When does the release train leave?",
                QueryOptions::new(3).with_min_relevance(-1.0),
            )
            .await
            .expect("query");
        assert_eq!(
            payloads,
            vec!["The release train leaves every Tuesday.".to_string()]
        );
    }
}
