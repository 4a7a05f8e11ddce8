//! Loading [`EngramConfig`] from json5.
//!
//! A layered load reads up to three kinds of documents, lowest precedence
//! first: the user file, `engram.json5` in the working directory, then every
//! runtime override in order. Each document is schema-checked on its own
//! before the sections are merged field by field.

mod layers;
mod schema;


pub use layers::{ConfigLayer, ConfigLayerSource, LayeredConfig, LayeredConfigOptions};

use crate::{ConfigError, EmbedderProvider, EngramConfig};
use log::{debug, info};
use serde_json::{Map, Value};
use std::path::Path;

impl EngramConfig {
    /// Load one file, without layering.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading config (path={})", path.display());
        let document = layers::read_document(path, &path.display().to_string())?;
        from_document(document)
    }

    /// Load json5 contents, without layering.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from string (len={})", contents.len());
        from_document(layers::parse_document(contents, "config")?)
    }

    /// Merge the user, cwd and runtime layers described by `options`.
    pub fn load_layered(options: LayeredConfigOptions) -> Result<LayeredConfig, ConfigError> {
        let (document, layers) = layers::merge_layers(&options)?;
        let config = from_document(document)?;
        info!("loaded layered config (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Check the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory.agent_name.trim().is_empty() {
            return Err(invalid("memory.agent_name", "must not be empty"));
        }
        if self.memory.chunk_size == 0 {
            return Err(invalid("memory.chunk_size", "must be greater than zero"));
        }
        if !(-1.0..=1.0).contains(&self.memory.min_relevance_score) {
            return Err(invalid(
                "memory.min_relevance_score",
                "must be within [-1, 1]",
            ));
        }
        if self.embedder.dimensions == 0 {
            return Err(invalid("embedder.dimensions", "must be greater than zero"));
        }
        if self.embedder.provider == EmbedderProvider::Openai
            && self.embedder.api_key_env.trim().is_empty()
        {
            return Err(ConfigError::MissingProviderSetting {
                provider: "openai",
                field: "embedder.api_key_env",
            });
        }
        Ok(())
    }
}

fn from_document(document: Map<String, Value>) -> Result<EngramConfig, ConfigError> {
    let config: EngramConfig = serde_json::from_value(Value::Object(document))?;
    config.validate()?;
    Ok(config)
}

fn invalid(path: &str, message: &str) -> ConfigError {
    ConfigError::InvalidField {
        path: path.to_string(),
        message: message.to_string(),
    }
}
