//! Config layer discovery, reading and merging.

use super::schema::validate_document;
use crate::{ConfigError, EngramConfig};
use directories::ProjectDirs;
use log::debug;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// File name shared by the user and working-directory layers.
pub(super) const CONFIG_FILE: &str = "engram.json5";

/// Where a config layer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// `engram.json5` in the platform config directory.
    User,
    /// `engram.json5` in the working directory.
    Cwd,
    /// An explicit override file such as the CLI's `--config`.
    Runtime,
}

impl ConfigLayerSource {
    fn label(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Cwd => "cwd",
            Self::Runtime => "runtime",
        }
    }
}

/// A layer that contributed to a [`LayeredConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    pub path: PathBuf,
}

/// Effective config plus the layers it was merged from, lowest first.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub config: EngramConfig,
    pub layers: Vec<ConfigLayer>,
}

/// Where to look for config layers.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Directory searched for the cwd layer.
    pub cwd: PathBuf,
    /// User layer location; `None` skips the layer.
    pub user_config_path: Option<PathBuf>,
    /// Override files applied last, in order. Each one must exist.
    pub runtime_paths: Vec<PathBuf>,
}

impl LayeredConfigOptions {
    /// Default layer locations for the given working directory.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            user_config_path: ProjectDirs::from("", "", "engram")
                .map(|dirs| dirs.config_dir().join(CONFIG_FILE)),
            runtime_paths: Vec::new(),
        }
    }

    /// Append a runtime override file.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

/// Merge every present layer into one document.
pub(super) fn merge_layers(
    options: &LayeredConfigOptions,
) -> Result<(Map<String, Value>, Vec<ConfigLayer>), ConfigError> {
    let mut merged = Map::new();
    let mut layers = Vec::new();

    let optional = options
        .user_config_path
        .iter()
        .map(|path| (ConfigLayerSource::User, path.clone()))
        .chain(std::iter::once((
            ConfigLayerSource::Cwd,
            options.cwd.join(CONFIG_FILE),
        )));
    for (source, path) in optional {
        if !path.is_file() {
            debug!(
                "skipping absent config layer (source={:?}, path={})",
                source,
                path.display()
            );
            continue;
        }
        apply_layer(&mut merged, &mut layers, source, path)?;
    }
    for path in &options.runtime_paths {
        apply_layer(
            &mut merged,
            &mut layers,
            ConfigLayerSource::Runtime,
            path.clone(),
        )?;
    }
    Ok((merged, layers))
}

fn apply_layer(
    merged: &mut Map<String, Value>,
    layers: &mut Vec<ConfigLayer>,
    source: ConfigLayerSource,
    path: PathBuf,
) -> Result<(), ConfigError> {
    let origin = format!("{}({})", source.label(), path.display());
    let document = read_document(&path, &origin)?;
    overlay_sections(merged, document);
    debug!(
        "applied config layer (source={:?}, path={})",
        source,
        path.display()
    );
    layers.push(ConfigLayer { source, path });
    Ok(())
}

/// Overlay one layer onto the merged document.
///
/// Sections are flat objects of scalars: a layer replaces the fields it sets
/// and leaves the others alone.
fn overlay_sections(merged: &mut Map<String, Value>, layer: Map<String, Value>) {
    for (section, value) in layer {
        match (merged.get_mut(&section), value) {
            (Some(Value::Object(fields)), Value::Object(overrides)) => fields.extend(overrides),
            (_, value) => {
                merged.insert(section, value);
            }
        }
    }
}

/// Read a json5 file and check it against the schema.
pub(super) fn read_document(path: &Path, origin: &str) -> Result<Map<String, Value>, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&contents, origin)
}

pub(super) fn parse_document(
    contents: &str,
    origin: &str,
) -> Result<Map<String, Value>, ConfigError> {
    let value: Value = json5::from_str(contents).map_err(|source| ConfigError::Parse {
        origin: origin.to_string(),
        source,
    })?;
    validate_document(value, origin)
}
