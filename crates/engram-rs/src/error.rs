//! Error type for store construction.

use engram_rs_config::ConfigError;
use engram_rs_memory::{IndexError, MemoryError};
use thiserror::Error;

/// Errors returned while building a memory store from config.
#[derive(Debug, Error)]
pub enum EngramError {
    /// Config loading or validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A collaborator could not be constructed.
    #[error(transparent)]
    Memory(#[from] MemoryError),
    /// The configured index could not be opened.
    #[error(transparent)]
    Index(#[from] IndexError),
}
