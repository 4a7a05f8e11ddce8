//! Public SDK surface for Engram.
//!
//! This crate re-exports the memory and config building blocks, builds a
//! ready-to-use [`memory::MemoryStore`] from an [`config::EngramConfig`], and
//! provides a small initialization helper to keep consumer setup consistent.

mod error;
mod factory;

/// Re-export for convenience.
pub use engram_rs_config as config;
/// Re-export for convenience.
pub use engram_rs_memory as memory;

pub use error::EngramError;
pub use factory::{DEFAULT_INDEX_PATH, StoreFactory};

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::builder()
            .format_timestamp_millis()
            .parse_default_env()
            .try_init();
    }
}
