//! Test helpers shared across Engram crates.

pub mod embedder;
pub mod index;
pub mod segmenter;

pub use embedder::{FailingEmbedder, StubEmbedder};
pub use index::{IndexCall, RecordingIndex, StaticIndex, UnreachableIndex, memory_entry};
pub use segmenter::{FailingSegmenter, WhitespaceSegmenter};
