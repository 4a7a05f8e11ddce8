use async_trait::async_trait;
use engram_rs_memory::{Embedder, MemoryError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Embedder returning canned vectors and recording every input.
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    default: Vec<f32>,
    vectors: HashMap<String, Vec<f32>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StubEmbedder {
    pub fn new(default: Vec<f32>) -> Self {
        Self {
            default,
            vectors: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Return `vector` whenever exactly `text` is embedded.
    pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.into(), vector);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    fn name(&self) -> &str {
        "stub"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        self.calls.lock().push(text.to_string());
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.default.clone()))
    }
}

/// Embedder that fails, optionally after a number of successful calls.
#[derive(Debug)]
pub struct FailingEmbedder {
    message: String,
    successes: usize,
    vector: Vec<f32>,
    calls: AtomicUsize,
}

impl FailingEmbedder {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            successes: 0,
            vector: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Succeed with `vector` for the first `successes` calls.
    pub fn after(mut self, successes: usize, vector: Vec<f32>) -> Self {
        self.successes = successes;
        self.vector = vector;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FailingEmbedder {
    fn name(&self) -> &str {
        "failing"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, MemoryError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.successes {
            return Ok(self.vector.clone());
        }
        Err(MemoryError::Embedding(self.message.clone()))
    }
}
