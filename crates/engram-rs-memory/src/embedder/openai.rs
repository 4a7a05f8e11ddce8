//! OpenAI-compatible `/embeddings` client.

use super::Embedder;
use crate::error::MemoryError;
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
/// Default embedding model.
pub const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// Embedder backed by an OpenAI-compatible HTTP endpoint.
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for OpenAiEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEmbedder")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiEmbedder {
    /// Create a client for the default host and model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: normalize_base_url(DEFAULT_BASE_URL),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Create a client reading its API key from an environment variable.
    pub fn from_env(var: &str) -> Result<Self, MemoryError> {
        let api_key = std::env::var(var)
            .map_err(|_| MemoryError::Embedding(format!("environment variable {var} is not set")))?;
        Ok(Self::new(api_key))
    }

    /// Use a different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use a different API base URL.
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = normalize_base_url(url);
        self
    }

    /// Full embeddings endpoint URL.
    pub fn endpoint(&self) -> String {
        embeddings_endpoint(&self.base_url)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: vec![text],
        };
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| MemoryError::Embedding(err.to_string()))?
            .json::<EmbeddingResponse>()
            .await
            .map_err(|err| MemoryError::Embedding(err.to_string()))?;
        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| MemoryError::Embedding("empty embedding response".to_string()))?;
        debug!(
            "embedded text (model={}, chars={}, dimensions={})",
            self.model,
            text.chars().count(),
            embedding.len()
        );
        Ok(embedding)
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Whether the last path segment looks like `v1`, `v4`, ...
fn has_version_suffix(base_url: &str) -> bool {
    let Some(last_segment) = base_url.rsplit('/').next() else {
        return false;
    };
    let Some(rest) = last_segment.strip_prefix('v') else {
        return false;
    };
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

fn embeddings_endpoint(base_url: &str) -> String {
    let normalized = normalize_base_url(base_url);
    if normalized.ends_with("/embeddings") {
        return normalized;
    }
    if has_version_suffix(&normalized) {
        return format!("{normalized}/embeddings");
    }
    format!("{normalized}/v1/embeddings")
}
