//! Memory recall configuration.

/// Default number of memories returned by a query.
pub const DEFAULT_RECALL_LIMIT: usize = 5;

/// Recall options for memory queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryOptions {
    /// Maximum number of results, also the candidate count requested from the index.
    pub limit: usize,
    /// Results scoring below this similarity are dropped.
    pub min_relevance_score: f32,
}

impl QueryOptions {
    /// Options returning at most `limit` results with no score floor.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            min_relevance_score: 0.0,
        }
    }

    /// Set the minimum relevance score.
    pub fn with_min_relevance(mut self, min_relevance_score: f32) -> Self {
        self.min_relevance_score = min_relevance_score;
        self
    }
}

impl Default for QueryOptions {
    /// Default recall options.
    fn default() -> Self {
        Self::new(DEFAULT_RECALL_LIMIT)
    }
}
