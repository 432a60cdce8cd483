//! Interfaces the query path consumes: a nearest-neighbour index and the
//! embedding function that turns query text into the index's vector space.

use async_trait::async_trait;

use super::document::ScoredMatch;
use crate::core::errors::ApiError;

/// Text to fixed-dimension vector. Deterministic for a given model.
#[async_trait]
pub trait EmbeddingFunction: Send + Sync {
    /// Model identifier, recorded next to stored vectors.
    fn model(&self) -> &str;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ApiError>;
}

/// Read-only similarity search over stored documents.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Returns at most `k` matches ordered by ascending distance.
    ///
    /// An empty result is a valid outcome (empty index, nothing relevant),
    /// not an error.
    async fn similarity_search(&self, query: &str, k: usize)
        -> Result<Vec<ScoredMatch>, ApiError>;

    /// Number of stored entries.
    async fn count(&self) -> Result<usize, ApiError>;
}
