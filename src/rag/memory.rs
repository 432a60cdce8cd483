//! In-process vector index over a fixed document list, ranked the same way
//! as the SQLite index.

use std::sync::Arc;

use async_trait::async_trait;

use super::distance::{rank_by_distance, DistanceMetric};
use super::document::{Document, ScoredMatch};
use super::store::{EmbeddingFunction, VectorIndex};
use crate::core::errors::ApiError;

pub struct InMemoryVectorIndex {
    entries: Vec<(Document, Vec<f32>)>,
    embedder: Arc<dyn EmbeddingFunction>,
    metric: DistanceMetric,
}

impl InMemoryVectorIndex {
    pub fn new(embedder: Arc<dyn EmbeddingFunction>, metric: DistanceMetric) -> Self {
        Self {
            entries: Vec::new(),
            embedder,
            metric,
        }
    }

    /// Embeds each document with the index's own embedding function.
    pub async fn from_documents(
        embedder: Arc<dyn EmbeddingFunction>,
        metric: DistanceMetric,
        documents: Vec<Document>,
    ) -> Result<Self, ApiError> {
        let mut index = Self::new(embedder, metric);
        for document in documents {
            let embedding = index.embedder.embed_query(&document.content).await?;
            index.entries.push((document, embedding));
        }
        Ok(index)
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredMatch>, ApiError> {
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }
        let query_embedding = self.embedder.embed_query(query).await?;
        rank_by_distance(&query_embedding, self.entries.iter().cloned(), k, self.metric)
    }

    async fn count(&self) -> Result<usize, ApiError> {
        Ok(self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::embedder;

    #[tokio::test]
    async fn returns_at_most_k_in_ascending_order() {
        let index = InMemoryVectorIndex::from_documents(
            embedder(),
            DistanceMetric::Cosine,
            vec![
                Document::new("a", "Lyon is a city in France."),
                Document::new("b", "Paris is the capital of France."),
                Document::new("c", "Tokyo is the capital of Japan."),
            ],
        )
        .await
        .unwrap();

        let matches = index
            .similarity_search("capital of France", 2)
            .await
            .unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].document.id, "b");
        assert!(matches.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[tokio::test]
    async fn empty_index_is_not_an_error() {
        let index = InMemoryVectorIndex::new(embedder(), DistanceMetric::L2);
        assert!(index.similarity_search("q", 5).await.unwrap().is_empty());
        assert_eq!(index.count().await.unwrap(), 0);
    }
}
