use std::sync::Arc;

use async_trait::async_trait;

use super::provider::LlmProvider;
use crate::core::errors::ApiError;
use crate::rag::EmbeddingFunction;

/// Embedding function backed by a provider's embed endpoint.
pub struct ProviderEmbedder {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl ProviderEmbedder {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

#[async_trait]
impl EmbeddingFunction for ProviderEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ApiError> {
        let mut embeddings = self
            .provider
            .embed(&[text.to_string()], &self.model)
            .await?;

        if embeddings.len() != 1 {
            return Err(ApiError::Internal(format!(
                "{} returned {} embeddings for one input",
                self.provider.name(),
                embeddings.len()
            )));
        }
        let embedding = embeddings.remove(0);
        if embedding.is_empty() {
            return Err(ApiError::Internal(format!(
                "{} returned an empty embedding",
                self.provider.name()
            )));
        }
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedProvider;

    #[tokio::test]
    async fn embeds_through_the_provider() {
        let provider = Arc::new(ScriptedProvider::default());
        let embedder = ProviderEmbedder::new(provider.clone(), "nomic-embed-text");

        let embedding = embedder.embed_query("capital of France").await.unwrap();
        assert!(!embedding.is_empty());
        assert_eq!(embedder.model(), "nomic-embed-text");
        assert_eq!(provider.embed_calls(), vec!["capital of France".to_string()]);
    }

    #[tokio::test]
    async fn empty_embedding_is_an_error() {
        let provider = Arc::new(ScriptedProvider::default().with_empty_embeddings());
        let embedder = ProviderEmbedder::new(provider, "nomic-embed-text");
        assert!(embedder.embed_query("x").await.is_err());
    }
}
