use async_trait::async_trait;

use super::types::GenerationRequest;
use crate::core::errors::ApiError;

/// A model backend that can complete prompts and embed text.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short backend name used in logs ("ollama", "lmstudio").
    fn name(&self) -> &str;

    /// `Ok(false)` when the backend answered but is not usable.
    async fn health_check(&self) -> Result<bool, ApiError>;

    /// One non-streaming completion of `request.prompt`.
    async fn generate(&self, request: GenerationRequest, model_id: &str)
        -> Result<String, ApiError>;

    /// One vector per input, in input order.
    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, ApiError>;
}
