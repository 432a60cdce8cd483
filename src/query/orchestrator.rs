//! Fan-out/fan-in over the two generation calls.
//!
//! The general call sees only the question; the grounded call sees only the
//! built prompt. Both run concurrently, each under its own timeout, and the
//! answers are returned together or not at all.

use std::sync::Arc;
use std::time::Duration;

use crate::core::config::LlmConfig;
use crate::core::errors::{summarize, PipelineError};
use crate::llm::{GenerationRequest, LlmProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    General,
    Grounded,
}

impl GenerationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GenerationKind::General => "general",
            GenerationKind::Grounded => "grounded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAnswers {
    pub general: String,
    pub grounded: String,
}

pub struct GenerationOrchestrator {
    provider: Arc<dyn LlmProvider>,
    config: LlmConfig,
    timeout: Duration,
}

impl GenerationOrchestrator {
    pub fn new(provider: Arc<dyn LlmProvider>, config: LlmConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        Self {
            provider,
            config,
            timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub async fn generate(
        &self,
        query_text: &str,
        prompt: &str,
    ) -> Result<GeneratedAnswers, PipelineError> {
        let (general, grounded) = tokio::try_join!(
            self.generate_one(GenerationKind::General, query_text),
            self.generate_one(GenerationKind::Grounded, prompt),
        )?;

        Ok(GeneratedAnswers { general, grounded })
    }

    async fn generate_one(&self, kind: GenerationKind, input: &str) -> Result<String, PipelineError> {
        let request = GenerationRequest::new(input).with_config(&self.config);
        let call = self.provider.generate(request, &self.config.model);

        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(text)) => Ok(text.trim().to_string()),
            Ok(Err(err)) => {
                tracing::error!(
                    "{} generation via {} failed: {}",
                    kind.as_str(),
                    self.provider.name(),
                    err
                );
                Err(PipelineError::Generation {
                    kind: kind.as_str(),
                    message: summarize(&err),
                })
            }
            Err(_) => {
                tracing::error!(
                    "{} generation via {} timed out after {:?}",
                    kind.as_str(),
                    self.provider.name(),
                    self.timeout
                );
                Err(PipelineError::GenerationTimeout {
                    kind: kind.as_str(),
                    secs: self.timeout.as_secs(),
                })
            }
        }
    }
}
