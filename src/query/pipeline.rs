//! The retrieval-augmented query pipeline.
//!
//! Validate → Retrieve → Score/Assemble → BuildPrompt →
//! Generate(general) ∥ Generate(grounded) → Respond.
//! Stages before generation are sequential; any failure short-circuits and
//! nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::orchestrator::GenerationOrchestrator;
use super::profile::RetrievalProfile;
use crate::core::errors::{summarize, PipelineError};
use crate::rag::{
    ContextAssembler, Metadata, PromptBuilder, ScoreMode, VectorIndex, NO_RELEVANT_DATA,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query_text: Option<String>,
}

/// The one response shape both surfaces produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub general_response: String,
    pub rag_response: String,
    /// Content of the best match, or the no-data placeholder.
    pub exact_chunk: String,
    pub exact_chunk_metadata: Metadata,
    /// Normalized accuracy or raw distance of the best match, per `score_mode`.
    pub accuracy_score: f64,
    pub score_mode: ScoreMode,
}

/// Rejects a missing, empty or whitespace-only question.
pub fn validate_query(query_text: Option<&str>) -> Result<&str, PipelineError> {
    match query_text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(PipelineError::EmptyQuery),
    }
}

const DEFAULT_RETRIEVAL_TIMEOUT: Duration = Duration::from_secs(60);

pub struct QueryPipeline {
    index: Arc<dyn VectorIndex>,
    orchestrator: GenerationOrchestrator,
    assembler: ContextAssembler,
    prompt: PromptBuilder,
    retrieval_timeout: Duration,
}

impl QueryPipeline {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        orchestrator: GenerationOrchestrator,
        assembler: ContextAssembler,
    ) -> Self {
        Self {
            index,
            orchestrator,
            assembler,
            prompt: PromptBuilder,
            retrieval_timeout: DEFAULT_RETRIEVAL_TIMEOUT,
        }
    }

    /// Deadline for the similarity search, query embedding included.
    pub fn with_retrieval_timeout(mut self, timeout: Duration) -> Self {
        self.retrieval_timeout = timeout;
        self
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    pub fn model(&self) -> &str {
        self.orchestrator.model()
    }

    pub async fn run(
        &self,
        query_text: Option<&str>,
        profile: RetrievalProfile,
    ) -> Result<QueryResponse, PipelineError> {
        let query_text = validate_query(query_text)?;

        let search = self.index.similarity_search(query_text, profile.k);
        let matches = match tokio::time::timeout(self.retrieval_timeout, search).await {
            Ok(Ok(matches)) => matches,
            Ok(Err(err)) => {
                tracing::error!("Similarity search failed: {}", err);
                return Err(PipelineError::Retrieval(summarize(&err)));
            }
            Err(_) => {
                tracing::error!(
                    "Similarity search timed out after {:?}",
                    self.retrieval_timeout
                );
                return Err(PipelineError::RetrievalTimeout {
                    secs: self.retrieval_timeout.as_secs(),
                });
            }
        };

        let best = matches.first();
        let accuracy_score = profile.score_mode.score(best.map(|m| m.distance));
        let (exact_chunk, exact_chunk_metadata) = match best {
            Some(m) => (m.document.content.trim().to_string(), m.document.metadata.clone()),
            None => (NO_RELEVANT_DATA.to_string(), Metadata::new()),
        };

        tracing::info!(
            "Retrieved {} of k={} matches (best: {}, {} score {:.4})",
            matches.len(),
            profile.k,
            best.map(|m| m.document.id.as_str()).unwrap_or("none"),
            profile.score_mode.as_str(),
            accuracy_score
        );

        let context = self.assembler.assemble(matches.iter().map(|m| &m.document));
        let prompt = self.prompt.build(&context, query_text);

        let answers = self.orchestrator.generate(query_text, &prompt).await?;

        Ok(QueryResponse {
            general_response: answers.general,
            rag_response: answers.grounded,
            exact_chunk,
            exact_chunk_metadata,
            accuracy_score,
            score_mode: profile.score_mode,
        })
    }
}
