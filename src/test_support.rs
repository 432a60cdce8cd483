//! Fakes shared by unit tests: a deterministic embedder, a scripted model
//! provider that records what it was asked, and an index with canned results.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::core::errors::ApiError;
use crate::llm::{GenerationRequest, LlmProvider};
use crate::rag::{EmbeddingFunction, ScoredMatch, VectorIndex};

const DIMENSIONS: usize = 256;

/// Hashes lowercase alphanumeric tokens into a fixed-size count vector.
#[derive(Debug, Default, Clone)]
pub struct BagOfWordsEmbedder;

impl BagOfWordsEmbedder {
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; DIMENSIONS];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            vector[fnv1a(token.as_bytes()) % DIMENSIONS] += 1.0;
        }
        vector
    }
}

fn fnv1a(bytes: &[u8]) -> usize {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in bytes {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash as usize
}

#[async_trait]
impl EmbeddingFunction for BagOfWordsEmbedder {
    fn model(&self) -> &str {
        "bag-of-words"
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ApiError> {
        Ok(self.embed_sync(text))
    }
}

pub fn embedder() -> Arc<dyn EmbeddingFunction> {
    Arc::new(BagOfWordsEmbedder)
}

#[derive(Default)]
pub struct ScriptedProvider {
    responses: HashMap<String, String>,
    context_answers: Vec<(String, String)>,
    failures: Vec<String>,
    delays: HashMap<String, Duration>,
    empty_embeddings: bool,
    generate_calls: Mutex<Vec<String>>,
    models: Mutex<Vec<String>>,
    embed_calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    /// Exact prompt → answer.
    pub fn respond_to(mut self, prompt: &str, answer: &str) -> Self {
        self.responses.insert(prompt.to_string(), answer.to_string());
        self
    }

    /// Any prompt containing `needle` → answer.
    pub fn answer_from_context(mut self, needle: &str, answer: &str) -> Self {
        self.context_answers.push((needle.to_string(), answer.to_string()));
        self
    }

    pub fn fail_on(mut self, prompt: &str) -> Self {
        self.failures.push(prompt.to_string());
        self
    }

    pub fn delay_on(mut self, prompt: &str, delay: Duration) -> Self {
        self.delays.insert(prompt.to_string(), delay);
        self
    }

    pub fn with_empty_embeddings(mut self) -> Self {
        self.empty_embeddings = true;
        self
    }

    pub fn generate_calls(&self) -> Vec<String> {
        self.generate_calls.lock().unwrap().clone()
    }

    pub fn models_used(&self) -> Vec<String> {
        self.models.lock().unwrap().clone()
    }

    pub fn embed_calls(&self) -> Vec<String> {
        self.embed_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        Ok(true)
    }

    async fn generate(&self, request: GenerationRequest, model_id: &str) -> Result<String, ApiError> {
        let prompt = request.prompt;
        self.generate_calls.lock().unwrap().push(prompt.clone());
        self.models.lock().unwrap().push(model_id.to_string());

        if let Some(delay) = self.delays.get(&prompt) {
            tokio::time::sleep(*delay).await;
        }
        if self.failures.contains(&prompt) {
            return Err(ApiError::Internal("scripted failure".to_string()));
        }
        if let Some(answer) = self.responses.get(&prompt) {
            return Ok(answer.clone());
        }
        if let Some((_, answer)) = self
            .context_answers
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
        {
            return Ok(answer.clone());
        }
        Ok(" I am not sure. ".to_string())
    }

    async fn embed(&self, inputs: &[String], _model_id: &str) -> Result<Vec<Vec<f32>>, ApiError> {
        self.embed_calls.lock().unwrap().extend(inputs.iter().cloned());
        if self.empty_embeddings {
            return Ok(inputs.iter().map(|_| Vec::new()).collect());
        }
        Ok(inputs.iter().map(|i| BagOfWordsEmbedder.embed_sync(i)).collect())
    }
}

/// Returns the same ranked matches for every query, truncated to `k`.
pub struct FixedIndex {
    matches: Vec<ScoredMatch>,
    failure: Option<String>,
    delay: Option<Duration>,
    searches: AtomicUsize,
    last_k: Mutex<Option<usize>>,
}

impl FixedIndex {
    pub fn new(matches: Vec<ScoredMatch>) -> Self {
        Self {
            matches,
            failure: None,
            delay: None,
            searches: AtomicUsize::new(0),
            last_k: Mutex::new(None),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(Vec::new())
        }
    }

    /// Sleeps before answering each search.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn last_k(&self) -> Option<usize> {
        *self.last_k.lock().unwrap()
    }
}

#[async_trait]
impl VectorIndex for FixedIndex {
    async fn similarity_search(
        &self,
        _query: &str,
        k: usize,
    ) -> Result<Vec<ScoredMatch>, ApiError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        *self.last_k.lock().unwrap() = Some(k);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(ApiError::Internal(message.clone()));
        }
        Ok(self.matches.iter().take(k).cloned().collect())
    }

    async fn count(&self) -> Result<usize, ApiError> {
        if let Some(message) = &self.failure {
            return Err(ApiError::Internal(message.clone()));
        }
        Ok(self.matches.len())
    }
}
