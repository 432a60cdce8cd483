use serde::{Deserialize, Serialize};

use crate::core::config::LlmConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// A single-turn completion request.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub max_tokens: Option<i32>,
    pub stop: Option<Vec<String>>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_config(mut self, config: &LlmConfig) -> Self {
        self.temperature = config.temperature.or(self.temperature);
        self.top_p = config.top_p.or(self.top_p);
        self.max_tokens = config.max_tokens.or(self.max_tokens);
        self.stop = config.stop.clone().or(self.stop);
        self
    }

    /// The prompt as a one-message chat, for chat-only endpoints.
    pub fn as_messages(&self) -> Vec<ChatMessage> {
        vec![ChatMessage {
            role: "user".to_string(),
            content: self.prompt.clone(),
        }]
    }
}
