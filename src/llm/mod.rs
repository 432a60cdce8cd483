pub mod embedder;
pub mod lmstudio;
pub mod ollama;
pub mod provider;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::core::config::{ProviderEndpoint, ProviderKind};

pub use embedder::ProviderEmbedder;
pub use lmstudio::LmStudioProvider;
pub use ollama::OllamaProvider;
pub use provider::LlmProvider;
pub use types::{ChatMessage, GenerationRequest};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn http_client() -> Client {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .unwrap_or_else(|err| {
            tracing::warn!("Failed to build HTTP client ({}); using defaults", err);
            Client::new()
        })
}

pub fn build_provider(endpoint: &ProviderEndpoint) -> Arc<dyn LlmProvider> {
    match endpoint.kind {
        ProviderKind::Ollama => Arc::new(OllamaProvider::new(endpoint.base_url.clone())),
        ProviderKind::LmStudio => Arc::new(LmStudioProvider::new(
            endpoint.base_url.clone(),
            endpoint.api_key.clone(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_provider_for_kind() {
        let ollama = build_provider(&ProviderEndpoint {
            kind: ProviderKind::Ollama,
            base_url: "http://localhost:11434".to_string(),
            api_key: None,
        });
        assert_eq!(ollama.name(), "ollama");

        let lmstudio = build_provider(&ProviderEndpoint {
            kind: ProviderKind::LmStudio,
            base_url: "http://localhost:1234".to_string(),
            api_key: Some("sk".to_string()),
        });
        assert_eq!(lmstudio.name(), "lmstudio");
    }
}
