use std::sync::Arc;
use std::time::Duration;

use crate::core::config::{AppConfig, AppPaths, ConfigService};
use crate::llm::{build_provider, LlmProvider, ProviderEmbedder};
use crate::query::{GenerationOrchestrator, QueryPipeline};
use crate::rag::{ContextAssembler, SqliteVectorIndex, VectorIndex};

pub mod error;

use error::InitializationError;

/// Process-wide state shared by every request.
///
/// Built once at startup and never mutated afterwards; the index and model
/// handles inside are read-only, so requests share them without locking.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: Arc<AppConfig>,
    pub pipeline: Arc<QueryPipeline>,
}

impl AppState {
    /// Initializes the application state.
    ///
    /// This process includes:
    /// 1. Loading and validating configuration
    /// 2. Checking that the embedding and generation backends answer
    /// 3. Opening the persisted vector index
    /// 4. Wiring the query pipeline
    ///
    /// Any failure aborts startup rather than leaving a half-working service.
    pub async fn initialize(config_service: ConfigService) -> Result<Arc<Self>, InitializationError> {
        let paths = Arc::new(config_service.paths().clone());
        let config = config_service
            .load_config()
            .map_err(|e| InitializationError::Config(e.into()))?;
        tracing::info!("Loaded configuration from {}", config_service.config_path().display());

        let embedding_endpoint = config.embedding.endpoint();
        let llm_endpoint = config.llm.endpoint();
        let llm = build_provider(&llm_endpoint);
        let embedding_provider = if embedding_endpoint == llm_endpoint {
            llm.clone()
        } else {
            build_provider(&embedding_endpoint)
        };

        if config.llm.check_on_startup {
            ensure_reachable("generation", llm.as_ref()).await?;
            if !Arc::ptr_eq(&llm, &embedding_provider) {
                ensure_reachable("embedding", embedding_provider.as_ref()).await?;
            }
        }

        let embedder = Arc::new(ProviderEmbedder::new(
            embedding_provider,
            config.embedding.model.clone(),
        ));
        let index_path = paths.resolve(&config.index.path);
        let index = SqliteVectorIndex::open(&index_path, embedder, config.index.distance)
            .await
            .map_err(|e| InitializationError::Index(e.into()))?;

        match index.count().await {
            Ok(count) => tracing::info!(
                "Opened vector index {} ({} chunks, {:?} distance)",
                index.db_path().display(),
                count,
                config.index.distance
            ),
            Err(e) => tracing::warn!("Failed to count chunks in {}: {}", index.db_path().display(), e),
        }

        Ok(Self::from_parts(paths, config, Arc::new(index), llm))
    }

    /// Wires the pipeline around already-constructed collaborators.
    pub fn from_parts(
        paths: Arc<AppPaths>,
        config: AppConfig,
        index: Arc<dyn VectorIndex>,
        llm: Arc<dyn LlmProvider>,
    ) -> Arc<Self> {
        let orchestrator = GenerationOrchestrator::new(llm, config.llm.clone());
        let assembler = ContextAssembler::new(config.retrieval.max_context_chars);
        let pipeline = Arc::new(
            QueryPipeline::new(index, orchestrator, assembler)
                .with_retrieval_timeout(Duration::from_secs(config.retrieval.timeout_secs)),
        );

        Arc::new(AppState {
            paths,
            config: Arc::new(config),
            pipeline,
        })
    }
}

async fn ensure_reachable(
    role: &'static str,
    provider: &dyn LlmProvider,
) -> Result<(), InitializationError> {
    match provider.health_check().await {
        Ok(true) => {
            tracing::info!("{} backend ({}) is reachable", role, provider.name());
            Ok(())
        }
        Ok(false) => Err(InitializationError::Backend {
            role,
            source: anyhow::anyhow!("{} did not answer its health check", provider.name()),
        }),
        Err(e) => Err(InitializationError::Backend {
            role,
            source: e.into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ProviderKind;

    #[tokio::test]
    async fn missing_index_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.yml"),
            "llm:\n  check_on_startup: false\nindex:\n  path: missing/rag.db\n",
        )
        .unwrap();
        let paths = Arc::new(AppPaths::with_dirs(
            dir.path().to_path_buf(),
            dir.path().to_path_buf(),
        ));
        let service = ConfigService::with_config_path(paths, dir.path().join("config.yml"));

        let err = AppState::initialize(service).await.err().unwrap();
        assert!(matches!(err, InitializationError::Index(_)));
    }

    #[tokio::test]
    async fn unreachable_backend_fails_startup() {
        if std::env::var("OLLAMA_HOST").is_ok() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        // Port 9 (discard) on loopback refuses connections.
        std::fs::write(
            dir.path().join("config.yml"),
            "llm:\n  base_url: http://127.0.0.1:9\nembedding:\n  base_url: http://127.0.0.1:9\n",
        )
        .unwrap();
        let paths = Arc::new(AppPaths::with_dirs(
            dir.path().to_path_buf(),
            dir.path().to_path_buf(),
        ));
        let service = ConfigService::with_config_path(paths, dir.path().join("config.yml"));

        let err = AppState::initialize(service).await.err().unwrap();
        assert!(matches!(err, InitializationError::Backend { role: "generation", .. }));
    }

    #[test]
    fn endpoint_equality_drives_provider_sharing() {
        let config = AppConfig::default();
        assert_eq!(config.embedding.endpoint(), config.llm.endpoint());
        assert_eq!(config.llm.endpoint().kind, ProviderKind::Ollama);
    }
}
