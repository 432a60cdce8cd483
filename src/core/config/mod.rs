pub mod defaults;
pub mod paths;
pub mod service;
pub mod validation;

pub use defaults::{
    AppConfig, EmbeddingConfig, IndexConfig, LlmConfig, ProviderEndpoint, ProviderKind,
    RetrievalConfig, ServerConfig,
};
pub use paths::AppPaths;
pub use service::ConfigService;
pub use validation::validate_profile;
