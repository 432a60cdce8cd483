mod orchestrator;
mod pipeline;
mod profile;

pub use orchestrator::{GeneratedAnswers, GenerationKind, GenerationOrchestrator};
pub use pipeline::{validate_query, QueryPipeline, QueryRequest, QueryResponse};
pub use profile::RetrievalProfile;
