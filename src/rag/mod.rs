//! Retrieval side of the query pipeline.
//!
//! This module provides:
//! - `VectorIndex` / `EmbeddingFunction`: the collaborator interfaces
//! - `SqliteVectorIndex`: the persisted index
//! - `ScoreMode`: distance to caller-facing score
//! - `ContextAssembler`: ranked documents to grounding text
//! - `PromptBuilder`: context + question to the grounded prompt

mod context_builder;
mod distance;
mod document;
#[cfg(test)]
mod memory;
mod prompt;
mod score;
mod sqlite;
mod store;

pub use context_builder::{ContextAssembler, CONTEXT_SEPARATOR, NO_RELEVANT_DATA};
pub use distance::{rank_by_distance, DistanceMetric};
pub use document::{Document, Metadata, ScoredMatch};
#[cfg(test)]
pub use memory::InMemoryVectorIndex;
pub use prompt::PromptBuilder;
pub use score::{normalize, ScoreMode};
pub use sqlite::SqliteVectorIndex;
pub use store::{EmbeddingFunction, VectorIndex};
