use serde::{Deserialize, Serialize};

use crate::rag::ScoreMode;

/// How many documents to retrieve and how to report the best one's score.
///
/// The HTTP service and the CLI run the same pipeline with different
/// profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalProfile {
    pub k: usize,
    pub score_mode: ScoreMode,
}

impl Default for RetrievalProfile {
    fn default() -> Self {
        Self {
            k: 1,
            score_mode: ScoreMode::Normalized,
        }
    }
}

impl RetrievalProfile {
    pub fn new(k: usize, score_mode: ScoreMode) -> Self {
        Self { k, score_mode }
    }
}
