use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::document::{Document, ScoredMatch};
use crate::core::errors::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// `1 - cosine_similarity`, in `[0, 2]`.
    #[default]
    Cosine,
    /// Euclidean distance.
    L2,
}

impl DistanceMetric {
    pub fn distance(self, query: &[f32], candidate: &[f32]) -> Result<f64, ApiError> {
        if query.len() != candidate.len() {
            return Err(ApiError::Internal(format!(
                "embedding dimension mismatch: query has {}, stored vector has {}",
                query.len(),
                candidate.len()
            )));
        }

        match self {
            DistanceMetric::Cosine => Ok(1.0 - cosine_similarity(query, candidate)),
            DistanceMetric::L2 => Ok(query
                .iter()
                .zip(candidate.iter())
                .map(|(a, b)| (*a as f64 - *b as f64).powi(2))
                .sum::<f64>()
                .sqrt()),
        }
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Ranks candidates by ascending distance and keeps the best `k`.
///
/// The sort is stable, so equal distances keep the candidates' input
/// (storage) order. Non-finite distances are dropped.
pub fn rank_by_distance<I>(
    query: &[f32],
    candidates: I,
    k: usize,
    metric: DistanceMetric,
) -> Result<Vec<ScoredMatch>, ApiError>
where
    I: IntoIterator<Item = (Document, Vec<f32>)>,
{
    let mut scored = Vec::new();
    for (document, embedding) in candidates {
        let distance = metric.distance(query, &embedding)?;
        if !distance.is_finite() {
            tracing::debug!("Dropping {} with non-finite distance", document.id);
            continue;
        }
        scored.push(ScoredMatch { document, distance });
    }

    scored.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
    scored.truncate(k);
    Ok(scored)
}
