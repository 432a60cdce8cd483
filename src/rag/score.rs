use serde::{Deserialize, Serialize};

/// How the top match's distance is reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMode {
    /// `1 - distance`, clamped to `[0, 1]`.
    #[default]
    Normalized,
    /// The index's distance, unbounded.
    Raw,
}

impl ScoreMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ScoreMode::Normalized => "normalized",
            ScoreMode::Raw => "raw",
        }
    }

    /// Score for the best match, or `0.0` when nothing matched.
    ///
    /// A non-finite distance scores like no match; JSON has no encoding
    /// for it.
    pub fn score(self, distance: Option<f64>) -> f64 {
        match (self, distance.filter(|d| d.is_finite())) {
            (_, None) => 0.0,
            (ScoreMode::Normalized, Some(d)) => normalize(d),
            (ScoreMode::Raw, Some(d)) => d,
        }
    }
}

/// Linear, saturating map from distance to an accuracy-like value.
///
/// This is an approximation, not a calibrated probability. The upper clamp
/// only matters for an index that reports negative distances.
/// NaN maps to `0.0`.
pub fn normalize(distance: f64) -> f64 {
    f64::max(0.0, 1.0 - distance).min(1.0)
}
