use serde::Serialize;
use thiserror::Error;

/// Rank-concordance accuracy on the 0..100 scale with a 95% interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreResult {
    pub accuracy: f64,
    pub lower: f64,
    pub upper: f64,
    pub n: usize,
    pub tau: f64,
    pub concordant: u64,
    pub discordant: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Truth,
    Prediction,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Truth => f.write_str("truth"),
            Side::Prediction => f.write_str("prediction"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInputError {
    #[error("length mismatch: truth has {truth} values, prediction has {prediction}")]
    LengthMismatch { truth: usize, prediction: usize },
    #[error("too few observations: {n} (need at least 2)")]
    TooFewObservations { n: usize },
    #[error("{side} value at index {index} is not finite")]
    NonFinite { side: Side, index: usize },
    #[error("{side} has a single distinct value; concordance is undefined")]
    Degenerate { side: Side },
}
