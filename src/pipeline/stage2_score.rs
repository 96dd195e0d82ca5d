use thiserror::Error;

use crate::model::concordance::count_pairs;
use crate::model::score::{InvalidInputError, ScoreResult, Side};
use crate::pipeline::stage1_pairs::{Comparison, Role};

/// Two-sided 95% normal quantile.
pub const Z_95: f64 = 1.96;

/// Concordance accuracy of `prediction` against `truth`.
///
/// Pairs tied in either sequence are left out of both numerator and
/// denominator, so `tau = (C - D) / (C + D)` and `accuracy = 50 + 50 * tau`.
/// The interval uses the large-sample standard error of Kendall's tau,
/// `sqrt(2(2N+5) / (9N(N-1)))`, clamped to 0..100.
pub fn score(truth: &[f64], prediction: &[f64]) -> Result<ScoreResult, InvalidInputError> {
    validate(truth, prediction)?;

    let n = truth.len();
    let counts = count_pairs(truth, prediction);
    // Both sides vary, so some pair differs in both.
    let untied = counts.untied();
    debug_assert!(untied > 0);

    let tau = (counts.concordant as f64 - counts.discordant as f64) / untied as f64;
    let accuracy = 50.0 + 50.0 * tau;
    let half_width = Z_95 * 50.0 * tau_standard_error(n);

    Ok(ScoreResult {
        accuracy,
        lower: clamp_percent(accuracy - half_width),
        upper: clamp_percent(accuracy + half_width),
        n,
        tau,
        concordant: counts.concordant,
        discordant: counts.discordant,
    })
}

pub fn tau_standard_error(n: usize) -> f64 {
    let n = n as f64;
    ((2.0 * (2.0 * n + 5.0)) / (9.0 * n * (n - 1.0))).sqrt()
}

fn validate(truth: &[f64], prediction: &[f64]) -> Result<(), InvalidInputError> {
    if truth.len() != prediction.len() {
        return Err(InvalidInputError::LengthMismatch {
            truth: truth.len(),
            prediction: prediction.len(),
        });
    }
    if truth.len() < 2 {
        return Err(InvalidInputError::TooFewObservations { n: truth.len() });
    }
    for (side, values) in [(Side::Truth, truth), (Side::Prediction, prediction)] {
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(InvalidInputError::NonFinite { side, index });
        }
    }
    for (side, values) in [(Side::Truth, truth), (Side::Prediction, prediction)] {
        let first = values[0];
        if values.iter().all(|&v| v == first) {
            return Err(InvalidInputError::Degenerate { side });
        }
    }
    Ok(())
}

fn clamp_percent(x: f64) -> f64 {
    x.clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    #[default]
    Skip,
    Abort,
}

#[derive(Debug, Clone)]
pub struct ComparisonOutcome {
    pub group: Option<String>,
    pub predictor: String,
    pub role: Role,
    /// Complete-case rows handed to the scorer.
    pub n: usize,
    pub n_dropped: usize,
    pub result: Result<ScoreResult, InvalidInputError>,
}

#[derive(Debug, Error)]
#[error("comparison {label} failed: {source}")]
pub struct ComparisonFailed {
    pub label: String,
    pub source: InvalidInputError,
}

pub fn run_comparisons(
    comparisons: &[Comparison],
    policy: ErrorPolicy,
) -> Result<Vec<ComparisonOutcome>, ComparisonFailed> {
    let mut out = Vec::with_capacity(comparisons.len());
    let mut failed = 0usize;
    for cmp in comparisons {
        let result = score(&cmp.truth, &cmp.prediction);
        match &result {
            Ok(r) => tracing::debug!(
                comparison = %cmp.label(),
                n = r.n,
                accuracy = r.accuracy,
                lower = r.lower,
                upper = r.upper,
                "scored comparison"
            ),
            Err(err) => {
                if policy == ErrorPolicy::Abort {
                    tracing::error!(comparison = %cmp.label(), "{err}");
                    return Err(ComparisonFailed {
                        label: cmp.label(),
                        source: err.clone(),
                    });
                }
                failed += 1;
                tracing::warn!(comparison = %cmp.label(), "skipping comparison: {err}");
            }
        }
        out.push(ComparisonOutcome {
            group: cmp.group.clone(),
            predictor: cmp.predictor.clone(),
            role: cmp.role,
            n: cmp.truth.len(),
            n_dropped: cmp.n_dropped,
            result,
        });
    }
    tracing::info!(
        total = out.len(),
        failed,
        "scored {} comparisons",
        out.len()
    );
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_score.rs"]
mod tests;
