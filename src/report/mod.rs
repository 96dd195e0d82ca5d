pub mod json;
pub mod text;

use serde::Serialize;

use crate::model::score::ScoreResult;
use crate::pipeline::stage1_pairs::Role;
use crate::pipeline::stage2_score::ComparisonOutcome;

pub const OVERALL_GROUP: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    #[default]
    Percent,
    Fraction,
}

impl Scale {
    pub fn apply(self, v: f64) -> f64 {
        match self {
            Scale::Percent => v,
            Scale::Fraction => v / 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Outperforms,
    Underperforms,
    Indistinguishable,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Outperforms => "outperforms",
            Verdict::Underperforms => "underperforms",
            Verdict::Indistinguishable => "indistinguishable",
        }
    }
}

/// Interval-overlap comparison of a model against a benchmark.
pub fn compare_intervals(model: &ScoreResult, benchmark: &ScoreResult) -> Verdict {
    if model.lower > benchmark.upper {
        Verdict::Outperforms
    } else if model.upper < benchmark.lower {
        Verdict::Underperforms
    } else {
        Verdict::Indistinguishable
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScaledScore {
    pub accuracy: f64,
    pub lower: f64,
    pub upper: f64,
    pub n: usize,
    pub tau: f64,
    pub concordant: u64,
    pub discordant: u64,
}

impl ScaledScore {
    pub fn from_result(r: &ScoreResult, scale: Scale) -> Self {
        Self {
            accuracy: round4(scale.apply(r.accuracy)),
            lower: round4(scale.apply(r.lower)),
            upper: round4(scale.apply(r.upper)),
            n: r.n,
            tau: round4(r.tau),
            concordant: r.concordant,
            discordant: r.discordant,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeRow {
    pub group: String,
    pub predictor: String,
    pub role: Role,
    pub n: usize,
    pub n_dropped: usize,
    pub status: String,
    pub score: Option<ScaledScore>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputMeta {
    pub path: String,
    pub truth: String,
    pub group_by: Option<String>,
    pub n_rows: usize,
    pub scale: Scale,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub tool: ToolMeta,
    pub input: InputMeta,
    pub results: Vec<OutcomeRow>,
}

pub fn group_label(group: Option<&str>) -> &str {
    group.unwrap_or(OVERALL_GROUP)
}

/// Overall rows first, then groups in name order, then predictor name.
pub fn sorted_outcomes(outcomes: &[ComparisonOutcome]) -> Vec<&ComparisonOutcome> {
    let mut sorted = outcomes.iter().collect::<Vec<_>>();
    sorted.sort_by(|a, b| {
        a.group
            .cmp(&b.group)
            .then_with(|| a.predictor.cmp(&b.predictor))
    });
    sorted
}

pub fn outcome_rows(outcomes: &[ComparisonOutcome], scale: Scale) -> Vec<OutcomeRow> {
    sorted_outcomes(outcomes)
        .into_iter()
        .map(|o| OutcomeRow {
            group: group_label(o.group.as_deref()).to_string(),
            predictor: o.predictor.clone(),
            role: o.role,
            n: o.n,
            n_dropped: o.n_dropped,
            status: status_text(o),
            score: o
                .result
                .as_ref()
                .ok()
                .map(|r| ScaledScore::from_result(r, scale)),
        })
        .collect()
}

pub fn status_text(outcome: &ComparisonOutcome) -> String {
    match &outcome.result {
        Ok(_) => "ok".to_string(),
        Err(err) => err.to_string(),
    }
}

pub fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

pub fn format_f64_4(v: f64) -> String {
    format!("{:.4}", v)
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
