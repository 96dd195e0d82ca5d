use std::collections::BTreeMap;

use serde::Serialize;

use crate::input::{InputError, Table, numeric_column, text_column};
use crate::report::OVERALL_GROUP;

pub const MISSING_GROUP: &str = "(missing)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Model,
    Benchmark,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Model => "model",
            Role::Benchmark => "benchmark",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub truth: String,
    pub models: Vec<String>,
    pub benchmarks: Vec<String>,
    pub group_by: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Comparison {
    pub group: Option<String>,
    pub predictor: String,
    pub role: Role,
    pub truth: Vec<f64>,
    pub prediction: Vec<f64>,
    pub n_dropped: usize,
}

impl Comparison {
    pub fn label(&self) -> String {
        match &self.group {
            Some(g) => format!("{}[{}]", self.predictor, g),
            None => self.predictor.clone(),
        }
    }
}

pub fn validate_selection(table: &Table, selection: &Selection) -> Result<(), InputError> {
    table.column_index(&selection.truth)?;
    if selection.models.is_empty() && selection.benchmarks.is_empty() {
        return Err(InputError::InvalidSelection(
            "at least one model or benchmark column is required".to_string(),
        ));
    }
    let mut seen = BTreeMap::new();
    for (name, role) in predictors(selection) {
        table.column_index(name)?;
        if name == selection.truth {
            return Err(InputError::InvalidSelection(format!(
                "truth column {} cannot also be a predictor",
                name
            )));
        }
        if let Some(prev) = seen.insert(name, role) {
            let msg = if prev == role {
                format!("column {} listed twice", name)
            } else {
                format!("column {} cannot be both a model and a benchmark", name)
            };
            return Err(InputError::InvalidSelection(msg));
        }
    }
    if let Some(group) = &selection.group_by {
        table.column_index(group)?;
        if *group == selection.truth {
            return Err(InputError::InvalidSelection(format!(
                "truth column {} cannot be the group column",
                group
            )));
        }
    }
    Ok(())
}

pub fn plan_comparisons(
    table: &Table,
    selection: &Selection,
) -> Result<Vec<Comparison>, InputError> {
    validate_selection(table, selection)?;

    let truth = numeric_column(table, &selection.truth)?;
    let groups = match &selection.group_by {
        Some(name) => Some(group_rows(name, &text_column(table, name)?)?),
        None => None,
    };

    let all_rows = (0..table.n_rows()).collect::<Vec<_>>();
    let mut out = Vec::new();
    for (name, role) in predictors(selection) {
        let prediction = numeric_column(table, name)?;
        out.push(build_comparison(None, name, role, &truth, &prediction, &all_rows));
        if let Some(groups) = &groups {
            for (group, rows) in groups {
                out.push(build_comparison(
                    Some(group.clone()),
                    name,
                    role,
                    &truth,
                    &prediction,
                    rows,
                ));
            }
        }
    }
    Ok(out)
}

fn predictors(selection: &Selection) -> impl Iterator<Item = (&str, Role)> {
    let models = selection.models.iter().map(|m| (m.as_str(), Role::Model));
    let benchmarks = selection
        .benchmarks
        .iter()
        .map(|b| (b.as_str(), Role::Benchmark));
    models.chain(benchmarks)
}

/// Row indices per group value. Blank values fall into `MISSING_GROUP`;
/// a literal value equal to a reserved label is an error.
fn group_rows(
    column: &str,
    values: &[String],
) -> Result<BTreeMap<String, Vec<usize>>, InputError> {
    let mut map: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (row, value) in values.iter().enumerate() {
        if value == OVERALL_GROUP || value == MISSING_GROUP {
            return Err(InputError::InvalidSelection(format!(
                "group column {} contains reserved value {:?}",
                column, value
            )));
        }
        let key = if value.is_empty() {
            MISSING_GROUP.to_string()
        } else {
            value.clone()
        };
        map.entry(key).or_default().push(row);
    }
    Ok(map)
}

fn build_comparison(
    group: Option<String>,
    predictor: &str,
    role: Role,
    truth: &[Option<f64>],
    prediction: &[Option<f64>],
    rows: &[usize],
) -> Comparison {
    let mut t = Vec::with_capacity(rows.len());
    let mut p = Vec::with_capacity(rows.len());
    for &row in rows {
        if let (Some(a), Some(b)) = (truth[row], prediction[row]) {
            t.push(a);
            p.push(b);
        }
    }
    let n_dropped = rows.len() - t.len();
    let comparison = Comparison {
        group,
        predictor: predictor.to_string(),
        role,
        truth: t,
        prediction: p,
        n_dropped,
    };
    if n_dropped > 0 {
        tracing::debug!(
            comparison = %comparison.label(),
            dropped = n_dropped,
            kept = comparison.truth.len(),
            "dropped rows with missing values"
        );
    }
    comparison
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_pairs.rs"]
mod tests;
