use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::pipeline::stage1_pairs::Role;
use crate::pipeline::stage2_score::ComparisonOutcome;
use crate::report::json::render_summary_json;
use crate::report::text::{
    GroupSection, RankedEntry, ReportContext, VerdictLine, render_report_text,
};
use crate::report::{
    InputMeta, Scale, ScaledScore, SummaryData, ToolMeta, compare_intervals, format_f64_4,
    group_label, outcome_rows, sorted_outcomes, status_text,
};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot serialize summary: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct Stage3Input<'a> {
    pub outcomes: &'a [ComparisonOutcome],
    pub input_path: String,
    pub truth: String,
    pub group_by: Option<String>,
    pub n_rows: usize,
    pub scale: Scale,
    pub tool_name: String,
    pub tool_version: String,
}

pub fn write_reports(input: &Stage3Input<'_>, out_dir: &Path) -> Result<(), ReportError> {
    fs::create_dir_all(out_dir)?;

    let tsv_path = out_dir.join("accuracy.tsv");
    write_accuracy_tsv(input, &tsv_path)?;

    let summary_path = out_dir.join("summary.json");
    let summary = build_summary(input);
    write_text(&summary_path, &render_summary_json(&summary)?)?;

    let report_path = out_dir.join("report.txt");
    let ctx = build_report_context(input);
    write_text(&report_path, &render_report_text(&ctx))?;

    tracing::info!(out_dir = %out_dir.display(), "wrote accuracy.tsv, summary.json, report.txt");
    Ok(())
}

fn write_accuracy_tsv(input: &Stage3Input<'_>, path: &Path) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    let header = [
        "group",
        "predictor",
        "role",
        "n",
        "n_dropped",
        "accuracy",
        "lower",
        "upper",
        "tau",
        "concordant",
        "discordant",
        "status",
    ]
    .join("\t");
    writeln!(w, "{}", header)?;

    for outcome in sorted_outcomes(input.outcomes) {
        let mut row = vec![
            group_label(outcome.group.as_deref()).to_string(),
            outcome.predictor.clone(),
            outcome.role.as_str().to_string(),
        ];
        match &outcome.result {
            Ok(r) => {
                let s = ScaledScore::from_result(r, input.scale);
                row.extend([
                    s.n.to_string(),
                    outcome.n_dropped.to_string(),
                    format_f64_4(s.accuracy),
                    format_f64_4(s.lower),
                    format_f64_4(s.upper),
                    format_f64_4(s.tau),
                    s.concordant.to_string(),
                    s.discordant.to_string(),
                ]);
            }
            Err(_) => {
                row.push(outcome.n.to_string());
                row.push(outcome.n_dropped.to_string());
                row.extend(std::iter::repeat_n(String::new(), 6));
            }
        }
        row.push(sanitize_field(&status_text(outcome)));
        writeln!(w, "{}", row.join("\t"))?;
    }

    w.flush()
}

pub fn build_summary(input: &Stage3Input<'_>) -> SummaryData {
    SummaryData {
        tool: ToolMeta {
            name: input.tool_name.clone(),
            version: input.tool_version.clone(),
        },
        input: InputMeta {
            path: input.input_path.clone(),
            truth: input.truth.clone(),
            group_by: input.group_by.clone(),
            n_rows: input.n_rows,
            scale: input.scale,
        },
        results: outcome_rows(input.outcomes, input.scale),
    }
}

pub fn build_report_context(input: &Stage3Input<'_>) -> ReportContext {
    let mut by_group: BTreeMap<Option<&str>, Vec<&ComparisonOutcome>> = BTreeMap::new();
    for outcome in input.outcomes {
        by_group
            .entry(outcome.group.as_deref())
            .or_default()
            .push(outcome);
    }

    let mut sections = Vec::with_capacity(by_group.len());
    for (group, outcomes) in by_group {
        let mut ranked = Vec::new();
        let mut failed = Vec::new();
        for o in &outcomes {
            match &o.result {
                Ok(r) => ranked.push((
                    r,
                    RankedEntry {
                        predictor: o.predictor.clone(),
                        role: o.role,
                        score: ScaledScore::from_result(r, input.scale),
                    },
                )),
                Err(err) => failed.push((o.predictor.clone(), err.to_string())),
            }
        }
        ranked.sort_by(|(a, ea), (b, eb)| {
            b.accuracy
                .partial_cmp(&a.accuracy)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| ea.predictor.cmp(&eb.predictor))
        });
        failed.sort();

        let mut verdicts = Vec::new();
        for (model, m_entry) in ranked.iter().filter(|(_, e)| e.role == Role::Model) {
            for (bench, b_entry) in ranked.iter().filter(|(_, e)| e.role == Role::Benchmark) {
                verdicts.push(VerdictLine {
                    model: m_entry.predictor.clone(),
                    benchmark: b_entry.predictor.clone(),
                    verdict: compare_intervals(model, bench),
                });
            }
        }

        sections.push(GroupSection {
            label: group_label(group).to_string(),
            ranked: ranked.into_iter().map(|(_, e)| e).collect(),
            failed,
            verdicts,
        });
    }

    ReportContext {
        truth: input.truth.clone(),
        group_by: input.group_by.clone(),
        n_rows: input.n_rows,
        scale: input.scale,
        sections,
    }
}

fn sanitize_field(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}

fn write_text(path: &Path, content: &str) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(content.as_bytes())?;
    w.flush()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_report.rs"]
mod tests;
