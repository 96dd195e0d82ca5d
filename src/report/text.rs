use crate::pipeline::stage1_pairs::Role;
use crate::report::{Scale, ScaledScore, Verdict, format_f64_4};

#[derive(Debug, Clone)]
pub struct RankedEntry {
    pub predictor: String,
    pub role: Role,
    pub score: ScaledScore,
}

#[derive(Debug, Clone)]
pub struct VerdictLine {
    pub model: String,
    pub benchmark: String,
    pub verdict: Verdict,
}

#[derive(Debug, Clone)]
pub struct GroupSection {
    pub label: String,
    pub ranked: Vec<RankedEntry>,
    pub failed: Vec<(String, String)>,
    pub verdicts: Vec<VerdictLine>,
}

#[derive(Debug, Clone)]
pub struct ReportContext {
    pub truth: String,
    pub group_by: Option<String>,
    pub n_rows: usize,
    pub scale: Scale,
    pub sections: Vec<GroupSection>,
}

pub fn render_report_text(ctx: &ReportContext) -> String {
    let mut out = String::new();

    out.push_str("Rank Concordance Accuracy Report\n");
    out.push_str("================================\n\n");

    out.push_str(&format!("Truth column: {}\n", ctx.truth));
    if let Some(group) = &ctx.group_by {
        out.push_str(&format!("Grouped by: {}\n", group));
    }
    out.push_str(&format!("Rows: {}\n", ctx.n_rows));
    out.push_str(&format!("Scale: {}\n\n", scale_label(ctx.scale)));

    for (i, section) in ctx.sections.iter().enumerate() {
        out.push_str(&format!("{}. Group: {}\n", i + 1, section.label));

        if section.ranked.is_empty() {
            out.push_str("No predictor could be scored.\n");
        }
        for (rank, entry) in section.ranked.iter().enumerate() {
            out.push_str(&format!(
                "  {:>2}. {} ({}): {} [{}, {}] n={}\n",
                rank + 1,
                entry.predictor,
                entry.role.as_str(),
                format_f64_4(entry.score.accuracy),
                format_f64_4(entry.score.lower),
                format_f64_4(entry.score.upper),
                entry.score.n
            ));
        }

        if let Some(best) = best_model(&section.ranked) {
            out.push_str(&format!(
                "Best model: {} ({})\n",
                best.predictor,
                format_f64_4(best.score.accuracy)
            ));
        }

        for v in &section.verdicts {
            out.push_str(&format!(
                "{} {} {}\n",
                v.model,
                v.verdict.as_str(),
                v.benchmark
            ));
        }

        for (predictor, reason) in &section.failed {
            out.push_str(&format!("Skipped {}: {}\n", predictor, reason));
        }
        out.push('\n');
    }

    out
}

fn best_model(ranked: &[RankedEntry]) -> Option<&RankedEntry> {
    ranked.iter().find(|e| e.role == Role::Model)
}

fn scale_label(scale: Scale) -> &'static str {
    match scale {
        Scale::Percent => "percent (0-100, chance = 50)",
        Scale::Fraction => "fraction (0-1, chance = 0.5)",
    }
}
