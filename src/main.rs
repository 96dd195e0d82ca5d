mod input;
mod model;
mod pipeline;
mod report;
mod tracing;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::input::{InputError, load_table};
use crate::pipeline::stage1_pairs::{Selection, plan_comparisons};
use crate::pipeline::stage2_score::{ComparisonFailed, ErrorPolicy, run_comparisons};
use crate::pipeline::stage3_report::{ReportError, Stage3Input, write_reports};
use crate::report::Scale;

#[derive(Debug, Parser)]
#[command(name = "kira-rankacc", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score predictor columns against a truth column and write reports.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Input table (.tsv, .csv, optionally .gz).
    #[arg(long)]
    input: PathBuf,
    /// Ground-truth column.
    #[arg(long)]
    truth: String,
    /// Model prediction column; repeatable.
    #[arg(long = "model")]
    models: Vec<String>,
    /// Benchmark prediction column; repeatable.
    #[arg(long = "benchmark")]
    benchmarks: Vec<String>,
    /// Also score every value of this column separately.
    #[arg(long)]
    group_by: Option<String>,
    /// Output directory.
    #[arg(long)]
    out: PathBuf,
    /// Report accuracies on the 0-1 scale instead of 0-100.
    #[arg(long)]
    fraction: bool,
    /// Abort on the first comparison that cannot be scored.
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Clone)]
struct RunConfig {
    input: PathBuf,
    out_dir: PathBuf,
    selection: Selection,
    scale: Scale,
    policy: ErrorPolicy,
}

impl From<RunArgs> for RunConfig {
    fn from(args: RunArgs) -> Self {
        RunConfig {
            input: args.input,
            out_dir: args.out,
            selection: Selection {
                truth: args.truth,
                models: args.models,
                benchmarks: args.benchmarks,
                group_by: args.group_by,
            },
            scale: if args.fraction {
                Scale::Fraction
            } else {
                Scale::Percent
            },
            policy: if args.strict {
                ErrorPolicy::Abort
            } else {
                ErrorPolicy::Skip
            },
        }
    }
}

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Score(#[from] ComparisonFailed),
    #[error(transparent)]
    Report(#[from] ReportError),
}

fn main() {
    crate::tracing::init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => run(RunConfig::from(args)),
    };
    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(config: RunConfig) -> Result<(), RunError> {
    ::tracing::info!(
        input = %config.input.display(),
        truth = %config.selection.truth,
        models = config.selection.models.len(),
        benchmarks = config.selection.benchmarks.len(),
        "starting run"
    );

    let table = load_table(&config.input)?;
    let comparisons = plan_comparisons(&table, &config.selection)?;
    let outcomes = run_comparisons(&comparisons, config.policy)?;

    let input = Stage3Input {
        outcomes: &outcomes,
        input_path: config.input.display().to_string(),
        truth: config.selection.truth.clone(),
        group_by: config.selection.group_by.clone(),
        n_rows: table.n_rows(),
        scale: config.scale,
        tool_name: env!("CARGO_PKG_NAME").to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
    };
    write_reports(&input, &config.out_dir)?;

    Ok(())
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
