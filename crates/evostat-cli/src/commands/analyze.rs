//! Aggregate experiment logs and write result tables.

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use evostat_core::prelude::*;
use evostat_runtime::alignment::{Alignment, AlignmentOrder};
use evostat_runtime::export::write_report;
use evostat_runtime::pipeline::{LogReport, Pipeline};
use evostat_runtime::render::CsvRenderer;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Config;
use crate::AxisArg;

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Log files to analyse
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Primary time axis
    #[arg(short, long, value_enum)]
    pub axis: Option<AxisArg>,

    /// Skip the gain/variance/diversity correlations
    #[arg(long)]
    pub no_correlations: bool,

    /// Do not add the iteration axis to a generation run
    #[arg(long)]
    pub no_iteration_plots: bool,

    /// Rows per batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Maximum batches read per log (0 for no limit)
    #[arg(long, conflicts_with = "unbounded")]
    pub batch_limit: Option<usize>,

    /// Read every batch of every log
    #[arg(long)]
    pub unbounded: bool,

    /// How algorithms are ranked across elitism policies ("roster" or a metric, e.g. "mean-score")
    #[arg(long)]
    pub alignment_order: Option<AlignmentOrder>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl AnalyzeArgs {
    /// Apply command-line overrides on top of the file configuration.
    pub fn apply(&self, config: &mut Config) {
        let pipeline = &mut config.pipeline;
        if let Some(axis) = self.axis {
            pipeline.time_axis = axis.into();
        }
        if self.no_correlations {
            pipeline.compute_correlations = false;
        }
        if self.no_iteration_plots {
            pipeline.compute_iteration_plots = false;
        }
        if let Some(size) = self.batch_size {
            pipeline.batch_size = size;
        }
        if let Some(limit) = self.batch_limit {
            pipeline.batch_limit = Some(limit).filter(|&l| l > 0);
        }
        if self.unbounded {
            pipeline.batch_limit = None;
        }
        if let Some(order) = self.alignment_order {
            pipeline.alignment_order = order;
        }
        if let Some(output) = &self.output {
            config.output.directory = output.clone();
        }
    }
}

pub fn run(args: AnalyzeArgs, verbose: bool) -> Result<()> {
    let mut config = Config::load()?;
    args.apply(&mut config);

    for path in &args.paths {
        if !path.exists() {
            bail!("Log does not exist: {}", path.display());
        }
    }

    println!(
        "{} Analysing {} logs ({} axis)...",
        "→".blue(),
        args.paths.len().to_string().cyan(),
        config.pipeline.time_axis.name().cyan()
    );

    let pipeline = Pipeline::csv(config.pipeline.clone());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("reading logs");
    let outcomes = pipeline.run_all(&args.paths);
    pb.finish_and_clear();

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => {
                let written = write_outputs(report, &config)?;
                print_report(report, &written, verbose);
            }
            Err(e) => {
                failed += 1;
                println!("{} {}", "✗".red().bold(), e);
            }
        }
    }

    println!();
    if failed > 0 {
        bail!("{} of {} logs failed", failed, args.paths.len());
    }
    println!(
        "{} Results written to {}",
        "✓".green().bold(),
        config.output.directory.display()
    );
    Ok(())
}

fn write_outputs(report: &LogReport, config: &Config) -> Result<Vec<PathBuf>> {
    let dir = config.output.directory.as_path();
    let mut written = write_report(report, dir)?;

    let mut renderer = CsvRenderer::new(dir).with_stride(config.output.stride);
    report.render(&mut renderer, &DefaultStyles, &config.output.metrics)?;
    written.extend_from_slice(renderer.written());
    Ok(written)
}

fn print_report(report: &LogReport, written: &[PathBuf], verbose: bool) {
    let table = &report.table;
    println!("{} {}", "✓".green(), report.context.path.display());
    println!(
        "  Rows: {} ({} dropped without diversity)",
        table.rows.to_string().cyan(),
        table.dropped_rows
    );
    if table.truncated {
        println!(
            "  {} stopped after {} batches, remaining input ignored",
            "•".yellow(),
            table.batches
        );
    }

    for analysis in &report.analyses {
        let status = match &analysis.alignment {
            Alignment::Aligned(index) => format!("aligned ({})", index.order).green(),
            Alignment::Rejected(e) => e.to_string().yellow(),
            Alignment::Skipped => "no data".dimmed(),
        };
        println!(
            "  {:<10} {} groups, {}",
            analysis.axis.name(),
            analysis.series.len().to_string().cyan(),
            status
        );
    }

    if verbose {
        for path in written {
            println!("    {}", display_name(path).dimmed());
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use evostat_core::schema::Metric;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: AnalyzeArgs,
    }

    fn parse(argv: &[&str]) -> AnalyzeArgs {
        Harness::try_parse_from(std::iter::once("analyze").chain(argv.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn flags_override_file_values() {
        let args = parse(&[
            "a.csv",
            "b.csv",
            "--axis",
            "iteration",
            "--no-correlations",
            "--batch-size",
            "10",
            "--alignment-order",
            "max-score",
            "-o",
            "out",
        ]);
        assert_eq!(args.paths.len(), 2);

        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.pipeline.time_axis, TimeAxis::Iteration);
        assert!(!config.pipeline.compute_correlations);
        assert!(config.pipeline.compute_iteration_plots);
        assert_eq!(config.pipeline.batch_size, 10);
        assert_eq!(
            config.pipeline.alignment_order,
            AlignmentOrder::MetricMean(Metric::MaxScore)
        );
        assert_eq!(config.output.directory, PathBuf::from("out"));
    }

    #[test]
    fn unbounded_removes_the_batch_limit() {
        let mut config = Config::default();
        parse(&["a.csv", "--unbounded"]).apply(&mut config);
        assert_eq!(config.pipeline.batch_limit, None);

        let mut config = Config::default();
        parse(&["a.csv", "--batch-limit", "3"]).apply(&mut config);
        assert_eq!(config.pipeline.batch_limit, Some(3));

        let mut config = Config::default();
        parse(&["a.csv", "--batch-limit", "0"]).apply(&mut config);
        assert_eq!(config.pipeline.batch_limit, None);
    }

    #[test]
    fn conflicting_limits_are_rejected() {
        let result = Harness::try_parse_from(["analyze", "a.csv", "--unbounded", "--batch-limit", "3"]);
        assert!(result.is_err());
    }
}
