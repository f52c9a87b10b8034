//! Per-log orchestration.
//!
//! A [`Pipeline`] pulls batches from a [`TableSource`], types and
//! normalizes them into an [`AccumulatingTable`], then aggregates the table
//! on every configured time axis. Logs are processed one at a time; a
//! failing log does not stop a multi-log run.

use evostat_core::context::LogContext;
use evostat_core::error::{EvostatError, Result};
use evostat_core::schema::{Metric, TimeAxis};
use evostat_core::style::StyleLookup;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::aggregate::{aggregate, GroupedSeries};
use crate::alignment::{align, Alignment, AlignmentOrder};
use crate::correlation::{correlate, CorrelationRecord};
use crate::ingest::{CsvLogReader, TableSource, DEFAULT_BATCH_SIZE};
use crate::normalize::ChunkNormalizer;
use crate::render::Renderer;
use crate::table::{AccumulatingTable, TableSummary, DEFAULT_BATCH_LIMIT};
use crate::typing::type_batch;

/// What a pipeline computes and how much input it reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Primary time axis.
    pub time_axis: TimeAxis,
    /// Also aggregate on the iteration axis when the primary axis is
    /// [`TimeAxis::Generation`].
    pub compute_iteration_plots: bool,
    pub compute_correlations: bool,
    /// Rows per batch.
    pub batch_size: usize,
    /// Maximum batches per log; `None` reads everything. A configured `0`
    /// also means unbounded.
    #[serde(
        serialize_with = "limit_to_config",
        deserialize_with = "limit_from_config"
    )]
    pub batch_limit: Option<usize>,
    pub alignment_order: AlignmentOrder,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            time_axis: TimeAxis::Generation,
            compute_iteration_plots: true,
            compute_correlations: true,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_limit: Some(DEFAULT_BATCH_LIMIT),
            alignment_order: AlignmentOrder::default(),
        }
    }
}

fn limit_from_config<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<usize>, D::Error> {
    let limit = Option::<usize>::deserialize(deserializer)?;
    Ok(limit.filter(|&l| l > 0))
}

// TOML has no null, so an unbounded limit is written as 0.
fn limit_to_config<S: Serializer>(
    limit: &Option<usize>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(limit.unwrap_or(0) as u64)
}

impl PipelineConfig {
    /// Axes to aggregate on, primary first.
    pub fn axes(&self) -> Vec<TimeAxis> {
        let mut axes = vec![self.time_axis];
        if self.time_axis == TimeAxis::Generation && self.compute_iteration_plots {
            axes.push(TimeAxis::Iteration);
        }
        axes
    }
}

/// Cooperative cancellation flag, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Results of one log on one time axis.
#[derive(Debug)]
pub struct AxisAnalysis {
    pub axis: TimeAxis,
    pub series: GroupedSeries,
    pub alignment: Alignment,
    pub correlations: Option<Vec<CorrelationRecord>>,
}

/// Everything computed for one log.
#[derive(Debug)]
pub struct LogReport {
    pub context: LogContext,
    pub table: TableSummary,
    pub analyses: Vec<AxisAnalysis>,
}

impl LogReport {
    pub fn analysis(&self, axis: TimeAxis) -> Option<&AxisAnalysis> {
        self.analyses.iter().find(|a| a.axis == axis)
    }

    /// Hand every analysed axis and each of `metrics` to a renderer.
    pub fn render(
        &self,
        renderer: &mut dyn Renderer,
        styles: &dyn StyleLookup,
        metrics: &[Metric],
    ) -> Result<()> {
        for analysis in &self.analyses {
            for &metric in metrics {
                renderer.render(&self.context, &analysis.series, metric, styles)?;
            }
        }
        Ok(())
    }
}

/// The outcome of one log in a multi-log run.
#[derive(Debug)]
pub struct LogOutcome {
    pub path: PathBuf,
    pub result: Result<LogReport>,
}

/// Runs the ingestion and aggregation chain for logs read by `S`.
pub struct Pipeline<S> {
    source: S,
    config: PipelineConfig,
    cancel: CancellationToken,
}

impl Pipeline<CsvLogReader> {
    /// A pipeline reading harness CSV logs.
    pub fn csv(config: PipelineConfig) -> Self {
        let reader = CsvLogReader::new(config.batch_size);
        Self::new(reader, config)
    }
}

impl<S: TableSource> Pipeline<S> {
    pub fn new(source: S, config: PipelineConfig) -> Self {
        Self {
            source,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Share an existing cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Process one log. Errors carry the log's path.
    pub fn run_log(&self, path: impl AsRef<Path>) -> Result<LogReport> {
        let path = path.as_ref();
        self.process(path).map_err(|e| e.in_file(path))
    }

    /// Process logs in order, continuing past failing logs. Stops early
    /// once cancellation is observed.
    pub fn run_all<I, P>(&self, paths: I) -> Vec<LogOutcome>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut outcomes = Vec::new();
        for path in paths {
            let path = path.as_ref().to_path_buf();
            let result = self.run_log(&path);
            let cancelled = match &result {
                Ok(report) => {
                    info!(path = %path.display(), rows = report.table.rows, "log analysed");
                    false
                }
                Err(e) => {
                    warn!(error = %e, "log failed");
                    e.is_cancelled()
                }
            };
            outcomes.push(LogOutcome { path, result });
            if cancelled {
                break;
            }
        }
        outcomes
    }

    fn process(&self, path: &Path) -> Result<LogReport> {
        let opened = self.source.open_table(path)?;
        let context = LogContext::from_header_line(path, &opened.header_line)?;
        info!(
            path = %path.display(),
            problem = context.problem.title(),
            algorithms = context.resolver.len(),
            "opened log"
        );

        let table = self.fill_table(&context, opened.batches)?;
        let summary = table.summary();
        info!(
            batches = summary.batches,
            rows = summary.rows,
            dropped = summary.dropped_rows,
            "table complete"
        );

        let analyses = self.analyze_table(&context, &table)?;
        Ok(LogReport {
            context,
            table: summary,
            analyses,
        })
    }

    fn fill_table(&self, context: &LogContext, mut batches: S::Batches) -> Result<AccumulatingTable> {
        let normalizer = ChunkNormalizer::new(&context.resolver);
        let mut table = AccumulatingTable::new(self.config.batch_limit);

        loop {
            if self.cancel.is_cancelled() {
                return Err(EvostatError::Cancelled);
            }
            let Some(batch) = batches.next() else {
                break;
            };
            if !table.has_capacity() {
                table.mark_truncated();
                warn!(
                    consumed = table.summary().batches,
                    "batch limit reached, remaining input ignored"
                );
                break;
            }

            let batch = batch?;
            let records = type_batch(&batch)?;
            let normalized = normalizer.normalize(records)?;
            debug!(
                first_row = batch.first_row,
                rows = normalized.len(),
                dropped = normalized.dropped_rows,
                "batch normalized"
            );
            table.push(normalized);
        }
        Ok(table)
    }

    /// Aggregate, align and correlate a filled table on every configured axis.
    pub fn analyze_table(
        &self,
        context: &LogContext,
        table: &AccumulatingTable,
    ) -> Result<Vec<AxisAnalysis>> {
        let mut analyses = Vec::new();
        for axis in self.config.axes() {
            let series = aggregate(table.rows(), axis);
            debug!(%axis, groups = series.len(), "aggregated");

            let alignment = if series.is_empty() {
                Alignment::Skipped
            } else {
                match align(&series, &context.resolver, self.config.alignment_order) {
                    Ok(index) => Alignment::Aligned(index),
                    Err(e @ EvostatError::AlignmentPrecondition(_)) => {
                        warn!(%axis, error = %e, "rosters cannot be aligned");
                        Alignment::Rejected(e)
                    }
                    Err(e) => return Err(e),
                }
            };

            let correlations = if self.config.compute_correlations {
                Some(correlate(&series, &context.resolver)?)
            } else {
                None
            };

            analyses.push(AxisAnalysis {
                axis,
                series,
                alignment,
                correlations,
            });
        }
        Ok(analyses)
    }
}
