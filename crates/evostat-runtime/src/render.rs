//! Presentation seam.
//!
//! The engine hands aggregated series to a [`Renderer`] and only expects an
//! I/O result back. [`CsvRenderer`] writes one plot-ready table per time
//! axis and metric.

use csv::Writer;
use evostat_core::context::LogContext;
use evostat_core::error::Result;
use evostat_core::schema::Metric;
use evostat_core::style::StyleLookup;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::aggregate::GroupedSeries;
use crate::export::format_value;

/// Draws one metric of an aggregated series.
pub trait Renderer {
    fn render(
        &mut self,
        ctx: &LogContext,
        series: &GroupedSeries,
        metric: Metric,
        styles: &dyn StyleLookup,
    ) -> Result<()>;
}

/// Writes `<log stem>_<axis>_<metric>.csv` files with label, colour and
/// marker columns ready for plotting.
#[derive(Debug, Clone)]
pub struct CsvRenderer {
    out_dir: PathBuf,
    stride: usize,
    written: Vec<PathBuf>,
}

impl CsvRenderer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            stride: 1,
            written: Vec::new(),
        }
    }

    /// Keep only every `stride`-th point of each group. The last point of a
    /// group is always kept.
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride.max(1);
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn file_name(ctx: &LogContext, series: &GroupedSeries, metric: Metric) -> String {
        format!(
            "{}_{}_{}.csv",
            ctx.stem(),
            series.axis.name(),
            metric.name().replace(' ', "_")
        )
    }
}

impl Renderer for CsvRenderer {
    fn render(
        &mut self,
        ctx: &LogContext,
        series: &GroupedSeries,
        metric: Metric,
        styles: &dyn StyleLookup,
    ) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(Self::file_name(ctx, series, metric));
        let mut writer = Writer::from_writer(File::create(&path)?);

        writer.write_record([
            "label",
            "color",
            "symbol",
            "algorithm index",
            series.axis.name(),
            "mean",
            "std",
        ])?;

        for (key, points) in series.groups() {
            let identity = ctx.resolver.resolve(key.algorithm_index as usize)?;
            let label = styles.label(identity);
            let style = styles.style(identity);
            let index = key.algorithm_index.to_string();
            let last = points.len().saturating_sub(1);

            for (i, point) in points.iter().enumerate() {
                if i % self.stride != 0 && i != last {
                    continue;
                }
                let summary = point.get(metric);
                let time = point.time.to_string();
                let mean = format_value(summary.map(|s| s.mean));
                let std = format_value(summary.map(|s| s.std));
                writer.write_record([
                    label.as_str(),
                    style.color,
                    style.symbol,
                    index.as_str(),
                    time.as_str(),
                    mean.as_str(),
                    std.as_str(),
                ])?;
            }
        }
        writer.flush()?;

        debug!(path = %path.display(), %metric, "rendered series");
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::normalize::NormalizedRecord;
    use evostat_core::metadata::{AlgorithmIdentity, LogHeader};
    use evostat_core::schema::{ElitismPolicy, Record, TimeAxis};
    use evostat_core::style::DefaultStyles;

    fn context() -> LogContext {
        LogContext::new(
            "/logs/onemax_run.csv",
            LogHeader {
                roster: vec![AlgorithmIdentity::new(
                    ElitismPolicy::GreedySelection,
                    "SimpleReplacement",
                    false,
                    false,
                )],
                common: None,
            },
        )
    }

    fn series(points: u32) -> GroupedSeries {
        let rows: Vec<NormalizedRecord> = (0..points)
            .map(|iteration| NormalizedRecord {
                elitism: ElitismPolicy::GreedySelection,
                record: Record {
                    iteration,
                    max_score: iteration as f32,
                    mean_genetic_distance: Some(1.0),
                    ..Record::default()
                },
            })
            .collect();
        aggregate(&rows, TimeAxis::Iteration)
    }

    #[test]
    fn writes_one_file_per_metric() {
        let dir = tempfile::tempdir().unwrap();
        let mut renderer = CsvRenderer::new(dir.path());
        let ctx = context();
        let series = series(3);

        renderer
            .render(&ctx, &series, Metric::MaxScore, &DefaultStyles)
            .unwrap();
        renderer
            .render(&ctx, &series, Metric::MeanGeneticDistance, &DefaultStyles)
            .unwrap();

        assert_eq!(renderer.written().len(), 2);
        let path = dir.path().join("onemax_run_iteration_max_score.csv");
        assert_eq!(renderer.written()[0], path);

        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "label,color,symbol,algorithm index,iteration,mean,std");
        assert_eq!(lines[1], "SimpleReplacement (G),grey,+,0,0,0,0");
        assert_eq!(lines[3], "SimpleReplacement (G),grey,+,0,2,2,0");
    }

    #[test]
    fn stride_keeps_last_point() {
        let dir = tempfile::tempdir().unwrap();
        let mut renderer = CsvRenderer::new(dir.path()).with_stride(4);
        renderer
            .render(&context(), &series(6), Metric::MaxScore, &DefaultStyles)
            .unwrap();

        let text = fs::read_to_string(&renderer.written()[0]).unwrap();
        let times: Vec<&str> = text
            .lines()
            .skip(1)
            .map(|l| l.split(',').nth(4).unwrap())
            .collect();
        assert_eq!(times, vec!["0", "4", "5"]);
    }
}
