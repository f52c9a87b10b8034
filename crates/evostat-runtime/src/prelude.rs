//! Common imports.
//!
//! ```rust
//! use evostat_runtime::prelude::*;
//! ```

pub use crate::ingest::{CsvLogReader, OpenedTable, RawBatch, TableSource, DEFAULT_BATCH_SIZE};

pub use crate::normalize::{ChunkNormalizer, NormalizedBatch, NormalizedRecord};
pub use crate::table::{AccumulatingTable, TableSummary, DEFAULT_BATCH_LIMIT};

pub use crate::aggregate::{aggregate, GroupKey, GroupedSeries, SeriesPoint};
pub use crate::alignment::{align, Alignment, AlignmentIndex, AlignmentOrder};
pub use crate::correlation::{correlate, CorrelationRecord};
pub use crate::stats::{pearson, RunningStats, Summary};

pub use crate::export::{write_correlations, write_report, write_series};
pub use crate::render::{CsvRenderer, Renderer};

pub use crate::pipeline::{
    AxisAnalysis, CancellationToken, LogOutcome, LogReport, Pipeline, PipelineConfig,
};
