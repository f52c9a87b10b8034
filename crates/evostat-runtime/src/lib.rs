//! # evostat runtime
//!
//! Streaming ingestion and aggregation of evolutionary-algorithm logs.
//!
//! A log is read batch by batch through a [`ingest::TableSource`], typed,
//! normalized and accumulated into one table. The table is then summarised
//! per (elitism policy, algorithm index, time value), aligned across
//! policies and correlated. [`pipeline::Pipeline`] ties the stages together.
//!
//! ```no_run
//! use evostat_runtime::prelude::*;
//!
//! let pipeline = Pipeline::csv(PipelineConfig::default());
//! let report = pipeline.run_log("logs/onemax.csv")?;
//! write_report(&report, std::path::Path::new("evostat-out"))?;
//! # Ok::<(), evostat_core::error::EvostatError>(())
//! ```

pub mod ingest;
pub mod typing;
pub mod normalize;
pub mod table;
pub mod stats;
pub mod aggregate;
pub mod alignment;
pub mod correlation;
pub mod export;
pub mod render;
pub mod pipeline;
pub mod prelude;
