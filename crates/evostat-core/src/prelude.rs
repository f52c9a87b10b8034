//! evostat core prelude: convenient imports for common usage.
//!
//! ```rust
//! use evostat_core::prelude::*;
//! ```

pub use crate::schema::{Column, ElitismPolicy, Metric, Record, TimeAxis};

pub use crate::metadata::{AlgorithmIdentity, CommonParameters, LogHeader, MetadataResolver};

pub use crate::context::{LogContext, Problem};

pub use crate::style::{DefaultStyles, PlotStyle, StyleLookup};

pub use crate::error::{EvostatError, Result};
