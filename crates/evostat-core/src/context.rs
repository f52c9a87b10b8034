//! Immutable per-log context.
//!
//! Everything a component needs to know about the log it is working on
//! travels in one [`LogContext`], built once before the first batch.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::metadata::{LogHeader, MetadataResolver};

/// Benchmark problem a log was produced for, derived from its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Problem {
    Rastrigin,
    OneMax,
    TravellingSalesman,
    Unknown,
}

impl Problem {
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if name.contains("rastrigin") {
            Problem::Rastrigin
        } else if name.contains("onemax") {
            Problem::OneMax
        } else if name.contains("tsp") {
            Problem::TravellingSalesman
        } else {
            Problem::Unknown
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Problem::Rastrigin => "custom Rastrigin function",
            Problem::OneMax => "One Max",
            Problem::TravellingSalesman => "2D Travelling Salesman Problem",
            Problem::Unknown => "unknown",
        }
    }
}

/// What is known about a log before its data rows are read.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub path: PathBuf,
    pub problem: Problem,
    pub header: LogHeader,
    pub resolver: MetadataResolver,
}

impl LogContext {
    pub fn new(path: impl Into<PathBuf>, header: LogHeader) -> Self {
        let path = path.into();
        let resolver = MetadataResolver::new(&header);
        Self {
            problem: Problem::from_path(&path),
            path,
            header,
            resolver,
        }
    }

    /// Build a context from the raw first line of the log.
    pub fn from_header_line(path: impl Into<PathBuf>, line: &str) -> Result<Self> {
        let path = path.into();
        let header = LogHeader::from_wrapped_line(line).map_err(|e| e.in_file(&path))?;
        Ok(Self::new(path, header))
    }

    /// File stem used to name outputs derived from this log.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "log".to_string())
    }
}
