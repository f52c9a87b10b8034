//! Batch ingestion of experiment logs.
//!
//! The engine only depends on the [`TableSource`] trait: given a path it
//! yields the raw header line plus a lazy, finite sequence of [`RawBatch`]es
//! in file order. [`CsvLogReader`] is the implementation used for the
//! comma-separated logs written by the experiment harness.

use csv::{ReaderBuilder, StringRecord, Trim};
use evostat_core::error::{EvostatError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

/// Rows per batch when nothing else is configured.
pub const DEFAULT_BATCH_SIZE: usize = 100 * 1024;

/// A batch of untyped rows, in arrival order.
#[derive(Debug, Clone)]
pub struct RawBatch {
    /// Column names of the table, shared by every batch of a log.
    pub headers: Arc<StringRecord>,
    pub rows: Vec<StringRecord>,
    /// Data-row index of the first row in this batch (0-based, header rows excluded).
    pub first_row: u64,
}

impl RawBatch {
    pub fn new(headers: Arc<StringRecord>, rows: Vec<StringRecord>, first_row: u64) -> Self {
        Self {
            headers,
            rows,
            first_row,
        }
    }

    /// Build a batch from string slices. Mostly useful in tests.
    pub fn from_rows(headers: &[&str], rows: &[&[&str]], first_row: u64) -> Self {
        Self {
            headers: Arc::new(StringRecord::from(headers.to_vec())),
            rows: rows.iter().map(|r| StringRecord::from(r.to_vec())).collect(),
            first_row,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// An opened log: its header line and the batches that follow it.
pub struct OpenedTable<B> {
    pub header_line: String,
    pub batches: B,
}

/// Supplies batches of raw records for one log at a time.
pub trait TableSource {
    type Batches: Iterator<Item = Result<RawBatch>>;

    fn open_table(&self, path: &Path) -> Result<OpenedTable<Self::Batches>>;
}

/// Reads harness logs: one wrapped JSON line followed by a CSV table.
#[derive(Debug, Clone, Copy)]
pub struct CsvLogReader {
    batch_size: usize,
}

impl CsvLogReader {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Open a log from any buffered reader.
    pub fn open_reader<R: BufRead>(&self, mut reader: R) -> Result<OpenedTable<CsvBatches<R>>> {
        let mut header_line = String::new();
        if reader.read_line(&mut header_line)? == 0 {
            return Err(EvostatError::missing_metadata("log is empty"));
        }
        let batches = CsvBatches::new(reader, self.batch_size)?;
        Ok(OpenedTable {
            header_line,
            batches,
        })
    }
}

impl Default for CsvLogReader {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl TableSource for CsvLogReader {
    type Batches = CsvBatches<BufReader<File>>;

    fn open_table(&self, path: &Path) -> Result<OpenedTable<Self::Batches>> {
        let file = File::open(path)?;
        self.open_reader(BufReader::new(file))
    }
}

/// Lazy batch iterator over a CSV table. Stops after the first error.
pub struct CsvBatches<R> {
    reader: csv::Reader<R>,
    headers: Arc<StringRecord>,
    batch_size: usize,
    next_row: u64,
    done: bool,
}

impl<R: std::io::Read> CsvBatches<R> {
    pub fn new(reader: R, batch_size: usize) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);
        let headers = Arc::new(reader.headers()?.clone());
        Ok(Self {
            reader,
            headers,
            batch_size: batch_size.max(1),
            next_row: 0,
            done: false,
        })
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }
}

impl<R: std::io::Read> Iterator for CsvBatches<R> {
    type Item = Result<RawBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let first_row = self.next_row;
        let mut rows = Vec::with_capacity(self.batch_size.min(4096));
        while rows.len() < self.batch_size {
            let mut record = StringRecord::new();
            match self.reader.read_record(&mut record) {
                Ok(true) => rows.push(record),
                Ok(false) => {
                    self.done = true;
                    break;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            }
        }

        if rows.is_empty() {
            return None;
        }
        self.next_row += rows.len() as u64;
        Some(Ok(RawBatch::new(self.headers.clone(), rows, first_row)))
    }
}
