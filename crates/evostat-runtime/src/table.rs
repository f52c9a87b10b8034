//! The accumulated dataset of one log.

use serde::Serialize;

use crate::normalize::{NormalizedBatch, NormalizedRecord};

/// Batch ceiling applied when none is configured.
pub const DEFAULT_BATCH_LIMIT: usize = 100;

/// Counters describing how a table was filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TableSummary {
    pub batches: usize,
    pub raw_rows: usize,
    pub dropped_rows: usize,
    pub rows: usize,
    /// Input was left unread because of the batch ceiling.
    pub truncated: bool,
}

/// Normalized batches of one log, concatenated in arrival order.
#[derive(Debug, Clone, Default)]
pub struct AccumulatingTable {
    rows: Vec<NormalizedRecord>,
    batch_limit: Option<usize>,
    batches: usize,
    raw_rows: usize,
    dropped_rows: usize,
    truncated: bool,
}

impl AccumulatingTable {
    /// Create a table taking at most `batch_limit` batches (`None` for no limit).
    pub fn new(batch_limit: Option<usize>) -> Self {
        Self {
            batch_limit,
            ..Self::default()
        }
    }

    /// Whether another batch would be accepted.
    pub fn has_capacity(&self) -> bool {
        self.batch_limit.map_or(true, |limit| self.batches < limit)
    }

    /// Record that input remained after the ceiling was reached.
    pub fn mark_truncated(&mut self) {
        self.truncated = true;
    }

    /// Append a batch. Callers check [`has_capacity`](Self::has_capacity)
    /// before reading the batch.
    pub fn push(&mut self, batch: NormalizedBatch) {
        debug_assert!(self.has_capacity(), "batch pushed past the ceiling");
        self.batches += 1;
        self.raw_rows += batch.input_rows;
        self.dropped_rows += batch.dropped_rows;
        self.rows.extend(batch.rows);
    }

    pub fn rows(&self) -> &[NormalizedRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn summary(&self) -> TableSummary {
        TableSummary {
            batches: self.batches,
            raw_rows: self.raw_rows,
            dropped_rows: self.dropped_rows,
            rows: self.rows.len(),
            truncated: self.truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evostat_core::schema::{ElitismPolicy, Record};

    fn batch(iterations: std::ops::Range<u32>, dropped: usize) -> NormalizedBatch {
        let rows: Vec<NormalizedRecord> = iterations
            .map(|iteration| NormalizedRecord {
                elitism: ElitismPolicy::GreedySelection,
                record: Record {
                    iteration,
                    mean_genetic_distance: Some(1.0),
                    ..Record::default()
                },
            })
            .collect();
        NormalizedBatch {
            input_rows: rows.len() + dropped,
            dropped_rows: dropped,
            rows,
        }
    }

    #[test]
    fn keeps_arrival_order_and_counts() {
        let mut table = AccumulatingTable::new(None);
        table.push(batch(0..3, 1));
        table.push(batch(3..5, 2));

        let iterations: Vec<u32> = table.rows().iter().map(|r| r.record.iteration).collect();
        assert_eq!(iterations, vec![0, 1, 2, 3, 4]);

        let summary = table.summary();
        assert_eq!(summary.batches, 2);
        assert_eq!(summary.raw_rows, 8);
        assert_eq!(summary.dropped_rows, 3);
        assert_eq!(summary.rows, summary.raw_rows - summary.dropped_rows);
        assert!(!summary.truncated);
    }

    #[test]
    fn batch_limit_truncates() {
        let mut table = AccumulatingTable::new(Some(1));
        assert!(table.has_capacity());
        table.push(batch(0..2, 0));
        assert!(!table.has_capacity());
        assert!(!table.summary().truncated);
        table.mark_truncated();
        assert_eq!(table.len(), 2);
        assert!(table.summary().truncated);
    }
}
