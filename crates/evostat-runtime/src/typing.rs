//! Coercion of raw batches into typed [`Record`]s.
//!
//! Columns are located by header name, so the table may list them in any
//! order. A single bad value rejects the whole batch.

use csv::StringRecord;
use evostat_core::error::{EvostatError, Result};
use evostat_core::schema::{integer_generation, Column, Record};

use crate::ingest::RawBatch;

/// Position of every schema column inside a table header.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    positions: [Option<usize>; Column::ALL.len()],
}

impl ColumnMap {
    /// Locate the columns of `headers`. Every required column must be present.
    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        let mut positions = [None; Column::ALL.len()];
        for (i, name) in headers.iter().enumerate() {
            if let Some(column) = Column::from_name(name) {
                positions[column as usize] = Some(i);
            }
        }
        for column in Column::required() {
            if positions[column as usize].is_none() {
                return Err(EvostatError::MissingColumn(column));
            }
        }
        Ok(Self { positions })
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions[column as usize]
    }
}

/// Coerce every row of `batch`, or fail on the first malformed value.
pub fn type_batch(batch: &RawBatch) -> Result<Vec<Record>> {
    let columns = ColumnMap::from_headers(&batch.headers)?;
    batch
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| type_row(&columns, row, batch.first_row + i as u64))
        .collect()
}

fn type_row(columns: &ColumnMap, row: &StringRecord, row_index: u64) -> Result<Record> {
    let at = |column: Column| cell(columns, row, column);

    let generations = nullable_float(at(Column::Generations), row_index, Column::Generations)?;

    Ok(Record {
        repetition: unsigned(at(Column::Repetition), row_index, Column::Repetition)?,
        algorithm_index: unsigned(at(Column::AlgorithmIndex), row_index, Column::AlgorithmIndex)?,
        iteration: unsigned(at(Column::Iteration), row_index, Column::Iteration)?,
        min_score: float(at(Column::MinScore), row_index, Column::MinScore)?,
        max_score: float(at(Column::MaxScore), row_index, Column::MaxScore)?,
        mean_score: float(at(Column::MeanScore), row_index, Column::MeanScore)?,
        number_of_organisms: unsigned(
            at(Column::NumberOfOrganisms),
            row_index,
            Column::NumberOfOrganisms,
        )?,
        variance: float(at(Column::Variance), row_index, Column::Variance)?,
        integer_generation: generations.and_then(integer_generation),
        generations: generations.map(|g| g as f32),
        mean_genetic_distance: nullable_float(
            at(Column::MeanGeneticDistance),
            row_index,
            Column::MeanGeneticDistance,
        )?
        .map(|d| d as f32),
    })
}

fn cell<'a>(columns: &ColumnMap, row: &'a StringRecord, column: Column) -> &'a str {
    columns
        .position(column)
        .and_then(|i| row.get(i))
        .unwrap_or("")
}

/// Parse an unsigned counter and narrow it to `T`.
///
/// Integral floats such as `"3.0"` are accepted.
fn unsigned<T: TryFrom<u64>>(value: &str, row: u64, column: Column) -> Result<T> {
    let wide = match value.parse::<u64>() {
        Ok(v) => Some(v),
        Err(_) => value
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64),
    };
    wide.and_then(|v| T::try_from(v).ok())
        .ok_or_else(|| EvostatError::malformed(row, column, value))
}

fn float(value: &str, row: u64, column: Column) -> Result<f32> {
    match value.parse::<f64>() {
        Ok(v) => Ok(v as f32),
        Err(_) => Err(EvostatError::malformed(row, column, value)),
    }
}

fn nullable_float(value: &str, row: u64, column: Column) -> Result<Option<f64>> {
    if is_null(value) {
        return Ok(None);
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(EvostatError::malformed(row, column, value)),
    }
}

fn is_null(value: &str) -> bool {
    matches!(value, "" | "NaN" | "nan" | "null" | "None")
}
