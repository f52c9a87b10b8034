//! Per-batch normalization: derivation, filtering and labelling.
//!
//! Rows without a mean genetic distance come from a population that has not
//! been sampled for diversity yet. They are removed here, so no aggregate
//! downstream ever sees them.

use evostat_core::error::Result;
use evostat_core::metadata::MetadataResolver;
use evostat_core::schema::{ElitismPolicy, Record};

/// A record tagged with the elitism policy of its algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub elitism: ElitismPolicy,
    pub record: Record,
}

/// The cleaned output of one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    pub rows: Vec<NormalizedRecord>,
    /// Rows handed to the normalizer.
    pub input_rows: usize,
    /// Rows removed for lacking a mean genetic distance.
    pub dropped_rows: usize,
}

impl NormalizedBatch {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The plain records, e.g. to feed them through the normalizer again.
    pub fn into_records(self) -> Vec<Record> {
        self.rows.into_iter().map(|r| r.record).collect()
    }
}

/// Normalizes typed batches against one log's roster.
pub struct ChunkNormalizer<'a> {
    resolver: &'a MetadataResolver,
}

impl<'a> ChunkNormalizer<'a> {
    pub fn new(resolver: &'a MetadataResolver) -> Self {
        Self { resolver }
    }

    /// Derive integer generations, drop rows without diversity and attach
    /// each row's elitism policy.
    ///
    /// Every row's algorithm index is checked against the roster, including
    /// rows that end up dropped.
    pub fn normalize(&self, records: Vec<Record>) -> Result<NormalizedBatch> {
        let input_rows = records.len();
        let mut rows = Vec::with_capacity(input_rows);

        for record in records {
            let identity = self.resolver.resolve(record.algorithm_index as usize)?;
            if record.mean_genetic_distance.is_none() {
                continue;
            }
            rows.push(NormalizedRecord {
                elitism: identity.elitism.clone(),
                record: record.with_integer_generation(),
            });
        }

        Ok(NormalizedBatch {
            dropped_rows: input_rows - rows.len(),
            input_rows,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evostat_core::error::EvostatError;
    use evostat_core::metadata::AlgorithmIdentity;

    fn resolver() -> MetadataResolver {
        MetadataResolver::from_roster(vec![
            AlgorithmIdentity::new(ElitismPolicy::GreedySelection, "SimpleReplacement", false, false),
            AlgorithmIdentity::new(ElitismPolicy::MetropolisHastings, "MAP Elite", true, false),
        ])
    }

    fn record(algorithm_index: u8, iteration: u32, diversity: Option<f32>) -> Record {
        Record {
            repetition: 1,
            algorithm_index,
            iteration,
            generations: Some(iteration as f32 / 4.0),
            mean_genetic_distance: diversity,
            ..Record::default()
        }
    }

    #[test]
    fn drops_rows_without_diversity() {
        let resolver = resolver();
        let normalizer = ChunkNormalizer::new(&resolver);
        let batch = normalizer
            .normalize(vec![
                record(0, 0, None),
                record(0, 1, Some(0.5)),
                record(1, 0, Some(0.25)),
                record(1, 1, None),
            ])
            .unwrap();

        assert_eq!(batch.input_rows, 4);
        assert_eq!(batch.dropped_rows, 2);
        assert_eq!(batch.len(), batch.input_rows - batch.dropped_rows);
        assert_eq!(batch.rows[0].elitism, ElitismPolicy::GreedySelection);
        assert_eq!(batch.rows[1].elitism, ElitismPolicy::MetropolisHastings);
    }

    #[test]
    fn derives_integer_generation() {
        let resolver = resolver();
        let batch = ChunkNormalizer::new(&resolver)
            .normalize(vec![record(0, 9, Some(1.0))])
            .unwrap();
        assert_eq!(batch.rows[0].record.integer_generation, Some(2));
    }

    #[test]
    fn normalizing_twice_is_idempotent() {
        let resolver = resolver();
        let normalizer = ChunkNormalizer::new(&resolver);
        let once = normalizer
            .normalize(vec![
                record(0, 0, None),
                record(0, 5, Some(0.5)),
                record(1, 7, Some(0.25)),
            ])
            .unwrap();
        let twice = normalizer.normalize(once.clone().into_records()).unwrap();
        assert_eq!(once.rows, twice.rows);
        assert_eq!(twice.dropped_rows, 0);
    }

    #[test]
    fn unknown_index_is_fatal_even_for_dropped_rows() {
        let resolver = resolver();
        let err = ChunkNormalizer::new(&resolver)
            .normalize(vec![record(0, 0, Some(1.0)), record(5, 0, None)])
            .unwrap_err();
        assert!(matches!(
            err,
            EvostatError::UnknownAlgorithmIndex { index: 5, roster_len: 2 }
        ));
    }
}
