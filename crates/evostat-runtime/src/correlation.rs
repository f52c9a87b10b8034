//! Gain/variance/diversity correlations.
//!
//! For every group the aggregated means are taken in time order. The gain
//! is the first difference of the mean score, so the first time value has
//! no gain and is left out of all three correlations.

use evostat_core::error::Result;
use evostat_core::metadata::MetadataResolver;
use evostat_core::schema::{ElitismPolicy, Metric, TimeAxis};
use serde::Serialize;

use crate::aggregate::{GroupedSeries, SeriesPoint};
use crate::stats::pearson;

/// Correlations of one algorithm under one elitism policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationRecord {
    pub elitism: ElitismPolicy,
    pub family: String,
    pub use_features: bool,
    pub use_hyperparameters: bool,
    pub algorithm_index: u8,
    pub axis: TimeAxis,
    /// Points that entered the correlations, after the first time value.
    pub points: usize,
    pub gain_variance: Option<f64>,
    pub gain_diversity: Option<f64>,
    pub variance_diversity: Option<f64>,
}

/// Correlate every group of `series`.
pub fn correlate(
    series: &GroupedSeries,
    resolver: &MetadataResolver,
) -> Result<Vec<CorrelationRecord>> {
    series
        .groups()
        .map(|(key, points)| -> Result<CorrelationRecord> {
            let identity = resolver.resolve(key.algorithm_index as usize)?;
            let columns = Columns::from_points(points);
            Ok(CorrelationRecord {
                elitism: key.elitism.clone(),
                family: identity.family.clone(),
                use_features: identity.use_features,
                use_hyperparameters: identity.use_hyperparameters,
                algorithm_index: key.algorithm_index,
                axis: series.axis,
                points: columns.gain.len(),
                gain_variance: pearson(&columns.gain, &columns.variance),
                gain_diversity: pearson(&columns.gain, &columns.diversity),
                variance_diversity: pearson(&columns.variance, &columns.diversity),
            })
        })
        .collect()
}

/// The aligned suffix used for the correlations.
#[derive(Debug, Default)]
struct Columns {
    gain: Vec<f64>,
    variance: Vec<f64>,
    diversity: Vec<f64>,
}

impl Columns {
    fn from_points(points: &[SeriesPoint]) -> Self {
        let mut columns = Columns::default();
        for pair in points.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            let values = (
                previous.mean(Metric::MeanScore),
                current.mean(Metric::MeanScore),
                current.mean(Metric::Variance),
                current.mean(Metric::MeanGeneticDistance),
            );
            // Points missing any mean are left out of all three series.
            if let (Some(before), Some(score), Some(variance), Some(diversity)) = values {
                columns.gain.push(score - before);
                columns.variance.push(variance);
                columns.diversity.push(diversity);
            }
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::normalize::NormalizedRecord;
    use evostat_core::metadata::AlgorithmIdentity;
    use evostat_core::schema::Record;

    fn row(iteration: u32, mean_score: f32, variance: f32, diversity: f32) -> NormalizedRecord {
        NormalizedRecord {
            elitism: ElitismPolicy::GreedySelection,
            record: Record {
                repetition: 1,
                iteration,
                mean_score,
                variance,
                mean_genetic_distance: Some(diversity),
                ..Record::default()
            },
        }
    }

    fn resolver() -> MetadataResolver {
        MetadataResolver::from_roster(vec![AlgorithmIdentity::new(
            ElitismPolicy::GreedySelection,
            "MAP Elite",
            true,
            false,
        )])
    }

    #[test]
    fn gain_tracks_variance() {
        // Scores 0, 1, 3, 6, 10 give gains 1, 2, 3, 4, matching the variance.
        let rows = vec![
            row(0, 0.0, 9.0, 4.0),
            row(1, 1.0, 1.0, 4.0),
            row(2, 3.0, 2.0, 3.0),
            row(3, 6.0, 3.0, 2.0),
            row(4, 10.0, 4.0, 1.0),
        ];
        let series = aggregate(&rows, TimeAxis::Iteration);
        let records = correlate(&series, &resolver()).unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.points, 4);
        assert!((record.gain_variance.unwrap() - 1.0).abs() < 1e-9);
        assert!((record.gain_diversity.unwrap() + 1.0).abs() < 1e-9);
        assert!((record.variance_diversity.unwrap() + 1.0).abs() < 1e-9);
        assert_eq!(record.family, "MAP Elite");
        assert!(record.use_features);
    }

    #[test]
    fn constant_diversity_is_undefined() {
        let rows = vec![
            row(0, 0.0, 1.0, 2.0),
            row(1, 1.0, 2.0, 2.0),
            row(2, 3.0, 4.0, 2.0),
        ];
        let series = aggregate(&rows, TimeAxis::Iteration);
        let record = &correlate(&series, &resolver()).unwrap()[0];
        assert!(record.gain_variance.is_some());
        assert_eq!(record.gain_diversity, None);
        assert_eq!(record.variance_diversity, None);
    }

    #[test]
    fn too_few_points_is_undefined() {
        let rows = vec![row(0, 0.0, 1.0, 2.0), row(1, 1.0, 2.0, 3.0)];
        let series = aggregate(&rows, TimeAxis::Iteration);
        let record = &correlate(&series, &resolver()).unwrap()[0];
        assert_eq!(record.points, 1);
        assert_eq!(record.gain_variance, None);
    }
}
