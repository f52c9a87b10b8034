//! Fixed record schema of an experiment log.
//!
//! Every data row of a log becomes one [`Record`]. Columns are addressed
//! through the [`Column`] enum instead of by string, and numeric views over
//! a record are enumerated by [`Metric`] and [`TimeAxis`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A column of the log table, named exactly as in the log header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Repetition,
    AlgorithmIndex,
    Iteration,
    DurationNs,
    SumScore,
    MinScore,
    MaxScore,
    MeanScore,
    MedianScore,
    NumberOfOrganisms,
    Variance,
    Generations,
    MeanGeneticDistance,
}

impl Column {
    /// All columns in the order the experiment harness writes them.
    pub const ALL: [Column; 13] = [
        Column::Repetition,
        Column::AlgorithmIndex,
        Column::Iteration,
        Column::DurationNs,
        Column::SumScore,
        Column::MinScore,
        Column::MaxScore,
        Column::MeanScore,
        Column::MedianScore,
        Column::NumberOfOrganisms,
        Column::Variance,
        Column::Generations,
        Column::MeanGeneticDistance,
    ];

    /// The header-row name of this column.
    pub fn name(self) -> &'static str {
        match self {
            Column::Repetition => "repetition",
            Column::AlgorithmIndex => "algorithm index",
            Column::Iteration => "iteration",
            Column::DurationNs => "duration (ns)",
            Column::SumScore => "sum score",
            Column::MinScore => "min score",
            Column::MaxScore => "max score",
            Column::MeanScore => "mean score",
            Column::MedianScore => "median score",
            Column::NumberOfOrganisms => "number of organisms",
            Column::Variance => "variance",
            Column::Generations => "generations",
            Column::MeanGeneticDistance => "mean genetic distance",
        }
    }

    /// Look up a column by its header-row name. Surrounding whitespace is ignored.
    pub fn from_name(name: &str) -> Option<Column> {
        let name = name.trim();
        Column::ALL.iter().copied().find(|c| c.name() == name)
    }

    /// Columns present in the source log but never read downstream.
    pub fn is_dropped(self) -> bool {
        matches!(
            self,
            Column::DurationNs | Column::SumScore | Column::MedianScore
        )
    }

    /// Columns that may legitimately hold no value.
    pub fn is_nullable(self) -> bool {
        matches!(self, Column::Generations | Column::MeanGeneticDistance)
    }

    /// Columns the typed record is built from.
    pub fn required() -> impl Iterator<Item = Column> {
        Column::ALL.into_iter().filter(|c| !c.is_dropped())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One typed row of the log, with dropped columns already removed.
///
/// Counters are narrowed to the smallest width the harness can produce and
/// scores to `f32`, which keeps a fully accumulated log compact.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Record {
    pub repetition: u8,
    pub algorithm_index: u8,
    pub iteration: u32,
    pub min_score: f32,
    pub max_score: f32,
    pub mean_score: f32,
    pub number_of_organisms: u16,
    pub variance: f32,
    /// `iteration / population size`; absent on warm-up rows.
    pub generations: Option<f32>,
    /// Absent until the population diversity has been sampled.
    pub mean_genetic_distance: Option<f32>,
    /// `floor(generations)`, derived from the full-precision value.
    pub integer_generation: Option<u32>,
}

impl Record {
    /// Derive the integer generation from `generations` when missing.
    pub fn with_integer_generation(mut self) -> Self {
        if self.integer_generation.is_none() {
            self.integer_generation = self.generations.and_then(integer_generation);
        }
        self
    }
}

/// `floor(generations)` for a finite, non-negative generation count.
pub fn integer_generation<F: Into<f64>>(generations: F) -> Option<u32> {
    let g: f64 = generations.into();
    if g.is_finite() && g >= 0.0 && g <= u32::MAX as f64 {
        Some(g.floor() as u32)
    } else {
        None
    }
}

/// Replacement/acceptance strategy of an algorithm configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElitismPolicy {
    GreedySelection,
    MetropolisHastings,
    /// Any policy name the engine does not know about.
    Unclassified(Arc<str>),
}

impl ElitismPolicy {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Greedy_selection" => ElitismPolicy::GreedySelection,
            "Metropolis-Hastings" => ElitismPolicy::MetropolisHastings,
            other => ElitismPolicy::Unclassified(Arc::from(other)),
        }
    }

    /// The policy name as written in log headers.
    pub fn name(&self) -> &str {
        match self {
            ElitismPolicy::GreedySelection => "Greedy_selection",
            ElitismPolicy::MetropolisHastings => "Metropolis-Hastings",
            ElitismPolicy::Unclassified(name) => name,
        }
    }

    /// Short suffix used in display names.
    pub fn short_label(&self) -> &'static str {
        match self {
            ElitismPolicy::GreedySelection => "G",
            ElitismPolicy::MetropolisHastings => "MH",
            ElitismPolicy::Unclassified(_) => "?",
        }
    }
}

impl Serialize for ElitismPolicy {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl fmt::Display for ElitismPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric quantities aggregated per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    MinScore,
    MaxScore,
    MeanScore,
    NumberOfOrganisms,
    Variance,
    Generations,
    MeanGeneticDistance,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::MinScore,
        Metric::MaxScore,
        Metric::MeanScore,
        Metric::NumberOfOrganisms,
        Metric::Variance,
        Metric::Generations,
        Metric::MeanGeneticDistance,
    ];

    /// The log column this metric reads.
    pub fn column(self) -> Column {
        match self {
            Metric::MinScore => Column::MinScore,
            Metric::MaxScore => Column::MaxScore,
            Metric::MeanScore => Column::MeanScore,
            Metric::NumberOfOrganisms => Column::NumberOfOrganisms,
            Metric::Variance => Column::Variance,
            Metric::Generations => Column::Generations,
            Metric::MeanGeneticDistance => Column::MeanGeneticDistance,
        }
    }

    pub fn name(self) -> &'static str {
        self.column().name()
    }

    /// Position of this metric in [`Metric::ALL`].
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Read this metric from a record.
    pub fn value(self, record: &Record) -> Option<f64> {
        match self {
            Metric::MinScore => Some(record.min_score as f64),
            Metric::MaxScore => Some(record.max_score as f64),
            Metric::MeanScore => Some(record.mean_score as f64),
            Metric::NumberOfOrganisms => Some(record.number_of_organisms as f64),
            Metric::Variance => Some(record.variance as f64),
            Metric::Generations => record.generations.map(f64::from),
            Metric::MeanGeneticDistance => record.mean_genetic_distance.map(f64::from),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The time axis a series is indexed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeAxis {
    /// Raw fitness-evaluation counter.
    Iteration,
    /// Integer generation count.
    Generation,
}

impl TimeAxis {
    pub fn name(self) -> &'static str {
        match self {
            TimeAxis::Iteration => "iteration",
            TimeAxis::Generation => "generation",
        }
    }

    /// The time value of a record on this axis.
    pub fn value(self, record: &Record) -> Option<u32> {
        match self {
            TimeAxis::Iteration => Some(record.iteration),
            TimeAxis::Generation => record.integer_generation,
        }
    }
}

impl fmt::Display for TimeAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_round_trip() {
        for column in Column::ALL {
            assert_eq!(Column::from_name(column.name()), Some(column));
        }
        assert_eq!(Column::from_name(" variance "), Some(Column::Variance));
        assert_eq!(Column::from_name("intgen"), None);
    }

    #[test]
    fn dropped_columns_are_not_required() {
        let required: Vec<Column> = Column::required().collect();
        assert_eq!(required.len(), 10);
        assert!(!required.contains(&Column::SumScore));
        assert!(!required.contains(&Column::DurationNs));
        assert!(!required.contains(&Column::MedianScore));
    }

    #[test]
    fn integer_generation_floors() {
        assert_eq!(integer_generation(2.9_f64), Some(2));
        assert_eq!(integer_generation(0.0_f32), Some(0));
        assert_eq!(integer_generation(f64::NAN), None);
        assert_eq!(integer_generation(-1.0_f64), None);
    }

    #[test]
    fn integer_generation_is_kept_once_derived() {
        let record = Record {
            generations: Some(3.0),
            integer_generation: Some(2),
            ..Record::default()
        };
        assert_eq!(record.with_integer_generation().integer_generation, Some(2));

        let fresh = Record {
            generations: Some(3.5),
            ..Record::default()
        };
        assert_eq!(fresh.with_integer_generation().integer_generation, Some(3));
    }

    #[test]
    fn unknown_elitism_is_unclassified() {
        assert_eq!(
            ElitismPolicy::from_name("Greedy_selection"),
            ElitismPolicy::GreedySelection
        );
        let other = ElitismPolicy::from_name("Tournament");
        assert_eq!(other.name(), "Tournament");
        assert_eq!(other.short_label(), "?");
        assert_eq!(serde_json::to_string(&other).unwrap(), "\"Tournament\"");
    }

    #[test]
    fn metric_ordinals_match_all() {
        for (i, metric) in Metric::ALL.iter().enumerate() {
            assert_eq!(metric.ordinal(), i);
        }
    }

    #[test]
    fn optional_metrics_read_as_none() {
        let record = Record::default();
        assert_eq!(Metric::MeanGeneticDistance.value(&record), None);
        assert_eq!(Metric::MeanScore.value(&record), Some(0.0));
        assert_eq!(TimeAxis::Generation.value(&record), None);
    }
}
