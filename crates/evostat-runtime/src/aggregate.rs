//! Grouped mean/standard-deviation series.
//!
//! Records are grouped by `(elitism, algorithm index, time value)` and every
//! [`Metric`] is summarised across repetitions. On the generation axis each
//! repetition first contributes a single value per integer generation: the
//! maximum it reported during that generation.

use evostat_core::schema::{ElitismPolicy, Metric, Record, TimeAxis};
use std::collections::{BTreeMap, HashMap};

use crate::normalize::NormalizedRecord;
use crate::stats::{RunningStats, Summary};

const METRICS: usize = Metric::ALL.len();

/// One algorithm of one elitism policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub elitism: ElitismPolicy,
    pub algorithm_index: u8,
}

impl GroupKey {
    pub fn new(elitism: ElitismPolicy, algorithm_index: u8) -> Self {
        Self {
            elitism,
            algorithm_index,
        }
    }
}

/// Summaries of every metric at one time value of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub time: u32,
    /// Repetitions contributing to this point.
    pub repetitions: usize,
    summaries: [Option<Summary>; METRICS],
}

impl SeriesPoint {
    /// Summary of `metric`, or `None` when no repetition reported it.
    pub fn get(&self, metric: Metric) -> Option<Summary> {
        self.summaries[metric.ordinal()]
    }

    pub fn mean(&self, metric: Metric) -> Option<f64> {
        self.get(metric).map(|s| s.mean)
    }
}

/// Aggregated series of one log on one time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedSeries {
    pub axis: TimeAxis,
    groups: BTreeMap<GroupKey, Vec<SeriesPoint>>,
}

impl GroupedSeries {
    /// All groups, ordered by key; points are ordered by time.
    pub fn groups(&self) -> impl Iterator<Item = (&GroupKey, &[SeriesPoint])> {
        self.groups.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn group(&self, key: &GroupKey) -> Option<&[SeriesPoint]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    pub fn point(&self, key: &GroupKey, time: u32) -> Option<&SeriesPoint> {
        let points = self.groups.get(key)?;
        points
            .binary_search_by_key(&time, |p| p.time)
            .ok()
            .map(|i| &points[i])
    }

    /// Summary of one cell. Absent groups, times and metrics are all `None`.
    pub fn summary(&self, key: &GroupKey, time: u32, metric: Metric) -> Option<Summary> {
        self.point(key, time)?.get(metric)
    }

    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> {
        self.groups.keys()
    }

    /// Elitism policies present, in order.
    pub fn policies(&self) -> Vec<ElitismPolicy> {
        let mut policies: Vec<ElitismPolicy> =
            self.groups.keys().map(|k| k.elitism.clone()).collect();
        policies.dedup();
        policies
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

type Sample = [Option<f64>; METRICS];

fn sample(record: &Record) -> Sample {
    Metric::ALL.map(|metric| metric.value(record))
}

/// Aggregate normalized rows on the given time axis.
pub fn aggregate(rows: &[NormalizedRecord], axis: TimeAxis) -> GroupedSeries {
    match axis {
        TimeAxis::Iteration => summarise(
            axis,
            rows.iter().map(|row| {
                (
                    GroupKey::new(row.elitism.clone(), row.record.algorithm_index),
                    row.record.iteration,
                    sample(&row.record),
                )
            }),
        ),
        TimeAxis::Generation => summarise(axis, generation_maxima(rows)),
    }
}

/// Collapse each `(group, generation, repetition)` to per-metric maxima.
fn generation_maxima(
    rows: &[NormalizedRecord],
) -> impl Iterator<Item = (GroupKey, u32, Sample)> {
    let mut maxima: HashMap<(GroupKey, u32, u8), Sample> = HashMap::new();
    for row in rows {
        let Some(generation) = row.record.integer_generation else {
            continue;
        };
        let key = (
            GroupKey::new(row.elitism.clone(), row.record.algorithm_index),
            generation,
            row.record.repetition,
        );
        let values = sample(&row.record);
        maxima
            .entry(key)
            .and_modify(|best| {
                for (b, v) in best.iter_mut().zip(values) {
                    *b = match (*b, v) {
                        (Some(a), Some(c)) => Some(a.max(c)),
                        (a, c) => a.or(c),
                    };
                }
            })
            .or_insert(values);
    }
    maxima
        .into_iter()
        .map(|((group, generation, _), values)| (group, generation, values))
}

fn summarise(
    axis: TimeAxis,
    samples: impl Iterator<Item = (GroupKey, u32, Sample)>,
) -> GroupedSeries {
    let mut cells: BTreeMap<GroupKey, BTreeMap<u32, (usize, [RunningStats; METRICS])>> =
        BTreeMap::new();
    for (group, time, values) in samples {
        let (count, stats) = cells
            .entry(group)
            .or_default()
            .entry(time)
            .or_insert_with(|| (0, [RunningStats::new(); METRICS]));
        *count += 1;
        for (stat, value) in stats.iter_mut().zip(values) {
            if let Some(v) = value {
                stat.push(v);
            }
        }
    }

    let groups = cells
        .into_iter()
        .map(|(group, times)| {
            let points = times
                .into_iter()
                .map(|(time, (repetitions, stats))| SeriesPoint {
                    time,
                    repetitions,
                    summaries: stats.map(|s| s.summary()),
                })
                .collect();
            (group, points)
        })
        .collect();

    GroupedSeries { axis, groups }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(elitism: ElitismPolicy, algo: u8, rep: u8, iteration: u32, max: f32, gen: u32) -> NormalizedRecord {
        NormalizedRecord {
            elitism,
            record: Record {
                repetition: rep,
                algorithm_index: algo,
                iteration,
                max_score: max,
                mean_score: max / 2.0,
                generations: Some(gen as f32),
                integer_generation: Some(gen),
                mean_genetic_distance: Some(1.0),
                ..Record::default()
            },
        }
    }

    #[test]
    fn iteration_axis_groups_across_repetitions() {
        let g = ElitismPolicy::GreedySelection;
        let rows = vec![
            row(g.clone(), 0, 1, 0, 2.0, 0),
            row(g.clone(), 0, 2, 0, 4.0, 0),
            row(g.clone(), 0, 1, 1, 6.0, 0),
        ];
        let series = aggregate(&rows, TimeAxis::Iteration);
        let key = GroupKey::new(g, 0);

        let at0 = series.summary(&key, 0, Metric::MaxScore).unwrap();
        assert_eq!(at0.mean, 3.0);
        assert!((at0.std - 2.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(series.point(&key, 0).unwrap().repetitions, 2);

        let at1 = series.summary(&key, 1, Metric::MaxScore).unwrap();
        assert_eq!(at1.mean, 6.0);
        assert_eq!(at1.std, 0.0);
    }

    #[test]
    fn generation_axis_takes_per_repetition_maximum() {
        let g = ElitismPolicy::MetropolisHastings;
        let rows = vec![
            row(g.clone(), 3, 1, 0, 1.0, 0),
            row(g.clone(), 3, 1, 1, 5.0, 0),
            row(g.clone(), 3, 1, 2, 3.0, 0),
            row(g.clone(), 3, 2, 0, 2.0, 0),
            row(g.clone(), 3, 2, 1, 1.0, 0),
            row(g.clone(), 3, 1, 3, 9.0, 1),
        ];
        let series = aggregate(&rows, TimeAxis::Generation);
        let key = GroupKey::new(g, 3);

        let gen0 = series.summary(&key, 0, Metric::MaxScore).unwrap();
        assert_eq!(gen0.count, 2);
        assert_eq!(gen0.mean, 3.5);
        assert_eq!(series.point(&key, 0).unwrap().repetitions, 2);

        let gen1 = series.summary(&key, 1, Metric::MaxScore).unwrap();
        assert_eq!(gen1.mean, 9.0);
        assert_eq!(gen1.std, 0.0);
    }

    #[test]
    fn rows_without_generation_are_skipped_on_generation_axis() {
        let g = ElitismPolicy::GreedySelection;
        let mut warm_up = row(g.clone(), 0, 1, 0, 1.0, 0);
        warm_up.record.integer_generation = None;
        warm_up.record.generations = None;
        let series = aggregate(&[warm_up.clone()], TimeAxis::Generation);
        assert!(series.is_empty());

        let by_iteration = aggregate(&[warm_up], TimeAxis::Iteration);
        let key = GroupKey::new(g, 0);
        assert_eq!(by_iteration.summary(&key, 0, Metric::Generations), None);
        assert!(by_iteration.summary(&key, 0, Metric::MaxScore).is_some());
    }

    #[test]
    fn groups_are_separated_by_policy_and_index() {
        let rows = vec![
            row(ElitismPolicy::GreedySelection, 0, 1, 0, 1.0, 0),
            row(ElitismPolicy::GreedySelection, 1, 1, 0, 1.0, 0),
            row(ElitismPolicy::MetropolisHastings, 2, 1, 0, 1.0, 0),
        ];
        let series = aggregate(&rows, TimeAxis::Iteration);
        assert_eq!(series.len(), 3);
        assert_eq!(
            series.policies(),
            vec![ElitismPolicy::GreedySelection, ElitismPolicy::MetropolisHastings]
        );
        let missing = GroupKey::new(ElitismPolicy::MetropolisHastings, 0);
        assert_eq!(series.group(&missing), None);
        assert_eq!(series.summary(&missing, 0, Metric::MaxScore), None);
    }
}
