//! Cross-policy alignment of algorithm indices.
//!
//! Each elitism policy numbers its algorithms with its own slice of the
//! roster. To overlay "the same" configuration under two policies, every
//! algorithm gets a canonical index: its rank inside its own policy.
//!
//! This only pairs the right algorithms when the experiment declared every
//! policy's algorithms in the same order. [`align`] checks that: at every
//! rank, all policies must carry the same family and flags.

use evostat_core::error::{EvostatError, Result};
use evostat_core::metadata::MetadataResolver;
use evostat_core::schema::{ElitismPolicy, Metric};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::aggregate::{GroupKey, GroupedSeries};

/// How algorithms are ranked inside a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AlignmentOrder {
    /// By algorithm index, i.e. declaration order in the header.
    Roster,
    /// By ascending mean of a metric over the whole series; ties by index.
    MetricMean(Metric),
}

impl Default for AlignmentOrder {
    fn default() -> Self {
        AlignmentOrder::Roster
    }
}

impl fmt::Display for AlignmentOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentOrder::Roster => f.write_str("roster"),
            AlignmentOrder::MetricMean(metric) => {
                f.write_str(&metric.name().replace(' ', "-"))
            }
        }
    }
}

impl FromStr for AlignmentOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', '_'], " ");
        if wanted == "roster" {
            return Ok(AlignmentOrder::Roster);
        }
        Metric::ALL
            .into_iter()
            .find(|m| m.name() == wanted)
            .map(AlignmentOrder::MetricMean)
            .ok_or_else(|| format!("unknown alignment order '{s}'"))
    }
}

impl TryFrom<String> for AlignmentOrder {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AlignmentOrder> for String {
    fn from(order: AlignmentOrder) -> Self {
        order.to_string()
    }
}

/// Canonical indices for every group of a series.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentIndex {
    pub order: AlignmentOrder,
    canonical: BTreeMap<GroupKey, usize>,
    means: BTreeMap<GroupKey, [Option<f64>; Metric::ALL.len()]>,
}

impl AlignmentIndex {
    pub fn canonical(&self, elitism: &ElitismPolicy, algorithm_index: u8) -> Option<usize> {
        self.canonical
            .get(&GroupKey::new(elitism.clone(), algorithm_index))
            .copied()
    }

    /// Mean of `metric` over every point of a group.
    pub fn group_mean(&self, key: &GroupKey, metric: Metric) -> Option<f64> {
        self.means.get(key)?[metric.ordinal()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, usize)> {
        self.canonical.iter().map(|(k, v)| (k, *v))
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

/// Result of trying to align a series across policies.
#[derive(Debug)]
pub enum Alignment {
    /// Alignment was not requested.
    Skipped,
    Aligned(AlignmentIndex),
    /// The rosters are not ordered identically across policies.
    Rejected(EvostatError),
}

impl Alignment {
    pub fn index(&self) -> Option<&AlignmentIndex> {
        match self {
            Alignment::Aligned(index) => Some(index),
            _ => None,
        }
    }
}

/// Compute per-group means and canonical indices, validating that every
/// policy declares the same configurations in the same order.
pub fn align(
    series: &GroupedSeries,
    resolver: &MetadataResolver,
    order: AlignmentOrder,
) -> Result<AlignmentIndex> {
    let means: BTreeMap<GroupKey, [Option<f64>; Metric::ALL.len()]> = series
        .groups()
        .map(|(key, points)| {
            let means = Metric::ALL.map(|metric| {
                let values: Vec<f64> = points.iter().filter_map(|p| p.mean(metric)).collect();
                (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
            });
            (key.clone(), means)
        })
        .collect();

    let mut per_policy: BTreeMap<&ElitismPolicy, Vec<&GroupKey>> = BTreeMap::new();
    for key in means.keys() {
        per_policy.entry(&key.elitism).or_default().push(key);
    }

    for keys in per_policy.values_mut() {
        if let AlignmentOrder::MetricMean(metric) = order {
            keys.sort_by(|a, b| {
                let ma = means[*a][metric.ordinal()].unwrap_or(f64::INFINITY);
                let mb = means[*b][metric.ordinal()].unwrap_or(f64::INFINITY);
                ma.total_cmp(&mb)
                    .then(a.algorithm_index.cmp(&b.algorithm_index))
            });
        }
    }

    validate(&per_policy, resolver)?;

    let canonical = per_policy
        .values()
        .flat_map(|keys| keys.iter().enumerate().map(|(rank, key)| ((*key).clone(), rank)))
        .collect();

    Ok(AlignmentIndex {
        order,
        canonical,
        means,
    })
}

fn validate(
    per_policy: &BTreeMap<&ElitismPolicy, Vec<&GroupKey>>,
    resolver: &MetadataResolver,
) -> Result<()> {
    let mut policies = per_policy.iter();
    let Some((reference_policy, reference)) = policies.next() else {
        return Ok(());
    };

    for (policy, keys) in policies {
        if keys.len() != reference.len() {
            return Err(EvostatError::AlignmentPrecondition(format!(
                "{} has {} algorithms but {} has {}",
                reference_policy,
                reference.len(),
                policy,
                keys.len()
            )));
        }
        for (rank, (expected, found)) in reference.iter().zip(keys.iter()).enumerate() {
            let expected_id = resolver.resolve(expected.algorithm_index as usize)?;
            let found_id = resolver.resolve(found.algorithm_index as usize)?;
            if expected_id.signature() != found_id.signature() {
                return Err(EvostatError::AlignmentPrecondition(format!(
                    "rank {rank}: {} is '{}' but {} is '{}'",
                    reference_policy,
                    expected_id.display_name(),
                    policy,
                    found_id.display_name()
                )));
            }
        }
    }
    Ok(())
}
