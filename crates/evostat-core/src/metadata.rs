//! Log header decoding and algorithm identity resolution.
//!
//! The first line of every log is a JSON object describing the algorithm
//! roster, wrapped in a stray quote on each side by the experiment harness.
//! The roster is decoded once per log into a [`MetadataResolver`] which maps
//! the integer `algorithm index` of a record to its [`AlgorithmIdentity`].

use serde::Deserialize;
use std::fmt;

use crate::error::{EvostatError, Result};
use crate::schema::ElitismPolicy;

/// Family name of the configurable grid algorithm, whose flags select
/// between several distinct configurations.
pub const GENERALIZED_FAMILY: &str = "Generalized MAP Elite algorithm";

/// Shared run parameters recorded in the header's `"common"` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CommonParameters {
    #[serde(rename = "population size")]
    pub population_size: Option<u64>,
    #[serde(rename = "total repetitions")]
    pub total_repetitions: Option<u64>,
    #[serde(rename = "iterations per run")]
    pub iterations_per_run: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawHeader {
    algorithms: Option<Vec<RawAlgorithm>>,
    #[serde(default)]
    common: Option<CommonParameters>,
}

#[derive(Debug, Deserialize)]
struct RawAlgorithm {
    #[serde(rename = "algorithm name")]
    name: Option<String>,
    #[serde(rename = "algorithm index")]
    index: Option<usize>,
    #[serde(rename = "algorithm config", default)]
    config: RawAlgorithmConfig,
    elitism: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAlgorithmConfig {
    #[serde(rename = "algorithm name")]
    name: Option<String>,
    #[serde(rename = "use features", default)]
    use_features: bool,
    #[serde(rename = "use spatial hyperparameters", default)]
    use_hyperparameters: bool,
}

/// The semantic identity of one configured algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlgorithmIdentity {
    pub elitism: ElitismPolicy,
    pub family: String,
    pub use_features: bool,
    pub use_hyperparameters: bool,
}

impl AlgorithmIdentity {
    pub fn new(
        elitism: ElitismPolicy,
        family: impl Into<String>,
        use_features: bool,
        use_hyperparameters: bool,
    ) -> Self {
        Self {
            elitism,
            family: family.into(),
            use_features,
            use_hyperparameters,
        }
    }

    /// The identity without its elitism policy, used to match equivalent
    /// configurations across policies.
    pub fn signature(&self) -> (&str, bool, bool) {
        (&self.family, self.use_features, self.use_hyperparameters)
    }

    /// Human-readable label, total over every family and flag combination.
    pub fn display_name(&self) -> String {
        let base = if self.family == GENERALIZED_FAMILY {
            match (self.use_features, self.use_hyperparameters) {
                (false, false) => "Spatial grid GA",
                (true, false) => "Spatial grid GA with features",
                (false, true) => "Spatial grid GA with adaptive hyperparameters",
                (true, true) => "Spatial grid GA with features and adaptive hyperparameters",
            }
        } else {
            self.family.as_str()
        };
        format!("{} ({})", base, self.elitism.short_label())
    }
}

impl fmt::Display for AlgorithmIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// The decoded log header.
#[derive(Debug, Clone, PartialEq)]
pub struct LogHeader {
    pub roster: Vec<AlgorithmIdentity>,
    pub common: Option<CommonParameters>,
}

impl LogHeader {
    /// Decode the first line of a log file.
    ///
    /// The line terminator is removed, then one wrapper character on each
    /// side, and the remainder is parsed as JSON.
    pub fn from_wrapped_line(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut chars = line.chars();
        if chars.next().is_none() || chars.next_back().is_none() {
            return Err(EvostatError::missing_metadata("header line is empty"));
        }
        Self::from_json(chars.as_str())
    }

    /// Decode an unwrapped JSON header.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawHeader = serde_json::from_str(json)
            .map_err(|e| EvostatError::missing_metadata(format!("header is not valid JSON: {e}")))?;
        let algorithms = raw
            .algorithms
            .ok_or_else(|| EvostatError::missing_metadata("header has no \"algorithms\" list"))?;

        let mut roster = Vec::with_capacity(algorithms.len());
        for (position, algo) in algorithms.into_iter().enumerate() {
            if let Some(index) = algo.index {
                if index != position {
                    return Err(EvostatError::missing_metadata(format!(
                        "algorithm at position {position} declares index {index}"
                    )));
                }
            }
            let family = algo.name.or(algo.config.name).ok_or_else(|| {
                EvostatError::missing_metadata(format!(
                    "algorithm {position} has no \"algorithm name\""
                ))
            })?;
            let elitism = algo.elitism.ok_or_else(|| {
                EvostatError::missing_metadata(format!("algorithm {position} has no \"elitism\""))
            })?;
            roster.push(AlgorithmIdentity::new(
                ElitismPolicy::from_name(&elitism),
                family,
                algo.config.use_features,
                algo.config.use_hyperparameters,
            ));
        }

        Ok(LogHeader {
            roster,
            common: raw.common,
        })
    }
}

/// Maps algorithm indices of one log to their identities.
#[derive(Debug, Clone)]
pub struct MetadataResolver {
    roster: Vec<AlgorithmIdentity>,
}

impl MetadataResolver {
    pub fn new(header: &LogHeader) -> Self {
        Self {
            roster: header.roster.clone(),
        }
    }

    pub fn from_roster(roster: Vec<AlgorithmIdentity>) -> Self {
        Self { roster }
    }

    /// Identity of the algorithm at `index`.
    pub fn resolve(&self, index: usize) -> Result<&AlgorithmIdentity> {
        self.roster
            .get(index)
            .ok_or(EvostatError::UnknownAlgorithmIndex {
                index,
                roster_len: self.roster.len(),
            })
    }

    pub fn display_name(&self, identity: &AlgorithmIdentity) -> String {
        identity.display_name()
    }

    pub fn roster(&self) -> &[AlgorithmIdentity] {
        &self.roster
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    /// `(algorithm index, identity)` pairs of one policy, in roster order.
    pub fn policy_roster<'a>(
        &'a self,
        elitism: &'a ElitismPolicy,
    ) -> impl Iterator<Item = (usize, &'a AlgorithmIdentity)> + 'a {
        self.roster
            .iter()
            .enumerate()
            .filter(move |(_, identity)| &identity.elitism == elitism)
    }
}
