//! Run configuration for a partitioning epoch.
//!
//! A [`RunConfig`] carries every tunable of the allocator: shard count, the
//! label-change cap, objective weights, sweep budget, the update discipline,
//! the termination policy, the penalty formula, and the ensemble seeding.
//! Strategies are closed enums selected here, not injected at runtime.

use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How label updates take effect within one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateDiscipline {
    /// Each vertex moves as soon as it is scored; later vertices in the same
    /// sweep observe the updated labels.
    Immediate,
    /// All vertices are scored against start-of-sweep labels; staged moves
    /// are applied together at the end of the sweep, in visiting order.
    Barrier,
    /// Per-sweep winners accumulate votes; a vertex moves only when the
    /// top-voted shard outvotes its current label by the fixed margin.
    Voting,
}

impl FromStr for UpdateDiscipline {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "immediate" => Ok(Self::Immediate),
            "barrier" => Ok(Self::Barrier),
            "voting" => Ok(Self::Voting),
            other => Err(ConfigError::UnknownDiscipline(other.to_string())),
        }
    }
}

/// When the sweep loop stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminationPolicy {
    /// Always perform all `tau` sweeps, recording the first sweep at which
    /// labels stopped changing.
    RunToBudget,
    /// Stop as soon as labels are unchanged for one sweep, once at least
    /// `min_sweeps` sweeps have run.
    StopOnConvergence {
        #[serde(default)]
        min_sweeps: u32,
    },
}

impl FromStr for TerminationPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "run-to-budget" => Ok(Self::RunToBudget),
            "stop-on-convergence" => Ok(Self::StopOnConvergence { min_sweeps: 0 }),
            other => Err(ConfigError::UnknownTermination(other.to_string())),
        }
    }
}

/// The workload penalty term of the per-shard score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PenaltyFormula {
    /// `1 - beta * (workload[k] / min(workloads))`.
    MinRelative,
    /// `1 - beta * (workload[k] / mean(workloads))`.
    MeanRelative,
}

impl FromStr for PenaltyFormula {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "min-relative" => Ok(Self::MinRelative),
            "mean-relative" => Ok(Self::MeanRelative),
            other => Err(ConfigError::UnknownPenalty(other.to_string())),
        }
    }
}

/// Where each ensemble replica's random stream is seeded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeedSource {
    /// Wall-clock nanoseconds offset by replica index. Not reproducible.
    WallClock,
    /// A fixed base value offset by replica index.
    Base(u64),
    /// An explicit seed list; must cover the ensemble size.
    List(Vec<u64>),
}

impl SeedSource {
    /// Materialize one seed per replica.
    pub fn seeds(&self, replicas: usize) -> Result<Vec<u64>, ConfigError> {
        match self {
            Self::WallClock => {
                let base = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_nanos() as u64;
                Ok((0..replicas as u64).map(|i| base.wrapping_add(i)).collect())
            }
            Self::Base(base) => Ok((0..replicas as u64).map(|i| base.wrapping_add(i)).collect()),
            Self::List(seeds) => {
                if seeds.len() < replicas {
                    return Err(ConfigError::SeedShortfall {
                        needed: replicas,
                        found: seeds.len(),
                    });
                }
                Ok(seeds[..replicas].to_vec())
            }
        }
    }
}

/// All tunables of one allocation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of shards to partition accounts across.
    pub shard_count: usize,
    /// Maximum label changes per vertex per epoch (rho).
    pub rho: u32,
    /// Objective weight: cross-shard workload vs workload imbalance.
    pub alpha: f64,
    /// Score weight: locality vs load-balance penalty.
    pub beta: f64,
    /// Sweep budget per epoch run (tau).
    pub tau: u32,
    /// How label updates take effect within a sweep.
    pub discipline: UpdateDiscipline,
    /// When the sweep loop stops.
    pub termination: TerminationPolicy,
    /// Which workload penalty the scoring uses.
    pub penalty: PenaltyFormula,
    /// Number of concurrent ensemble replicas.
    pub replicas: usize,
    /// Seeding of per-replica random streams.
    pub seeds: SeedSource,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            shard_count: 8,
            rho: 50,
            alpha: 0.5,
            beta: 0.5,
            tau: 100,
            discipline: UpdateDiscipline::Immediate,
            termination: TerminationPolicy::RunToBudget,
            penalty: PenaltyFormula::MinRelative,
            replicas: std::thread::available_parallelism().map_or(4, usize::from),
            seeds: SeedSource::WallClock,
        }
    }
}

impl RunConfig {
    /// Check all bounds. Called once before a run; an invalid configuration
    /// fails the epoch rather than panicking mid-sweep.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shard_count == 0 {
            return Err(ConfigError::NoShards);
        }
        if self.tau == 0 {
            return Err(ConfigError::ZeroSweepBudget);
        }
        if self.replicas == 0 {
            return Err(ConfigError::NoReplicas);
        }
        for (name, value) in [("alpha", self.alpha), ("beta", self.beta)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::WeightOutOfRange { name, value });
            }
        }
        // Fail early on an under-provisioned seed list.
        if let SeedSource::List(seeds) = &self.seeds {
            if seeds.len() < self.replicas {
                return Err(ConfigError::SeedShortfall {
                    needed: self.replicas,
                    found: seeds.len(),
                });
            }
        }
        Ok(())
    }
}
