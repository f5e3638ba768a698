//! Concurrent multi-replica search over independent randomized runs.
//!
//! Each replica owns a deep copy of the post-ingestion graph and its own
//! seeded random stream; workers share nothing mutable. Results funnel
//! through a channel and are reduced on arrival, so only the current best
//! graph is ever retained — losing graphs are dropped as soon as they lose.

use std::sync::mpsc;
use std::thread;

use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use weft_core::config::RunConfig;
use weft_core::graph::{Graph, Weight};
use weft_core::{EnsembleError, EpochResult, GraphError};

use crate::runner;

/// Graph-free summary of one replica's run, kept for every replica even
/// after its graph has been dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicaSummary {
    pub seed: u64,
    pub fitness: f64,
    pub workload_imbalance: f64,
    pub cross_shard_workload: Weight,
    pub convergence: Option<u32>,
}

impl From<&EpochResult> for ReplicaSummary {
    fn from(result: &EpochResult) -> Self {
        Self {
            seed: result.seed,
            fitness: result.fitness,
            workload_imbalance: result.workload_imbalance,
            cross_shard_workload: result.cross_shard_workload,
            convergence: result.convergence,
        }
    }
}

/// Per-replica outcome: a summary, or the isolated failure of that replica.
#[derive(Debug)]
pub struct ReplicaReport {
    pub seed: u64,
    pub outcome: Result<ReplicaSummary, GraphError>,
}

/// The reduced result of an ensemble: the winning run plus one report per
/// replica, ordered by replica index.
#[derive(Debug)]
pub struct EnsembleOutcome {
    /// The minimum-fitness result; ties resolve to the earlier replica index.
    pub winner: EpochResult,
    pub replicas: Vec<ReplicaReport>,
}

/// Run `config.replicas` independent partitioning replicas concurrently over
/// deep copies of `base` and keep the best outcome.
///
/// `base` must be post-ingestion: edges merged for the epoch, carried labels
/// intact, new vertices still unlabeled. It is only read here; every replica
/// clones it before mutating anything. A replica that fails reports its
/// error without disturbing its siblings; only an ensemble where every
/// replica failed is an error.
pub fn run_ensemble(base: &Graph, config: &RunConfig) -> Result<EnsembleOutcome, EnsembleError> {
    config.validate()?;
    let seeds = config.seeds.seeds(config.replicas)?;
    debug!(replicas = seeds.len(), vertices = base.len(), "starting ensemble");

    thread::scope(|scope| {
        let (sender, receiver) = mpsc::channel();
        for (index, seed) in seeds.iter().copied().enumerate() {
            let sender = sender.clone();
            scope.spawn(move || {
                let mut rng = StdRng::seed_from_u64(seed);
                let outcome = runner::run_epoch(base.clone(), config, &mut rng, seed);
                // The coordinator holds the receiver for the whole scope, so
                // a send can only fail if it panicked; nothing to do then.
                let _ = sender.send((index, seed, outcome));
            });
        }
        drop(sender);

        let mut best: Option<(usize, EpochResult)> = None;
        let mut reports: Vec<(usize, ReplicaReport)> = Vec::with_capacity(seeds.len());

        for (index, seed, outcome) in receiver {
            match outcome {
                Ok(result) => {
                    reports.push((
                        index,
                        ReplicaReport {
                            seed,
                            outcome: Ok(ReplicaSummary::from(&result)),
                        },
                    ));
                    best = Some(match best.take() {
                        None => (index, result),
                        Some((incumbent_index, incumbent)) => {
                            let challenger_key = (OrderedFloat(result.fitness), index);
                            let incumbent_key = (OrderedFloat(incumbent.fitness), incumbent_index);
                            if challenger_key < incumbent_key {
                                // `incumbent` drops here, releasing its graph.
                                (index, result)
                            } else {
                                (incumbent_index, incumbent)
                            }
                        }
                    });
                }
                Err(err) => {
                    warn!(seed, error = %err, "replica failed; continuing with the rest");
                    reports.push((index, ReplicaReport { seed, outcome: Err(err) }));
                }
            }
        }

        reports.sort_by_key(|(index, _)| *index);
        let replicas: Vec<ReplicaReport> = reports.into_iter().map(|(_, report)| report).collect();

        match best {
            Some((_, winner)) => {
                info!(
                    seed = winner.seed,
                    fitness = winner.fitness,
                    convergence = ?winner.convergence,
                    "ensemble reduced"
                );
                Ok(EnsembleOutcome { winner, replicas })
            }
            None => {
                let first = replicas
                    .iter()
                    .find_map(|report| report.outcome.as_ref().err().cloned())
                    .unwrap_or(GraphError::Unlabeled(String::new()));
                Err(EnsembleError::AllReplicasFailed {
                    replicas: seeds.len(),
                    first,
                })
            }
        }
    })
}
