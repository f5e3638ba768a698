//! One replica's full epoch run: sweeps until convergence or budget.
//!
//! The runner owns its graph for the duration of the run and hands it back
//! inside the [`EpochResult`]. Label stability is detected by snapshotting
//! labels before each sweep and comparing afterwards.

use std::collections::HashMap;

use rand::Rng;
use tracing::debug;

use weft_core::config::{RunConfig, TerminationPolicy};
use weft_core::graph::{Graph, ShardId};
use weft_core::{EpochResult, GraphError};

use crate::{fitness, ingest, sweep, workload};

fn snapshot_labels(graph: &Graph) -> HashMap<String, Option<ShardId>> {
    graph
        .vertices
        .iter()
        .map(|(id, v)| (id.clone(), v.label))
        .collect()
}

fn labels_unchanged(graph: &Graph, snapshot: &HashMap<String, Option<ShardId>>) -> bool {
    graph
        .vertices
        .iter()
        .all(|(id, v)| snapshot.get(id).copied() == Some(v.label))
}

/// Run one full partitioning epoch on a private graph copy.
///
/// Labels any still-unassigned vertices from `rng`, excludes inactive
/// vertices, recomputes shard workloads once, then sweeps under the
/// configured discipline until the termination policy says stop. The
/// returned result owns the graph with inactive vertices restored.
pub fn run_epoch<R: Rng>(
    mut graph: Graph,
    config: &RunConfig,
    rng: &mut R,
    seed: u64,
) -> Result<EpochResult, GraphError> {
    ingest::assign_random_labels(&mut graph, rng);
    let inactive = ingest::split_inactive(&mut graph);
    graph.shard_workloads = workload::recompute_workloads(&graph)?;

    let mut convergence: Option<u32> = None;
    for sweep_index in 1..=config.tau {
        let before = snapshot_labels(&graph);
        sweep::run_sweep(&mut graph, config, rng)?;
        let stable = labels_unchanged(&graph, &before);

        if stable && convergence.is_none() {
            convergence = Some(sweep_index);
            debug!(seed, sweep = sweep_index, "labels stabilized");
        }
        match config.termination {
            TerminationPolicy::RunToBudget => {}
            TerminationPolicy::StopOnConvergence { min_sweeps } => {
                if stable && sweep_index >= min_sweeps {
                    break;
                }
            }
        }
    }

    let breakdown = fitness::evaluate(&graph, config.alpha)?;
    ingest::restore_inactive(&mut graph, inactive);

    Ok(EpochResult {
        seed,
        fitness: breakdown.fitness,
        workload_imbalance: breakdown.workload_imbalance,
        cross_shard_workload: breakdown.cross_shard_workload,
        convergence,
        graph,
    })
}
