//! Output of one partitioning run.

use crate::graph::{Graph, Weight};

/// Immutable outcome of a single epoch run on one replica.
///
/// Ownership of the resulting graph transfers to the caller; the run retains
/// nothing. Lower fitness is better.
#[derive(Debug)]
pub struct EpochResult {
    /// The seed that drove this replica's random stream.
    pub seed: u64,
    /// Combined objective: `alpha * cross_shard + (1 - alpha) * imbalance`.
    pub fitness: f64,
    /// Maximum deviation of any shard's workload from the mean.
    pub workload_imbalance: f64,
    /// Total weight of edges crossing shard boundaries, each counted once.
    pub cross_shard_workload: Weight,
    /// 1-based sweep index at which labels first stopped changing, or `None`
    /// if the run never converged within its sweep budget.
    pub convergence: Option<u32>,
    /// The partitioned graph, inactive vertices restored.
    pub graph: Graph,
}
