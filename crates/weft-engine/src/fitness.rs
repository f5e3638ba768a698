//! Partition quality: cross-shard workload, imbalance, combined fitness.

use weft_core::graph::{Graph, Weight};
use weft_core::GraphError;

/// The two objective components and their weighted combination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessBreakdown {
    /// `alpha * cross_shard_workload + (1 - alpha) * workload_imbalance`.
    pub fitness: f64,
    /// Maximum deviation of any shard's workload from the mean workload.
    pub workload_imbalance: f64,
    /// Total weight of edges whose endpoints sit on different shards.
    pub cross_shard_workload: Weight,
}

/// Maximum deviation of any shard's workload from the mean.
pub fn workload_imbalance(graph: &Graph) -> f64 {
    if graph.shard_workloads.is_empty() {
        return 0.0;
    }
    let total: Weight = graph.shard_workloads.iter().sum();
    let mean = total as f64 / graph.shard_workloads.len() as f64;
    graph
        .shard_workloads
        .iter()
        .map(|&w| (w as f64 - mean).abs())
        .fold(0.0, f64::max)
}

/// Total weight of cross-shard edges, each undirected edge counted once.
pub fn cross_shard_workload(graph: &Graph) -> Result<Weight, GraphError> {
    let mut cross: Weight = 0;
    for vertex in graph.vertices.values() {
        let label = vertex
            .label
            .ok_or_else(|| GraphError::Unlabeled(vertex.id.clone()))?;
        for (neighbour, &weight) in &vertex.edges {
            // Count each edge from its smaller endpoint only.
            if vertex.id >= *neighbour {
                continue;
            }
            let neighbour_label = graph
                .vertices
                .get(neighbour)
                .ok_or_else(|| GraphError::UnknownVertex(neighbour.clone()))?
                .label
                .ok_or_else(|| GraphError::Unlabeled(neighbour.clone()))?;
            if label != neighbour_label {
                cross += weight;
            }
        }
    }
    Ok(cross)
}

/// Evaluate the combined fitness of a partitioned graph. Lower is better.
pub fn evaluate(graph: &Graph, alpha: f64) -> Result<FitnessBreakdown, GraphError> {
    let imbalance = workload_imbalance(graph);
    let cross = cross_shard_workload(graph)?;
    Ok(FitnessBreakdown {
        fitness: alpha * cross as f64 + (1.0 - alpha) * imbalance,
        workload_imbalance: imbalance,
        cross_shard_workload: cross,
    })
}
