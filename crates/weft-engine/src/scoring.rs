//! Per-vertex shard scoring and best-shard selection.
//!
//! A vertex may only move to a shard it has at least one edge into; other
//! shards score as `None` and are ignored by selection. The defined scores
//! combine an affinity term (fraction of the vertex's edge weight inside the
//! shard) with a workload penalty chosen by [`PenaltyFormula`].

use rand::Rng;

use weft_core::config::PenaltyFormula;
use weft_core::graph::{Graph, ShardId, Vertex, Weight};
use weft_core::GraphError;

/// Reference workload the penalty divides by, computed once per scoring
/// call over the current workload snapshot.
fn penalty_reference(formula: PenaltyFormula, workloads: &[Weight]) -> f64 {
    match formula {
        PenaltyFormula::MinRelative => {
            workloads.iter().copied().min().unwrap_or(0) as f64
        }
        PenaltyFormula::MeanRelative => {
            let total: Weight = workloads.iter().sum();
            total as f64 / workloads.len().max(1) as f64
        }
    }
}

/// Score every shard with respect to one vertex.
///
/// Returns one `Option<f64>` per shard: `None` where the vertex has no edge
/// weight into the shard, otherwise `affinity * penalty`. The workload
/// snapshot is read from the graph at call time.
pub fn score_shards(
    graph: &Graph,
    vertex: &Vertex,
    beta: f64,
    formula: PenaltyFormula,
) -> Result<Vec<Option<f64>>, GraphError> {
    let mut weight_into = vec![0u64; graph.shard_count];
    let mut total_weight: Weight = 0;

    for (neighbour, &weight) in &vertex.edges {
        total_weight += weight;
        let neighbour_label = graph
            .vertices
            .get(neighbour)
            .ok_or_else(|| GraphError::UnknownVertex(neighbour.clone()))?
            .label
            .ok_or_else(|| GraphError::Unlabeled(neighbour.clone()))?;
        weight_into[neighbour_label] += weight;
    }

    let reference = penalty_reference(formula, &graph.shard_workloads);
    let scores = (0..graph.shard_count)
        .map(|shard| {
            if weight_into[shard] == 0 {
                return None;
            }
            let affinity = weight_into[shard] as f64 / total_weight as f64;
            let penalty = 1.0 - beta * (graph.shard_workloads[shard] as f64 / reference);
            Some(affinity * penalty)
        })
        .collect();
    Ok(scores)
}

/// Pick the highest-scoring shard, breaking ties uniformly at random.
///
/// Undefined scores are skipped. A single maximum is chosen without touching
/// the random stream; only a genuine tie consumes a draw. Returns `None`
/// when no shard has a defined score, which callers treat as "no move".
pub fn best_shard<R: Rng>(scores: &[Option<f64>], rng: &mut R) -> Option<ShardId> {
    let mut max = f64::NEG_INFINITY;
    let mut candidates: Vec<ShardId> = Vec::new();

    for (shard, score) in scores.iter().enumerate() {
        let Some(score) = *score else { continue };
        if score > max {
            max = score;
            candidates.clear();
            candidates.push(shard);
        } else if score == max {
            candidates.push(shard);
        }
    }

    match candidates.len() {
        0 => None,
        1 => Some(candidates[0]),
        n => Some(candidates[rng.gen_range(0..n)]),
    }
}
