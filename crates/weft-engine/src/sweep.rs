//! One full pass over the active vertices under an update discipline.
//!
//! The visiting order is randomized per sweep: ids are sorted first so the
//! shuffle is fully determined by the run's seeded stream regardless of map
//! iteration order.

use rand::seq::SliceRandom;
use rand::Rng;

use weft_core::config::{RunConfig, UpdateDiscipline};
use weft_core::graph::Graph;
use weft_core::GraphError;

use crate::scoring::{best_shard, score_shards};
use crate::workload::apply_move;

/// Votes by which the leading shard must beat the current label before a
/// voting-discipline vertex moves.
pub const VOTE_MARGIN: u64 = 1;

/// Produce the randomized visiting order for one sweep.
pub fn visiting_order<R: Rng>(graph: &Graph, rng: &mut R) -> Vec<String> {
    let mut ids: Vec<String> = graph.vertices.keys().cloned().collect();
    ids.sort_unstable();
    ids.shuffle(rng);
    ids
}

/// Run one sweep over all active vertices under the configured discipline.
pub fn run_sweep<R: Rng>(
    graph: &mut Graph,
    config: &RunConfig,
    rng: &mut R,
) -> Result<(), GraphError> {
    let order = visiting_order(graph, rng);
    match config.discipline {
        UpdateDiscipline::Immediate => immediate_sweep(graph, config, &order, rng),
        UpdateDiscipline::Barrier => barrier_sweep(graph, config, &order, rng),
        UpdateDiscipline::Voting => voting_sweep(graph, config, &order, rng),
    }
}

/// Score and move each vertex in turn; later vertices see earlier moves.
fn immediate_sweep<R: Rng>(
    graph: &mut Graph,
    config: &RunConfig,
    order: &[String],
    rng: &mut R,
) -> Result<(), GraphError> {
    for id in order {
        let Some(vertex) = graph.vertices.get(id) else {
            continue;
        };
        let scores = score_shards(graph, vertex, config.beta, config.penalty)?;
        if let Some(target) = best_shard(&scores, rng) {
            apply_move(graph, id, target, config.rho)?;
        }
    }
    Ok(())
}

/// Score every vertex against start-of-sweep labels, then apply the staged
/// moves together, in the same visiting order.
fn barrier_sweep<R: Rng>(
    graph: &mut Graph,
    config: &RunConfig,
    order: &[String],
    rng: &mut R,
) -> Result<(), GraphError> {
    for id in order {
        let Some(vertex) = graph.vertices.get(id) else {
            continue;
        };
        let scores = score_shards(graph, vertex, config.beta, config.penalty)?;
        let staged = best_shard(&scores, rng);
        if let Some(vertex) = graph.vertices.get_mut(id) {
            vertex.staged_label = staged;
        }
    }

    for id in order {
        let staged = graph
            .vertices
            .get_mut(id)
            .and_then(|v| v.staged_label.take());
        if let Some(target) = staged {
            apply_move(graph, id, target, config.rho)?;
        }
    }
    Ok(())
}

/// Accumulate one vote per sweep for each vertex's winning shard; move only
/// when the top-voted shard outvotes the current label by [`VOTE_MARGIN`].
///
/// The tally is seeded with one vote for the vertex's current label the
/// first time the vertex is visited in an epoch, so a single dissenting
/// sweep cannot flip a vertex.
fn voting_sweep<R: Rng>(
    graph: &mut Graph,
    config: &RunConfig,
    order: &[String],
    rng: &mut R,
) -> Result<(), GraphError> {
    for id in order {
        let Some(vertex) = graph.vertices.get(id) else {
            continue;
        };
        let scores = score_shards(graph, vertex, config.beta, config.penalty)?;
        let winner = best_shard(&scores, rng);

        let mut decided = None;
        if let Some(vertex) = graph.vertices.get_mut(id) {
            let current = vertex
                .label
                .ok_or_else(|| GraphError::Unlabeled(id.clone()))?;
            if vertex.votes.is_empty() {
                vertex.votes.insert(current, 1);
            }
            if let Some(winner) = winner {
                *vertex.votes.entry(winner).or_insert(0) += 1;
            }

            // Leading shard; equal vote counts resolve to the lowest index
            // so the decision does not depend on map iteration order.
            let top = vertex
                .votes
                .iter()
                .max_by(|(s1, v1), (s2, v2)| v1.cmp(v2).then_with(|| s2.cmp(s1)))
                .map(|(&shard, &votes)| (shard, votes));
            if let Some((top_shard, top_votes)) = top {
                let current_votes = vertex.votes.get(&current).copied().unwrap_or(0);
                if top_shard != current && top_votes >= current_votes + VOTE_MARGIN {
                    decided = Some(top_shard);
                }
            }
        }
        if let Some(target) = decided {
            apply_move(graph, id, target, config.rho)?;
        }
    }
    Ok(())
}
