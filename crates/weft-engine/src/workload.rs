//! Per-shard workload accounting.
//!
//! [`recompute_workloads`] is the authoritative from-scratch rule, evaluated
//! once at the start of an epoch run. [`apply_move`] is its O(degree)
//! incremental counterpart, run for every label change. The two must agree
//! after every move; the property test at the bottom checks exactly that.
//!
//! Accounting rule: an intra-shard edge between distinct vertices counts once
//! toward its shard (attributed via the lexicographically smaller endpoint);
//! a self-loop counts once; a cross-shard edge counts once toward *each*
//! endpoint's shard, since both shards independently bear load for it.

use weft_core::graph::{Graph, ShardId, Weight};
use weft_core::GraphError;

/// Compute every shard's workload from scratch over the active vertices.
pub fn recompute_workloads(graph: &Graph) -> Result<Vec<Weight>, GraphError> {
    let mut workloads = vec![0; graph.shard_count];

    for vertex in graph.vertices.values() {
        let label = vertex
            .label
            .ok_or_else(|| GraphError::Unlabeled(vertex.id.clone()))?;
        // A carried-forward label can be stale if the shard count shrank.
        if label >= graph.shard_count {
            return Err(GraphError::ShardOutOfRange {
                shard: label,
                count: graph.shard_count,
            });
        }
        for (neighbour, &weight) in &vertex.edges {
            let neighbour_label = graph
                .vertices
                .get(neighbour)
                .ok_or_else(|| GraphError::UnknownVertex(neighbour.clone()))?
                .label
                .ok_or_else(|| GraphError::Unlabeled(neighbour.clone()))?;

            if label == neighbour_label {
                if vertex.id < *neighbour {
                    // Intra-shard edge, counted via its smaller endpoint.
                    workloads[label] += weight;
                } else if vertex.id == *neighbour {
                    // Self-loop.
                    workloads[label] += weight;
                }
            } else {
                // Cross-shard edge: each endpoint's shard bears it.
                workloads[label] += weight;
            }
        }
    }
    Ok(workloads)
}

/// Move a vertex to `target`, updating shard workloads incrementally.
///
/// No-op when the vertex is already on `target` or has exhausted its `rho`
/// label-change budget. Otherwise the vertex's neighbour weights are split
/// into four buckets relative to the old and target shards and the two
/// affected workload entries are adjusted in O(degree).
pub fn apply_move(
    graph: &mut Graph,
    id: &str,
    target: ShardId,
    rho: u32,
) -> Result<(), GraphError> {
    let vertex = graph
        .vertices
        .get(id)
        .ok_or_else(|| GraphError::UnknownVertex(id.to_string()))?;
    let old = vertex
        .label
        .ok_or_else(|| GraphError::Unlabeled(id.to_string()))?;

    if old == target || vertex.label_updates >= rho {
        return Ok(());
    }

    let (mut intra, mut self_loop, mut toward_target, mut toward_others) = (0, 0, 0, 0);
    for (neighbour, &weight) in &vertex.edges {
        if *neighbour == vertex.id {
            self_loop += weight;
            continue;
        }
        let neighbour_label = graph
            .vertices
            .get(neighbour)
            .ok_or_else(|| GraphError::UnknownVertex(neighbour.clone()))?
            .label
            .ok_or_else(|| GraphError::Unlabeled(neighbour.clone()))?;
        if neighbour_label == old {
            intra += weight;
        } else if neighbour_label == target {
            toward_target += weight;
        } else {
            toward_others += weight;
        }
    }

    if let Some(vertex) = graph.vertices.get_mut(id) {
        vertex.label = Some(target);
        vertex.label_updates += 1;
    }
    graph.shard_workloads[old] -= toward_target + toward_others + self_loop;
    graph.shard_workloads[target] += toward_others + intra + self_loop;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest;
    use proptest::prelude::*;
    use weft_core::TxRecord;

    /// Small labeled graph: edges (a-b: 10, c-d: 10, b-c: 1), labels a,b=0 c,d=1.
    fn two_cluster_graph() -> Graph {
        let mut g = Graph::new(2);
        ingest::merge_epoch(
            &mut g,
            &[
                TxRecord::weighted("a", "b", 10),
                TxRecord::weighted("c", "d", 10),
                TxRecord::weighted("b", "c", 1),
            ],
        );
        for (id, label) in [("a", 0), ("b", 0), ("c", 1), ("d", 1)] {
            g.vertices.get_mut(id).unwrap().label = Some(label);
        }
        g.shard_workloads = recompute_workloads(&g).unwrap();
        g
    }

    // --- recompute_workloads ---

    #[test]
    fn intra_edges_count_once_cross_edges_per_endpoint() {
        let g = two_cluster_graph();
        // 10 intra per cluster plus 1 for each endpoint of the b-c edge.
        assert_eq!(g.shard_workloads, vec![11, 11]);
    }

    #[test]
    fn self_loop_counts_once() {
        let mut g = Graph::new(2);
        ingest::merge_epoch(&mut g, &[TxRecord::weighted("a", "a", 4)]);
        g.vertices.get_mut("a").unwrap().label = Some(1);
        assert_eq!(recompute_workloads(&g).unwrap(), vec![0, 4]);
    }

    #[test]
    fn unlabeled_vertex_is_an_error() {
        let mut g = Graph::new(2);
        ingest::merge_epoch(&mut g, &[TxRecord::new("a", "b")]);
        g.vertices.get_mut("a").unwrap().label = Some(0);
        let err = recompute_workloads(&g).unwrap_err();
        assert_eq!(err, GraphError::Unlabeled("b".into()));
    }

    #[test]
    fn stale_label_beyond_shard_count_is_an_error() {
        let mut g = Graph::new(2);
        ingest::merge_epoch(&mut g, &[TxRecord::new("a", "b")]);
        g.vertices.get_mut("a").unwrap().label = Some(5);
        g.vertices.get_mut("b").unwrap().label = Some(0);
        let err = recompute_workloads(&g).unwrap_err();
        assert_eq!(err, GraphError::ShardOutOfRange { shard: 5, count: 2 });
    }

    // --- apply_move ---

    #[test]
    fn move_to_same_shard_is_a_noop() {
        let mut g = two_cluster_graph();
        apply_move(&mut g, "b", 0, 10).unwrap();
        assert_eq!(g.vertices["b"].label_updates, 0);
        assert_eq!(g.shard_workloads, vec![11, 11]);
    }

    #[test]
    fn exhausted_budget_blocks_the_move() {
        let mut g = two_cluster_graph();
        apply_move(&mut g, "b", 1, 0).unwrap();
        assert_eq!(g.shard_of("b"), Some(0));
        assert_eq!(g.shard_workloads, vec![11, 11]);
    }

    #[test]
    fn move_updates_label_counter_and_workloads() {
        let mut g = two_cluster_graph();
        apply_move(&mut g, "b", 1, 10).unwrap();
        assert_eq!(g.shard_of("b"), Some(1));
        assert_eq!(g.vertices["b"].label_updates, 1);
        assert_eq!(g.shard_workloads, recompute_workloads(&g).unwrap());
    }

    #[test]
    fn move_with_self_loop_keeps_invariant() {
        let mut g = Graph::new(3);
        ingest::merge_epoch(
            &mut g,
            &[
                TxRecord::weighted("a", "a", 5),
                TxRecord::weighted("a", "b", 2),
                TxRecord::weighted("b", "c", 3),
            ],
        );
        for (id, label) in [("a", 0), ("b", 1), ("c", 2)] {
            g.vertices.get_mut(id).unwrap().label = Some(label);
        }
        g.shard_workloads = recompute_workloads(&g).unwrap();

        apply_move(&mut g, "a", 2, 10).unwrap();
        assert_eq!(g.shard_workloads, recompute_workloads(&g).unwrap());
        apply_move(&mut g, "b", 2, 10).unwrap();
        assert_eq!(g.shard_workloads, recompute_workloads(&g).unwrap());
    }

    // --- proptest: incremental maintenance equals from-scratch ---

    /// Build a labeled graph from generated edges over a small id universe.
    fn graph_from_edges(edges: &[(u8, u8, u8)], labels: &[u8], shards: usize) -> Graph {
        let mut g = Graph::new(shards);
        let records: Vec<TxRecord> = edges
            .iter()
            .map(|&(a, b, w)| {
                TxRecord::weighted(format!("v{:02}", a % 12), format!("v{:02}", b % 12), w as u64 + 1)
            })
            .collect();
        ingest::merge_epoch(&mut g, &records);

        let mut ids: Vec<String> = g.vertices.keys().cloned().collect();
        ids.sort_unstable();
        for (i, id) in ids.iter().enumerate() {
            let label = labels.get(i % labels.len().max(1)).copied().unwrap_or(0) as usize % shards;
            g.vertices.get_mut(id).unwrap().label = Some(label);
        }
        g.shard_workloads = recompute_workloads(&g).unwrap();
        g
    }

    proptest! {
        #[test]
        fn incremental_equals_from_scratch_after_every_move(
            edges in prop::collection::vec((0u8..12, 0u8..12, 0u8..9), 1..40),
            labels in prop::collection::vec(0u8..4, 1..12),
            moves in prop::collection::vec((0u8..12, 0u8..4), 1..30),
        ) {
            let mut g = graph_from_edges(&edges, &labels, 4);
            for (target_vertex, target_shard) in moves {
                let id = format!("v{:02}", target_vertex % 12);
                if !g.vertices.contains_key(&id) {
                    continue;
                }
                apply_move(&mut g, &id, target_shard as usize, u32::MAX).unwrap();
                prop_assert_eq!(
                    g.shard_workloads.clone(),
                    recompute_workloads(&g).unwrap(),
                    "workload drift after moving {} to shard {}", id, target_shard
                );
            }
        }

        #[test]
        fn rho_caps_label_changes(
            edges in prop::collection::vec((0u8..8, 0u8..8, 0u8..4), 1..20),
            rho in 0u32..4,
        ) {
            let mut g = graph_from_edges(&edges, &[0, 1], 3);
            let ids: Vec<String> = g.vertices.keys().cloned().collect();
            for round in 0..6usize {
                for id in &ids {
                    let target = (round + 1) % 3;
                    apply_move(&mut g, id, target, rho).unwrap();
                }
            }
            for v in g.vertices.values() {
                prop_assert!(v.label_updates <= rho, "{} exceeded rho", v.id);
            }
        }
    }
}
