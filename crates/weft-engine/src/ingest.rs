//! Epoch ingestion: merging a new epoch's transactions into the carried graph.
//!
//! Partitioning state survives between epochs: vertices keep their labels and
//! only the per-epoch transient state (edges, update counters, staged labels,
//! votes) is reset. Vertices that see no transactions this epoch are pulled
//! out before the run and put back unchanged afterwards.

use std::collections::HashMap;

use rand::Rng;

use weft_core::graph::{Graph, Vertex};
use weft_core::TxRecord;

/// Merge one epoch's transaction records into the graph.
///
/// Surviving vertices have their edges and per-epoch counters cleared but
/// keep their labels. Missing vertices are created unlabeled. Each record
/// increments the undirected edge weight on both endpoints; a self-loop
/// increments its single entry once. Zero-weight records carry no signal and
/// are skipped.
pub fn merge_epoch(graph: &mut Graph, records: &[TxRecord]) {
    for vertex in graph.vertices.values_mut() {
        vertex.edges.clear();
        vertex.label_updates = 0;
        vertex.staged_label = None;
        vertex.votes.clear();
    }

    for record in records {
        if record.weight == 0 {
            continue;
        }
        for id in [&record.from, &record.to] {
            if !graph.vertices.contains_key(id) {
                graph.vertices.insert(id.clone(), Vertex::new(id.clone()));
            }
        }
        if let Some(from) = graph.vertices.get_mut(&record.from) {
            *from.edges.entry(record.to.clone()).or_insert(0) += record.weight;
        }
        if record.from != record.to {
            if let Some(to) = graph.vertices.get_mut(&record.to) {
                *to.edges.entry(record.from.clone()).or_insert(0) += record.weight;
            }
        }
    }
}

/// Give every still-unlabeled vertex a uniformly random shard label.
///
/// Ids are visited in sorted order so the assignment is fully determined by
/// the random stream. Carried-forward vertices keep their labels.
pub fn assign_random_labels<R: Rng>(graph: &mut Graph, rng: &mut R) {
    let mut ids: Vec<String> = graph
        .vertices
        .iter()
        .filter(|(_, v)| v.label.is_none())
        .map(|(id, _)| id.clone())
        .collect();
    ids.sort_unstable();

    let shard_count = graph.shard_count;
    for id in ids {
        if let Some(vertex) = graph.vertices.get_mut(&id) {
            vertex.label = Some(rng.gen_range(0..shard_count));
            vertex.label_updates = 0;
        }
    }
}

/// Remove every edgeless vertex from the graph, returning them keyed by id.
///
/// Inactive vertices take no part in scoring or workload accounting this
/// epoch; [`restore_inactive`] reinserts them unchanged after the run.
pub fn split_inactive(graph: &mut Graph) -> HashMap<String, Vertex> {
    let ids: Vec<String> = graph
        .vertices
        .iter()
        .filter(|(_, v)| v.is_inactive())
        .map(|(id, _)| id.clone())
        .collect();

    let mut inactive = HashMap::with_capacity(ids.len());
    for id in ids {
        if let Some(vertex) = graph.vertices.remove(&id) {
            inactive.insert(id, vertex);
        }
    }
    inactive
}

/// Reinsert vertices previously removed by [`split_inactive`].
pub fn restore_inactive(graph: &mut Graph, inactive: HashMap<String, Vertex>) {
    graph.vertices.extend(inactive);
}
