//! End-to-end epoch lifecycle tests.
//!
//! Each test drives the full pipeline the way the experiment driver does:
//! merge an epoch's transactions into the carried graph, race an ensemble of
//! seeded replicas, and thread the winning graph into the next epoch.

use weft_core::config::{TerminationPolicy, UpdateDiscipline};
use weft_core::graph::Graph;
use weft_core::TxRecord;
use weft_engine::{ingest, run_ensemble};
use weft_tests::helpers::*;

#[test]
fn two_cluster_partition_metrics() {
    // Two tight pairs joined by a single weak edge, pre-labeled onto their
    // natural shards: cross-shard weight 1, both shards carrying 11 (the 10
    // intra plus 1 for their endpoint of the joining edge), zero imbalance.
    let mut graph = Graph::new(2);
    ingest::merge_epoch(
        &mut graph,
        &[
            TxRecord::weighted("a", "b", 10),
            TxRecord::weighted("c", "d", 10),
            TxRecord::weighted("b", "c", 1),
        ],
    );
    for (id, label) in [("a", 0), ("b", 0), ("c", 1), ("d", 1)] {
        graph.vertices.get_mut(id).unwrap().label = Some(label);
    }

    let workloads = weft_engine::workload::recompute_workloads(&graph).unwrap();
    assert_eq!(workloads, vec![11, 11]);

    graph.shard_workloads = workloads;
    let breakdown = weft_engine::fitness::evaluate(&graph, 0.5).unwrap();
    assert_eq!(breakdown.cross_shard_workload, 1);
    assert_eq!(breakdown.workload_imbalance, 0.0);
}

#[test]
fn winning_graph_carries_into_the_next_epoch() {
    let config = seeded_config(4, vec![1, 2, 3, 4, 5]);

    // Epoch 1: everyone is active.
    let mut graph = Graph::new(4);
    ingest::merge_epoch(&mut graph, &ring_records(24, 4));
    let outcome = run_ensemble(&graph, &config).unwrap();
    let mut graph = outcome.winner.graph;
    assert!(graph.vertices.values().all(|v| v.label.is_some()));

    // Epoch 2: only a handful of accounts transact. The idle majority keeps
    // the labels the previous epoch settled on.
    let carried: Vec<(String, _)> = graph
        .vertices
        .iter()
        .filter(|(id, _)| id.as_str() >= "acct0004")
        .map(|(id, v)| (id.clone(), v.label))
        .collect();

    ingest::merge_epoch(
        &mut graph,
        &[
            TxRecord::new(acct(0), acct(1)),
            TxRecord::new(acct(1), acct(2)),
            TxRecord::new(acct(2), acct(3)),
        ],
    );
    let outcome = run_ensemble(&graph, &config).unwrap();
    let next = outcome.winner.graph;

    assert_eq!(next.len(), 24, "idle accounts must survive the epoch");
    for (id, label) in carried {
        assert_eq!(next.vertices[&id].label, label, "{id} drifted while idle");
    }
}

#[test]
fn ensemble_winner_beats_every_reported_replica() {
    let mut graph = Graph::new(4);
    ingest::merge_epoch(&mut graph, &ring_records(30, 3));

    let outcome = run_ensemble(&graph, &seeded_config(4, vec![9, 8, 7, 6, 5])).unwrap();
    assert_eq!(outcome.replicas.len(), 5);
    for report in &outcome.replicas {
        let summary = report.outcome.as_ref().unwrap();
        assert!(outcome.winner.fitness <= summary.fitness);
    }
    // The winner's metrics must be recomputable from its own graph.
    let again = weft_engine::fitness::evaluate(&outcome.winner.graph, 0.5).unwrap();
    assert_eq!(outcome.winner.fitness, again.fitness);
}

#[test]
fn label_change_budget_holds_across_disciplines() {
    for discipline in [
        UpdateDiscipline::Immediate,
        UpdateDiscipline::Barrier,
        UpdateDiscipline::Voting,
    ] {
        for rho in [0u32, 2] {
            let mut graph = Graph::new(3);
            ingest::merge_epoch(&mut graph, &ring_records(18, 2));
            let config = weft_core::config::RunConfig {
                rho,
                discipline,
                ..seeded_config(3, vec![4, 5, 6])
            };
            let outcome = run_ensemble(&graph, &config).unwrap();
            for v in outcome.winner.graph.vertices.values() {
                assert!(
                    v.label_updates <= rho,
                    "{:?} rho={rho}: {} moved {} times",
                    discipline,
                    v.id,
                    v.label_updates
                );
            }
        }
    }
}

#[test]
fn stop_on_convergence_reports_a_convergence_index() {
    let mut graph = Graph::new(2);
    // A tight pair already sharing a shard converges on the first sweep
    // whatever the seed: neither vertex has any edge weight elsewhere.
    ingest::merge_epoch(&mut graph, &[TxRecord::weighted("a", "b", 10)]);
    graph.vertices.get_mut("a").unwrap().label = Some(0);
    graph.vertices.get_mut("b").unwrap().label = Some(0);

    let config = weft_core::config::RunConfig {
        termination: TerminationPolicy::StopOnConvergence { min_sweeps: 0 },
        ..seeded_config(2, vec![1, 2, 3])
    };
    let outcome = run_ensemble(&graph, &config).unwrap();
    assert_eq!(outcome.winner.convergence, Some(1));
}
