//! Shared builders for integration tests.

use weft_core::config::{RunConfig, SeedSource};
use weft_core::TxRecord;

/// A ring of `n` accounts where each talks to its next neighbour, plus a
/// weaker mid-range edge. Produces a graph with clear local structure.
pub fn ring_records(n: u32, weight: u64) -> Vec<TxRecord> {
    (0..n)
        .flat_map(|i| {
            vec![
                TxRecord::weighted(acct(i), acct((i + 1) % n), weight),
                TxRecord::weighted(acct(i), acct((i + n / 3) % n), 1),
            ]
        })
        .collect()
}

/// Canonical account id used by the builders.
pub fn acct(i: u32) -> String {
    format!("acct{i:04}")
}

/// A reproducible ensemble configuration over an explicit seed list.
pub fn seeded_config(shard_count: usize, seeds: Vec<u64>) -> RunConfig {
    RunConfig {
        shard_count,
        tau: 15,
        replicas: seeds.len(),
        seeds: SeedSource::List(seeds),
        ..RunConfig::default()
    }
}
