//! # weft-engine — Constrained label-propagation shard allocation.
//!
//! Partitions an account-transaction graph over a fixed number of shards,
//! minimizing cross-shard transaction weight while keeping per-shard load
//! balanced. The assignment carries forward epoch to epoch and is refined
//! incrementally:
//!
//! - **Ingestion** merges each epoch's transactions into the carried graph
//!   and sidelines accounts with no activity.
//! - **Scoring** rates each shard for a vertex by edge affinity, discounted
//!   by a configurable workload penalty.
//! - **Sweeps** visit all active vertices in seeded random order under one
//!   of three update disciplines (immediate, barrier, voting).
//! - **The runner** repeats sweeps up to a budget, tracking label stability.
//! - **The ensemble** races independently seeded replicas on private graph
//!   copies and keeps the lowest-fitness partition.

pub mod ensemble;
pub mod fitness;
pub mod ingest;
pub mod runner;
pub mod scoring;
pub mod sweep;
pub mod workload;

pub use ensemble::{run_ensemble, EnsembleOutcome, ReplicaReport, ReplicaSummary};
pub use fitness::FitnessBreakdown;
pub use runner::run_epoch;
