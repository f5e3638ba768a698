//! Integration test suite for the Weft shard allocator.
//!
//! The tests in `tests/` exercise the full epoch lifecycle across crates:
//! ingestion, ensemble partitioning, carry-forward, and reporting.

pub mod helpers;
