//! # weft-core
//! Foundation types for the Weft shard allocator: the account graph model,
//! epoch transaction records, run configuration, and the error taxonomy.

pub mod config;
pub mod error;
pub mod feed;
pub mod graph;
pub mod result;

pub use config::{PenaltyFormula, RunConfig, SeedSource, TerminationPolicy, UpdateDiscipline};
pub use error::{ConfigError, EnsembleError, FeedError, GraphError, WeftError};
pub use feed::TxRecord;
pub use graph::{Graph, ShardId, Vertex, Weight};
pub use result::EpochResult;
