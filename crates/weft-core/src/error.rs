//! Error types for the Weft shard allocator.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("shard count must be at least 1")] NoShards,
    #[error("sweep budget (tau) must be at least 1")] ZeroSweepBudget,
    #[error("ensemble size must be at least 1")] NoReplicas,
    #[error("{name} must lie in [0, 1], got {value}")] WeightOutOfRange { name: &'static str, value: f64 },
    #[error("unknown update discipline: {0}")] UnknownDiscipline(String),
    #[error("unknown termination policy: {0}")] UnknownTermination(String),
    #[error("unknown penalty formula: {0}")] UnknownPenalty(String),
    #[error("not enough seeds: needed {needed}, found {found}")] SeedShortfall { needed: usize, found: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("vertex has no shard assignment: {0}")] Unlabeled(String),
    #[error("edge references unknown vertex: {0}")] UnknownVertex(String),
    #[error("shard {shard} out of range for {count} shards")] ShardOutOfRange { shard: usize, count: usize },
}

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("missing required column '{0}' in header")] MissingColumn(&'static str),
    #[error("empty feed: {0}")] EmptyFeed(String),
    #[error(transparent)] Io(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnsembleError {
    #[error("all {replicas} replicas failed; first failure: {first}")]
    AllReplicasFailed { replicas: usize, first: GraphError },
    #[error(transparent)] Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum WeftError {
    #[error(transparent)] Config(#[from] ConfigError),
    #[error(transparent)] Graph(#[from] GraphError),
    #[error(transparent)] Feed(#[from] FeedError),
    #[error(transparent)] Ensemble(#[from] EnsembleError),
}
