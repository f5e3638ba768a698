//! Epoch transaction feed records.

use serde::{Deserialize, Serialize};

use crate::graph::Weight;

/// One account-to-account transaction, optionally pre-aggregated.
///
/// The engine treats the edge as undirected; a record with `from == to` is a
/// self-loop and is applied once. Loaders supply these records per epoch,
/// skipping malformed rows rather than failing the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRecord {
    /// Sender account address.
    pub from: String,
    /// Receiver account address.
    pub to: String,
    /// Aggregated repetition count, at least 1.
    #[serde(default = "default_weight")]
    pub weight: Weight,
}

fn default_weight() -> Weight {
    1
}

impl TxRecord {
    /// A single unweighted transaction between two accounts.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            weight: 1,
        }
    }

    /// A pre-aggregated transaction record.
    pub fn weighted(from: impl Into<String>, to: impl Into<String>, weight: Weight) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            weight,
        }
    }

    /// Whether this record is a self-loop.
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}
