//! Per-epoch reporting: replica fitness statistics and JSON-lines output.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use weft_engine::{EnsembleOutcome, ReplicaSummary};

/// Distribution of replica fitness values within one epoch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitnessStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    /// How much smaller the minimum is than the mean, in percent.
    pub min_below_mean_pct: f64,
}

/// One replica's line in the report: a summary or its isolated error.
#[derive(Debug, Serialize)]
pub struct ReplicaEntry {
    pub seed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ReplicaSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything recorded about one epoch run.
#[derive(Debug, Serialize)]
pub struct EpochReport {
    pub epoch: u32,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub winner: ReplicaSummary,
    pub stats: Option<FitnessStats>,
    pub replicas: Vec<ReplicaEntry>,
}

impl EpochReport {
    /// Build a report from an ensemble outcome.
    pub fn new(
        epoch: u32,
        started_at: DateTime<Utc>,
        duration_ms: u64,
        outcome: &EnsembleOutcome,
    ) -> Self {
        let replicas: Vec<ReplicaEntry> = outcome
            .replicas
            .iter()
            .map(|report| match &report.outcome {
                Ok(summary) => ReplicaEntry {
                    seed: report.seed,
                    summary: Some(summary.clone()),
                    error: None,
                },
                Err(err) => ReplicaEntry {
                    seed: report.seed,
                    summary: None,
                    error: Some(err.to_string()),
                },
            })
            .collect();

        let fitness_values: Vec<f64> = replicas
            .iter()
            .filter_map(|entry| entry.summary.as_ref().map(|s| s.fitness))
            .collect();

        Self {
            epoch,
            started_at,
            duration_ms,
            winner: ReplicaSummary::from(&outcome.winner),
            stats: fitness_stats(&fitness_values),
            replicas,
        }
    }

    /// Append this report as one JSON line to `path`.
    pub fn append_to(&self, path: &Path) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let line = serde_json::to_string(self)?;
        writeln!(file, "{line}")
    }
}

/// Summarize a set of replica fitness values. `None` when the set is empty.
pub fn fitness_stats(values: &[f64]) -> Option<FitnessStats> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / n;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    let min_below_mean_pct = if mean != 0.0 {
        (mean - min) / mean * 100.0
    } else {
        0.0
    };

    Some(FitnessStats {
        min,
        max,
        mean,
        median,
        std_dev: variance.sqrt(),
        min_below_mean_pct,
    })
}
