//! weft — experiment driver for the Weft shard allocator.
//!
//! Loads per-epoch transaction chunks from a dataset directory, runs the
//! ensemble allocator epoch by epoch with the winning partition carried
//! forward, and reports per-epoch metrics as logs and optional JSON lines.

mod loader;
mod report;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use weft_core::config::{
    PenaltyFormula, RunConfig, SeedSource, TerminationPolicy, UpdateDiscipline,
};
use weft_core::graph::Graph;
use weft_engine::{ingest, run_ensemble};

use report::EpochReport;

/// CLI arguments for the experiment driver.
#[derive(Debug, Parser)]
#[command(name = "weft")]
#[command(about = "Incremental shard allocation over epoch transaction chunks", long_about = None)]
struct Args {
    /// Directory containing epoch chunk files named `epoch_<n>.csv`.
    #[arg(long)]
    dataset: PathBuf,

    /// Number of epochs to process, starting from epoch 1.
    #[arg(long, default_value = "3")]
    epochs: u32,

    /// Number of shards to partition accounts across.
    #[arg(long, default_value = "8")]
    shards: usize,

    /// Ensemble size: independent replicas per epoch.
    #[arg(long, default_value = "8")]
    replicas: usize,

    /// Label-change cap per vertex per epoch.
    #[arg(long, default_value = "50")]
    rho: u32,

    /// Objective weight between cross-shard workload and imbalance.
    #[arg(long, default_value = "0.5")]
    alpha: f64,

    /// Score weight between locality and the load-balance penalty.
    #[arg(long, default_value = "0.5")]
    beta: f64,

    /// Sweep budget per epoch run.
    #[arg(long, default_value = "100")]
    tau: u32,

    /// Update discipline: immediate, barrier, or voting.
    #[arg(long, default_value = "immediate")]
    discipline: String,

    /// Termination policy: run-to-budget or stop-on-convergence.
    #[arg(long, default_value = "run-to-budget")]
    termination: String,

    /// Minimum sweeps before stop-on-convergence may stop.
    #[arg(long, default_value = "0")]
    min_sweeps: u32,

    /// Penalty formula: min-relative or mean-relative.
    #[arg(long, default_value = "min-relative")]
    penalty: String,

    /// Base seed; replica i uses base + i. Omit for wall-clock seeding.
    #[arg(long)]
    seed_base: Option<u64>,

    /// File of explicit seeds (comma/newline separated). Overrides seed-base.
    #[arg(long)]
    seeds_file: Option<PathBuf>,

    /// Append one JSON report line per epoch to this file.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn run_config(&self) -> Result<RunConfig> {
        let seeds = if let Some(path) = &self.seeds_file {
            SeedSource::List(loader::read_seed_list(path).context("reading seed list")?)
        } else if let Some(base) = self.seed_base {
            SeedSource::Base(base)
        } else {
            SeedSource::WallClock
        };

        let mut termination: TerminationPolicy = self.termination.parse()?;
        if let TerminationPolicy::StopOnConvergence { min_sweeps } = &mut termination {
            *min_sweeps = self.min_sweeps;
        }

        let config = RunConfig {
            shard_count: self.shards,
            rho: self.rho,
            alpha: self.alpha,
            beta: self.beta,
            tau: self.tau,
            discipline: self.discipline.parse::<UpdateDiscipline>()?,
            termination,
            penalty: self.penalty.parse::<PenaltyFormula>()?,
            replicas: self.replicas,
            seeds,
        };
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    info!("weft v{}", env!("CARGO_PKG_VERSION"));
    let config = args.run_config()?;
    info!(
        shards = config.shard_count,
        replicas = config.replicas,
        rho = config.rho,
        alpha = config.alpha,
        beta = config.beta,
        tau = config.tau,
        "configuration validated"
    );

    let mut graph = Graph::new(config.shard_count);
    for epoch in 1..=args.epochs {
        let path = args.dataset.join(format!("epoch_{epoch}.csv"));
        let records = loader::read_epoch_records(&path)
            .with_context(|| format!("loading epoch chunk {}", path.display()))?;
        info!(epoch, records = records.len(), "epoch chunk loaded");

        let started_at = chrono::Utc::now();
        let clock = Instant::now();
        ingest::merge_epoch(&mut graph, &records);
        let outcome =
            run_ensemble(&graph, &config).with_context(|| format!("running epoch {epoch}"))?;
        let duration_ms = clock.elapsed().as_millis() as u64;

        let epoch_report = EpochReport::new(epoch, started_at, duration_ms, &outcome);
        if let Some(stats) = &epoch_report.stats {
            info!(
                epoch,
                winner_seed = epoch_report.winner.seed,
                fitness = epoch_report.winner.fitness,
                cross_shard = epoch_report.winner.cross_shard_workload,
                imbalance = epoch_report.winner.workload_imbalance,
                convergence = ?epoch_report.winner.convergence,
                mean = stats.mean,
                median = stats.median,
                std_dev = stats.std_dev,
                duration_ms,
                "epoch complete"
            );
        }
        if let Some(path) = &args.report {
            epoch_report
                .append_to(path)
                .with_context(|| format!("writing report {}", path.display()))?;
        }

        // The winning partition seeds the next epoch.
        graph = outcome.winner.graph;
    }

    info!("all epochs processed");
    Ok(())
}
