//! Epoch dataset loading.
//!
//! Epoch chunk files are CSVs with a header row naming at least `from` and
//! `to` columns (an optional `weight` column carries pre-aggregated counts).
//! Columns are discovered by name so extra columns such as block numbers or
//! timestamps are ignored. Malformed or short rows are skipped, never fatal.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::warn;

use weft_core::{FeedError, TxRecord};

/// Read one epoch's transaction records from a CSV chunk file.
pub fn read_epoch_records(path: &Path) -> Result<Vec<TxRecord>, FeedError> {
    let file = File::open(path)?;
    let mut lines = BufReader::new(file).lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => return Err(FeedError::EmptyFeed(path.display().to_string())),
    };
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let from_idx = find_column(&columns, "from")?;
    let to_idx = find_column(&columns, "to")?;
    let weight_idx = columns.iter().position(|c| *c == "weight");

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for line in lines {
        let line = line?;
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let needed = from_idx.max(to_idx).max(weight_idx.unwrap_or(0));
        if fields.len() <= needed {
            skipped += 1;
            continue;
        }
        let from = fields[from_idx];
        let to = fields[to_idx];
        if from.is_empty() || to.is_empty() {
            skipped += 1;
            continue;
        }
        let weight = match weight_idx {
            None => 1,
            Some(idx) => match fields[idx].parse::<u64>() {
                Ok(w) if w > 0 => w,
                _ => {
                    skipped += 1;
                    continue;
                }
            },
        };
        records.push(TxRecord::weighted(from, to, weight));
    }

    if skipped > 0 {
        warn!(path = %path.display(), skipped, "skipped malformed feed rows");
    }
    Ok(records)
}

fn find_column(columns: &[&str], name: &'static str) -> Result<usize, FeedError> {
    columns
        .iter()
        .position(|c| *c == name)
        .ok_or(FeedError::MissingColumn(name))
}

/// Read an explicit seed list: one or more comma-separated integers per line.
///
/// Values that do not parse are skipped with a warning, matching the feed's
/// tolerance for malformed rows.
pub fn read_seed_list(path: &Path) -> Result<Vec<u64>, FeedError> {
    let file = File::open(path)?;
    let mut seeds = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        for field in line.split(',') {
            let field = field.trim();
            if field.is_empty() {
                continue;
            }
            match field.parse::<u64>() {
                Ok(seed) => seeds.push(seed),
                Err(_) => warn!(value = field, "skipping unparseable seed"),
            }
        }
    }
    if seeds.is_empty() {
        return Err(FeedError::EmptyFeed(path.display().to_string()));
    }
    Ok(seeds)
}
