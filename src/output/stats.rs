//! Statistics generation from the harvest database
//!
//! This module provides functionality for extracting and displaying
//! harvest statistics from the storage layer.

use crate::storage::{Persistence, RunRecord, StorageStats};
use crate::HarvestError;

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// Row counts across the queues and email records
    pub counts: StorageStats,

    /// Most recent run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(HarvestStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Persistence) -> Result<HarvestStatistics, HarvestError> {
    Ok(HarvestStatistics {
        counts: storage.stats()?,
        latest_run: storage.get_latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &HarvestStatistics) {
    let counts = &stats.counts;

    println!("=== Harvest Statistics ===\n");

    println!("Queues:");
    println!(
        "  Scrape targets: {} ({} pending)",
        counts.targets_total, counts.targets_pending
    );
    println!(
        "  Search queries: {} ({} pending)",
        counts.queries_total, counts.queries_pending
    );
    println!();

    println!("Results:");
    println!("  Email addresses: {}", counts.emails_total);
    println!("  Runs recorded: {}", counts.runs_total);
    println!();

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run ({}):", run.id);
            println!("  Status: {}", run.status.to_db_string());
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            if let Some(report) = &run.report {
                println!("  Counters: {}", report);
            }
        }
        None => println!("No runs recorded yet"),
    }
}
