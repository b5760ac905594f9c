//! Output module for generating harvest summaries and reports
//!
//! This module handles:
//! - Generating markdown summaries of harvest results
//! - Loading and printing storage statistics

mod markdown;
pub mod stats;
mod summary;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{load_statistics, print_statistics, HarvestStatistics};
pub use summary::{HarvestSummary, OutputError, OutputResult};

use crate::storage::Persistence;
use crate::HarvestError;

/// Generates a harvest summary from storage
///
/// # Arguments
///
/// * `storage` - The storage backend containing harvest data
///
/// # Returns
///
/// * `Ok(HarvestSummary)` - Successfully generated summary
/// * `Err(HarvestError)` - Failed to generate summary
pub fn generate_summary(storage: &dyn Persistence) -> Result<HarvestSummary, HarvestError> {
    let stats = load_statistics(storage)?;
    let mut summary = HarvestSummary {
        stats: stats.counts,
        emails: storage.list_emails()?,
        targets: storage.list_targets()?,
        ..Default::default()
    };

    if let Some(run) = stats.latest_run {
        summary.duration_seconds = duration_seconds(&run.started_at, run.finished_at.as_deref());
        summary.run_id = Some(run.id);
        summary.started_at = Some(run.started_at);
        summary.finished_at = run.finished_at;
        summary.status = Some(run.status.to_db_string().to_string());
        summary.config_hash = Some(run.config_hash);
        summary.report = run.report;
    }

    Ok(summary)
}

fn duration_seconds(started: &str, finished: Option<&str>) -> Option<u64> {
    let started = started.parse::<chrono::DateTime<chrono::Utc>>().ok()?;
    let finished = finished?.parse::<chrono::DateTime<chrono::Utc>>().ok()?;
    u64::try_from((finished - started).num_seconds()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineReport;
    use crate::storage::{RunStatus, SqliteStorage};
    use std::collections::HashSet;

    #[test]
    fn test_generate_summary_from_storage() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage.add_target("https://a.test").unwrap();
        let emails: HashSet<String> = ["x@a.test".to_string()].into();
        storage.record_emails(&emails).unwrap();
        let run_id = storage.start_run("hash").unwrap();
        storage
            .finish_run(run_id, RunStatus::Completed, &PipelineReport::default())
            .unwrap();

        let summary = generate_summary(&storage).unwrap();

        assert_eq!(summary.run_id, Some(run_id));
        assert_eq!(summary.status.as_deref(), Some("completed"));
        assert!(summary.duration_seconds.is_some());
        assert_eq!(summary.emails, vec!["x@a.test"]);
        assert_eq!(summary.targets, vec!["https://a.test"]);
    }

    #[test]
    fn test_duration_seconds() {
        assert_eq!(
            duration_seconds("2024-01-01T00:00:00+00:00", Some("2024-01-01T00:01:30+00:00")),
            Some(90)
        );
        assert_eq!(duration_seconds("2024-01-01T00:00:00+00:00", None), None);
        assert_eq!(duration_seconds("garbage", Some("2024-01-01T00:00:00+00:00")), None);
    }
}
