//! Summary data and output errors

use crate::pipeline::PipelineReport;
use crate::storage::StorageStats;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Everything the markdown summary shows
#[derive(Debug, Clone, Default)]
pub struct HarvestSummary {
    // Latest run, if any
    pub run_id: Option<i64>,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub duration_seconds: Option<u64>,
    pub status: Option<String>,
    pub config_hash: Option<String>,
    pub report: Option<PipelineReport>,

    pub stats: StorageStats,
    pub emails: Vec<String>,
    pub targets: Vec<String>,
}

impl HarvestSummary {
    /// Share of crawled seeds that completed, in percent
    pub fn seed_success_rate(&self) -> Option<f64> {
        let report = self.report.as_ref()?;
        let total = report.seeds_ok + report.seeds_failed;
        (total > 0).then(|| report.seeds_ok as f64 / total as f64 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_success_rate() {
        let mut summary = HarvestSummary::default();
        assert_eq!(summary.seed_success_rate(), None);

        summary.report = Some(PipelineReport {
            seeds_ok: 3,
            seeds_failed: 1,
            ..Default::default()
        });
        assert_eq!(summary.seed_success_rate(), Some(75.0));
    }
}
