use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-stage counters of one pipeline run
///
/// Contained failures only show up here and in the logs; the harvested data
/// itself cannot tell "found nothing" apart from "that unit failed".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    // Search stage
    pub queries_ok: usize,
    pub queries_failed: usize,
    pub origins_found: usize,
    pub targets_recorded: usize,

    // Crawl stage
    pub seeds_ok: usize,
    pub seeds_failed: usize,
    pub pages_ok: usize,
    pub pages_failed: usize,

    // Remote dispatch, both stages
    pub batches_ok: usize,
    pub batches_failed: usize,

    pub emails_found: usize,
    pub emails_recorded: usize,
}

impl PipelineReport {
    /// True if any query, seed, page or batch failed
    pub fn has_failures(&self) -> bool {
        self.queries_failed + self.seeds_failed + self.pages_failed + self.batches_failed > 0
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "queries {} ok/{} failed, {} origins ({} new targets), \
             seeds {} ok/{} failed, pages {} ok/{} failed, \
             batches {} ok/{} failed, {} emails ({} new)",
            self.queries_ok,
            self.queries_failed,
            self.origins_found,
            self.targets_recorded,
            self.seeds_ok,
            self.seeds_failed,
            self.pages_ok,
            self.pages_failed,
            self.batches_ok,
            self.batches_failed,
            self.emails_found,
            self.emails_recorded
        )
    }
}
