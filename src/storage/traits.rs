//! Storage traits and error types
//!
//! This module defines the persistence collaborator the pipeline talks to
//! and its associated error types.

use crate::pipeline::PipelineReport;
use crate::storage::{PendingKind, RunRecord, RunStatus, StorageStats};
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence collaborator for the harvest pipeline
///
/// Holds the work queues (scrape targets and search queries, each with a
/// pending flag), the harvested email addresses, and run bookkeeping.
/// Recording is idempotent: values already stored are not duplicated.
pub trait Persistence {
    // ===== Work Queues =====

    /// Lists scrape targets waiting to be crawled, oldest first
    fn list_pending_targets(&self) -> StorageResult<Vec<String>>;

    /// Lists search queries waiting to be expanded, oldest first
    fn list_pending_queries(&self) -> StorageResult<Vec<String>>;

    /// Records scrape targets and marks them pending
    ///
    /// Targets are normalized first; invalid ones are skipped. A target that
    /// already exists is marked pending again.
    ///
    /// # Returns
    ///
    /// The number of targets that were not stored before
    fn record_targets(&mut self, targets: &HashSet<String>) -> StorageResult<usize>;

    /// Clears the pending flag of every item of one kind without deleting rows
    ///
    /// # Returns
    ///
    /// The number of items that were pending
    fn clear_pending(&mut self, kind: PendingKind) -> StorageResult<usize>;

    /// Adds a single target; returns false if it was already stored
    fn add_target(&mut self, url: &str) -> StorageResult<bool>;

    /// Adds a single query; returns false if it was already stored
    fn add_query(&mut self, query: &str) -> StorageResult<bool>;

    /// Lists all stored targets, sorted
    fn list_targets(&self) -> StorageResult<Vec<String>>;

    // ===== Emails =====

    /// Records harvested emails
    ///
    /// # Returns
    ///
    /// The number of emails that were not stored before
    fn record_emails(&mut self, emails: &HashSet<String>) -> StorageResult<usize>;

    /// Lists all stored emails, sorted
    fn list_emails(&self) -> StorageResult<Vec<String>>;

    // ===== Run Management =====

    /// Creates a new run in the `running` state
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn start_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Finishes a run with its final status and counters
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        report: &PipelineReport,
    ) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    // ===== Statistics =====

    fn stats(&self) -> StorageResult<StorageStats>;
}
