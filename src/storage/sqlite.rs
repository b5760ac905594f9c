//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Persistence trait.

use crate::extract::normalize_email;
use crate::pipeline::PipelineReport;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Persistence, StorageError, StorageResult};
use crate::storage::{PendingKind, RunRecord, RunStatus, StorageStats};
use crate::url::normalize_target;
use crate::HarvestError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status, report";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn list_column(&self, sql: &str) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(sql)?;
        let values = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(values)
    }

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<(RunRecord, Option<String>)> {
    let record = RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?).unwrap_or(RunStatus::Running),
        report: None,
    };
    Ok((record, row.get(5)?))
}

fn attach_report(
    (mut record, report): (RunRecord, Option<String>),
) -> StorageResult<RunRecord> {
    record.report = report
        .map(|json| serde_json::from_str::<PipelineReport>(&json))
        .transpose()?;
    Ok(record)
}

fn normalize_query(raw: &str) -> Option<String> {
    let query = raw.trim();
    (!query.is_empty()).then(|| query.to_string())
}

impl Persistence for SqliteStorage {
    // ===== Work Queues =====

    fn list_pending_targets(&self) -> StorageResult<Vec<String>> {
        self.list_column("SELECT url FROM scrape_targets WHERE pending = 1 ORDER BY id")
    }

    fn list_pending_queries(&self) -> StorageResult<Vec<String>> {
        self.list_column("SELECT query FROM search_queries WHERE pending = 1 ORDER BY id")
    }

    fn record_targets(&mut self, targets: &HashSet<String>) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut inserted = 0;

        {
            let mut insert = tx.prepare(
                "INSERT OR IGNORE INTO scrape_targets (url, pending, added_at) VALUES (?1, 1, ?2)",
            )?;
            let mut requeue = tx.prepare("UPDATE scrape_targets SET pending = 1 WHERE url = ?1")?;

            for raw in targets {
                let url = match normalize_target(raw) {
                    Ok(url) => url,
                    Err(e) => {
                        tracing::warn!("Skipping invalid target '{}': {}", raw, e);
                        continue;
                    }
                };

                if insert.execute(params![url, now])? > 0 {
                    inserted += 1;
                } else {
                    requeue.execute(params![url])?;
                }
            }
        }

        tx.commit()?;
        Ok(inserted)
    }

    fn clear_pending(&mut self, kind: PendingKind) -> StorageResult<usize> {
        let sql = match kind {
            PendingKind::Targets => "UPDATE scrape_targets SET pending = 0 WHERE pending = 1",
            PendingKind::Queries => "UPDATE search_queries SET pending = 0 WHERE pending = 1",
        };
        Ok(self.conn.execute(sql, [])?)
    }

    fn add_target(&mut self, url: &str) -> StorageResult<bool> {
        let targets = HashSet::from([url.to_string()]);
        Ok(self.record_targets(&targets)? > 0)
    }

    fn add_query(&mut self, query: &str) -> StorageResult<bool> {
        let Some(query) = normalize_query(query) else {
            tracing::warn!("Skipping empty query");
            return Ok(false);
        };

        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO search_queries (query, pending, added_at) VALUES (?1, 1, ?2)",
            params![query, Utc::now().to_rfc3339()],
        )?;
        Ok(inserted > 0)
    }

    fn list_targets(&self) -> StorageResult<Vec<String>> {
        self.list_column("SELECT url FROM scrape_targets ORDER BY url")
    }

    // ===== Emails =====

    fn record_emails(&mut self, emails: &HashSet<String>) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut inserted = 0;

        {
            let mut insert = tx.prepare(
                "INSERT OR IGNORE INTO email_records (email, discovered_at) VALUES (?1, ?2)",
            )?;

            for raw in emails {
                let Some(email) = normalize_email(raw) else {
                    tracing::warn!("Skipping invalid email '{}'", raw);
                    continue;
                };
                inserted += insert.execute(params![email, now])?;
            }
        }

        tx.commit()?;
        Ok(inserted)
    }

    fn list_emails(&self) -> StorageResult<Vec<String>> {
        self.list_column("SELECT email FROM email_records ORDER BY email")
    }

    // ===== Run Management =====

    fn start_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        report: &PipelineReport,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let report = serde_json::to_string(report)?;
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, report = ?3 WHERE id = ?4",
            params![status.to_db_string(), now, report, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))?;

        attach_report(row)
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;

        row.map(attach_report).transpose()
    }

    // ===== Statistics =====

    fn stats(&self) -> StorageResult<StorageStats> {
        Ok(StorageStats {
            targets_total: self.count("SELECT COUNT(*) FROM scrape_targets")?,
            targets_pending: self.count("SELECT COUNT(*) FROM scrape_targets WHERE pending = 1")?,
            queries_total: self.count("SELECT COUNT(*) FROM search_queries")?,
            queries_pending: self.count("SELECT COUNT(*) FROM search_queries WHERE pending = 1")?,
            emails_total: self.count("SELECT COUNT(*) FROM email_records")?,
            runs_total: self.count("SELECT COUNT(*) FROM runs")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_create_in_memory() {
        assert!(SqliteStorage::new_in_memory().is_ok());
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harvest.db");

        let mut storage = SqliteStorage::new(&path).unwrap();
        storage.add_query("dentists").unwrap();
        drop(storage);

        let storage = SqliteStorage::new(&path).unwrap();
        assert_eq!(storage.list_pending_queries().unwrap(), vec!["dentists"]);
    }

    #[test]
    fn test_record_targets_normalizes_and_dedupes() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();

        let inserted = storage
            .record_targets(&set(&["https://A.test/", "a.test", "ftp://nope.test"]))
            .unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(storage.list_pending_targets().unwrap(), vec!["https://a.test"]);
    }

    #[test]
    fn test_rerecorded_target_becomes_pending_again() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage.record_targets(&set(&["https://a.test"])).unwrap();
        storage.clear_pending(PendingKind::Targets).unwrap();
        assert!(storage.list_pending_targets().unwrap().is_empty());

        let inserted = storage.record_targets(&set(&["https://a.test"])).unwrap();
        assert_eq!(inserted, 0);
        assert_eq!(storage.list_pending_targets().unwrap(), vec!["https://a.test"]);
    }

    #[test]
    fn test_clear_pending_keeps_rows() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage.add_query("plumbers").unwrap();
        storage.add_query("electricians").unwrap();

        assert_eq!(storage.clear_pending(PendingKind::Queries).unwrap(), 2);
        assert!(storage.list_pending_queries().unwrap().is_empty());

        let stats = storage.stats().unwrap();
        assert_eq!(stats.queries_total, 2);
        assert_eq!(stats.queries_pending, 0);
    }

    #[test]
    fn test_clear_pending_is_per_kind() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage.add_query("plumbers").unwrap();
        storage.add_target("https://a.test").unwrap();

        storage.clear_pending(PendingKind::Queries).unwrap();
        assert_eq!(storage.list_pending_targets().unwrap(), vec!["https://a.test"]);
    }

    #[test]
    fn test_add_query_trims_and_dedupes() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        assert!(storage.add_query("  dentists ").unwrap());
        assert!(!storage.add_query("dentists").unwrap());
        assert!(!storage.add_query("   ").unwrap());
        assert_eq!(storage.list_pending_queries().unwrap(), vec!["dentists"]);
    }

    #[test]
    fn test_record_emails_is_idempotent() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let emails = set(&["Info@A.test", "x@b.test", "not-an-email"]);

        assert_eq!(storage.record_emails(&emails).unwrap(), 2);
        assert_eq!(storage.record_emails(&emails).unwrap(), 0);
        assert_eq!(
            storage.list_emails().unwrap(),
            vec!["info@a.test", "x@b.test"]
        );
    }

    #[test]
    fn test_run_lifecycle() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.start_run("test_hash").unwrap();
        assert!(run_id > 0);

        let run = storage.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Running);
        assert!(run.report.is_none());

        let report = PipelineReport {
            seeds_ok: 3,
            emails_found: 7,
            ..Default::default()
        };
        storage
            .finish_run(run_id, RunStatus::Completed, &report)
            .unwrap();

        let run = storage.get_latest_run().unwrap().unwrap();
        assert_eq!(run.id, run_id);
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.config_hash, "test_hash");
        assert!(run.finished_at.is_some());
        assert_eq!(run.report, Some(report));
    }

    #[test]
    fn test_unknown_run() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        assert!(matches!(
            storage.get_run(42),
            Err(StorageError::RunNotFound(42))
        ));
        assert!(storage
            .finish_run(42, RunStatus::Failed, &PipelineReport::default())
            .is_err());
        assert!(storage.get_latest_run().unwrap().is_none());
    }
}
