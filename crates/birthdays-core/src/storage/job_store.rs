//! SQLite-backed execution substrate.
//!
//! Pending alert jobs survive restarts in an `alert_jobs` table. A job is
//! due once its `due_at` passes; [`JobStore::take_due`] removes due jobs in
//! the same transaction that returns them, so each job is handed out at most
//! once.
//!
//! Several processes may share one store file. Writes that read-then-modify
//! take the write lock up front (`BEGIN IMMEDIATE`) and wait on a busy
//! timeout rather than fail.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{params, Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::alerts::PayloadMap;
use crate::error::{CoreError, DatabaseError, Result};
use crate::jobs::{ExecutionSubstrate, JobId, JobRequest, Replacement};

/// A pending job as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredJob {
    pub id: JobId,
    pub tag: String,
    pub payload: PayloadMap,
    pub due_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

pub struct JobStore {
    conn: Mutex<Connection>,
}

/// How long a writer waits for another process holding the write lock.
const BUSY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

fn timestamp(at: DateTime<Utc>) -> String {
    // Fixed width so SQL string comparison orders by time.
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e)))
}

impl JobStore {
    /// Open the job store at `path`, creating the schema if needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open `jobs.db` in the data directory.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_default() -> Result<Self> {
        Self::open(&data_dir()?.join("jobs.db"))
    }

    /// Open an in-memory store.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.migrate()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CoreError::Database(DatabaseError::Locked))
    }

    fn migrate(&self) -> Result<()> {
        self.conn()?.execute_batch(
            "CREATE TABLE IF NOT EXISTS alert_jobs (
                id         TEXT PRIMARY KEY,
                tag        TEXT NOT NULL,
                payload    TEXT NOT NULL,
                due_at     TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_alert_jobs_tag ON alert_jobs(tag);
            CREATE INDEX IF NOT EXISTS idx_alert_jobs_due_at ON alert_jobs(due_at);",
        )?;
        Ok(())
    }

    fn insert(&self, request: &JobRequest, now: DateTime<Utc>) -> Result<JobId> {
        insert_job(&*self.conn()?, request, now)
    }

    /// Cancel `tags` and insert `requests` in one immediate transaction,
    /// with `now` as the base of every delay.
    fn replace_at(
        &self,
        tags: &[&str],
        requests: Vec<JobRequest>,
        now: DateTime<Utc>,
    ) -> Result<Replacement> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut cancelled = 0;
        for tag in tags {
            cancelled += tx.execute("DELETE FROM alert_jobs WHERE tag = ?1", params![tag])?;
        }
        let submissions = requests
            .iter()
            .map(|request| insert_job(&tx, request, now))
            .collect();

        tx.commit()?;
        Ok(Replacement {
            cancelled,
            submissions,
        })
    }

    /// Every pending job, soonest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn pending(&self) -> Result<Vec<StoredJob>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, tag, payload, due_at, created_at FROM alert_jobs ORDER BY due_at, id",
        )?;
        let rows = stmt.query_map([], row_to_job)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// Remove and return every job due at or before `now`, soonest first.
    ///
    /// # Errors
    /// Returns an error if the transaction fails; nothing is removed then.
    pub fn take_due(&self, now: DateTime<Utc>) -> Result<Vec<StoredJob>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let due = {
            let mut stmt = tx.prepare(
                "SELECT id, tag, payload, due_at, created_at FROM alert_jobs
                 WHERE due_at <= ?1 ORDER BY due_at, id",
            )?;
            let rows = stmt.query_map(params![timestamp(now)], row_to_job)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        for job in &due {
            tx.execute("DELETE FROM alert_jobs WHERE id = ?1", params![job.id])?;
        }
        tx.commit()?;
        Ok(due)
    }
}

fn insert_job(conn: &Connection, request: &JobRequest, now: DateTime<Utc>) -> Result<JobId> {
    let id = uuid::Uuid::new_v4().to_string();
    let delay = i64::try_from(request.delay_ms)
        .ok()
        .and_then(Duration::try_milliseconds)
        .unwrap_or(Duration::MAX);
    let due_at = now.checked_add_signed(delay).unwrap_or(DateTime::<Utc>::MAX_UTC);
    let payload = serde_json::to_string(&request.payload)?;
    conn.execute(
        "INSERT INTO alert_jobs (id, tag, payload, due_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, request.tag, payload, timestamp(due_at), timestamp(now)],
    )?;
    Ok(id)
}

fn row_to_job(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredJob> {
    let payload: String = row.get(2)?;
    let payload: PayloadMap = serde_json::from_str(&payload).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let due_at: String = row.get(3)?;
    let created_at: String = row.get(4)?;
    Ok(StoredJob {
        id: row.get(0)?,
        tag: row.get(1)?,
        payload,
        due_at: parse_timestamp(&due_at)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

impl ExecutionSubstrate for JobStore {
    fn submit(&self, request: JobRequest) -> Result<JobId> {
        self.insert(&request, Utc::now())
    }

    fn cancel_by_tag(&self, tag: &str) -> Result<usize> {
        let n = self
            .conn()?
            .execute("DELETE FROM alert_jobs WHERE tag = ?1", params![tag])?;
        Ok(n)
    }

    fn replace(&self, tags: &[&str], requests: Vec<JobRequest>) -> Result<Replacement> {
        self.replace_at(tags, requests, Utc::now())
    }
}
