//! Run history persistence (SQLite)
//!
//! Records one row in `runs` per detection call plus its flagged points in
//! `anomalies`. The detection pipeline never depends on a save succeeding;
//! callers treat a storage failure as a degraded (unrecorded) result.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};
use serde::Serialize;

use crate::detector::AnomalyRecord;
use crate::error::Result;

/// Persisted summary of one detection call
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub id: i64,
    pub created_at: String,
    pub total_points: usize,
    pub anomalies_found: usize,
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at TEXT NOT NULL,
                total_points INTEGER NOT NULL,
                anomalies_found INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS anomalies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id INTEGER NOT NULL,
                ts TEXT NOT NULL,
                score REAL NOT NULL,
                fields TEXT NOT NULL,
                note TEXT NOT NULL,
                FOREIGN KEY (run_id) REFERENCES runs(id)
            );

            CREATE INDEX IF NOT EXISTS idx_anomalies_run
                ON anomalies(run_id);
            "#,
        )?;
        Ok(())
    }

    /// Persist a run and its anomaly records, returning the assigned run id.
    ///
    /// `fields` is stored comma-delimited; field names never contain commas.
    pub fn record_run(&self, total_points: usize, anomalies: &[AnomalyRecord]) -> Result<i64> {
        let mut conn = self.conn.lock().expect("database mutex poisoned");
        let tx = conn.transaction()?;

        let created_at = chrono::Utc::now().to_rfc3339();
        tx.execute(
            "INSERT INTO runs (created_at, total_points, anomalies_found) VALUES (?1, ?2, ?3)",
            params![created_at, total_points as i64, anomalies.len() as i64],
        )?;
        let run_id = tx.last_insert_rowid();

        for record in anomalies {
            tx.execute(
                "INSERT INTO anomalies (run_id, ts, score, fields, note) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    run_id,
                    record.ts,
                    record.score,
                    record.fields.join(","),
                    record.note
                ],
            )?;
        }

        tx.commit()?;
        Ok(run_id)
    }

    /// Most recent run summaries, newest first
    pub fn list_runs(&self, limit: usize) -> Result<Vec<RunSummary>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, created_at, total_points, anomalies_found
             FROM runs ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(RunSummary {
                id: row.get(0)?,
                created_at: row.get(1)?,
                total_points: row.get::<_, i64>(2)? as usize,
                anomalies_found: row.get::<_, i64>(3)? as usize,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn run_exists(&self, run_id: i64) -> Result<bool> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM runs WHERE id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// All records for a run, score descending, with the fields list
    /// reconstructed in its stored order
    pub fn anomalies_for_run(&self, run_id: i64) -> Result<Vec<AnomalyRecord>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT ts, score, fields, note
             FROM anomalies WHERE run_id = ?1 ORDER BY score DESC",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            let fields: String = row.get(2)?;
            Ok(AnomalyRecord {
                ts: row.get(0)?,
                score: row.get(1)?,
                fields: fields.split(',').map(str::to_string).collect(),
                note: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}
