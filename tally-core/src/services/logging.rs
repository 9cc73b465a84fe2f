//! Event logging - structured, privacy-safe event log in its own DuckDB file
//!
//! Stores command and pipeline events in `logs.duckdb`, separate from user
//! data. No user data (amounts, descriptions, merchants, account names) is
//! ever logged: events carry only names, stages, counts, and durations.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use duckdb::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

/// Counter for generating unique IDs within the same millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique ID based on timestamp + counter
fn generate_id() -> u64 {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64;

    // Lower 48 bits of timestamp, upper 16 bits of counter: 65536 unique
    // ids per millisecond.
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    (timestamp << 16) | counter
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

/// Detect the current platform
fn detect_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else {
        "unknown"
    }
}

/// One event to record.
#[derive(Debug, Clone)]
pub struct LogEvent {
    /// Event class: "command" or "ingest".
    pub kind: &'static str,
    /// Command or modality name.
    pub name: String,
    /// Pipeline stage a failed submission died in.
    pub stage: Option<&'static str>,
    pub outcome: &'static str,
    pub created: i64,
    pub duplicates: i64,
    pub failed: i64,
    pub duration_ms: i64,
}

impl LogEvent {
    pub fn command(name: impl Into<String>) -> Self {
        Self {
            kind: "command",
            name: name.into(),
            stage: None,
            outcome: "ok",
            created: 0,
            duplicates: 0,
            failed: 0,
            duration_ms: 0,
        }
    }

    pub fn ingest(name: impl Into<String>) -> Self {
        Self {
            kind: "ingest",
            ..Self::command(name)
        }
    }
}

/// A stored event row, for inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub event_id: u64,
    pub ts_ms: i64,
    pub platform: String,
    pub version: String,
    pub kind: String,
    pub name: String,
    pub stage: Option<String>,
    pub outcome: String,
    pub created: i64,
    pub duplicates: i64,
    pub failed: i64,
    pub duration_ms: i64,
}

/// Privacy-safe event logger backed by its own DuckDB file.
pub struct EventLogger {
    conn: Mutex<Connection>,
    version: String,
}

impl EventLogger {
    /// Open (or create) `logs.duckdb` in the given directory.
    pub fn new(dir: &Path, version: &str) -> Result<Self> {
        let conn = Connection::open(dir.join("logs.duckdb"))
            .map_err(|e| Error::persistence(format!("failed to open log database: {e}")))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS events (
                event_id UBIGINT PRIMARY KEY,
                ts_ms BIGINT NOT NULL,
                platform TEXT NOT NULL,
                version TEXT NOT NULL,
                kind TEXT NOT NULL,
                name TEXT NOT NULL,
                stage TEXT,
                outcome TEXT NOT NULL,
                created BIGINT NOT NULL,
                duplicates BIGINT NOT NULL,
                failed BIGINT NOT NULL,
                duration_ms BIGINT NOT NULL
            )",
        )
        .map_err(|e| Error::persistence(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
            version: version.to_string(),
        })
    }

    /// Record one event.
    pub fn log(&self, event: LogEvent) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO events (event_id, ts_ms, platform, version, kind, name, stage, \
             outcome, created, duplicates, failed, duration_ms) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                generate_id(),
                now_ms(),
                detect_platform(),
                self.version,
                event.kind,
                event.name,
                event.stage,
                event.outcome,
                event.created,
                event.duplicates,
                event.failed,
                event.duration_ms,
            ],
        )
        .map_err(|e| Error::persistence(e.to_string()))?;
        Ok(())
    }

    /// Most recent events, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT event_id, ts_ms, platform, version, kind, name, stage, outcome, \
                 created, duplicates, failed, duration_ms \
                 FROM events ORDER BY ts_ms DESC, event_id DESC LIMIT ?",
            )
            .map_err(|e| Error::persistence(e.to_string()))?;
        let rows = stmt
            .query_map([limit as i64], |row| {
                Ok(LogEntry {
                    event_id: row.get(0).unwrap_or_default(),
                    ts_ms: row.get(1).unwrap_or_default(),
                    platform: row.get(2).unwrap_or_default(),
                    version: row.get(3).unwrap_or_default(),
                    kind: row.get(4).unwrap_or_default(),
                    name: row.get(5).unwrap_or_default(),
                    stage: row.get::<_, Option<String>>(6).ok().flatten(),
                    outcome: row.get(7).unwrap_or_default(),
                    created: row.get(8).unwrap_or_default(),
                    duplicates: row.get(9).unwrap_or_default(),
                    failed: row.get(10).unwrap_or_default(),
                    duration_ms: row.get(11).unwrap_or_default(),
                })
            })
            .map_err(|e| Error::persistence(e.to_string()))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(|e| Error::persistence(e.to_string()))?);
        }
        Ok(out)
    }

    /// Delete all stored events.
    pub fn clear(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn
            .execute("DELETE FROM events", [])
            .map_err(|e| Error::persistence(e.to_string()))?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_and_recent() {
        let dir = tempfile::tempdir().unwrap();
        let logger = EventLogger::new(dir.path(), "0.1.0").unwrap();

        let mut event = LogEvent::ingest("sms");
        event.created = 1;
        event.duration_ms = 42;
        logger.log(event).unwrap();

        let mut failed = LogEvent::ingest("receipt");
        failed.outcome = "error";
        failed.stage = Some("extracting");
        logger.log(failed).unwrap();

        let entries = logger.recent(10).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.name == "sms" && e.created == 1));
        assert!(entries
            .iter()
            .any(|e| e.name == "receipt" && e.stage.as_deref() == Some("extracting")));

        assert_eq!(logger.clear().unwrap(), 2);
        assert!(logger.recent(10).unwrap().is_empty());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
    }
}
