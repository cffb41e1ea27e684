//! SQLite-backed durable ledger with an in-memory fallback mode.

use std::path::Path;
use std::sync::Mutex;

use agent_primitives::{AgentId, TaskId};
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use tracing::warn;

use crate::error::LedgerResult;
use crate::record::{LedgerStatistics, TaskRecord, TaskStatus};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS task_history (
    task_id    TEXT PRIMARY KEY,
    agent_id   TEXT NOT NULL,
    status     TEXT NOT NULL,
    input_payload  TEXT NOT NULL,
    output_result  TEXT,
    error_message  TEXT,
    timestamp  TEXT NOT NULL
);
";

/// Durable record of every task's lifecycle, backed by SQLite.
///
/// If the configured file path cannot be opened (missing directory,
/// permission denied, locked file), construction falls back to an
/// in-memory database rather than failing the kernel boot. This is the
/// "Phoenix" recovery mode: the contract keeps holding, but rows do not
/// survive process exit.
pub struct Ledger {
    conn: Mutex<Connection>,
    in_memory: bool,
}

impl Ledger {
    /// Opens (or creates) the ledger database at `path`.
    ///
    /// Falls back to an in-memory database and logs a warning if `path`
    /// cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref();
        match Connection::open(path) {
            Ok(conn) => {
                conn.execute_batch(SCHEMA)?;
                Ok(Self {
                    conn: Mutex::new(conn),
                    in_memory: false,
                })
            }
            Err(source) => {
                warn!(
                    path = %path.display(),
                    error = %source,
                    "ledger storage unavailable, falling back to in-memory mode"
                );
                Self::in_memory()
            }
        }
    }

    /// Opens a purely in-memory ledger. Used directly by tests and by the
    /// Phoenix fallback path.
    pub fn in_memory() -> LedgerResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            in_memory: true,
        })
    }

    /// Returns whether this ledger is running in Phoenix (in-memory) mode.
    #[must_use]
    pub const fn is_in_memory(&self) -> bool {
        self.in_memory
    }

    /// Records that `task_id` has started executing on `agent_id` with `payload`.
    ///
    /// Upserts: calling this more than once for the same task id simply
    /// rewrites the row.
    pub fn record_start(&self, task_id: TaskId, agent_id: AgentId, payload: &Value) {
        let timestamp = now();
        let payload_text = payload.to_string();
        if let Err(error) = self.upsert(
            task_id,
            agent_id,
            TaskStatus::Started,
            &payload_text,
            None,
            None,
            &timestamp,
        ) {
            warn!(%task_id, %error, "failed to record task start");
        }
    }

    /// Records that `task_id` completed with `result`.
    ///
    /// If `result` cannot be serialized through the canonical JSON form,
    /// its debug string form is recorded instead. Never propagates an error
    /// to the caller.
    pub fn record_completion(&self, task_id: TaskId, agent_id: AgentId, result: &Value) {
        let timestamp = now();
        let existing_payload = self
            .get_task(task_id)
            .map(|record| record.input_payload.to_string())
            .unwrap_or_else(|| "null".to_string());
        if let Err(error) = self.upsert(
            task_id,
            agent_id,
            TaskStatus::Completed,
            &existing_payload,
            Some(&result.to_string()),
            None,
            &timestamp,
        ) {
            warn!(%task_id, %error, "failed to record task completion");
        }
    }

    /// Records that `task_id` failed with `error_text`.
    pub fn record_failure(&self, task_id: TaskId, agent_id: AgentId, error_text: &str) {
        let timestamp = now();
        let existing_payload = self
            .get_task(task_id)
            .map(|record| record.input_payload.to_string())
            .unwrap_or_else(|| "null".to_string());
        if let Err(error) = self.upsert(
            task_id,
            agent_id,
            TaskStatus::Failed,
            &existing_payload,
            None,
            Some(error_text),
            &timestamp,
        ) {
            warn!(%task_id, %error, "failed to record task failure");
        }
    }

    /// Returns the most recent record for `task_id`, if any.
    #[must_use]
    pub fn get_task(&self, task_id: TaskId) -> Option<TaskRecord> {
        let conn = self.conn.lock().expect("ledger mutex poisoned");
        conn.query_row(
            "SELECT task_id, agent_id, status, input_payload, output_result, error_message, timestamp \
             FROM task_history WHERE task_id = ?1",
            params![task_id.to_string()],
            row_to_record,
        )
        .optional()
        .ok()
        .flatten()
    }

    /// Returns the most recent `limit` records, optionally filtered by
    /// `status` and/or `agent_id`, newest first.
    #[must_use]
    pub fn get_history(
        &self,
        limit: u32,
        status: Option<TaskStatus>,
        agent_id: Option<AgentId>,
    ) -> Vec<TaskRecord> {
        let conn = self.conn.lock().expect("ledger mutex poisoned");

        // Building dynamic parameter lists with rusqlite's positional params is
        // awkward; it is simpler to special-case the four filter combinations.
        let rows: rusqlite::Result<Vec<TaskRecord>> = match (status, agent_id) {
            (None, None) => conn
                .prepare(
                    "SELECT task_id, agent_id, status, input_payload, output_result, error_message, timestamp \
                     FROM task_history ORDER BY timestamp DESC LIMIT ?1",
                )
                .and_then(|mut stmt| {
                    stmt.query_map(params![limit], row_to_record)?
                        .collect()
                }),
            (Some(status), None) => conn
                .prepare(
                    "SELECT task_id, agent_id, status, input_payload, output_result, error_message, timestamp \
                     FROM task_history WHERE status = ?1 ORDER BY timestamp DESC LIMIT ?2",
                )
                .and_then(|mut stmt| {
                    stmt.query_map(params![status.as_str(), limit], row_to_record)?
                        .collect()
                }),
            (None, Some(agent_id)) => conn
                .prepare(
                    "SELECT task_id, agent_id, status, input_payload, output_result, error_message, timestamp \
                     FROM task_history WHERE agent_id = ?1 ORDER BY timestamp DESC LIMIT ?2",
                )
                .and_then(|mut stmt| {
                    stmt.query_map(
                        params![agent_id.to_string(), limit],
                        row_to_record,
                    )?
                    .collect()
                }),
            (Some(status), Some(agent_id)) => conn
                .prepare(
                    "SELECT task_id, agent_id, status, input_payload, output_result, error_message, timestamp \
                     FROM task_history WHERE status = ?1 AND agent_id = ?2 \
                     ORDER BY timestamp DESC LIMIT ?3",
                )
                .and_then(|mut stmt| {
                    stmt.query_map(
                        params![status.as_str(), agent_id.to_string(), limit],
                        row_to_record,
                    )?
                    .collect()
                }),
        };

        rows.unwrap_or_default()
    }

    /// Returns aggregate counts by status and the set of distinct agent ids.
    #[must_use]
    pub fn get_statistics(&self) -> LedgerStatistics {
        let conn = self.conn.lock().expect("ledger mutex poisoned");
        let mut stats = LedgerStatistics::default();

        let counts: Vec<(String, i64)> = conn
            .prepare("SELECT status, COUNT(*) FROM task_history GROUP BY status")
            .and_then(|mut stmt| {
                stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
                    .collect()
            })
            .unwrap_or_default();

        for (status, count) in counts {
            let count = count.max(0) as u64;
            stats.total += count;
            match TaskStatus::from_str(&status) {
                Some(TaskStatus::Started) => stats.started = count,
                Some(TaskStatus::Completed) => stats.completed = count,
                Some(TaskStatus::Failed) => stats.failed = count,
                None => {}
            }
        }

        stats.distinct_agents = conn
            .prepare("SELECT DISTINCT agent_id FROM task_history")
            .and_then(|mut stmt| {
                stmt.query_map([], |row| row.get::<_, String>(0))?
                    .filter_map(|value| value.ok())
                    .map(|text| text.parse::<AgentId>().map_err(|_| rusqlite::Error::InvalidQuery))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })
            .unwrap_or_default();

        stats
    }

    #[allow(clippy::too_many_arguments)]
    fn upsert(
        &self,
        task_id: TaskId,
        agent_id: AgentId,
        status: TaskStatus,
        payload: &str,
        result: Option<&str>,
        error: Option<&str>,
        timestamp: &str,
    ) -> LedgerResult<()> {
        let conn = self.conn.lock().expect("ledger mutex poisoned");
        conn.execute(
            "INSERT INTO task_history (task_id, agent_id, status, input_payload, output_result, error_message, timestamp) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
             ON CONFLICT(task_id) DO UPDATE SET \
                agent_id = excluded.agent_id, \
                status = excluded.status, \
                input_payload = excluded.input_payload, \
                output_result = COALESCE(excluded.output_result, task_history.output_result), \
                error_message = COALESCE(excluded.error_message, task_history.error_message), \
                timestamp = excluded.timestamp",
            params![
                task_id.to_string(),
                agent_id.to_string(),
                status.as_str(),
                payload,
                result,
                error,
                timestamp,
            ],
        )?;
        Ok(())
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<TaskRecord> {
    let task_id: String = row.get(0)?;
    let agent_id: String = row.get(1)?;
    let status: String = row.get(2)?;
    let payload: String = row.get(3)?;
    let result: Option<String> = row.get(4)?;
    let error: Option<String> = row.get(5)?;
    let timestamp: String = row.get(6)?;

    Ok(TaskRecord {
        task_id: task_id.parse().map_err(|_| rusqlite::Error::InvalidQuery)?,
        agent_id: agent_id.parse().map_err(|_| rusqlite::Error::InvalidQuery)?,
        status: TaskStatus::from_str(&status).ok_or(rusqlite::Error::InvalidQuery)?,
        input_payload: serde_json::from_str(&payload).unwrap_or(Value::Null),
        output_result: result.and_then(|text| serde_json::from_str(&text).ok()),
        error_message: error,
        timestamp,
    })
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_full_lifecycle() {
        let ledger = Ledger::in_memory().unwrap();
        let task_id = TaskId::random();
        let agent_id = AgentId::random();

        ledger.record_start(task_id, agent_id, &json!({"input": "hi"}));
        let record = ledger.get_task(task_id).unwrap();
        assert_eq!(record.status, TaskStatus::Started);

        ledger.record_completion(task_id, agent_id, &json!({"output": "done"}));
        let record = ledger.get_task(task_id).unwrap();
        assert_eq!(record.status, TaskStatus::Completed);
        assert_eq!(record.output_result, Some(json!({"output": "done"})));
        assert_eq!(record.input_payload, json!({"input": "hi"}));
    }

    #[test]
    fn record_start_upserts() {
        let ledger = Ledger::in_memory().unwrap();
        let task_id = TaskId::random();
        let agent_id = AgentId::random();

        ledger.record_start(task_id, agent_id, &json!({"a": 1}));
        ledger.record_start(task_id, agent_id, &json!({"a": 2}));

        let history = ledger.get_history(10, None, None);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].input_payload, json!({"a": 2}));
    }

    #[test]
    fn missing_task_returns_none() {
        let ledger = Ledger::in_memory().unwrap();
        assert!(ledger.get_task(TaskId::random()).is_none());
    }

    #[test]
    fn statistics_count_by_status() {
        let ledger = Ledger::in_memory().unwrap();
        let agent_id = AgentId::random();

        let ok_task = TaskId::random();
        ledger.record_start(ok_task, agent_id, &json!({}));
        ledger.record_completion(ok_task, agent_id, &json!({}));

        let failed_task = TaskId::random();
        ledger.record_start(failed_task, agent_id, &json!({}));
        ledger.record_failure(failed_task, agent_id, "boom");

        let stats = ledger.get_statistics();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.distinct_agents.len(), 1);
    }

    #[test]
    fn get_history_filters_by_status_and_agent() {
        let ledger = Ledger::in_memory().unwrap();
        let agent_a = AgentId::random();
        let agent_b = AgentId::random();

        let t1 = TaskId::random();
        ledger.record_start(t1, agent_a, &json!({}));
        ledger.record_completion(t1, agent_a, &json!({}));

        let t2 = TaskId::random();
        ledger.record_start(t2, agent_b, &json!({}));

        let completed = ledger.get_history(10, Some(TaskStatus::Completed), None);
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].task_id, t1);

        let for_b = ledger.get_history(10, None, Some(agent_b));
        assert_eq!(for_b.len(), 1);
        assert_eq!(for_b[0].task_id, t2);
    }

    #[test]
    fn opens_in_memory_when_path_unusable() {
        // A directory cannot be opened as a SQLite file; this exercises the
        // Phoenix fallback path without needing write-permission tricks.
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::open(dir.path()).unwrap();
        assert!(ledger.is_in_memory());
    }
}
