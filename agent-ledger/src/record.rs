//! Row shapes stored in and returned from the ledger.

use agent_primitives::{AgentId, TaskId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle status of a task as recorded in the ledger.
///
/// Ordering is total: `Started` precedes `Completed`/`Failed`; an upsert on
/// an existing `started` row moves it forward, never backward.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// The task was dispatched to an agent but has not yet produced an outcome.
    Started,
    /// The task's agent returned a result.
    Completed,
    /// The task's agent raised or the kernel failed to dispatch it.
    Failed,
}

impl TaskStatus {
    /// Returns the row's canonical string form, as stored in SQLite.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parses a status string read back from storage.
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "started" => Some(Self::Started),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A single row of the task ledger: the latest known state of one task.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Identifier of the task this row describes.
    pub task_id: TaskId,
    /// Identifier of the agent the task was dispatched to.
    pub agent_id: AgentId,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// The task's input payload, as submitted.
    pub input_payload: Value,
    /// The agent's result, once completed. `None` before completion.
    pub output_result: Option<Value>,
    /// The failure message, once failed. `None` otherwise.
    pub error_message: Option<String>,
    /// ISO-8601 timestamp of the most recent write to this row.
    pub timestamp: String,
}

/// Aggregate counters returned by [`crate::Ledger::get_statistics`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LedgerStatistics {
    /// Total rows in the ledger.
    pub total: u64,
    /// Rows currently in the `started` state.
    pub started: u64,
    /// Rows in the `completed` state.
    pub completed: u64,
    /// Rows in the `failed` state.
    pub failed: u64,
    /// Distinct agent ids that have appeared in the ledger.
    pub distinct_agents: Vec<AgentId>,
}
