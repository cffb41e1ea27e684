//! The task queue: a strict FIFO of units of work awaiting dispatch.

use std::collections::VecDeque;
use std::sync::Mutex;

use agent_primitives::{AgentId, TaskId};
use serde_json::Value;

/// A unit of work submitted for dispatch to a specific agent.
///
/// Immutable from the caller's perspective once submitted. `priority` is
/// accepted and stored but never consulted by the scheduler (see the design
/// notes on reserved fields); the queue is always strict FIFO.
#[derive(Clone, Debug)]
pub struct Task {
    /// Unique identifier, generated if the caller does not supply one.
    pub task_id: TaskId,
    /// The agent this task is dispatched to.
    pub agent_id: AgentId,
    /// Structured, agent-specific input.
    pub payload: Value,
    /// Reserved; current semantics: FIFO regardless of this value.
    pub priority: i64,
}

impl Task {
    /// Builds a task with a freshly generated id and default priority.
    #[must_use]
    pub fn new(agent_id: AgentId, payload: Value) -> Self {
        Self {
            task_id: TaskId::random(),
            agent_id,
            payload,
            priority: 0,
        }
    }

    /// Builds a task with an explicit id, for callers that need stable ids
    /// across retries.
    #[must_use]
    pub fn with_id(task_id: TaskId, agent_id: AgentId, payload: Value) -> Self {
        Self {
            task_id,
            agent_id,
            payload,
            priority: 0,
        }
    }
}

/// A single-consumer FIFO of [`Task`]s awaiting dispatch.
///
/// The reference scheduling model is single-threaded and cooperative (tasks
/// are dequeued one at a time by explicit `tick` calls), so the mutex here
/// exists only to satisfy `Send + Sync` for the kernel that owns it; it is
/// never contended in practice.
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: Mutex<VecDeque<Task>>,
}

impl TaskQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `task` to the tail of the queue. Never fails.
    pub fn submit(&self, task: Task) -> TaskId {
        let task_id = task.task_id;
        self.tasks.lock().expect("task queue mutex poisoned").push_back(task);
        task_id
    }

    /// Removes and returns the task at the head of the queue, if any.
    pub fn next(&self) -> Option<Task> {
        self.tasks.lock().expect("task queue mutex poisoned").pop_front()
    }

    /// Returns the number of tasks currently queued.
    #[must_use]
    pub fn size(&self) -> usize {
        self.tasks.lock().expect("task queue mutex poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> Value {
        serde_json::json!({"k": "v"})
    }

    #[test]
    fn fifo_order_is_preserved() {
        let queue = TaskQueue::new();
        let agent = AgentId::random();
        let first = queue.submit(Task::new(agent, payload()));
        let second = queue.submit(Task::new(agent, payload()));

        assert_eq!(queue.next().unwrap().task_id, first);
        assert_eq!(queue.next().unwrap().task_id, second);
        assert!(queue.next().is_none());
    }

    #[test]
    fn size_reflects_queued_count() {
        let queue = TaskQueue::new();
        let agent = AgentId::random();
        assert_eq!(queue.size(), 0);
        queue.submit(Task::new(agent, payload()));
        queue.submit(Task::new(agent, payload()));
        assert_eq!(queue.size(), 2);
        queue.next();
        assert_eq!(queue.size(), 1);
    }

    #[test]
    fn priority_is_stored_but_does_not_reorder() {
        let queue = TaskQueue::new();
        let agent = AgentId::random();
        let mut low = Task::new(agent, payload());
        low.priority = 0;
        let mut high = Task::new(agent, payload());
        high.priority = 100;

        let low_id = queue.submit(low);
        let high_id = queue.submit(high);

        assert_eq!(queue.next().unwrap().task_id, low_id);
        assert_eq!(queue.next().unwrap().task_id, high_id);
    }
}
