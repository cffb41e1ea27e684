//! The kernel: owns the task queue, the agent and tool registries, and the
//! ledger, and exposes the cooperative `boot`/`submit`/`tick`/`shutdown` loop.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock, Weak};

use agent_ledger::{Ledger, TaskRecord};
use agent_policy::PolicyEngine;
use agent_primitives::{AgentId, AgentManifest, TaskId};
use agent_tools::{ListDirectoryTool, ReadFileTool, SearchFileTool, ToolCall, ToolRegistry, WriteFileTool};
use tracing::{info, warn};

use crate::agent::Agent;
use crate::error::KernelError;
use crate::registry::AgentRegistry;
use crate::task::{Task, TaskQueue};
use crate::tools::{DelegateTaskTool, InspectResultTool};

/// A single file loaded from the convention-based inbox directory at boot.
#[derive(Clone, Debug)]
pub struct InboxMessage {
    /// File name (without directory component).
    pub filename: String,
    /// Raw markdown content.
    pub content: String,
}

/// Lifecycle state of the kernel's cooperative scheduling loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KernelState {
    /// No tick or submit processing occurs; queued tasks are retained.
    Stopped,
    /// `tick` dequeues and dispatches; `submit` enforces the active-manifest check.
    Running,
}

/// Owns every other component and exposes the kernel's public operations.
pub struct Kernel {
    tasks: TaskQueue,
    agents: AgentRegistry,
    ledger: Ledger,
    tools: ToolRegistry,
    delegate_tool: Arc<DelegateTaskTool>,
    inspect_tool: Arc<InspectResultTool>,
    state: Mutex<KernelState>,
    workspace_root: PathBuf,
    inbox: RwLock<Vec<InboxMessage>>,
    backlog: RwLock<Vec<String>>,
    git_status: RwLock<Option<String>>,
    self_ref: RwLock<Weak<Kernel>>,
}

impl Kernel {
    /// Builds a kernel in the `Stopped` state, with the bundled filesystem
    /// tools and the kernel-aware `delegate_task`/`inspect_result` tools
    /// registered (the latter two unbound until [`Kernel::boot`] runs).
    #[must_use]
    pub fn new(ledger: Ledger, policy: Option<Arc<PolicyEngine>>, workspace_root: PathBuf) -> Arc<Self> {
        let tools = policy.map_or_else(ToolRegistry::new, ToolRegistry::with_policy);
        let _ = tools.register(Arc::new(ReadFileTool));
        let _ = tools.register(Arc::new(WriteFileTool));
        let _ = tools.register(Arc::new(ListDirectoryTool::new(workspace_root.clone())));
        let _ = tools.register(Arc::new(SearchFileTool::new(workspace_root.clone())));

        let delegate_tool = Arc::new(DelegateTaskTool::new());
        let inspect_tool = Arc::new(InspectResultTool::new());
        let _ = tools.register(delegate_tool.clone());
        let _ = tools.register(inspect_tool.clone());

        let kernel = Arc::new(Self {
            tasks: TaskQueue::new(),
            agents: AgentRegistry::new(),
            ledger,
            tools,
            delegate_tool,
            inspect_tool,
            state: Mutex::new(KernelState::Stopped),
            workspace_root,
            inbox: RwLock::new(Vec::new()),
            backlog: RwLock::new(Vec::new()),
            git_status: RwLock::new(None),
            self_ref: RwLock::new(Weak::new()),
        });
        *kernel.self_ref.write().expect("self_ref lock poisoned") = Arc::downgrade(&kernel);
        kernel
    }

    /// Registers `agent`. May be called before or after `boot`; manifests are
    /// only (re)generated on the next `boot`.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::DuplicateAgent`] on a repeated id.
    pub fn register_agent(&self, agent: Arc<dyn Agent>) -> Result<(), KernelError> {
        self.agents.register_agent(agent)
    }

    /// The tool registry backing this kernel, for direct tool invocation
    /// outside the agent-dispatch path (e.g. a REPL driver).
    #[must_use]
    pub const fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Transitions `Stopped -> Running`.
    ///
    /// Generates manifests for every registered agent, binds the kernel
    /// reference into the `delegate_task`/`inspect_result` tools, and scans
    /// the optional inbox/backlog/git-status side channels rooted at the
    /// configured workspace root. Calling `boot` again while already running
    /// is allowed and regenerates manifests.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::ManifestGeneration`] only if an agent's name or
    /// version is empty, which should not happen for conforming agents.
    pub fn boot(&self) -> Result<(), KernelError> {
        self.agents.boot()?;

        let weak_self = self.self_ref.read().expect("self_ref lock poisoned").clone();
        self.delegate_tool.bind_kernel(weak_self.clone());
        self.inspect_tool.bind_kernel(weak_self);

        self.scan_inbox();
        self.parse_backlog();
        self.read_git_status();

        *self.state.lock().expect("kernel state lock poisoned") = KernelState::Running;
        info!(workspace_root = %self.workspace_root.display(), "kernel booted");
        Ok(())
    }

    /// Transitions `Running -> Stopped`. Queued tasks are retained; a
    /// subsequent `boot` resumes processing where it left off.
    pub fn shutdown(&self) {
        *self.state.lock().expect("kernel state lock poisoned") = KernelState::Stopped;
        info!("kernel shut down");
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> KernelState {
        *self.state.lock().expect("kernel state lock poisoned")
    }

    /// Validates `task.agent_id` and enqueues it.
    ///
    /// # Errors
    ///
    /// - [`KernelError::AgentNotRegistered`] if the target agent was never
    ///   registered.
    /// - [`KernelError::AgentNotActive`] if the kernel is running and the
    ///   agent's manifest status is not `"active"`.
    pub fn submit(&self, task: Task) -> Result<TaskId, KernelError> {
        self.validate_delegation_target(task.agent_id)?;
        Ok(self.tasks.submit(task))
    }

    /// The validation shared by `submit` and the `delegate_task` tool:
    /// agent must be registered, and — once the kernel has booted — its
    /// manifest must report `status == "active"`.
    fn validate_delegation_target(&self, agent_id: AgentId) -> Result<(), KernelError> {
        if !self.agents.contains(agent_id) {
            return Err(KernelError::AgentNotRegistered {
                agent_id,
                known: self.agents.known_agent_ids(),
            });
        }
        if self.state() == KernelState::Running {
            let is_active = self
                .agents
                .manifest(agent_id)
                .is_some_and(|manifest| manifest.status() == "active");
            if !is_active {
                return Err(KernelError::AgentNotActive { agent_id });
            }
        }
        Ok(())
    }

    /// Advances the loop by one step.
    ///
    /// Returns `Ok(false)` without dequeuing when the kernel is not running
    /// or the queue is empty. Otherwise dequeues one task, records its start,
    /// dispatches it to the target agent, and records the terminal outcome
    /// before returning `Ok(true)` or re-raising the agent's error.
    ///
    /// # Errors
    ///
    /// Re-raises [`KernelError::AgentNotRegistered`] or
    /// [`KernelError::AgentProcessingFailed`] after the ledger failure record
    /// has already been written.
    pub async fn tick(&self) -> Result<bool, KernelError> {
        if self.state() != KernelState::Running {
            warn!("tick called while kernel is not running");
            return Ok(false);
        }
        let Some(task) = self.tasks.next() else {
            return Ok(false);
        };

        self.ledger.record_start(task.task_id, task.agent_id, &task.payload);

        let Some(agent) = self.agents.lookup(task.agent_id) else {
            let message = format!("agent {} not found at dispatch time", task.agent_id);
            self.ledger.record_failure(task.task_id, task.agent_id, &message);
            return Err(KernelError::AgentNotRegistered {
                agent_id: task.agent_id,
                known: self.agents.known_agent_ids(),
            });
        };

        match agent.process(&task).await {
            Ok(response) => {
                let output = if let Some(tool_call) = response.tool_call {
                    let call = ToolCall::new(tool_call.tool, tool_call.parameters);
                    let tool_result = self.tools.execute(call).await;
                    serde_json::to_value(tool_result).unwrap_or(serde_json::Value::Null)
                } else {
                    response.output
                };
                self.ledger.record_completion(task.task_id, task.agent_id, &output);
                Ok(true)
            }
            Err(agent_error) => {
                self.ledger
                    .record_failure(task.task_id, task.agent_id, &agent_error.message);
                Err(KernelError::AgentProcessingFailed {
                    agent_id: task.agent_id,
                    task_id: task.task_id,
                    message: agent_error.message,
                })
            }
        }
    }

    /// Returns the full ledger record for `task_id`, if any.
    #[must_use]
    pub fn get_task_result(&self, task_id: TaskId) -> Option<TaskRecord> {
        self.ledger.get_task(task_id)
    }

    /// Returns only `output_result` for `task_id`, if the task has a record.
    #[must_use]
    pub fn get_task_output(&self, task_id: TaskId) -> Option<serde_json::Value> {
        self.ledger.get_task(task_id).and_then(|record| record.output_result)
    }

    /// Returns the manifest generated for `agent_id` at the last boot, if any.
    #[must_use]
    pub fn get_agent_manifest(&self, agent_id: AgentId) -> Option<AgentManifest> {
        self.agents.manifest(agent_id)
    }

    /// Returns the manifests of every agent declaring `capability`.
    #[must_use]
    pub fn find_agents_by_capability(&self, capability: &str) -> Vec<AgentManifest> {
        self.agents.find_by_capability(capability)
    }

    /// Number of tasks currently queued.
    #[must_use]
    pub fn queue_size(&self) -> usize {
        self.tasks.size()
    }

    /// Inbox messages loaded at the last boot.
    #[must_use]
    pub fn inbox_messages(&self) -> Vec<InboxMessage> {
        self.inbox.read().expect("inbox lock poisoned").clone()
    }

    /// Outstanding backlog agenda items parsed at the last boot.
    #[must_use]
    pub fn backlog_items(&self) -> Vec<String> {
        self.backlog.read().expect("backlog lock poisoned").clone()
    }

    /// Raw git-sync status string read from the environment at the last boot.
    #[must_use]
    pub fn git_status(&self) -> Option<String> {
        self.git_status.read().expect("git status lock poisoned").clone()
    }

    fn scan_inbox(&self) {
        let inbox_dir = self.workspace_root.join("inbox");
        let Ok(entries) = fs::read_dir(&inbox_dir) else {
            return;
        };
        let mut messages = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("md") {
                continue;
            }
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            let filename = path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
            messages.push(InboxMessage { filename, content });
        }
        *self.inbox.write().expect("inbox lock poisoned") = messages;
    }

    fn parse_backlog(&self) {
        let backlog_path = self.workspace_root.join("BACKLOG.md");
        let Ok(content) = fs::read_to_string(&backlog_path) else {
            return;
        };
        let mut items = Vec::new();
        let mut in_outstanding = false;
        for line in content.lines() {
            if line.starts_with("## Outstanding Tasks") {
                in_outstanding = true;
                continue;
            }
            if line.starts_with("## ") {
                in_outstanding = false;
                continue;
            }
            if in_outstanding {
                if let Some(item) = line.trim_start().strip_prefix("- [ ] ") {
                    items.push(item.to_string());
                }
            }
        }
        *self.backlog.write().expect("backlog lock poisoned") = items;
    }

    fn read_git_status(&self) {
        if let Ok(status) = std::env::var("GIT_SYNC_STATUS") {
            *self.git_status.write().expect("git status lock poisoned") = Some(status);
        }
    }
}
