use std::fs;
use std::io::Write as _;
use std::sync::Arc;

use agent_kernel_rt::kernel::{Agent, AgentError, AgentResponse, Kernel, KernelError, Task};
use agent_kernel_rt::ledger::Ledger;
use agent_kernel_rt::policy::PolicyEngine;
use agent_kernel_rt::primitives::AgentId;
use agent_kernel_rt::tools::ToolCall;
use serde_json::{json, Map, Value};

/// Emits a `write_file` tool call with the path/content found on the task payload.
struct WriterAgent {
    id: AgentId,
}

#[async_trait::async_trait]
impl Agent for WriterAgent {
    fn agent_id(&self) -> AgentId {
        self.id
    }

    fn capabilities(&self) -> Vec<String> {
        vec!["write".to_string()]
    }

    async fn process(&self, task: &Task) -> Result<AgentResponse, AgentError> {
        let mut parameters = Map::new();
        parameters.insert("path".to_string(), task.payload["path"].clone());
        parameters.insert("content".to_string(), task.payload["content"].clone());
        Ok(AgentResponse::with_tool_call(
            self.id,
            task.task_id,
            "write_file",
            parameters,
        ))
    }
}

/// Delegates a task to `target` via the `delegate_task` tool, echoing the
/// delegation request it was given on its own payload.
struct OrchestratorAgent {
    id: AgentId,
    target: AgentId,
}

#[async_trait::async_trait]
impl Agent for OrchestratorAgent {
    fn agent_id(&self) -> AgentId {
        self.id
    }

    fn capabilities(&self) -> Vec<String> {
        vec!["orchestrate".to_string()]
    }

    async fn process(&self, task: &Task) -> Result<AgentResponse, AgentError> {
        let mut parameters = Map::new();
        parameters.insert("agent_id".to_string(), json!(self.target.to_string()));
        parameters.insert("payload".to_string(), task.payload.clone());
        Ok(AgentResponse::with_tool_call(
            self.id,
            task.task_id,
            "delegate_task",
            parameters,
        ))
    }
}

/// Echoes its payload back verbatim as output.
struct PlannerAgent {
    id: AgentId,
}

#[async_trait::async_trait]
impl Agent for PlannerAgent {
    fn agent_id(&self) -> AgentId {
        self.id
    }

    fn capabilities(&self) -> Vec<String> {
        vec!["plan".to_string()]
    }

    async fn process(&self, task: &Task) -> Result<AgentResponse, AgentError> {
        Ok(AgentResponse::success(self.id, task.task_id, task.payload.clone()))
    }
}

fn permissive_kernel(workspace_root: std::path::PathBuf) -> Arc<Kernel> {
    let ledger = Ledger::in_memory().unwrap();
    Kernel::new(ledger, None, workspace_root)
}

fn git_blocking_policy(workspace_root: &std::path::Path) -> Arc<PolicyEngine> {
    let config_path = workspace_root.join("policy.toml");
    let mut file = fs::File::create(&config_path).unwrap();
    writeln!(
        file,
        r#"
[[safety_rules]]
id = "no-git-internals"
tool_name = "write_file"
action = "block"
condition = "path_contains"
pattern = ".git"
message = "Touching .git internals is forbidden."
"#
    )
    .unwrap();
    Arc::new(PolicyEngine::from_config_file(&config_path, workspace_root).unwrap())
}

// S1: a happy-path write goes through the full tool pipeline and lands in
// the ledger as a completed task with the tool's own success output.
#[tokio::test]
async fn s1_happy_path_write_completes() {
    let dir = tempfile::tempdir().unwrap();
    let kernel = permissive_kernel(dir.path().to_path_buf());
    let agent_id = AgentId::random();
    kernel.register_agent(Arc::new(WriterAgent { id: agent_id })).unwrap();
    kernel.boot().unwrap();

    let target = dir.path().join("notes.txt");
    let task_id = kernel
        .submit(Task::new(
            agent_id,
            json!({"path": target.to_string_lossy(), "content": "hello"}),
        ))
        .unwrap();
    assert!(kernel.tick().await.unwrap());

    assert_eq!(fs::read_to_string(&target).unwrap(), "hello");
    let record = kernel.get_task_result(task_id).unwrap();
    assert_eq!(record.status.as_str(), "completed");
    assert_eq!(record.output_result.as_ref().unwrap()["success"], Value::Bool(true));
}

// S2: a write blocked by policy still completes as a task (the kernel does
// not treat a policy block as an agent failure), but the stored tool result
// reports failure and carries the blocked_by_policy metadata flag.
#[tokio::test]
async fn s2_policy_blocked_write_is_shielded() {
    let dir = tempfile::tempdir().unwrap();
    let policy = git_blocking_policy(dir.path());
    let ledger = Ledger::in_memory().unwrap();
    let kernel = Kernel::new(ledger, Some(policy), dir.path().to_path_buf());

    let agent_id = AgentId::random();
    kernel.register_agent(Arc::new(WriterAgent { id: agent_id })).unwrap();
    kernel.boot().unwrap();

    let target = dir.path().join(".git").join("config");
    let task_id = kernel
        .submit(Task::new(
            agent_id,
            json!({"path": target.to_string_lossy(), "content": "malicious"}),
        ))
        .unwrap();
    assert!(kernel.tick().await.unwrap());

    assert!(!target.exists());
    let record = kernel.get_task_result(task_id).unwrap();
    assert_eq!(record.status.as_str(), "completed");
    let output = record.output_result.unwrap();
    assert_eq!(output["success"], Value::Bool(false));
    assert_eq!(output["metadata"]["blocked_by_policy"], Value::Bool(true));
    assert!(output["error"].as_str().unwrap().contains(".git"));
}

// S3: an orchestrator delegates to a planner through `delegate_task`; the
// delegated task only runs on a second tick.
#[tokio::test]
async fn s3_delegation_runs_on_a_second_tick() {
    let dir = tempfile::tempdir().unwrap();
    let kernel = permissive_kernel(dir.path().to_path_buf());
    let planner_id = AgentId::random();
    let orchestrator_id = AgentId::random();
    kernel.register_agent(Arc::new(PlannerAgent { id: planner_id })).unwrap();
    kernel
        .register_agent(Arc::new(OrchestratorAgent {
            id: orchestrator_id,
            target: planner_id,
        }))
        .unwrap();
    kernel.boot().unwrap();

    let orchestrator_task = kernel
        .submit(Task::new(orchestrator_id, json!({"goal": "write a plan"})))
        .unwrap();

    assert_eq!(kernel.queue_size(), 1);
    assert!(kernel.tick().await.unwrap());

    // The orchestrator's tick dispatched delegate_task, which submitted a
    // second task rather than completing the plan itself.
    assert_eq!(kernel.queue_size(), 1);
    let orchestrator_record = kernel.get_task_result(orchestrator_task).unwrap();
    assert_eq!(orchestrator_record.status.as_str(), "completed");
    let delegated_task_id_text = orchestrator_record.output_result.unwrap()["output"]["task_id"]
        .as_str()
        .unwrap()
        .to_string();

    assert!(kernel.tick().await.unwrap());
    assert_eq!(kernel.queue_size(), 0);

    let delegated_task_id: agent_kernel_rt::primitives::TaskId =
        delegated_task_id_text.parse().unwrap();
    let planner_record = kernel.get_task_result(delegated_task_id).unwrap();
    assert_eq!(planner_record.status.as_str(), "completed");
    assert_eq!(planner_record.output_result, Some(json!({"goal": "write a plan"})));
}

// S4: inspect_result round-trips a completed task's ledger record through
// the tool pipeline, including the NOT_FOUND-as-success case for a bad id.
#[tokio::test]
async fn s4_inspect_result_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let kernel = permissive_kernel(dir.path().to_path_buf());
    let agent_id = AgentId::random();
    kernel.register_agent(Arc::new(PlannerAgent { id: agent_id })).unwrap();
    kernel.boot().unwrap();

    let task_id = kernel.submit(Task::new(agent_id, json!({"note": "draft"}))).unwrap();
    assert!(kernel.tick().await.unwrap());

    let mut parameters = Map::new();
    parameters.insert("task_id".to_string(), json!(task_id.to_string()));
    let result = kernel
        .tools()
        .execute(ToolCall::new("inspect_result", parameters))
        .await;
    assert!(result.success);
    let output = result.output.unwrap();
    assert_eq!(output["status"], "completed");
    assert_eq!(output["output"], json!({"note": "draft"}));

    let mut missing_parameters = Map::new();
    missing_parameters.insert(
        "task_id".to_string(),
        json!(agent_kernel_rt::primitives::TaskId::random().to_string()),
    );
    let missing_result = kernel
        .tools()
        .execute(ToolCall::new("inspect_result", missing_parameters))
        .await;
    assert!(missing_result.success);
    assert_eq!(missing_result.output.unwrap()["status"], "NOT_FOUND");
}

// S5: a ledger opened at a path that is itself an existing directory falls
// back to an in-memory database instead of failing kernel construction.
#[tokio::test]
async fn s5_ledger_falls_back_to_in_memory_on_unusable_path() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Ledger::open(dir.path()).unwrap();
    assert!(ledger.is_in_memory());

    let kernel = Kernel::new(ledger, None, dir.path().to_path_buf());
    let agent_id = AgentId::random();
    kernel.register_agent(Arc::new(PlannerAgent { id: agent_id })).unwrap();
    kernel.boot().unwrap();

    let task_id = kernel.submit(Task::new(agent_id, json!({"k": "v"}))).unwrap();
    assert!(kernel.tick().await.unwrap());
    assert_eq!(kernel.get_task_result(task_id).unwrap().status.as_str(), "completed");
}

// S6: submitting to an unregistered agent fails before anything is queued,
// and the error names the agents that were actually registered.
#[tokio::test]
async fn s6_unknown_agent_submission_names_known_agents() {
    let dir = tempfile::tempdir().unwrap();
    let kernel = permissive_kernel(dir.path().to_path_buf());
    let agent_a = AgentId::random();
    let agent_b = AgentId::random();
    kernel.register_agent(Arc::new(PlannerAgent { id: agent_a })).unwrap();
    kernel.register_agent(Arc::new(PlannerAgent { id: agent_b })).unwrap();
    kernel.boot().unwrap();

    let stranger = AgentId::random();
    let err = kernel
        .submit(Task::new(stranger, json!({})))
        .unwrap_err();
    match err {
        KernelError::AgentNotRegistered { agent_id, known } => {
            assert_eq!(agent_id, stranger);
            assert!(known.contains(&agent_a.to_string()));
            assert!(known.contains(&agent_b.to_string()));
        }
        other => panic!("expected AgentNotRegistered, got {other:?}"),
    }
    assert_eq!(kernel.queue_size(), 0);
}
