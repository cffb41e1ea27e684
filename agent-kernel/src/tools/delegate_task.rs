//! The `delegate_task` tool: lets an agent submit a new task through the
//! kernel that registered it.

use std::sync::{RwLock, Weak};

use agent_tools::Tool;
use serde_json::{Map, Value};

use crate::kernel::Kernel;

/// Submits a task to another registered agent on behalf of the calling agent.
///
/// Constructed with no kernel reference (the kernel owns the tool registry
/// that owns this tool, so the kernel cannot exist yet when this is built).
/// [`Kernel::boot`] injects a [`Weak`] reference once the kernel itself is
/// wrapped in an `Arc`, breaking the otherwise-cyclic dependency.
#[derive(Default)]
pub struct DelegateTaskTool {
    kernel: RwLock<Option<Weak<Kernel>>>,
}

impl DelegateTaskTool {
    /// Builds an unbound tool instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Injects the kernel reference. Called once, during boot.
    pub fn bind_kernel(&self, kernel: Weak<Kernel>) {
        *self.kernel.write().expect("delegate tool lock poisoned") = Some(kernel);
    }
}

#[async_trait::async_trait]
impl Tool for DelegateTaskTool {
    fn name(&self) -> &str {
        "delegate_task"
    }

    fn description(&self) -> &str {
        "Submits a new task to another registered agent and returns its task id."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "agent_id": {"type": "string", "required": true},
                "payload": {"type": "object", "required": true},
            },
        })
    }

    fn validate(&self, parameters: &Map<String, Value>) -> Result<(), String> {
        if !parameters.get("agent_id").is_some_and(Value::is_string) {
            return Err("delegate_task requires a string \"agent_id\" parameter".to_string());
        }
        if !parameters.get("payload").is_some_and(Value::is_object) {
            return Err("delegate_task requires an object \"payload\" parameter".to_string());
        }
        Ok(())
    }

    async fn execute(&self, parameters: Map<String, Value>) -> Result<Value, String> {
        let kernel = self
            .kernel
            .read()
            .expect("delegate tool lock poisoned")
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or_else(|| "delegate_task: kernel reference not bound yet".to_string())?;

        let agent_id_text = parameters["agent_id"].as_str().expect("validated above");
        let agent_id: agent_primitives::AgentId = agent_id_text
            .parse()
            .map_err(|_| format!("delegate_task: \"{agent_id_text}\" is not a valid agent id"))?;
        let payload = parameters["payload"].clone();

        let task_id = kernel
            .submit(crate::task::Task::new(agent_id, payload))
            .map_err(|error| error.to_string())?;

        Ok(serde_json::json!({"task_id": task_id.to_string()}))
    }
}
