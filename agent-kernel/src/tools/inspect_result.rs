//! The `inspect_result` tool: lets an agent read back another task's ledger
//! record via the kernel that dispatched it.

use std::sync::{RwLock, Weak};

use agent_tools::Tool;
use serde_json::{Map, Value};

use crate::kernel::Kernel;

/// Fetches a ledger record for a given task id.
///
/// Same late-binding shape as [`crate::tools::delegate_task::DelegateTaskTool`]:
/// built with no kernel reference, injected at boot.
#[derive(Default)]
pub struct InspectResultTool {
    kernel: RwLock<Option<Weak<Kernel>>>,
}

impl InspectResultTool {
    /// Builds an unbound tool instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Injects the kernel reference. Called once, during boot.
    pub fn bind_kernel(&self, kernel: Weak<Kernel>) {
        *self.kernel.write().expect("inspect tool lock poisoned") = Some(kernel);
    }
}

#[async_trait::async_trait]
impl Tool for InspectResultTool {
    fn name(&self) -> &str {
        "inspect_result"
    }

    fn description(&self) -> &str {
        "Returns the ledger record for a task id: status, output, error, and timestamp."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "task_id": {"type": "string", "required": true},
                "include_input": {"type": "boolean", "required": false},
            },
        })
    }

    fn validate(&self, parameters: &Map<String, Value>) -> Result<(), String> {
        if !parameters.get("task_id").is_some_and(Value::is_string) {
            return Err("inspect_result requires a string \"task_id\" parameter".to_string());
        }
        Ok(())
    }

    async fn execute(&self, parameters: Map<String, Value>) -> Result<Value, String> {
        let kernel = self
            .kernel
            .read()
            .expect("inspect tool lock poisoned")
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or_else(|| "inspect_result: kernel reference not bound yet".to_string())?;

        let task_id_text = parameters["task_id"].as_str().expect("validated above");
        let task_id: agent_primitives::TaskId = task_id_text
            .parse()
            .map_err(|_| format!("inspect_result: \"{task_id_text}\" is not a valid task id"))?;
        let include_input = parameters
            .get("include_input")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let Some(record) = kernel.get_task_result(task_id) else {
            return Ok(serde_json::json!({"status": "NOT_FOUND"}));
        };

        let mut output = serde_json::json!({
            "status": record.status.as_str(),
            "timestamp": record.timestamp,
        });
        let map = output.as_object_mut().expect("object literal above");
        if let Some(result) = record.output_result {
            map.insert("output".to_string(), result);
        }
        if let Some(error) = record.error_message {
            map.insert("error".to_string(), Value::String(error));
        }
        if include_input {
            map.insert("input_payload".to_string(), record.input_payload);
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_task_returns_not_found_as_success() {
        let tool = InspectResultTool::new();
        let ledger = agent_ledger::Ledger::in_memory().unwrap();
        let kernel = Kernel::new(ledger, None, std::env::temp_dir());
        tool.bind_kernel(std::sync::Arc::downgrade(&kernel));

        let mut params = Map::new();
        params.insert(
            "task_id".to_string(),
            Value::String(agent_primitives::TaskId::random().to_string()),
        );
        let result = tool.execute(params).await.unwrap();
        assert_eq!(result["status"], Value::String("NOT_FOUND".to_string()));
    }
}
