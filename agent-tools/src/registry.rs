//! Central catalog of tools and the single entry point for executing them.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use agent_policy::{PolicyEngine, ToolInvocation};
use serde_json::Value;
use thiserror::Error;

use crate::protocol::{Tool, ToolCall, ToolResult};

/// Errors produced while registering tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool name collided with an existing registration.
    #[error("tool `{name}` is already registered")]
    DuplicateTool {
        /// Name of the offending tool.
        name: String,
    },
}

/// Central catalog of tools, and the single entry point for executing them.
///
/// When a [`PolicyEngine`] is attached, every invocation passes through it
/// before the tool's own parameter validation runs — a blocked call is
/// rejected even when its parameters would otherwise fail validation.
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
    policy: Option<Arc<PolicyEngine>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .tools
            .read()
            .expect("tool registry poisoned")
            .keys()
            .cloned()
            .collect();
        f.debug_struct("ToolRegistry")
            .field("registered", &names)
            .field("policy_attached", &self.policy.is_some())
            .finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry with no policy engine attached.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
            policy: None,
        }
    }

    /// Creates an empty registry gated by `policy`.
    #[must_use]
    pub fn with_policy(policy: Arc<PolicyEngine>) -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
            policy: Some(policy),
        }
    }

    /// Registers `tool`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::DuplicateTool`] if the name is already present.
    ///
    /// # Panics
    ///
    /// Panics if the internal registry lock is poisoned.
    pub fn register(&self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let mut tools = self.tools.write().expect("tool registry poisoned");
        let name = tool.name().to_owned();
        if tools.contains_key(&name) {
            return Err(ToolError::DuplicateTool { name });
        }
        tools.insert(name, tool);
        Ok(())
    }

    /// Returns the tool registered under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools
            .read()
            .expect("tool registry poisoned")
            .get(name)
            .cloned()
    }

    /// Returns whether a tool is registered under `name`.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.tools.read().expect("tool registry poisoned").contains_key(name)
    }

    /// Returns the names of every registered tool.
    #[must_use]
    pub fn list_names(&self) -> Vec<String> {
        self.tools.read().expect("tool registry poisoned").keys().cloned().collect()
    }

    /// Executes `call` through the full pipeline: lookup, policy, validation, execution.
    ///
    /// This ordering is load-bearing: the policy check runs before the
    /// tool's own parameter validation, so a blocked dangerous call is
    /// rejected even if its parameters are malformed.
    pub async fn execute(&self, call: ToolCall) -> ToolResult {
        let Some(tool) = self.get(&call.tool_name) else {
            return ToolResult::err(format!("tool `{}` is not registered", call.tool_name));
        };

        if let Some(policy) = &self.policy {
            let invocation = ToolInvocation::new(&call.tool_name, &call.parameters);
            let decision = policy.evaluate(&invocation);
            if decision.is_blocked() {
                let reason = decision
                    .reason()
                    .unwrap_or("blocked by policy")
                    .to_string();
                return ToolResult::err(reason)
                    .with_metadata("blocked_by_policy", Value::Bool(true));
            }
        }

        if let Err(reason) = tool.validate(&call.parameters) {
            return ToolResult::err(reason);
        }

        match tool.execute(call.parameters).await {
            Ok(output) => ToolResult::ok(output),
            Err(reason) => ToolResult::err(reason),
        }
    }

    /// Produces a prompt fragment describing every registered tool, with its
    /// schema and a canonical JSON invocation example.
    ///
    /// # Panics
    ///
    /// Panics if the internal registry lock is poisoned.
    #[must_use]
    pub fn describe_for_model(&self) -> String {
        let tools = self.tools.read().expect("tool registry poisoned");
        let mut names: Vec<&String> = tools.keys().collect();
        names.sort();

        let mut out = String::from("Available tools:\n\n");
        for name in names {
            let tool = &tools[name];
            out.push_str(&format!("- {}: {}\n", tool.name(), tool.description()));
            out.push_str(&format!(
                "  schema: {}\n",
                serde_json::to_string(&tool.parameters_schema()).unwrap_or_default()
            ));
            out.push_str(&format!(
                "  example: {{\"tool_name\": \"{}\", \"parameters\": {{}}}}\n",
                tool.name()
            ));
        }
        out
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
