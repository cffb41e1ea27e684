//! The agent trait and the shape of what a processing hook returns.

use agent_primitives::{AgentClass, AgentId, TaskId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An embedded tool invocation request, carried on an [`AgentResponse`] when
/// the agent wants the kernel to run a tool on its behalf.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Name of the tool to invoke.
    pub tool: String,
    /// Parameters to pass.
    pub parameters: Map<String, Value>,
}

/// The typed result of an agent's processing hook.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Whether the agent considers its own processing successful.
    pub success: bool,
    /// Structured output.
    pub output: Value,
    /// Error text, when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// An embedded tool invocation the kernel should run through the registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCallRequest>,
    /// The agent that produced this response.
    pub agent_id: AgentId,
    /// The task this response answers.
    pub task_id: TaskId,
}

impl AgentResponse {
    /// Builds a successful response with no embedded tool call.
    #[must_use]
    pub fn success(agent_id: AgentId, task_id: TaskId, output: Value) -> Self {
        Self {
            success: true,
            output,
            error: None,
            tool_call: None,
            agent_id,
            task_id,
        }
    }

    /// Builds a response that asks the kernel to run a tool call.
    #[must_use]
    pub fn with_tool_call(
        agent_id: AgentId,
        task_id: TaskId,
        tool: impl Into<String>,
        parameters: Map<String, Value>,
    ) -> Self {
        Self {
            success: true,
            output: Value::Null,
            error: None,
            tool_call: Some(ToolCallRequest {
                tool: tool.into(),
                parameters,
            }),
            agent_id,
            task_id,
        }
    }

    /// Serializes this response to a canonical JSON map for ledger storage.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// An agent's processing hook raised rather than returning a response.
#[derive(Clone, Debug)]
pub struct AgentError {
    /// Combined exception-type-and-message description.
    pub message: String,
}

impl AgentError {
    /// Builds an error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AgentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AgentError {}

/// A registered, named entity with a processing hook transforming a
/// [`crate::Task`] into an [`AgentResponse`].
#[async_trait::async_trait]
pub trait Agent: Send + Sync {
    /// Stable identifier, supplied at registration.
    fn agent_id(&self) -> AgentId;

    /// Free-form capability labels this agent declares.
    fn capabilities(&self) -> Vec<String>;

    /// The manifest class tag this agent should be reported under.
    ///
    /// Defaults to `OrchestrationOperator`, matching the manifest's default
    /// when an agent does not override it.
    fn class_hint(&self) -> AgentClass {
        AgentClass::OrchestrationOperator
    }

    /// A humanized display name, used when generating this agent's manifest.
    fn name(&self) -> String {
        self.agent_id().to_string()
    }

    /// Transforms `task` into a response, or raises.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when processing fails; the kernel records this
    /// as a ledger failure and re-raises to the `tick` caller.
    async fn process(&self, task: &crate::task::Task) -> Result<AgentResponse, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_to_value_round_trips_success_flag() {
        let response = AgentResponse::success(AgentId::random(), TaskId::random(), Value::Null);
        let value = response.to_value();
        assert_eq!(value["success"], Value::Bool(true));
    }

    #[test]
    fn tool_call_response_carries_request() {
        let mut params = Map::new();
        params.insert("path".to_string(), Value::String("a.txt".into()));
        let response =
            AgentResponse::with_tool_call(AgentId::random(), TaskId::random(), "read_file", params);
        assert_eq!(response.tool_call.unwrap().tool, "read_file");
    }
}
