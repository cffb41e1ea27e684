//! Wire shapes tools are invoked with and respond through.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A request to invoke a named tool with a parameter map.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool being invoked.
    pub tool_name: String,
    /// Parameters passed to the tool.
    pub parameters: Map<String, Value>,
    /// Optional caller-supplied correlation id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
}

impl ToolCall {
    /// Builds a call with no correlation id.
    #[must_use]
    pub fn new(tool_name: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            tool_name: tool_name.into(),
            parameters,
            call_id: None,
        }
    }
}

/// Outcome of invoking a tool through the registry.
///
/// Every failure mode the registry's pipeline can hit — unknown tool name,
/// policy block, validation failure, execution error — is represented as a
/// `ToolResult` with `success = false`, never as a propagated error. This
/// keeps the pipeline uniform for callers such as an LLM loop that must
/// always get a structured response back.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the invocation succeeded.
    pub success: bool,
    /// The tool's output, when successful.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// A human-readable error description, when unsuccessful.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Side-channel metadata, e.g. `blocked_by_policy`.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl ToolResult {
    /// Builds a successful result carrying `output`.
    #[must_use]
    pub fn ok(output: Value) -> Self {
        Self {
            success: true,
            output: Some(output),
            error: None,
            metadata: Map::new(),
        }
    }

    /// Builds a failed result carrying `error`.
    #[must_use]
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
            metadata: Map::new(),
        }
    }

    /// Attaches a metadata key/value pair and returns the updated result.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Implemented by every tool registered with a [`crate::ToolRegistry`].
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Stable, unique tool name used for lookup and policy matching.
    fn name(&self) -> &str;

    /// Human-readable description surfaced to the model.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's accepted parameters.
    fn parameters_schema(&self) -> Value;

    /// Validates `parameters` before execution.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message describing what is wrong with the
    /// supplied parameters.
    fn validate(&self, parameters: &Map<String, Value>) -> Result<(), String>;

    /// Executes the tool, producing its JSON output.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message on failure; the registry wraps it
    /// into a failed [`ToolResult`] rather than propagating it further.
    async fn execute(&self, parameters: Map<String, Value>) -> Result<Value, String>;
}
