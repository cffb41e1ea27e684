//! Request shape passed into the policy engine before a tool runs.

use serde_json::{Map, Value};

/// A proposed tool invocation, as seen by the policy engine.
///
/// The engine only ever inspects the conventional `path` parameter; every
/// other key in `parameters` is opaque to it.
#[derive(Debug, Clone)]
pub struct ToolInvocation<'a> {
    tool_name: &'a str,
    parameters: &'a Map<String, Value>,
}

impl<'a> ToolInvocation<'a> {
    /// Wraps a tool name and its parameter map for policy evaluation.
    #[must_use]
    pub fn new(tool_name: &'a str, parameters: &'a Map<String, Value>) -> Self {
        Self {
            tool_name,
            parameters,
        }
    }

    /// Returns the name of the tool being invoked.
    #[must_use]
    pub fn tool_name(&self) -> &str {
        self.tool_name
    }

    /// Returns the string form of the conventional `path` parameter, if present.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.parameters.get("path").and_then(Value::as_str)
    }
}
