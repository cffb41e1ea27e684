//! Tool protocol, registry, and bundled filesystem tools for the agent kernel.
//!
//! [`ToolRegistry`] is the single entry point for invoking a tool: it looks
//! the tool up by name, runs it past an optional [`agent_policy::PolicyEngine`],
//! validates its parameters, and only then executes it. See
//! [`ToolRegistry::execute`] for the exact pipeline.

#![warn(missing_docs, clippy::pedantic)]

mod protocol;
mod registry;
mod tools;

/// The tool trait and the request/response shapes tools exchange.
pub use protocol::{Tool, ToolCall, ToolResult};
/// The registry itself and its error type.
pub use registry::{ToolError, ToolRegistry};
/// Bundled filesystem tools.
pub use tools::{ListDirectoryTool, ReadFileTool, SearchFileTool, WriteFileTool};
