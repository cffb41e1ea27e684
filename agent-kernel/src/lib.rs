//! Cooperative scheduling loop, agent registry, and tool dispatch.
//!
//! [`Kernel`] owns a FIFO [`Task`] queue, an [`AgentRegistry`], an
//! [`agent_ledger::Ledger`], and an [`agent_tools::ToolRegistry`]. Drivers
//! call [`Kernel::boot`] once, then [`Kernel::submit`] and [`Kernel::tick`]
//! in a loop; the kernel never owns its own thread or event loop.

#![warn(missing_docs, clippy::pedantic)]

mod agent;
mod error;
mod kernel;
mod registry;
mod task;
mod tools;

pub use agent::{Agent, AgentError, AgentResponse, ToolCallRequest};
pub use error::KernelError;
pub use kernel::{InboxMessage, Kernel, KernelState};
pub use registry::AgentRegistry;
pub use task::{Task, TaskQueue};
pub use tools::{DelegateTaskTool, InspectResultTool};
