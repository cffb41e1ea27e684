//! Kernel-aware tools that need to call back into the [`crate::Kernel`] that
//! dispatched them, and therefore cannot live in the dependency-acyclic
//! `agent-tools` crate.

mod delegate_task;
mod inspect_result;

pub use delegate_task::DelegateTaskTool;
pub use inspect_result::InspectResultTool;
