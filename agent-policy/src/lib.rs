//! Declarative, path-based safety policy for tool invocations.
//!
//! Rules are declared in a TOML configuration file as an array of
//! `[[safety_rules]]` tables and evaluated in declaration order; the first
//! matching `block` rule wins. Absence of a configuration file yields zero
//! rules and therefore universal permission.

#![warn(missing_docs, clippy::pedantic)]

mod contracts;
mod decision;
mod engine;

pub use contracts::ToolInvocation;
pub use decision::PolicyDecision;
pub use engine::{PolicyEngine, PolicyError, PolicyResult};
