//! Core shared types and traits for kernel-registered agents.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod ids;
mod manifest;

/// Error type and result alias shared across the kernel crate family.
pub use error::{Error, Result};
/// Identifiers for agents and tasks.
pub use ids::{AgentId, TaskId};
/// Agent manifest structure and its builder.
pub use manifest::{
    AgentClass, AgentManifest, AgentManifestBuilder, CapabilitiesSection, CredentialsSection,
    GovernanceSection,
};
