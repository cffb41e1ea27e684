//! Kernel-level error taxonomy.

use agent_primitives::AgentId;
use thiserror::Error;

/// Errors raised by the kernel's public operations.
#[derive(Debug, Error)]
pub enum KernelError {
    /// `submit`/`tick` referenced an agent id never passed to `register_agent`.
    #[error("agent {agent_id} is not registered; known agents: {known}")]
    AgentNotRegistered {
        /// The id that was looked up.
        agent_id: AgentId,
        /// Comma-separated list of currently registered agent ids.
        known: String,
    },

    /// `register_agent` was called twice with the same id.
    #[error("agent {agent_id} is already registered")]
    DuplicateAgent {
        /// The id that was already present.
        agent_id: AgentId,
    },

    /// `submit` targeted an agent whose manifest is not `active` (only checked
    /// once the kernel has booted).
    #[error("agent {agent_id} is registered but not active")]
    AgentNotActive {
        /// The id that failed the activity check.
        agent_id: AgentId,
    },

    /// The agent's processing hook returned an error during `tick`.
    #[error("agent {agent_id} failed to process task {task_id}: {message}")]
    AgentProcessingFailed {
        /// The agent that raised.
        agent_id: AgentId,
        /// The task being processed when it raised.
        task_id: agent_primitives::TaskId,
        /// Combined exception-type-and-message description.
        message: String,
    },

    /// Manifest construction failed while booting (name/version rejected).
    #[error("failed to generate manifest for agent {agent_id}: {source}")]
    ManifestGeneration {
        /// The agent whose manifest could not be built.
        agent_id: AgentId,
        /// Underlying manifest builder error.
        #[source]
        source: agent_primitives::Error,
    },
}
