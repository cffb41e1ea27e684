//! In-process agent registry and the manifest-backed identity registry it
//! populates at boot.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use agent_primitives::{AgentId, AgentManifest};

use crate::agent::Agent;
use crate::error::KernelError;

/// Holds registered agents by id, and — once [`AgentRegistry::boot`] has run —
/// a parallel table of identity manifests.
#[derive(Default)]
pub struct AgentRegistry {
    agents: RwLock<HashMap<AgentId, Arc<dyn Agent>>>,
    manifests: RwLock<HashMap<AgentId, AgentManifest>>,
}

impl AgentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `agent`.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::DuplicateAgent`] if an agent with this id is
    /// already registered.
    pub fn register_agent(&self, agent: Arc<dyn Agent>) -> Result<(), KernelError> {
        let agent_id = agent.agent_id();
        let mut agents = self.agents.write().expect("agent registry poisoned");
        if agents.contains_key(&agent_id) {
            return Err(KernelError::DuplicateAgent { agent_id });
        }
        agents.insert(agent_id, agent);
        Ok(())
    }

    /// Returns the agent registered under `id`, if any.
    #[must_use]
    pub fn lookup(&self, id: AgentId) -> Option<Arc<dyn Agent>> {
        self.agents.read().expect("agent registry poisoned").get(&id).cloned()
    }

    /// Returns whether an agent is registered under `id`.
    #[must_use]
    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.read().expect("agent registry poisoned").contains_key(&id)
    }

    /// Returns a comma-separated list of every registered agent id, used to
    /// build "unknown agent" error messages.
    #[must_use]
    pub fn known_agent_ids(&self) -> String {
        self.agents
            .read()
            .expect("agent registry poisoned")
            .keys()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Generates a manifest for every currently registered agent, replacing
    /// any manifests from a prior boot.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError`] only if manifest construction itself fails
    /// (never observed in practice: name/version are always non-empty here).
    pub fn boot(&self) -> Result<(), KernelError> {
        let agents = self.agents.read().expect("agent registry poisoned");
        let mut fresh = HashMap::with_capacity(agents.len());
        for (agent_id, agent) in agents.iter() {
            let manifest = AgentManifest::builder(*agent_id)
                .name(agent.name())
                .map_err(|source| KernelError::ManifestGeneration {
                    agent_id: *agent_id,
                    source,
                })?
                .version("1.0.0")
                .map_err(|source| KernelError::ManifestGeneration {
                    agent_id: *agent_id,
                    source,
                })?
                .class(agent.class_hint())
                .capabilities(agent.capabilities())
                .build()
                .map_err(|source| KernelError::ManifestGeneration {
                    agent_id: *agent_id,
                    source,
                })?;
            fresh.insert(*agent_id, manifest);
        }
        drop(agents);
        *self.manifests.write().expect("manifest registry poisoned") = fresh;
        Ok(())
    }

    /// Returns the manifest generated for `id` at the last boot, if any.
    #[must_use]
    pub fn manifest(&self, id: AgentId) -> Option<AgentManifest> {
        self.manifests.read().expect("manifest registry poisoned").get(&id).cloned()
    }

    /// Returns the manifests of every agent whose declared capability list
    /// contains `capability`.
    #[must_use]
    pub fn find_by_capability(&self, capability: &str) -> Vec<AgentManifest> {
        self.manifests
            .read()
            .expect("manifest registry poisoned")
            .values()
            .filter(|manifest| manifest.has_capability(capability))
            .cloned()
            .collect()
    }
}
