//! Machine-readable identity manifests generated for agents at kernel boot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::AgentId;

/// Closed set of runtime classes a manifest can declare for an agent.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentClass {
    /// Agents that think and delegate rather than execute work themselves.
    OrchestrationOperator,
    /// Agents that execute a concrete unit of work.
    TaskExecutor,
}

impl Default for AgentClass {
    fn default() -> Self {
        Self::OrchestrationOperator
    }
}

/// Identity section of a manifest (§3, "agent section").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentSection {
    id: AgentId,
    name: String,
    version: String,
    class: AgentClass,
    specialization: String,
    status: String,
    issued_by: String,
    issued_date: String,
}

/// A capability grant entry inside the credentials section.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mandate {
    capability: String,
    scope: Vec<String>,
}

/// A forbidden action recorded in the credentials section.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Constraint {
    forbidden: String,
    reason: String,
}

/// Credentials section (§3): mandate, constraints, prime directive.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CredentialsSection {
    mandate: Vec<Mandate>,
    constraints: Vec<Constraint>,
    prime_directive: String,
}

/// One interface through which an agent can be addressed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Interface {
    #[serde(rename = "type")]
    kind: String,
    protocol: String,
    endpoint: String,
}

/// One operation an agent exposes, with a schema stub for each side.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Operation {
    name: String,
    description: String,
    input_schema: Value,
    output_schema: Value,
    idempotent: bool,
    versioned: bool,
}

/// Capabilities section (§3): interfaces and operations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapabilitiesSection {
    interfaces: Vec<Interface>,
    operations: Vec<Operation>,
}

/// Governance section (§3): who controls the agent, and how transparently.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GovernanceSection {
    principal: String,
    contact: String,
    audit_trail: String,
    transparency: String,
}

/// Machine-readable self-description generated from a registered agent at boot.
///
/// See §3 of the specification for the field-by-field contract; the shape here
/// matches it exactly because the fingerprint (§4.5) is computed over this
/// structure's canonical JSON form and must be reproducible by any conforming
/// implementation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentManifest {
    protocol_version: String,
    agent: AgentSection,
    credentials: CredentialsSection,
    capabilities: CapabilitiesSection,
    governance: GovernanceSection,
    /// The agent's raw declared capability list, used for registry indexing.
    ///
    /// Kept separate from `capabilities.operations` because that list also
    /// carries the synthetic `process` operation every manifest advertises;
    /// `find_by_capability` must only match capabilities the agent actually
    /// declared (invariant 4).
    #[serde(skip, default)]
    declared_capabilities: Vec<String>,
}

const PROTOCOL_VERSION: &str = "1.0.0";

impl AgentManifest {
    /// Starts building a manifest for `id`.
    #[must_use]
    pub fn builder(id: AgentId) -> AgentManifestBuilder {
        AgentManifestBuilder {
            id,
            name: None,
            version: None,
            class: AgentClass::default(),
            specialization: "general".to_string(),
            issuing_org: "agent-kernel".to_string(),
            capabilities: Vec::new(),
        }
    }

    /// Returns the agent identifier.
    #[must_use]
    pub const fn id(&self) -> AgentId {
        self.agent.id
    }

    /// Returns the agent display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.agent.name
    }

    /// Returns the declared manifest version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.agent.version
    }

    /// Returns the agent's runtime class tag.
    #[must_use]
    pub const fn class(&self) -> AgentClass {
        self.agent.class
    }

    /// Returns the operational status flag (`"active"` unless revoked).
    #[must_use]
    pub fn status(&self) -> &str {
        &self.agent.status
    }

    /// Returns the agent's declared capability names.
    #[must_use]
    pub fn capabilities(&self) -> &[String] {
        &self.declared_capabilities
    }

    /// Returns whether the manifest declares `capability`.
    #[must_use]
    pub fn has_capability(&self, capability: &str) -> bool {
        self.declared_capabilities.iter().any(|c| c == capability)
    }

    /// Computes the deterministic `sha256:`-prefixed fingerprint of this manifest.
    ///
    /// The hash runs over a canonical (sorted-key, minimal-whitespace) JSON
    /// serialization, so two manifests with identical field values always
    /// produce identical fingerprints regardless of struct field order.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let value = serde_json::to_value(self).expect("manifest always serializes");
        let canonical = canonicalize(&value);
        let bytes = serde_json::to_vec(&canonical).expect("canonical value always serializes");
        let digest = Sha256::digest(&bytes);
        format!("sha256:{digest:x}")
    }
}

/// Recursively sorts object keys so serialization order is deterministic.
///
/// `serde_json::Value`'s default map (a `serde_json::Map`, backed by an
/// insertion-ordered `IndexMap`-like structure unless the `preserve_order`
/// feature is off) does not guarantee sorted keys; routing every object
/// through a `BTreeMap` first does.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), canonicalize(v)))
                .collect();
            serde_json::to_value(sorted).expect("sorted map always serializes")
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Builder for [`AgentManifest`].
#[derive(Debug)]
pub struct AgentManifestBuilder {
    id: AgentId,
    name: Option<String>,
    version: Option<String>,
    class: AgentClass,
    specialization: String,
    issuing_org: String,
    capabilities: Vec<String>,
}

impl AgentManifestBuilder {
    /// Sets the human-readable name for the agent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidManifest`] when the name is empty.
    pub fn name(mut self, name: impl Into<String>) -> crate::Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(crate::Error::InvalidManifest {
                reason: "manifest name cannot be empty".into(),
            });
        }
        self.name = Some(name);
        Ok(self)
    }

    /// Sets the agent's version string.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidManifest`] when the version string is empty.
    pub fn version(mut self, version: impl Into<String>) -> crate::Result<Self> {
        let version = version.into();
        if version.trim().is_empty() {
            return Err(crate::Error::InvalidManifest {
                reason: "manifest version cannot be empty".into(),
            });
        }
        self.version = Some(version);
        Ok(self)
    }

    /// Overrides the default runtime class tag (`orchestration_operator`).
    #[must_use]
    pub const fn class(mut self, class: AgentClass) -> Self {
        self.class = class;
        self
    }

    /// Sets the specialization label.
    #[must_use]
    pub fn specialization(mut self, specialization: impl Into<String>) -> Self {
        self.specialization = specialization.into();
        self
    }

    /// Overrides the issuing organization recorded in the agent and governance sections.
    #[must_use]
    pub fn issuing_org(mut self, issuing_org: impl Into<String>) -> Self {
        self.issuing_org = issuing_org.into();
        self
    }

    /// Sets the agent's declared capability list.
    #[must_use]
    pub fn capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Consumes the builder, producing the manifest.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidManifest`] if mandatory fields are missing.
    pub fn build(self) -> crate::Result<AgentManifest> {
        let name = self.name.ok_or_else(|| crate::Error::InvalidManifest {
            reason: "manifest name must be provided".into(),
        })?;
        let version = self.version.ok_or_else(|| crate::Error::InvalidManifest {
            reason: "manifest version must be provided".into(),
        })?;

        let issued_date = chrono::Utc::now().to_rfc3339();

        let mut operations: Vec<Operation> = self
            .capabilities
            .iter()
            .map(|capability| Operation {
                name: capability.clone(),
                description: format!("Agent capability: {capability}"),
                input_schema: generic_schema(&format!("Input for {capability}")),
                output_schema: generic_schema(&format!("Output from {capability}")),
                idempotent: false,
                versioned: false,
            })
            .collect();

        if !operations.iter().any(|op| op.name == "process") {
            operations.push(Operation {
                name: "process".to_string(),
                description: "Process a task via the agent".to_string(),
                input_schema: generic_schema("Task to process"),
                output_schema: generic_schema("Agent response"),
                idempotent: false,
                versioned: false,
            });
        }

        Ok(AgentManifest {
            protocol_version: PROTOCOL_VERSION.to_string(),
            agent: AgentSection {
                id: self.id,
                name,
                version,
                class: self.class,
                specialization: self.specialization,
                status: "active".to_string(),
                issued_by: self.issuing_org.clone(),
                issued_date,
            },
            credentials: CredentialsSection {
                mandate: vec![Mandate {
                    capability: "*".to_string(),
                    scope: vec!["*".to_string()],
                }],
                constraints: vec![
                    Constraint {
                        forbidden: "bypass_policy_gate".to_string(),
                        reason: "tool invocations must pass the policy engine before execution"
                            .to_string(),
                    },
                    Constraint {
                        forbidden: "fabricate_ledger_record".to_string(),
                        reason: "ledger entries must reflect actual dispatch outcomes".to_string(),
                    },
                ],
                prime_directive: "Validate before acting; record every dispatch in the ledger."
                    .to_string(),
            },
            capabilities: CapabilitiesSection {
                interfaces: vec![Interface {
                    kind: "task".to_string(),
                    protocol: "agent-kernel".to_string(),
                    endpoint: format!("agent::{}", self.id),
                }],
                operations,
            },
            governance: GovernanceSection {
                principal: format!("{}-core-team", self.issuing_org),
                contact: "kernel-operators@local".to_string(),
                audit_trail: "ledger://task_history".to_string(),
                transparency: "public".to_string(),
            },
            declared_capabilities: self.capabilities,
        })
    }
}

fn generic_schema(description: &str) -> Value {
    serde_json::json!({
        "type": "object",
        "description": description,
    })
}
