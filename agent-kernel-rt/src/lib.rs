//! Facade crate bundling the agent kernel family behind feature flags.
//!
//! Depend on this crate to pull in [`kernel`], [`tools`], [`ledger`],
//! [`policy`], [`adapters`], [`telemetry`], and [`config`] together, or
//! depend on the individual crates directly and skip this facade.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use agent_primitives as primitives;

/// Cooperative scheduling loop, agent registry, and tool dispatch (`kernel` feature).
#[cfg(feature = "kernel")]
pub use agent_kernel as kernel;

/// The narrow model-adapter trait consumed by agents (`adapters` feature).
#[cfg(feature = "adapters")]
pub use agent_adapters as adapters;

/// Tool protocol, registry, and bundled filesystem tools (`tools` feature).
#[cfg(feature = "tools")]
pub use agent_tools as tools;

/// Durable task ledger (`ledger` feature).
#[cfg(feature = "ledger")]
pub use agent_ledger as ledger;

/// Declarative safety policy engine (`policy` feature).
#[cfg(feature = "policy")]
pub use agent_policy as policy;

/// Tracing subscriber initialization (`telemetry` feature).
#[cfg(feature = "telemetry")]
pub use agent_telemetry as telemetry;

/// TOML-backed kernel configuration (`config` feature).
#[cfg(feature = "config")]
pub use agent_config as config;
