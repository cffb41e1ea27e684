//! TOML-backed configuration for a kernel process: where its ledger and
//! policy files live, and what workspace root bounds its filesystem tools.

#![warn(missing_docs, clippy::pedantic)]

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors produced while loading a [`KernelConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration file's contents were not valid TOML for this shape.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path whose contents failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },
}

/// Result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
struct RawKernelConfig {
    ledger_path: Option<PathBuf>,
    policy_path: Option<PathBuf>,
    workspace_root: Option<PathBuf>,
    inbox_dir: Option<PathBuf>,
    backlog_path: Option<PathBuf>,
}

/// Everything a kernel process needs to know before it can boot: where the
/// ledger persists, where the policy engine's rule file lives, and the
/// workspace root that bounds the filesystem tools and the optional
/// inbox/backlog side channels.
#[derive(Clone, Debug)]
pub struct KernelConfig {
    /// SQLite file the ledger opens (falls back to in-memory on failure).
    pub ledger_path: PathBuf,
    /// Policy engine's declarative rule file. Absent means zero rules.
    pub policy_path: Option<PathBuf>,
    /// Root directory for `path_outside_root`/`list_directory`/`search_file`.
    pub workspace_root: PathBuf,
    /// Directory scanned for inbox messages at boot, if configured.
    pub inbox_dir: Option<PathBuf>,
    /// Backlog file parsed at boot, if configured.
    pub backlog_path: Option<PathBuf>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from("agent_kernel.db"),
            policy_path: None,
            workspace_root: PathBuf::from("."),
            inbox_dir: None,
            backlog_path: None,
        }
    }
}

impl KernelConfig {
    /// Loads configuration from a TOML file at `path`.
    ///
    /// Relative `ledger_path`/`policy_path`/`inbox_dir`/`backlog_path` entries
    /// are resolved against `workspace_root` once it is known; callers that
    /// need absolute paths should join them explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if its contents are not valid TOML for this
    /// shape.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawKernelConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let defaults = Self::default();
        Ok(Self {
            ledger_path: raw.ledger_path.unwrap_or(defaults.ledger_path),
            policy_path: raw.policy_path,
            workspace_root: raw.workspace_root.unwrap_or(defaults.workspace_root),
            inbox_dir: raw.inbox_dir,
            backlog_path: raw.backlog_path,
        })
    }
}
