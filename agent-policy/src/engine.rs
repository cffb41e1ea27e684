//! Path-based rule engine enforcing the safety policy.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::contracts::ToolInvocation;
use crate::decision::PolicyDecision;

/// Errors surfaced while loading or evaluating policy configuration.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The configuration file exists but could not be read.
    #[error("failed to read policy configuration at {path}: {source}")]
    Read {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file exists but is not valid TOML, or fails the schema.
    #[error("malformed policy configuration at {path}: {source}")]
    Parse {
        /// Path that failed to parse.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
}

/// Result alias for policy configuration operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// A single `[[safety_rules]]` entry as it appears in the TOML configuration file.
#[derive(Debug, Clone, Deserialize)]
struct RawRule {
    id: String,
    #[serde(default)]
    tool_name: Option<String>,
    action: String,
    #[serde(default)]
    condition: Option<String>,
    #[serde(default)]
    pattern: Option<String>,
    message: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    safety_rules: Vec<RawRule>,
}

/// Path-matching condition a rule can require.
#[derive(Debug, Clone)]
enum PathCondition {
    /// Substring match against the string form of the `path` parameter.
    Contains(String),
    /// Exact equality against the string form of the `path` parameter.
    Matches(String),
    /// The resolved `path` parameter lies outside the configured project root.
    OutsideRoot,
    /// An unrecognized condition kind, forward-compatible no-op.
    Unknown,
}

/// One entry in the policy rule set.
#[derive(Debug, Clone)]
struct Rule {
    id: String,
    tool_name: Option<String>,
    blocks: bool,
    condition: Option<PathCondition>,
    message: String,
}

impl Rule {
    fn matches(&self, invocation: &ToolInvocation<'_>, workspace_root: &Path) -> bool {
        if let Some(expected) = &self.tool_name {
            if expected != invocation.tool_name() {
                return false;
            }
        }

        let Some(condition) = &self.condition else {
            return true;
        };

        let Some(path) = invocation.path() else {
            return false;
        };

        match condition {
            PathCondition::Contains(pattern) => path.contains(pattern.as_str()),
            PathCondition::Matches(pattern) => path == pattern,
            PathCondition::OutsideRoot => is_outside_root(path, workspace_root),
            PathCondition::Unknown => false,
        }
    }
}

/// Resolves `path` and `root` to canonical absolute paths and checks containment.
///
/// Any resolution failure (the path does not exist, a component is not
/// traversable) is treated as "outside the root" — fail-closed, per the
/// safety contract.
fn is_outside_root(path: &str, root: &Path) -> bool {
    let Ok(canonical_path) = fs::canonicalize(path) else {
        return true;
    };
    let Ok(canonical_root) = fs::canonicalize(root) else {
        return true;
    };
    !canonical_path.starts_with(canonical_root)
}

/// Rule-based policy engine, evaluated in declaration order.
///
/// The first `block` rule whose condition matches short-circuits the
/// evaluation. Non-block actions are accepted by the loader but never
/// influence the decision: a rule recorded as `"warn"` or `"audit"` in the
/// configuration file is parsed, kept around, and simply never fires a
/// block.
#[derive(Debug)]
pub struct PolicyEngine {
    rules: Vec<Rule>,
    workspace_root: PathBuf,
}

impl PolicyEngine {
    /// Constructs an engine with no rules: every invocation is permitted.
    ///
    /// This is the fail-open default used when no configuration file exists.
    #[must_use]
    pub fn empty(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            rules: Vec::new(),
            workspace_root: workspace_root.into(),
        }
    }

    /// Loads rules from a TOML configuration file rooted at `workspace_root`.
    ///
    /// A missing file is not an error: it yields an empty rule set (see
    /// [`Self::empty`]). A present-but-malformed file is a hard error — the
    /// kernel should refuse to boot rather than run with a rule set it
    /// could not parse.
    pub fn from_config_file(
        path: impl AsRef<Path>,
        workspace_root: impl Into<PathBuf>,
    ) -> PolicyResult<Self> {
        let path = path.as_ref();
        let workspace_root = workspace_root.into();

        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::empty(workspace_root));
            }
            Err(source) => {
                return Err(PolicyError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let raw: RawConfig = toml::from_str(&text).map_err(|source| PolicyError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let rules = raw
            .safety_rules
            .into_iter()
            .map(|raw_rule| {
                let pattern = raw_rule.pattern.unwrap_or_default();
                let condition = raw_rule.condition.map(|kind| match kind.as_str() {
                    "path_contains" => PathCondition::Contains(pattern.clone()),
                    "path_matches" => PathCondition::Matches(pattern.clone()),
                    "path_outside_root" => PathCondition::OutsideRoot,
                    _ => PathCondition::Unknown,
                });
                Rule {
                    id: raw_rule.id,
                    tool_name: raw_rule.tool_name,
                    blocks: raw_rule.action == "block",
                    condition,
                    message: raw_rule.message,
                }
            })
            .collect();

        Ok(Self {
            rules,
            workspace_root,
        })
    }

    /// Evaluates a proposed tool invocation against the rule set.
    ///
    /// Iterates rules in declaration order; the first matching `block` rule
    /// short-circuits with a blocking decision. No match, or a configuration
    /// with no rules at all, permits the invocation.
    #[must_use]
    pub fn evaluate(&self, invocation: &ToolInvocation<'_>) -> PolicyDecision {
        for rule in &self.rules {
            if !rule.blocks {
                continue;
            }
            if rule.matches(invocation, &self.workspace_root) {
                debug!(rule = rule.id.as_str(), tool = invocation.tool_name(), "policy rule blocked invocation");
                return PolicyDecision::block(rule.id.clone(), rule.message.clone());
            }
        }

        PolicyDecision::permit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value, json};
    use std::io::Write;

    fn invocation_with_path<'a>(map: &'a Map<String, Value>, tool_name: &'a str) -> ToolInvocation<'a> {
        ToolInvocation::new(tool_name, map)
    }

    #[test]
    fn empty_config_permits_everything() {
        let engine = PolicyEngine::empty(std::env::temp_dir());
        let params = json!({"path": "/etc/passwd"}).as_object().unwrap().clone();
        let decision = engine.evaluate(&invocation_with_path(&params, "read_file"));
        assert!(!decision.is_blocked());
    }

    #[test]
    fn missing_config_file_is_fail_open() {
        let engine =
            PolicyEngine::from_config_file("/nonexistent/policy.toml", std::env::temp_dir())
                .unwrap();
        assert!(engine.rules.is_empty());
    }

    #[test]
    fn path_contains_blocks_match() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("policy.toml");
        let mut file = fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
[[safety_rules]]
id = "no-env-files"
action = "block"
condition = "path_contains"
pattern = ".env"
message = "Reading .env files is forbidden."
"#
        )
        .unwrap();

        let engine = PolicyEngine::from_config_file(&config_path, dir.path()).unwrap();
        let params = json!({"path": "/project/.env"}).as_object().unwrap().clone();
        let decision = engine.evaluate(&invocation_with_path(&params, "read_file"));
        assert!(decision.is_blocked());
        assert_eq!(decision.rule_name(), Some("no-env-files"));
        assert_eq!(decision.reason(), Some("Reading .env files is forbidden."));
    }

    #[test]
    fn non_block_action_never_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("policy.toml");
        let mut file = fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
[[safety_rules]]
id = "audit-everything"
action = "warn"
condition = "path_contains"
pattern = ""
message = "Every path is being audited."
"#
        )
        .unwrap();

        let engine = PolicyEngine::from_config_file(&config_path, dir.path()).unwrap();
        let params = json!({"path": "/anything"}).as_object().unwrap().clone();
        let decision = engine.evaluate(&invocation_with_path(&params, "read_file"));
        assert!(!decision.is_blocked());
    }

    #[test]
    fn missing_path_parameter_never_blocks_path_rule() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("policy.toml");
        let mut file = fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
[[safety_rules]]
id = "no-env-files"
action = "block"
condition = "path_contains"
pattern = ".env"
message = "Reading .env files is forbidden."
"#
        )
        .unwrap();

        let engine = PolicyEngine::from_config_file(&config_path, dir.path()).unwrap();
        let params = json!({"agent_id": "abc"}).as_object().unwrap().clone();
        let decision = engine.evaluate(&invocation_with_path(&params, "delegate_task"));
        assert!(!decision.is_blocked());
    }

    #[test]
    fn path_outside_root_is_fail_closed_on_unresolvable_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("policy.toml");
        let mut file = fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
[[safety_rules]]
id = "stay-in-workspace"
action = "block"
condition = "path_outside_root"
message = "Paths outside the workspace root are forbidden."
"#
        )
        .unwrap();

        let engine = PolicyEngine::from_config_file(&config_path, dir.path()).unwrap();
        let params = json!({"path": "/does/not/exist"}).as_object().unwrap().clone();
        let decision = engine.evaluate(&invocation_with_path(&params, "write_file"));
        assert!(decision.is_blocked());
    }

    #[test]
    fn path_inside_root_is_permitted() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("policy.toml");
        let mut file = fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
[[safety_rules]]
id = "stay-in-workspace"
action = "block"
condition = "path_outside_root"
message = "Paths outside the workspace root are forbidden."
"#
        )
        .unwrap();
        let inner_file = dir.path().join("inner.txt");
        fs::write(&inner_file, "hi").unwrap();

        let engine = PolicyEngine::from_config_file(&config_path, dir.path()).unwrap();
        let params = json!({"path": inner_file.to_str().unwrap()}).as_object().unwrap().clone();
        let decision = engine.evaluate(&invocation_with_path(&params, "write_file"));
        assert!(!decision.is_blocked());
    }

    #[test]
    fn unknown_condition_never_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("policy.toml");
        let mut file = fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
[[safety_rules]]
id = "future-rule"
action = "block"
condition = "path_has_extension"
pattern = ".exe"
message = "Executables are forbidden."
"#
        )
        .unwrap();

        let engine = PolicyEngine::from_config_file(&config_path, dir.path()).unwrap();
        let params = json!({"path": "/anything.exe"}).as_object().unwrap().clone();
        let decision = engine.evaluate(&invocation_with_path(&params, "read_file"));
        assert!(!decision.is_blocked());
    }

    #[test]
    fn first_matching_block_rule_wins() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("policy.toml");
        let mut file = fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
[[safety_rules]]
id = "rule-one"
action = "block"
condition = "path_contains"
pattern = "secret"
message = "Secrets are forbidden."

[[safety_rules]]
id = "rule-two"
action = "block"
condition = "path_contains"
pattern = "ret"
message = "Matched rule two."
"#
        )
        .unwrap();

        let engine = PolicyEngine::from_config_file(&config_path, dir.path()).unwrap();
        let params = json!({"path": "/project/secret.txt"}).as_object().unwrap().clone();
        let decision = engine.evaluate(&invocation_with_path(&params, "read_file"));
        assert_eq!(decision.rule_name(), Some("rule-one"));
    }
}
