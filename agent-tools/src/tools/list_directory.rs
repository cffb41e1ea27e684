//! `list_directory`: lists entries under a path, confined to the workspace root.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};

use crate::protocol::Tool;

/// Lists directory entries, refusing to escape the configured workspace root.
#[derive(Debug)]
pub struct ListDirectoryTool {
    workspace_root: PathBuf,
}

impl ListDirectoryTool {
    /// Creates a tool confined to `workspace_root`.
    #[must_use]
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
        }
    }
}

#[async_trait::async_trait]
impl Tool for ListDirectoryTool {
    fn name(&self) -> &str {
        "list_directory"
    }

    fn description(&self) -> &str {
        "List the files and subdirectories under a path within the workspace."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": { "type": "string" },
            },
        })
    }

    fn validate(&self, parameters: &Map<String, Value>) -> Result<(), String> {
        if let Some(value) = parameters.get("path") {
            if !value.is_string() {
                return Err("parameter `path` must be a string".to_string());
            }
        }
        Ok(())
    }

    async fn execute(&self, parameters: Map<String, Value>) -> Result<Value, String> {
        let target = parameters
            .get("path")
            .and_then(Value::as_str)
            .map_or_else(|| self.workspace_root.clone(), PathBuf::from);

        let resolved = resolve_within_root(&target, &self.workspace_root)?;

        let mut read_dir = tokio::fs::read_dir(&resolved)
            .await
            .map_err(|source| format!("failed to list {}: {source}", resolved.display()))?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|source| format!("failed to read directory entry: {source}"))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|source| format!("failed to stat entry: {source}"))?;
            let label = if file_type.is_dir() { "[DIR]" } else { "[FILE]" };
            entries.push(format!("{label} {}", entry.file_name().to_string_lossy()));
        }
        entries.sort();

        Ok(json!({ "entries": entries }))
    }
}

/// Resolves `path` to a canonical absolute path and verifies it lies under `root`.
fn resolve_within_root(path: &Path, root: &Path) -> Result<PathBuf, String> {
    let canonical_root = std::fs::canonicalize(root)
        .map_err(|source| format!("workspace root {} is invalid: {source}", root.display()))?;
    let canonical_path = std::fs::canonicalize(path)
        .map_err(|source| format!("path {} could not be resolved: {source}", path.display()))?;

    if canonical_path.starts_with(&canonical_root) {
        Ok(canonical_path)
    } else {
        Err(format!("path {} lies outside the workspace root", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_sorted_entries() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("b.txt"), "").await.unwrap();
        tokio::fs::create_dir(dir.path().join("a_dir")).await.unwrap();

        let tool = ListDirectoryTool::new(dir.path());
        let output = tool.execute(Map::new()).await.unwrap();
        let entries = output["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], "[DIR] a_dir");
        assert_eq!(entries[1], "[FILE] b.txt");
    }

    #[tokio::test]
    async fn rejects_path_outside_root() {
        let workspace = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();

        let tool = ListDirectoryTool::new(workspace.path());
        let mut params = Map::new();
        params.insert("path".into(), Value::from(outside.path().to_str().unwrap()));

        let error = tool.execute(params).await.unwrap_err();
        assert!(error.contains("outside"));
    }
}
