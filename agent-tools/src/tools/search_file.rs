//! `search_file`: recursive filename search within the workspace.

use std::path::PathBuf;

use serde_json::{Map, Value, json};

use crate::protocol::Tool;

const MAX_RESULTS: usize = 50;

/// Recursively searches for files whose name contains `pattern`.
///
/// Dotfiles are skipped, except for a conventional `.vibe` directory, which
/// is the one dotfile location expected to hold workspace-relevant state.
#[derive(Debug)]
pub struct SearchFileTool {
    workspace_root: PathBuf,
}

impl SearchFileTool {
    /// Creates a tool searching within `workspace_root`.
    #[must_use]
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
        }
    }
}

#[async_trait::async_trait]
impl Tool for SearchFileTool {
    fn name(&self) -> &str {
        "search_file"
    }

    fn description(&self) -> &str {
        "Recursively search the workspace for files whose name matches a pattern."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": { "type": "string" },
                "path": { "type": "string" },
            },
            "required": ["pattern"],
        })
    }

    fn validate(&self, parameters: &Map<String, Value>) -> Result<(), String> {
        match parameters.get("pattern") {
            Some(Value::String(pattern)) if !pattern.is_empty() => Ok(()),
            Some(Value::String(_)) => Err("parameter `pattern` cannot be empty".to_string()),
            Some(_) => Err("parameter `pattern` must be a string".to_string()),
            None => Err("parameter `pattern` is required".to_string()),
        }
    }

    async fn execute(&self, parameters: Map<String, Value>) -> Result<Value, String> {
        let pattern = parameters
            .get("pattern")
            .and_then(Value::as_str)
            .ok_or_else(|| "parameter `pattern` is required".to_string())?
            .to_string();
        let start = parameters
            .get("path")
            .and_then(Value::as_str)
            .map_or_else(|| self.workspace_root.clone(), PathBuf::from);

        let matches = tokio::task::spawn_blocking(move || walk(&start, &pattern, MAX_RESULTS))
            .await
            .map_err(|source| format!("search task failed: {source}"))?;

        Ok(json!({ "matches": matches }))
    }
}

fn walk(start: &std::path::Path, pattern: &str, limit: usize) -> Vec<String> {
    let mut matches = Vec::new();
    let mut stack = vec![start.to_path_buf()];

    while let Some(dir) = stack.pop() {
        if matches.len() >= limit {
            break;
        }
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            if matches.len() >= limit {
                break;
            }
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if name.starts_with('.') && name != ".vibe" {
                continue;
            }

            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }

            if name.contains(pattern) {
                matches.push(path.to_string_lossy().into_owned());
            }
        }
    }

    matches.sort();
    matches.truncate(limit);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("target.rs"), "").await.unwrap();
        tokio::fs::write(dir.path().join("other.rs"), "").await.unwrap();

        let tool = SearchFileTool::new(dir.path());
        let mut params = Map::new();
        params.insert("pattern".into(), Value::from("target"));

        let output = tool.execute(params).await.unwrap();
        let matches = output["matches"].as_array().unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[tokio::test]
    async fn skips_dotfiles_except_vibe_dir() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir(dir.path().join(".git")).await.unwrap();
        tokio::fs::write(dir.path().join(".git/match.txt"), "").await.unwrap();
        tokio::fs::create_dir(dir.path().join(".vibe")).await.unwrap();
        tokio::fs::write(dir.path().join(".vibe/match.txt"), "").await.unwrap();

        let tool = SearchFileTool::new(dir.path());
        let mut params = Map::new();
        params.insert("pattern".into(), Value::from("match"));

        let output = tool.execute(params).await.unwrap();
        let matches = output["matches"].as_array().unwrap();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].as_str().unwrap().contains(".vibe"));
    }
}
