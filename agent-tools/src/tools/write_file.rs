//! `write_file`: writes text content to a file.

use serde_json::{Map, Value, json};

use crate::protocol::Tool;

/// Writes a UTF-8 text file to disk, optionally creating parent directories.
#[derive(Debug, Default)]
pub struct WriteFileTool;

#[async_trait::async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write text content to a file at the given path."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": { "type": "string" },
                "content": { "type": "string" },
                "create_dirs": { "type": "boolean" },
            },
            "required": ["path", "content"],
        })
    }

    fn validate(&self, parameters: &Map<String, Value>) -> Result<(), String> {
        match parameters.get("path") {
            Some(Value::String(_)) => {}
            Some(_) => return Err("parameter `path` must be a string".to_string()),
            None => return Err("parameter `path` is required".to_string()),
        }
        match parameters.get("content") {
            Some(Value::String(_)) => {}
            Some(_) => return Err("parameter `content` must be a string".to_string()),
            None => return Err("parameter `content` is required".to_string()),
        }
        if let Some(value) = parameters.get("create_dirs") {
            if !value.is_boolean() {
                return Err("parameter `create_dirs` must be a boolean".to_string());
            }
        }
        Ok(())
    }

    async fn execute(&self, parameters: Map<String, Value>) -> Result<Value, String> {
        let path_text = parameters
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| "parameter `path` is required".to_string())?;
        let content = parameters
            .get("content")
            .and_then(Value::as_str)
            .ok_or_else(|| "parameter `content` is required".to_string())?;
        let create_dirs = parameters
            .get("create_dirs")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let path = std::path::Path::new(path_text);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                if create_dirs {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|source| format!("failed to create {}: {source}", parent.display()))?;
                } else {
                    return Err(format!(
                        "parent directory does not exist: {}. Use create_dirs=true to create it.",
                        parent.display()
                    ));
                }
            }
        }

        tokio::fs::write(path, content)
            .await
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::PermissionDenied => format!("permission denied: {path_text}"),
                _ => format!("failed to write {path_text}: {source}"),
            })?;

        Ok(json!({
            "metadata": { "path": path_text, "bytes_written": content.len() },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_file_content() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("out.txt");

        let tool = WriteFileTool;
        let mut params = Map::new();
        params.insert("path".into(), Value::from(file_path.to_str().unwrap()));
        params.insert("content".into(), Value::from("written content"));

        tool.execute(params).await.unwrap();
        let content = tokio::fs::read_to_string(&file_path).await.unwrap();
        assert_eq!(content, "written content");
    }

    #[tokio::test]
    async fn refuses_missing_parent_without_create_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("nested/out.txt");

        let tool = WriteFileTool;
        let mut params = Map::new();
        params.insert("path".into(), Value::from(file_path.to_str().unwrap()));
        params.insert("content".into(), Value::from("x"));

        let error = tool.execute(params).await.unwrap_err();
        assert!(error.contains("create_dirs"));
    }

    #[tokio::test]
    async fn create_dirs_makes_parent() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("nested/out.txt");

        let tool = WriteFileTool;
        let mut params = Map::new();
        params.insert("path".into(), Value::from(file_path.to_str().unwrap()));
        params.insert("content".into(), Value::from("x"));
        params.insert("create_dirs".into(), Value::Bool(true));

        tool.execute(params).await.unwrap();
        assert!(file_path.exists());
    }
}
