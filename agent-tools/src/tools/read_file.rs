//! `read_file`: returns a file's contents as text.

use serde_json::{Map, Value, json};

use crate::protocol::Tool;

/// Reads a UTF-8 text file from disk.
#[derive(Debug, Default)]
pub struct ReadFileTool;

#[async_trait::async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a text file at the given path."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": { "type": "string" },
            },
            "required": ["path"],
        })
    }

    fn validate(&self, parameters: &Map<String, Value>) -> Result<(), String> {
        match parameters.get("path") {
            Some(Value::String(path)) if !path.is_empty() => Ok(()),
            Some(Value::String(_)) => Err("parameter `path` cannot be empty".to_string()),
            Some(_) => Err("parameter `path` must be a string".to_string()),
            None => Err("parameter `path` is required".to_string()),
        }
    }

    async fn execute(&self, parameters: Map<String, Value>) -> Result<Value, String> {
        let path = parameters
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| "parameter `path` is required".to_string())?;

        let bytes = tokio::fs::read(path).await.map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => format!("file not found: {path}"),
            std::io::ErrorKind::PermissionDenied => format!("permission denied: {path}"),
            _ => format!("failed to read {path}: {source}"),
        })?;

        let content = String::from_utf8(bytes)
            .map_err(|_| format!("file is not valid UTF-8 text: {path}"))?;

        Ok(json!({
            "content": content,
            "metadata": { "path": path, "size_bytes": content.len() },
        }))
    }
}
