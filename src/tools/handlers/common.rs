use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::config::PhpsightConfig;
use crate::error::ToolError;
use crate::sandbox::Sandbox;
use crate::walker::{ExclusionSet, TreeWalker};

/// Context for executing tools. Arc-wrapped so it clones into spawned tasks.
#[derive(Clone)]
pub struct ToolContext {
    pub sandbox: Arc<Sandbox>,
    pub walker: Arc<TreeWalker>,
    pub config: Arc<PhpsightConfig>,
}

impl ToolContext {
    pub fn new(root: impl Into<PathBuf>, config: PhpsightConfig) -> Self {
        let sandbox = Sandbox::new(root);
        let walker = TreeWalker::new(
            sandbox.root(),
            ExclusionSet::new(config.walker.exclude.iter().cloned()),
        );
        Self {
            sandbox: Arc::new(sandbox),
            walker: Arc::new(walker),
            config: Arc::new(config),
        }
    }

    pub fn root(&self) -> &Path {
        self.sandbox.root()
    }

    /// Resolve an optional directory argument (default: project root) and
    /// require it to be an existing directory.
    pub fn resolve_dir(&self, rel: Option<&str>) -> Result<PathBuf, ToolError> {
        let rel = rel.unwrap_or(".");
        let abs = self.sandbox.resolve(rel)?;
        if !abs.exists() {
            return Err(ToolError::NotFound(format!("Directory not found: {}", rel)));
        }
        if !abs.is_dir() {
            return Err(ToolError::InvalidParams(format!("Not a directory: {}", rel)));
        }
        Ok(abs)
    }

    /// Resolve a file argument and read it as UTF-8 text.
    pub async fn read_text(&self, rel: &str) -> Result<(PathBuf, String), ToolError> {
        let abs = self.sandbox.resolve(rel)?;
        let meta = match tokio::fs::metadata(&abs).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ToolError::NotFound(format!("File not found: {}", rel)))
            }
            Err(e) => return Err(e.into()),
        };
        if meta.is_dir() {
            return Err(ToolError::InvalidParams(format!("Is a directory: {}", rel)));
        }
        let content = tokio::fs::read_to_string(&abs).await?;
        Ok((abs, content))
    }
}

pub fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidParams(format!("{} is required", key)))
}

pub fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
}

pub fn optional_bool(args: &Value, key: &str, default: bool) -> bool {
    args.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
}

/// Array of strings, or a single comma-separated string.
pub fn string_list(args: &Value, key: &str) -> Option<Vec<String>> {
    let list: Vec<String> = match args.get(key)? {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .collect(),
        Value::String(s) => s.split(',').map(|p| p.trim().to_string()).collect(),
        _ => return None,
    };
    let list: Vec<String> = list.into_iter().filter(|s| !s.is_empty()).collect();
    (!list.is_empty()).then_some(list)
}

/// Extensions are suffix-matched, so make sure each carries its leading dot.
pub fn normalize_extensions(exts: Vec<String>) -> Vec<String> {
    exts.into_iter()
        .map(|e| {
            if e.starts_with('.') {
                e
            } else {
                format!(".{}", e)
            }
        })
        .collect()
}
