//! File mutation tools
//!
//! Implements:
//! - write_file - overwrite an existing file
//! - create_file - create a new file, refusing to clobber
//! - delete_file - remove a single file
//! - search_and_replace - literal per-line replace within one file
//!
//! None of these lock: a concurrent external edit between read and write is lost.

use super::common::{required_str, ToolContext};
use crate::error::ToolError;
use crate::search::replace_in_text;
use crate::walker::format_size;
use anyhow::Result;
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;

/// Overwrite an existing file
pub async fn tool_write_file(args: Value, ctx: &ToolContext) -> Result<Value> {
    let path = required_str(&args, "path")?;
    let content = required_str(&args, "content")?;

    let abs_path = ctx.sandbox.resolve(path)?;
    if !abs_path.is_file() {
        return Err(ToolError::NotFound(format!(
            "File not found: {}. Use create_file for new files",
            path
        ))
        .into());
    }

    tokio::fs::write(&abs_path, content).await?;
    tracing::info!("Wrote {} ({} bytes)", path, content.len());

    Ok(json!({
        "path": path,
        "status": "written",
        "size": format_size(content.len() as u64),
        "lines": content.lines().count(),
    }))
}

/// Create a new file (parent directories included)
pub async fn tool_create_file(args: Value, ctx: &ToolContext) -> Result<Value> {
    let path = required_str(&args, "path")?;
    let content = required_str(&args, "content")?;

    let abs_path = ctx.sandbox.resolve(path)?;
    if abs_path.exists() {
        return Err(ToolError::AlreadyExists(path.to_string()).into());
    }

    if let Some(parent) = abs_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut file = match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&abs_path)
        .await
    {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(ToolError::AlreadyExists(path.to_string()).into())
        }
        Err(e) => return Err(e.into()),
    };
    file.write_all(content.as_bytes()).await?;
    file.flush().await?;
    tracing::info!("Created {}", path);

    Ok(json!({
        "path": path,
        "status": "created",
        "size": format_size(content.len() as u64),
        "lines": content.lines().count(),
    }))
}

/// Delete a single file
pub async fn tool_delete_file(args: Value, ctx: &ToolContext) -> Result<Value> {
    let path = required_str(&args, "path")?;
    let abs_path = ctx.sandbox.resolve(path)?;

    if !abs_path.exists() {
        return Err(ToolError::NotFound(format!("File not found: {}", path)).into());
    }
    if abs_path.is_dir() {
        return Err(ToolError::InvalidParams(format!(
            "{} is a directory; only files can be deleted",
            path
        ))
        .into());
    }

    tokio::fs::remove_file(&abs_path).await?;
    tracing::info!("Deleted {}", path);

    Ok(json!({
        "path": path,
        "status": "deleted",
    }))
}

/// Replace every literal occurrence of `search` in one file
pub async fn tool_search_and_replace(args: Value, ctx: &ToolContext) -> Result<Value> {
    let path = required_str(&args, "path")?;
    let search = required_str(&args, "search")?;
    let replace = required_str(&args, "replace")?;

    if search.is_empty() {
        return Err(ToolError::InvalidParams("search must not be empty".into()).into());
    }

    let (abs_path, content) = ctx.read_text(path).await?;
    let (new_content, changes) = replace_in_text(&content, search, replace);

    if changes.is_empty() {
        return Ok(json!({
            "path": path,
            "changes": 0,
            "message": format!("No occurrences of '{}' in {}", search, path),
            "details": [],
        }));
    }

    tokio::fs::write(&abs_path, &new_content).await?;
    tracing::info!("Replaced on {} line(s) in {}", changes.len(), path);

    Ok(json!({
        "path": path,
        "changes": changes.len(),
        "details": changes,
    }))
}
