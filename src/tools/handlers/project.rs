use super::common::{normalize_extensions, optional_str, string_list, ToolContext};
use crate::error::ToolError;
use crate::project::{summarize_manifest, MANIFEST};
use anyhow::Result;
use serde_json::{json, Value};

pub async fn tool_list_directory(args: Value, ctx: &ToolContext) -> Result<Value> {
    let path = optional_str(&args, "path");
    let extensions = string_list(&args, "extensions").map(normalize_extensions);

    let dir = ctx.resolve_dir(path)?;
    let entries = ctx.walker.list_children(&dir, extensions.as_deref(), true)?;

    Ok(json!({
        "path": path.unwrap_or("."),
        "count": entries.len(),
        "entries": entries,
    }))
}

pub async fn tool_project_tree(args: Value, ctx: &ToolContext) -> Result<Value> {
    let path = optional_str(&args, "path");
    let max_depth = args
        .get("max_depth")
        .and_then(|v| v.as_u64())
        .map(|d| d as usize)
        .unwrap_or(ctx.config.limits.tree_depth);

    let dir = ctx.resolve_dir(path)?;
    let tree = ctx.walker.render_tree(&dir, max_depth);

    Ok(json!({
        "root": path.unwrap_or("."),
        "max_depth": max_depth,
        "tree": tree,
    }))
}

pub async fn tool_find_files(args: Value, ctx: &ToolContext) -> Result<Value> {
    let extensions = string_list(&args, "extensions")
        .map(normalize_extensions)
        .ok_or_else(|| ToolError::InvalidParams("extensions is required".into()))?;
    let path = optional_str(&args, "path");

    let dir = ctx.resolve_dir(path)?;
    let outcome = ctx.walker.collect_files(&dir, &extensions);
    if outcome.skipped_dirs > 0 {
        tracing::debug!("find_files skipped {} unreadable dirs", outcome.skipped_dirs);
    }

    Ok(json!({
        "extensions": extensions,
        "count": outcome.files.len(),
        "skipped_dirs": outcome.skipped_dirs,
        "files": outcome.files,
    }))
}

/// Composer manifest summary
pub async fn tool_project_info(_args: Value, ctx: &ToolContext) -> Result<Value> {
    let manifest_path = ctx.sandbox.resolve(MANIFEST)?;
    let text = match tokio::fs::read_to_string(&manifest_path).await {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ToolError::NotFound(format!(
                "{} not found in project root",
                MANIFEST
            ))
            .into())
        }
        Err(e) => return Err(e.into()),
    };
    let has_artisan = ctx.sandbox.resolve("artisan")?.is_file();

    let info = summarize_manifest(&text, has_artisan)?;
    Ok(serde_json::to_value(info)?)
}
