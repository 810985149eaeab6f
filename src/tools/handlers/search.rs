use super::common::{
    normalize_extensions, optional_bool, optional_str, required_str, string_list, ToolContext,
};
use crate::search::{build_matcher, search_files, SearchOptions};
use anyhow::Result;
use serde_json::Value;

/// Project-wide line search, ranked by match density.
pub async fn tool_search_code(args: Value, ctx: &ToolContext) -> Result<Value> {
    let pattern = required_str(&args, "pattern")?;
    let extensions = normalize_extensions(
        string_list(&args, "extensions")
            .unwrap_or_else(|| ctx.config.walker.search_extensions.clone()),
    );
    let opts = SearchOptions {
        case_sensitive: optional_bool(&args, "case_sensitive", false),
        regex: optional_bool(&args, "regex", false),
        max_line_length: ctx.config.limits.max_line_length,
        max_files: ctx.config.limits.max_result_files,
    };

    let re = build_matcher(pattern, &opts)?;
    let dir = ctx.resolve_dir(optional_str(&args, "path"))?;
    let outcome = ctx.walker.collect_files(&dir, &extensions);

    tracing::debug!(
        "search_code '{}' over {} candidate files",
        pattern,
        outcome.files.len()
    );
    let report = search_files(ctx.root(), outcome.files, pattern, re, &opts).await;

    let mut out = serde_json::to_value(report)?;
    if let Some(obj) = out.as_object_mut() {
        obj.insert("extensions".into(), serde_json::to_value(&extensions)?);
        obj.insert("skipped_dirs".into(), outcome.skipped_dirs.into());
    }
    Ok(out)
}
