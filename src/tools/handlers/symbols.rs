use super::common::{required_str, ToolContext};
use crate::analyzer::analyze;
use crate::error::ToolError;
use crate::usages::find_usages;
use anyhow::Result;
use serde_json::{json, Value};

pub async fn tool_analyze_class(args: Value, ctx: &ToolContext) -> Result<Value> {
    let path = required_str(&args, "path")?;
    let (_, content) = ctx.read_text(path).await?;

    let table = analyze(&content);
    let summary = json!({
        "imports": table.imports.len(),
        "constants": table.constants.len(),
        "properties": table.properties.len(),
        "methods": table.methods.len(),
    });

    let mut out = serde_json::to_value(&table)?;
    if let Some(obj) = out.as_object_mut() {
        obj.insert("path".into(), path.into());
        obj.insert("summary".into(), summary);
    }
    Ok(out)
}

pub async fn tool_find_usages(args: Value, ctx: &ToolContext) -> Result<Value> {
    let symbol = required_str(&args, "symbol")?.trim();
    if symbol.is_empty() {
        return Err(ToolError::InvalidParams("symbol must not be empty".into()).into());
    }

    let exts = [ctx.config.walker.source_extension.clone()];
    let outcome = ctx.walker.collect_files(ctx.root(), &exts);
    let report = find_usages(
        ctx.root(),
        outcome.files,
        symbol,
        ctx.config.limits.max_line_length,
    )
    .await?;

    tracing::debug!("find_usages '{}': {} hits", symbol, report.total_usages);
    Ok(serde_json::to_value(report)?)
}
