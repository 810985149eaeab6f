use super::common::{required_str, ToolContext};
use crate::error::ToolError;
use anyhow::Result;
use serde_json::{json, Value};

/// A clamped line window over a file, rendered with a header and a
/// right-aligned line-number gutter.
#[derive(Debug, PartialEq)]
pub struct RangeView {
    pub start_line: usize,
    pub end_line: usize,
    pub total_lines: usize,
    pub text: String,
}

/// `end_line < 0` (conventionally -1) means "through end of file".
pub fn render_range(path: &str, content: &str, start_line: i64, end_line: i64) -> RangeView {
    let lines: Vec<&str> = content.lines().collect();
    let total = lines.len();

    let start = start_line.max(1) as usize;
    let end = if end_line < 0 {
        total
    } else {
        (end_line as usize).min(total)
    };

    let width = end.max(1).to_string().len();
    let mut text = format!("File: {} (lines {}-{} of {})\n", path, start, end, total);
    if start <= end {
        for (idx, line) in lines[start - 1..end].iter().enumerate() {
            text.push_str(&format!("{:>width$} | {}\n", start + idx, line, width = width));
        }
    }

    RangeView {
        start_line: start,
        end_line: end,
        total_lines: total,
        text,
    }
}

pub async fn tool_read_file(args: Value, ctx: &ToolContext) -> Result<Value> {
    let path = required_str(&args, "path")?;
    let start_line = args.get("start_line").and_then(|v| v.as_i64()).unwrap_or(1);
    let end_line = args.get("end_line").and_then(|v| v.as_i64()).unwrap_or(-1);

    let (_, content) = ctx.read_text(path).await?;
    let view = render_range(path, &content, start_line, end_line);

    Ok(json!({
        "path": path,
        "start_line": view.start_line,
        "end_line": view.end_line,
        "total_lines": view.total_lines,
        "content": view.text,
    }))
}

/// Read several files concurrently; a failing file becomes an error entry.
pub async fn tool_read_multiple_files(args: Value, ctx: &ToolContext) -> Result<Value> {
    let paths: Vec<String> = args
        .get("paths")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ToolError::InvalidParams("paths array is required".into()))?
        .iter()
        .filter_map(|v| v.as_str().map(String::from))
        .collect();

    let tasks: Vec<_> = paths
        .into_iter()
        .map(|path| {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                match ctx.read_text(&path).await {
                    Ok((_, content)) => json!({
                        "path": path,
                        "lines": content.lines().count(),
                        "content": content,
                    }),
                    Err(e) => json!({ "path": path, "error": e.to_string() }),
                }
            })
        })
        .collect();

    let mut files = Vec::with_capacity(tasks.len());
    for task in futures::future::join_all(tasks).await {
        match task {
            Ok(entry) => files.push(entry),
            Err(e) => return Err(anyhow::anyhow!("Task join error: {}", e)),
        }
    }

    let read = files.iter().filter(|f| f.get("error").is_none()).count();
    let failed = files.len() - read;

    Ok(json!({
        "files": files,
        "read": read,
        "failed": failed,
    }))
}
