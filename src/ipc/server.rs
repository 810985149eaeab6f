//! Line-delimited JSON-RPC server over stdio.

use anyhow::Result;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::protocol::{RpcRequest, RpcResponse};
use crate::error::ToolError;
use crate::tools::{self, ToolContext};

/// Serve on the process's stdin/stdout until stdin closes.
pub async fn serve(ctx: ToolContext) -> Result<()> {
    tracing::info!("Serving on stdio (root: {})", ctx.root().display());
    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();
    serve_io(reader, writer, ctx).await?;
    tracing::info!("stdin closed, shutting down");
    Ok(())
}

/// Read one JSON-RPC message (or batch) per line, write one response line each.
pub async fn serve_io<R, W>(mut reader: R, mut writer: W, ctx: ToolContext) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();

    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            break; // EOF
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(out) = handle_line(trimmed, &ctx).await? {
            writer.write_all(out.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
    }

    Ok(())
}

/// Handle one raw line; `None` when nothing should be written back.
async fn handle_line(line: &str, ctx: &ToolContext) -> Result<Option<String>> {
    let parsed: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            let resp = RpcResponse::from_tool_error(Value::Null, ToolError::ParseError(e.to_string()));
            return Ok(Some(serde_json::to_string(&resp)?));
        }
    };

    match parsed {
        Value::Array(batch) if !batch.is_empty() => {
            // JSON-RPC 2.0 batch, processed in parallel
            let handles: Vec<_> = batch
                .into_iter()
                .map(|v| {
                    let ctx = ctx.clone();
                    tokio::spawn(async move { handle_value(v, &ctx).await })
                })
                .collect();

            let mut responses = Vec::with_capacity(handles.len());
            for handle in futures::future::join_all(handles).await {
                match handle {
                    Ok(Some(resp)) => responses.push(resp),
                    Ok(None) => {}
                    Err(e) => tracing::error!("Batch item task failed: {}", e),
                }
            }

            if responses.is_empty() {
                return Ok(None);
            }
            Ok(Some(serde_json::to_string(&responses)?))
        }
        Value::Array(_) => {
            let resp = RpcResponse::error(Value::Null, -32600, "Invalid Request: empty batch".into());
            Ok(Some(serde_json::to_string(&resp)?))
        }
        other => match handle_value(other, ctx).await {
            Some(resp) => Ok(Some(serde_json::to_string(&resp)?)),
            None => Ok(None),
        },
    }
}

async fn handle_value(value: Value, ctx: &ToolContext) -> Option<RpcResponse> {
    match serde_json::from_value::<RpcRequest>(value) {
        Ok(req) => handle_request(req, ctx).await,
        Err(e) => Some(RpcResponse::from_tool_error(
            Value::Null,
            ToolError::ParseError(e.to_string()),
        )),
    }
}

/// Route one request. Notifications are executed but never answered.
pub async fn handle_request(req: RpcRequest, ctx: &ToolContext) -> Option<RpcResponse> {
    let notification = req.is_notification();
    let id = req.id.clone().unwrap_or(Value::Null);

    let response = match req.method.as_str() {
        "initialize" => RpcResponse::success(
            id,
            json!({
                "protocolVersion": "2024-11-05",
                "serverInfo": {
                    "name": "phpsight",
                    "version": env!("CARGO_PKG_VERSION")
                },
                "capabilities": {
                    "tools": { "listChanged": false }
                }
            }),
        ),
        "initialized" | "notifications/initialized" => RpcResponse::success(id, json!({})),
        "ping" => RpcResponse::success(id, json!({})),
        "tools/list" => RpcResponse::success(id, json!({ "tools": tools::core_tools_list() })),
        "tools/call" => handle_tools_call(id, &req.params, ctx).await,
        _ => RpcResponse::from_tool_error(id, ToolError::MethodNotFound(req.method.clone())),
    };

    if notification {
        tracing::debug!("Notification handled: {}", req.method);
        return None;
    }
    Some(response)
}

async fn handle_tools_call(id: Value, params: &Value, ctx: &ToolContext) -> RpcResponse {
    let Some(name) = params.get("name").and_then(|v| v.as_str()) else {
        return RpcResponse::from_tool_error(
            id,
            ToolError::InvalidParams("tools/call requires a tool name".into()),
        );
    };
    let args = params.get("arguments").cloned().unwrap_or(json!({}));

    let start = std::time::Instant::now();
    let result = tools::dispatch(name, args, ctx).await;
    tracing::debug!(
        "tool {} finished in {}ms (ok: {})",
        name,
        start.elapsed().as_millis(),
        result.is_ok()
    );

    match result {
        Ok(value) => {
            let text = serde_json::to_string_pretty(&value).unwrap_or_default();
            RpcResponse::success(id, json!({ "content": [{"type": "text", "text": text}] }))
        }
        Err(e) => RpcResponse::success(
            id,
            json!({
                "content": [{"type": "text", "text": format!("Error: {}", e)}],
                "isError": true
            }),
        ),
    }
}
