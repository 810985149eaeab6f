//! JSON-RPC 2.0 message types for the stdio server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

/// Incoming JSON-RPC request. A missing `id` marks a notification.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[allow(dead_code)]
    #[serde(default)]
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl RpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// One response line on stdout. Exactly one of `result` and `error` is set;
/// tool failures travel inside `result` with `isError`, and `error` carries
/// protocol faults only.
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// Protocol-level failure, code taken from [`ToolError::rpc_code`].
#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message,
                data: None,
            }),
        }
    }

    pub fn from_tool_error(id: Value, err: ToolError) -> Self {
        let (code, message) = err.into_rpc();
        Self::error(id, code, message)
    }
}
