//! Unified error type for phpsight, mapping tool failures to JSON-RPC codes.

use thiserror::Error;

/// Standard JSON-RPC 2.0 error codes.
const PARSE_ERROR: i32 = -32700;
const INVALID_PARAMS: i32 = -32602;
const METHOD_NOT_FOUND: i32 = -32601;
const INTERNAL_ERROR: i32 = -32603;
/// Application-level server error (implementation-defined).
const SERVER_ERROR: i32 = -32000;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Access denied: path '{0}' is outside the project root")]
    AccessDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File already exists: {0}. Use write_file to overwrite it")]
    AlreadyExists(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    /// JSON-RPC error code for this error variant.
    pub fn rpc_code(&self) -> i32 {
        match self {
            Self::ParseError(_) => PARSE_ERROR,
            Self::InvalidParams(_) => INVALID_PARAMS,
            Self::MethodNotFound(_) => METHOD_NOT_FOUND,
            Self::AccessDenied(_) | Self::NotFound(_) | Self::AlreadyExists(_) | Self::Io(_) => {
                SERVER_ERROR
            }
            Self::Internal(_) => INTERNAL_ERROR,
        }
    }

    /// Convert to (code, message) pair for RpcResponse::error.
    pub fn into_rpc(self) -> (i32, String) {
        let code = self.rpc_code();
        (code, self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_codes() {
        assert_eq!(ToolError::ParseError("x".into()).rpc_code(), -32700);
        assert_eq!(ToolError::MethodNotFound("x".into()).rpc_code(), -32601);
        assert_eq!(ToolError::AccessDenied("../x".into()).rpc_code(), -32000);
    }

    #[test]
    fn test_already_exists_points_to_write_file() {
        let (_, msg) = ToolError::AlreadyExists("app/User.php".into()).into_rpc();
        assert!(msg.contains("write_file"));
    }
}
