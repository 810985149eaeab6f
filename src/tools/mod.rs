//! Tool dispatch and the static tool catalogue served by `tools/list`.

pub mod handlers;

use anyhow::Result;
use serde_json::{json, Value};

use crate::error::ToolError;
use handlers::*;

pub use handlers::common::ToolContext;

/// Dispatch a tool call by name. Returns structured JSON.
pub async fn dispatch(name: &str, args: Value, ctx: &ToolContext) -> Result<Value> {
    match name {
        // Single-file primitives
        "read_file" => files::tool_read_file(args, ctx).await,
        "read_multiple_files" => files::tool_read_multiple_files(args, ctx).await,
        "write_file" => file_ops::tool_write_file(args, ctx).await,
        "create_file" => file_ops::tool_create_file(args, ctx).await,
        "delete_file" => file_ops::tool_delete_file(args, ctx).await,
        "search_and_replace" => file_ops::tool_search_and_replace(args, ctx).await,
        // Tree walking
        "list_directory" => project::tool_list_directory(args, ctx).await,
        "project_tree" => project::tool_project_tree(args, ctx).await,
        "find_files" => project::tool_find_files(args, ctx).await,
        "project_info" => project::tool_project_info(args, ctx).await,
        // Search and structure
        "search_code" => search::tool_search_code(args, ctx).await,
        "analyze_class" => symbols::tool_analyze_class(args, ctx).await,
        "find_usages" => symbols::tool_find_usages(args, ctx).await,
        _ => Err(ToolError::MethodNotFound(name.to_string()).into()),
    }
}

/// Return the static list of tools.
pub fn core_tools_list() -> Vec<Value> {
    vec![
        json!({
            "name": "read_file",
            "description": "Read a file with line numbers. Optionally restrict to a line range; end_line -1 reads through end of file.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "File path relative to the project root" },
                    "start_line": { "type": "integer", "description": "First line, 1-based (default: 1)", "default": 1 },
                    "end_line": { "type": "integer", "description": "Last line, inclusive (default: -1 = end of file)", "default": -1 }
                },
                "required": ["path"]
            }
        }),
        json!({
            "name": "read_multiple_files",
            "description": "Read several files at once. A file that cannot be read yields an error entry instead of failing the call.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "paths": { "type": "array", "items": { "type": "string" }, "description": "File paths relative to the project root" }
                },
                "required": ["paths"]
            }
        }),
        json!({
            "name": "write_file",
            "description": "Overwrite an existing file. Fails if the file does not exist; use create_file for new files.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "File path relative to the project root" },
                    "content": { "type": "string", "description": "Full new content" }
                },
                "required": ["path", "content"]
            }
        }),
        json!({
            "name": "create_file",
            "description": "Create a new file, including missing parent directories. Fails if the file already exists.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "File path relative to the project root" },
                    "content": { "type": "string", "description": "File content" }
                },
                "required": ["path", "content"]
            }
        }),
        json!({
            "name": "delete_file",
            "description": "Delete a single file. Directories are refused.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "File path relative to the project root" }
                },
                "required": ["path"]
            }
        }),
        json!({
            "name": "list_directory",
            "description": "List one directory level: directories first, then files with human-readable sizes. Vendor, build and hidden entries are skipped.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Directory relative to the project root (default: root)" },
                    "extensions": { "type": "array", "items": { "type": "string" }, "description": "Only list files with these extensions (e.g. ['.php'])" }
                }
            }
        }),
        json!({
            "name": "project_tree",
            "description": "Render the project structure as a tree, skipping vendor, build and hidden directories.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Directory relative to the project root (default: root)" },
                    "max_depth": { "type": "integer", "description": "Levels to descend (default: 3)", "default": 3 }
                }
            }
        }),
        json!({
            "name": "find_files",
            "description": "Recursively find files by extension. Multi-part extensions such as '.blade.php' are supported.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "extensions": { "type": "array", "items": { "type": "string" }, "description": "Extensions to match (e.g. ['.php', '.blade.php'])" },
                    "path": { "type": "string", "description": "Directory to search within (default: root)" }
                },
                "required": ["extensions"]
            }
        }),
        json!({
            "name": "search_code",
            "description": "Search file contents line by line. Literal, case-insensitive matching by default. Results are ranked by match count and capped at 50 files.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "pattern": { "type": "string", "description": "Text (or regex when regex=true) to search for" },
                    "extensions": { "type": "array", "items": { "type": "string" }, "description": "Extensions to search (default: common PHP project files)" },
                    "case_sensitive": { "type": "boolean", "description": "Match case exactly (default: false)", "default": false },
                    "regex": { "type": "boolean", "description": "Treat pattern as a regular expression (default: false)", "default": false },
                    "path": { "type": "string", "description": "Directory to search within (default: root)" }
                },
                "required": ["pattern"]
            }
        }),
        json!({
            "name": "search_and_replace",
            "description": "Replace every literal occurrence of a string in one file. Reports before/after per changed line; writes nothing when there is no match.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "File path relative to the project root" },
                    "search": { "type": "string", "description": "Literal text to find" },
                    "replace": { "type": "string", "description": "Replacement text" }
                },
                "required": ["path", "search", "replace"]
            }
        }),
        json!({
            "name": "analyze_class",
            "description": "Extract namespace, class/interface/trait/enum header, traits, imports, constants, properties and methods from a PHP file.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "PHP file relative to the project root" }
                },
                "required": ["path"]
            }
        }),
        json!({
            "name": "find_usages",
            "description": "Find where a class, interface or trait is imported, extended, implemented or referenced across all PHP files.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "symbol": { "type": "string", "description": "Short or fully qualified name (e.g. 'User' or 'App\\\\Models\\\\User')" }
                },
                "required": ["symbol"]
            }
        }),
        json!({
            "name": "project_info",
            "description": "Summarize composer.json: package name, PHP version, dependencies and PSR-4 autoload map.",
            "inputSchema": {
                "type": "object",
                "properties": {}
            }
        }),
    ]
}
