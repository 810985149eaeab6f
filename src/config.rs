use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Directory (relative to the project root) holding phpsight's own files.
pub const CONFIG_DIR: &str = ".phpsight";

/// phpsight configuration from `.phpsight/config.toml`
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct PhpsightConfig {
    #[serde(default)]
    pub walker: WalkerConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WalkerConfig {
    /// Path fragments skipped during traversal (substring match on the relative path)
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    /// Extensions scanned by `search_code` when the caller gives none
    #[serde(default = "default_search_extensions")]
    pub search_extensions: Vec<String>,
    /// Extension of files the class analyzer and usage finder look at
    #[serde(default = "default_source_extension")]
    pub source_extension: String,
}

fn default_exclude() -> Vec<String> {
    [
        "vendor",
        "node_modules",
        ".git",
        "storage/framework",
        "storage/logs",
        "bootstrap/cache",
        "public/build",
        CONFIG_DIR,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_search_extensions() -> Vec<String> {
    [
        ".php",
        ".js",
        ".ts",
        ".vue",
        ".css",
        ".scss",
        ".json",
        ".md",
        ".yml",
        ".yaml",
        ".xml",
        ".twig",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_source_extension() -> String {
    ".php".to_string()
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
            search_extensions: default_search_extensions(),
            source_extension: default_source_extension(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LimitsConfig {
    /// Matched lines longer than this are cut
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
    /// Files reported by `search_code` after ranking
    #[serde(default = "default_max_result_files")]
    pub max_result_files: usize,
    /// Default depth for `project_tree`
    #[serde(default = "default_tree_depth")]
    pub tree_depth: usize,
}

fn default_max_line_length() -> usize {
    200
}
fn default_max_result_files() -> usize {
    50
}
fn default_tree_depth() -> usize {
    3
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_line_length: default_max_line_length(),
            max_result_files: default_max_result_files(),
            tree_depth: default_tree_depth(),
        }
    }
}

/// Read `<config_dir>/config.toml`. A missing file means defaults; an unreadable
/// or malformed one is logged and also yields defaults, so the server still starts.
pub fn load_config(config_dir: &Path) -> PhpsightConfig {
    let config_path = config_dir.join("config.toml");
    let parsed: Result<PhpsightConfig, Option<String>> = std::fs::read_to_string(&config_path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => None,
            _ => Some(e.to_string()),
        })
        .and_then(|content| toml::from_str(&content).map_err(|e| Some(e.to_string())));

    match parsed {
        Ok(config) => config,
        Err(reason) => {
            if let Some(reason) = reason {
                tracing::warn!("Ignoring {}: {}", config_path.display(), reason);
            }
            PhpsightConfig::default()
        }
    }
}

/// Pick the project root: explicit value (flag or env) first, then the working directory.
///
/// The result is made absolute but not canonicalized and not checked for existence.
pub fn resolve_project_root(explicit: Option<&str>) -> std::io::Result<PathBuf> {
    let raw = match explicit {
        Some(p) if !p.trim().is_empty() => PathBuf::from(p.trim()),
        _ => std::env::current_dir()?,
    };
    std::path::absolute(raw)
}

pub const DEFAULT_CONFIG: &str = r#"# phpsight configuration
# See: phpsight config --help

[walker]
exclude = ["vendor", "node_modules", ".git", "storage/framework", "storage/logs", "bootstrap/cache", "public/build", ".phpsight"]
search_extensions = [".php", ".js", ".ts", ".vue", ".css", ".scss", ".json", ".md", ".yml", ".yaml", ".xml", ".twig"]
source_extension = ".php"

[limits]
max_line_length = 200
max_result_files = 50
tree_depth = 3
"#;
