//! Composer manifest summary for the `project_info` tool.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

pub const MANIFEST: &str = "composer.json";

#[derive(Debug, Default, Deserialize)]
struct ComposerManifest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "type")]
    package_type: Option<String>,
    #[serde(default)]
    require: BTreeMap<String, String>,
    #[serde(default, rename = "require-dev")]
    require_dev: BTreeMap<String, String>,
    #[serde(default)]
    autoload: Autoload,
}

#[derive(Debug, Default, Deserialize)]
struct Autoload {
    #[serde(default, rename = "psr-4")]
    psr4: BTreeMap<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct ProjectInfo {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub package_type: Option<String>,
    pub php_version: Option<String>,
    pub require: BTreeMap<String, String>,
    pub require_dev: BTreeMap<String, String>,
    /// Namespace prefix -> source directories
    pub psr4: BTreeMap<String, Vec<String>>,
    pub has_artisan: bool,
}

/// Summarize a composer manifest. `has_artisan` is supplied by the caller.
pub fn summarize_manifest(text: &str, has_artisan: bool) -> Result<ProjectInfo, ToolError> {
    let manifest: ComposerManifest = serde_json::from_str(text)
        .map_err(|e| ToolError::InvalidParams(format!("Malformed {}: {}", MANIFEST, e)))?;

    let psr4 = manifest
        .autoload
        .psr4
        .into_iter()
        .map(|(ns, dirs)| {
            let dirs = match dirs {
                Value::String(s) => vec![s],
                Value::Array(items) => items
                    .into_iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect(),
                _ => Vec::new(),
            };
            (ns, dirs)
        })
        .collect();

    Ok(ProjectInfo {
        php_version: manifest.require.get("php").cloned(),
        name: manifest.name,
        description: manifest.description,
        package_type: manifest.package_type,
        require: manifest.require,
        require_dev: manifest.require_dev,
        psr4,
        has_artisan,
    })
}
