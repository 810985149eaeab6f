//! Path sandbox: every caller-supplied path goes through [`Sandbox::resolve`]
//! before any filesystem call.

use std::path::{Component, Path, PathBuf};

use crate::error::ToolError;

/// The fixed project root all relative inputs are interpreted against.
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
    root_str: String,
}

impl Sandbox {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = normalize(&root.into());
        let root_str = root.to_string_lossy().to_string();
        Self { root, root_str }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `relative` against the root, rejecting anything that escapes it.
    ///
    /// `..` segments are folded lexically so the check also works for paths that
    /// do not exist yet (create_file). An absolute input replaces the root, as a
    /// shell would, and then has to pass the same prefix check.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, ToolError> {
        let resolved = normalize(&self.root.join(relative));
        if !has_root_prefix(&resolved.to_string_lossy(), &self.root_str) {
            tracing::debug!("Rejected path outside root: {}", relative);
            return Err(ToolError::AccessDenied(relative.to_string()));
        }
        Ok(resolved)
    }
}

/// Raw string prefix comparison, no separator boundary: `/proj-other` passes
/// for root `/proj`.
fn has_root_prefix(candidate: &str, root: &str) -> bool {
    candidate.starts_with(root)
}

/// Lexically fold `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}
