//! Exclusion-aware directory traversal: one-level listings, recursive file
//! collection and box-drawing tree rendering.

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

/// Directory-name fragments skipped during traversal.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    fragments: Vec<String>,
}

impl ExclusionSet {
    pub fn new(fragments: impl IntoIterator<Item = String>) -> Self {
        Self {
            fragments: fragments.into_iter().collect(),
        }
    }

    /// Hidden entries and entries whose root-relative path contains any
    /// fragment as a substring are excluded.
    pub fn is_excluded(&self, name: &str, rel_path: &str) -> bool {
        name.starts_with('.') || self.fragments.iter().any(|f| rel_path.contains(f.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// Result of a recursive collection; unreadable directories are counted, not fatal.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub files: Vec<String>,
    pub skipped_dirs: usize,
}

#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: PathBuf,
    exclusions: ExclusionSet,
}

impl TreeWalker {
    pub fn new(root: impl Into<PathBuf>, exclusions: ExclusionSet) -> Self {
        Self {
            root: root.into(),
            exclusions,
        }
    }

    fn rel(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .ok()
            .and_then(|p| p.to_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string())
    }

    fn excluded(&self, path: &Path) -> bool {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        self.exclusions.is_excluded(&name, &self.rel(path))
    }

    /// One level of `dir`: directories first, then files, each group by name.
    ///
    /// `extensions` filters files only; directories are always listed.
    pub fn list_children(
        &self,
        dir: &Path,
        extensions: Option<&[String]>,
        with_sizes: bool,
    ) -> std::io::Result<Vec<FileRecord>> {
        let mut records = Vec::new();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.excluded(e.path()));

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry in {:?}: {}", dir, e);
                    continue;
                }
            };

            let is_dir = entry.file_type().is_dir();
            let name = entry.file_name().to_string_lossy().to_string();

            if !is_dir {
                if let Some(exts) = extensions {
                    if !has_extension(&name, exts) {
                        continue;
                    }
                }
            }

            let size = if with_sizes && !is_dir {
                entry.metadata().ok().map(|m| format_size(m.len()))
            } else {
                None
            };

            records.push(FileRecord {
                path: self.rel(entry.path()),
                name,
                kind: if is_dir {
                    EntryKind::Directory
                } else {
                    EntryKind::File
                },
                size,
            });
        }

        // Already name-ordered; stable sort keeps that within each group.
        records.sort_by_key(|r| r.kind == EntryKind::File);
        Ok(records)
    }

    /// Depth-first collection of root-relative paths of files under `dir`
    /// whose name ends with one of `extensions`.
    pub fn collect_files(&self, dir: &Path, extensions: &[String]) -> WalkOutcome {
        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.excluded(e.path()))
            .filter(|entry| match entry {
                Ok(e) => e.file_type().is_file(),
                Err(_) => true,
            })
            .map(|entry| entry.map(walkdir::DirEntry::into_path));

        self.tally(walker, extensions)
    }

    /// Fold walk results into a [`WalkOutcome`]: errors are counted as skipped
    /// directories, file paths are kept when their name has a wanted extension.
    fn tally<E: std::fmt::Display>(
        &self,
        entries: impl IntoIterator<Item = Result<PathBuf, E>>,
        extensions: &[String],
    ) -> WalkOutcome {
        let mut outcome = WalkOutcome::default();

        for entry in entries {
            let path = match entry {
                Ok(p) => p,
                Err(e) => {
                    tracing::debug!("Skipping unreadable directory: {}", e);
                    outcome.skipped_dirs += 1;
                    continue;
                }
            };
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default();
            if has_extension(&name, extensions) {
                outcome.files.push(self.rel(&path));
            }
        }

        outcome
    }

    /// Render `dir` as a box-drawing tree, descending at most `max_depth` levels.
    pub fn render_tree(&self, dir: &Path, max_depth: usize) -> String {
        let mut lines = Vec::new();
        self.render_level(dir, "", 0, max_depth, &mut lines);
        lines.join("\n")
    }

    fn render_level(
        &self,
        dir: &Path,
        prefix: &str,
        depth: usize,
        max_depth: usize,
        lines: &mut Vec<String>,
    ) {
        if depth >= max_depth {
            return;
        }
        let children = match self.list_children(dir, None, false) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!("Cannot read {:?} while rendering tree: {}", dir, e);
                return;
            }
        };

        let count = children.len();
        for (idx, child) in children.into_iter().enumerate() {
            let last = idx + 1 == count;
            let connector = if last { "└── " } else { "├── " };
            let label = match child.kind {
                EntryKind::Directory => format!("{}/", child.name),
                EntryKind::File => child.name.clone(),
            };
            lines.push(format!("{prefix}{connector}{label}"));

            if child.kind == EntryKind::Directory {
                let next_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
                self.render_level(&dir.join(&child.name), &next_prefix, depth + 1, max_depth, lines);
            }
        }
    }
}

/// Suffix match, so multi-part extensions like `.blade.php` work.
pub fn has_extension(name: &str, extensions: &[String]) -> bool {
    extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}

/// Binary-prefixed size: whole bytes below 1 KB, one decimal place above.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let scaled = ["KB", "MB", "GB"]
        .iter()
        .scan(bytes as f64, |size, unit| {
            *size /= KB;
            Some((*size, *unit))
        })
        .take_while(|(size, _)| *size >= 1.0)
        .last();

    match scaled {
        Some((size, unit)) => format!("{size:.1} {unit}"),
        None => format!("{bytes} B"),
    }
}
