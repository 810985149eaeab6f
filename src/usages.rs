//! Cross-file usage classification for a class-like symbol.

use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::analyzer::NAMESPACE_SEPARATOR;
use crate::error::ToolError;
use crate::search::clip_line;

/// Final segment of a possibly fully qualified name.
pub fn short_name(symbol: &str) -> &str {
    let trimmed = symbol.trim().trim_matches(NAMESPACE_SEPARATOR);
    trimmed
        .rsplit(NAMESPACE_SEPARATOR)
        .next()
        .unwrap_or(trimmed)
}

/// The four independent per-line checks; a line may satisfy several.
#[derive(Debug, Clone)]
pub struct UsagePatterns {
    import: Regex,
    extends: Regex,
    implements: Regex,
    reference: Regex,
}

impl UsagePatterns {
    pub fn new(short: &str) -> Result<Self, ToolError> {
        if short.is_empty() {
            return Err(ToolError::InvalidParams("symbol must not be empty".into()));
        }
        let n = regex::escape(short);
        let qualified = format!(r"\\?(?:[\w\\]*\\)?{n}\b");

        Ok(Self {
            import: build(&format!(
                r"^\s*use\s+(?:{qualified}\s*(?:;|,|\s+as\s)|[\w\\]*\\\{{[^}}]*\b{n}\b[^}}]*\}})"
            ))?,
            extends: build(&format!(r"\bextends\s+{qualified}"))?,
            implements: build(&format!(r"\bimplements\s+(?:[\w\\]+\s*,\s*)*{qualified}"))?,
            reference: build(&format!(
                r"\bnew\s+{qualified}|\b{n}\s*::|\b{n}\s+&?(?:\.\.\.)?\$\w|\)\s*:\s*\??{qualified}|\binstanceof\s+{qualified}|\bcatch\s*\(\s*{qualified}"
            ))?,
        })
    }

    pub fn is_import(&self, line: &str) -> bool {
        self.import.is_match(line)
    }

    pub fn is_extends(&self, line: &str) -> bool {
        self.extends.is_match(line)
    }

    pub fn is_implements(&self, line: &str) -> bool {
        self.implements.is_match(line)
    }

    pub fn is_reference(&self, line: &str) -> bool {
        self.reference.is_match(line)
    }
}

fn build(pattern: &str) -> Result<Regex, ToolError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| ToolError::Internal(e.into()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageMatch {
    pub file: String,
    pub line: usize,
    pub content: String,
}

#[derive(Debug, Default, Serialize)]
pub struct UsageReport {
    pub symbol: String,
    pub short_name: String,
    pub imports: Vec<UsageMatch>,
    pub extends: Vec<UsageMatch>,
    pub implements: Vec<UsageMatch>,
    pub references: Vec<UsageMatch>,
    pub total_usages: usize,
    pub files_scanned: usize,
}

impl UsageReport {
    /// Classify every line of one file's text into the category lists.
    pub fn absorb(&mut self, patterns: &UsagePatterns, file: &str, text: &str, max_len: usize) {
        for (idx, line) in text.lines().enumerate() {
            let hit = || UsageMatch {
                file: file.to_string(),
                line: idx + 1,
                content: clip_line(line, max_len),
            };
            if patterns.is_import(line) {
                self.imports.push(hit());
            }
            if patterns.is_extends(line) {
                self.extends.push(hit());
            }
            if patterns.is_implements(line) {
                self.implements.push(hit());
            }
            if patterns.is_reference(line) {
                self.references.push(hit());
            }
        }
    }

    fn finish(mut self) -> Self {
        self.total_usages =
            self.imports.len() + self.extends.len() + self.implements.len() + self.references.len();
        self
    }
}

/// Read `files` (root-relative) concurrently and classify usages of `symbol`.
pub async fn find_usages(
    root: &Path,
    files: Vec<String>,
    symbol: &str,
    max_line_length: usize,
) -> Result<UsageReport, ToolError> {
    let short = short_name(symbol).to_string();
    let patterns = UsagePatterns::new(&short)?;

    let tasks: Vec<_> = files
        .into_iter()
        .map(|rel| {
            let abs = root.join(&rel);
            tokio::spawn(async move {
                match tokio::fs::read_to_string(&abs).await {
                    Ok(content) => Some((rel, content)),
                    Err(e) => {
                        tracing::debug!("Skipping unreadable file {}: {}", rel, e);
                        None
                    }
                }
            })
        })
        .collect();

    let mut report = UsageReport {
        symbol: symbol.to_string(),
        short_name: short,
        ..Default::default()
    };
    for outcome in futures::future::join_all(tasks).await {
        match outcome {
            Ok(Some((rel, content))) => {
                report.files_scanned += 1;
                report.absorb(&patterns, &rel, &content, max_line_length);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Usage scan task failed: {}", e),
        }
    }

    Ok(report.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("App\\Models\\User"), "User");
        assert_eq!(short_name("\\App\\Models\\User"), "User");
        assert_eq!(short_name("User"), "User");
    }

    #[test]
    fn test_import_pattern() {
        let p = UsagePatterns::new("User").unwrap();
        assert!(p.is_import("use App\\Models\\User;"));
        assert!(p.is_import("use App\\Models\\User as BaseUser;"));
        assert!(p.is_import("use user;"));
        assert!(!p.is_import("use App\\Models\\UserProfile;"));
        assert!(!p.is_import("$user->use(User::class);"));
    }

    #[test]
    fn test_group_import_pattern() {
        let p = UsagePatterns::new("User").unwrap();
        assert!(p.is_import("use App\\Models\\{User, Post};"));
        assert!(p.is_import("use App\\{Models\\User as Member};"));
        assert!(!p.is_import("use App\\Models\\{UserProfile};"));
    }

    #[test]
    fn test_extends_and_implements_patterns() {
        let p = UsagePatterns::new("Authenticatable").unwrap();
        assert!(p.is_extends("class User extends Authenticatable"));
        assert!(p.is_extends("class User extends \\Illuminate\\Foundation\\Auth\\Authenticatable {"));
        assert!(p.is_implements("class User extends Model implements Authenticatable"));
        assert!(p.is_implements("class User extends Model implements Arrayable, Authenticatable {"));
        assert!(!p.is_implements("class User extends Authenticatable"));
    }

    #[test]
    fn test_reference_pattern_shapes() {
        let p = UsagePatterns::new("User").unwrap();
        assert!(p.is_reference("$u = new User();"));
        assert!(p.is_reference("$u = new \\App\\Models\\User;"));
        assert!(p.is_reference("return User::query();"));
        assert!(p.is_reference("public function show(User $user)"));
        assert!(p.is_reference("public function owner(): ?User"));
        assert!(p.is_reference("if ($x instanceof User) {"));
        assert!(!p.is_reference("class Admin extends User"));
        assert!(!p.is_reference("use App\\Models\\User;"));
        assert!(!p.is_reference("$users = UserRepository::all();"));
    }

    #[test]
    fn test_line_can_land_in_several_categories() {
        let p = UsagePatterns::new("Contract").unwrap();
        let mut report = UsageReport::default();
        report.absorb(
            &p,
            "x.php",
            "interface Deep extends Contract implements Contract",
            200,
        );
        let report = report.finish();
        assert_eq!(report.extends.len(), 1);
        assert_eq!(report.implements.len(), 1);
        assert_eq!(report.total_usages, 2);
    }

    #[tokio::test]
    async fn test_find_usages_scenario() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Controller.php"),
            "<?php\nuse App\\Models\\User;\n",
        )
        .unwrap();
        fs::write(dir.path().join("Admin.php"), "<?php\nclass Admin extends User\n{\n}\n").unwrap();

        let files = vec![
            "Controller.php".to_string(),
            "Admin.php".to_string(),
            "Gone.php".to_string(),
        ];
        let report = find_usages(dir.path(), files, "User", 200).await.unwrap();

        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.imports.len(), 1);
        assert_eq!(report.imports[0].file, "Controller.php");
        assert_eq!(report.imports[0].line, 2);
        assert_eq!(report.extends.len(), 1);
        assert_eq!(report.extends[0].content, "class Admin extends User");
        assert!(report.implements.is_empty());
        assert!(report.references.is_empty());
        assert_eq!(report.total_usages, 2);
    }

    #[tokio::test]
    async fn test_fully_qualified_symbol_uses_short_name() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.php"), "$u = new User();\n").unwrap();
        let report = find_usages(dir.path(), vec!["a.php".into()], "App\\Models\\User", 200)
            .await
            .unwrap();
        assert_eq!(report.short_name, "User");
        assert_eq!(report.references.len(), 1);
    }
}
