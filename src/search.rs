//! Line-oriented text search across a file set, plus single-file literal
//! search-and-replace.

use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::error::ToolError;

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    /// Treat the pattern as a regular expression instead of literal text
    pub regex: bool,
    pub max_line_length: usize,
    pub max_files: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            regex: false,
            max_line_length: 200,
            max_files: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LineMatch {
    pub line: usize,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileMatches {
    pub file: String,
    pub match_count: usize,
    pub matches: Vec<LineMatch>,
}

#[derive(Debug, Serialize)]
pub struct SearchReport {
    pub pattern: String,
    pub total_matches: usize,
    pub files_with_matches: usize,
    pub files_searched: usize,
    pub truncated: bool,
    pub results: Vec<FileMatches>,
}

/// Compile `pattern`; literal mode escapes every metacharacter first.
pub fn build_matcher(pattern: &str, opts: &SearchOptions) -> Result<Regex, ToolError> {
    if pattern.is_empty() {
        return Err(ToolError::InvalidParams("pattern must not be empty".into()));
    }
    let source = if opts.regex {
        pattern.to_string()
    } else {
        regex::escape(pattern)
    };
    RegexBuilder::new(&source)
        .case_insensitive(!opts.case_sensitive)
        .build()
        .map_err(|e| ToolError::InvalidParams(format!("Invalid regex: {}", e)))
}

/// Trim surrounding whitespace and cut to at most `max` characters.
pub fn clip_line(line: &str, max: usize) -> String {
    line.trim().chars().take(max).collect()
}

/// Test every line of `text` independently against `re`.
pub fn scan_text(text: &str, re: &Regex, max_line_length: usize) -> Vec<LineMatch> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| re.is_match(line))
        .map(|(idx, line)| LineMatch {
            line: idx + 1,
            content: clip_line(line, max_line_length),
        })
        .collect()
}

/// Order by descending match count (stable) and keep the first `max_files`.
pub fn rank(mut results: Vec<FileMatches>, max_files: usize) -> (Vec<FileMatches>, bool) {
    results.sort_by(|a, b| b.match_count.cmp(&a.match_count));
    let truncated = results.len() > max_files;
    results.truncate(max_files);
    (results, truncated)
}

/// Scan `files` (root-relative) concurrently and aggregate a ranked report.
///
/// Unreadable files are skipped; they do not count as searched.
pub async fn search_files(
    root: &Path,
    files: Vec<String>,
    pattern: &str,
    re: Regex,
    opts: &SearchOptions,
) -> SearchReport {
    let max_line_length = opts.max_line_length;

    let tasks: Vec<_> = files
        .into_iter()
        .map(|rel| {
            let abs: PathBuf = root.join(&rel);
            let re = re.clone();
            tokio::spawn(async move {
                match tokio::fs::read_to_string(&abs).await {
                    Ok(content) => Some(FileMatches {
                        matches: scan_text(&content, &re, max_line_length),
                        match_count: 0,
                        file: rel,
                    }),
                    Err(e) => {
                        tracing::debug!("Skipping unreadable file {}: {}", rel, e);
                        None
                    }
                }
            })
        })
        .collect();

    let mut files_searched = 0;
    let mut hits = Vec::new();
    for outcome in futures::future::join_all(tasks).await {
        match outcome {
            Ok(Some(mut fm)) => {
                files_searched += 1;
                if !fm.matches.is_empty() {
                    fm.match_count = fm.matches.len();
                    hits.push(fm);
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Search task failed: {}", e),
        }
    }

    let total_matches = hits.iter().map(|f| f.match_count).sum();
    let files_with_matches = hits.len();
    let (results, truncated) = rank(hits, opts.max_files);

    SearchReport {
        pattern: pattern.to_string(),
        total_matches,
        files_with_matches,
        files_searched,
        truncated,
        results,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LineChange {
    pub line: usize,
    pub before: String,
    pub after: String,
}

/// Replace every literal occurrence of `search` on each line containing it.
///
/// Returns the rewritten text (lines rejoined with `\n`) and the per-line changes.
/// When nothing matches the returned text is the input unchanged.
pub fn replace_in_text(text: &str, search: &str, replace: &str) -> (String, Vec<LineChange>) {
    let mut changes = Vec::new();
    let lines: Vec<String> = text
        .split('\n')
        .enumerate()
        .map(|(idx, line)| {
            if !search.is_empty() && line.contains(search) {
                let replaced = line.replace(search, replace);
                changes.push(LineChange {
                    line: idx + 1,
                    before: line.trim().to_string(),
                    after: replaced.trim().to_string(),
                });
                replaced
            } else {
                line.to_string()
            }
        })
        .collect();

    if changes.is_empty() {
        return (text.to_string(), changes);
    }
    (lines.join("\n"), changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_literal_pattern_escapes_metacharacters() {
        let re = build_matcher("a.b(c)", &SearchOptions::default()).unwrap();
        assert!(re.is_match("x = a.b(c);"));
        assert!(!re.is_match("axbc"));
        assert!(!re.is_match("a.bc"));
    }

    #[test]
    fn test_case_sensitivity() {
        let insensitive = build_matcher("User", &SearchOptions::default()).unwrap();
        assert!(insensitive.is_match("$user = new USER();"));

        let opts = SearchOptions {
            case_sensitive: true,
            ..Default::default()
        };
        let sensitive = build_matcher("User", &opts).unwrap();
        assert!(!sensitive.is_match("$user"));
        assert!(sensitive.is_match("User::find(1)"));
    }

    #[test]
    fn test_regex_mode_and_invalid_regex() {
        let opts = SearchOptions {
            regex: true,
            ..Default::default()
        };
        let re = build_matcher(r"function\s+\w+Action", &opts).unwrap();
        assert!(re.is_match("public function indexAction()"));
        assert!(matches!(
            build_matcher("(unclosed", &opts),
            Err(ToolError::InvalidParams(_))
        ));
        assert!(build_matcher("", &SearchOptions::default()).is_err());
    }

    #[test]
    fn test_scan_text_trims_and_clips() {
        let re = build_matcher("needle", &SearchOptions::default()).unwrap();
        let long = format!("    needle {}", "x".repeat(300));
        let text = format!("first\n  needle here  \n{long}\n");
        let matches = scan_text(&text, &re, 200);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].line, 2);
        assert_eq!(matches[0].content, "needle here");
        assert_eq!(matches[1].line, 3);
        assert_eq!(matches[1].content.chars().count(), 200);
        assert!(matches[1].content.starts_with("needle x"));
    }

    fn fm(file: &str, count: usize) -> FileMatches {
        FileMatches {
            file: file.into(),
            match_count: count,
            matches: Vec::new(),
        }
    }

    #[test]
    fn test_rank_orders_by_density() {
        let (ranked, truncated) = rank(vec![fm("a", 3), fm("b", 1), fm("c", 5)], 50);
        let counts: Vec<_> = ranked.iter().map(|f| f.match_count).collect();
        assert_eq!(counts, vec![5, 3, 1]);
        assert!(!truncated);
    }

    #[test]
    fn test_rank_caps_file_count() {
        let input: Vec<_> = (0..60).map(|i| fm(&format!("f{i}"), i)).collect();
        let (ranked, truncated) = rank(input, 50);
        assert_eq!(ranked.len(), 50);
        assert!(truncated);
        assert_eq!(ranked[0].match_count, 59);
    }

    #[tokio::test]
    async fn test_search_files_aggregates_and_skips_missing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.php"), "foo\nbar\nfoo foo\n").unwrap();
        fs::write(dir.path().join("b.php"), "nothing here\n").unwrap();
        fs::write(dir.path().join("c.php"), "FOO\nfoo\nfoo\n").unwrap();

        let opts = SearchOptions::default();
        let re = build_matcher("foo", &opts).unwrap();
        let files = vec![
            "a.php".to_string(),
            "b.php".to_string(),
            "missing.php".to_string(),
            "c.php".to_string(),
        ];
        let report = search_files(dir.path(), files, "foo", re, &opts).await;

        assert_eq!(report.files_searched, 3);
        assert_eq!(report.files_with_matches, 2);
        assert_eq!(report.total_matches, 5);
        assert_eq!(report.results[0].file, "c.php");
        assert_eq!(report.results[0].match_count, 3);
        assert_eq!(report.results[1].file, "a.php");
        assert_eq!(report.results[1].matches[1].line, 3);
    }

    #[test]
    fn test_replace_all_occurrences_per_line() {
        let text = "$a = foo(); foo();\nkeep\n  foo\n";
        let (out, changes) = replace_in_text(text, "foo", "bar");
        assert_eq!(out, "$a = bar(); bar();\nkeep\n  bar\n");
        assert_eq!(
            changes,
            vec![
                LineChange {
                    line: 1,
                    before: "$a = foo(); foo();".into(),
                    after: "$a = bar(); bar();".into(),
                },
                LineChange {
                    line: 3,
                    before: "foo".into(),
                    after: "bar".into(),
                },
            ]
        );
    }

    #[test]
    fn test_replace_without_match_is_identity() {
        let text = "line one\r\nline two\n";
        let (out, changes) = replace_in_text(text, "foo", "bar");
        assert!(changes.is_empty());
        assert_eq!(out, text);
    }
}
