//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - The pet simulation is pure: no filesystem, git, clock or terminal access
//! - Production code propagates errors instead of panicking
//!
//! The helpers here walk workspace sources and hand back the production lines
//! of each file, with comments and the trailing `#[cfg(test)]` module removed.

use std::path::{Path, PathBuf};

/// A source line that broke a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File containing the line
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The offending line, trimmed
    pub text: String,
    /// The forbidden pattern that matched
    pub pattern: &'static str,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} - `{}`: {}",
            self.path.display(),
            self.line,
            self.pattern,
            self.text
        )
    }
}

/// Root of the workspace
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

/// Every `.rs` file below `dir`, sorted
pub fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(walkdir::DirEntry::into_path)
        .collect();
    files.sort();
    files
}

/// Production lines of a source file as `(line_number, code)`
///
/// Stops at the first `#[cfg(test)]`; test modules live at the bottom of each
/// file. Comment-only lines are dropped and trailing `//` comments cut off.
pub fn production_lines(content: &str) -> Vec<(usize, String)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .filter_map(|(idx, line)| {
            let trimmed = line.trim_start();
            if trimmed.starts_with("//") {
                return None;
            }
            let code = trimmed.split(" //").next().unwrap_or(trimmed);
            Some((idx + 1, code.to_string()))
        })
        .collect()
}

/// Every production line under `dir` containing one of `patterns`
pub fn find_violations(dir: &Path, patterns: &[&'static str]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for path in rust_files(dir) {
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        violations.extend(scan(&path, &content, patterns));
    }
    violations
}

/// Scan one file's content
pub fn scan(path: &Path, content: &str, patterns: &[&'static str]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (line, code) in production_lines(content) {
        for pattern in patterns {
            if code.contains(pattern) {
                violations.push(Violation {
                    path: path.to_path_buf(),
                    line,
                    text: code.trim().to_string(),
                    pattern,
                });
            }
        }
    }
    violations
}

/// Panic with a readable report if `violations` is not empty
pub fn assert_clean(rule: &str, violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ {rule}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    panic!(
        "\nFound {} violation(s) of: {rule}\nFix these before merging!",
        violations.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_skip_comments_and_tests() {
        let content = "\
//! module docs mention std::fs
use std::fs; // trailing
/// docs with .unwrap()
fn real() {}
#[cfg(test)]
mod tests {
    fn helper() { x.unwrap(); }
}";
        let lines = production_lines(content);
        assert_eq!(
            lines,
            vec![(2, "use std::fs;".to_string()), (4, "fn real() {}".to_string())]
        );
    }

    #[test]
    fn test_scan_reports_line_numbers() {
        let content = "fn a() {}\nfn b() { v.unwrap() }\n";
        let found = scan(Path::new("x.rs"), content, &[".unwrap()"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);
        assert_eq!(found[0].pattern, ".unwrap()");
    }

    #[test]
    fn test_workspace_root_contains_crates() {
        assert!(workspace_root().join("gitpet").join("core").is_dir());
    }
}
