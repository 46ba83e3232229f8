//! Architectural Enforcement Integration Tests
//!
//! Source scanning helpers shared by the policy tests in `tests/`:
//! - No sleep() calls in production code
//! - No terminal toolkit in the core crate
//!
//! Only production lines are checked: comments are stripped and a file is
//! cut at its first `#[cfg(test)]`.

use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root, two levels above this package
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// Every `.rs` file under `dir`, sorted
pub fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// `(line_number, code)` for each production line of `content`
pub fn production_lines(content: &str) -> Vec<(usize, &str)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .map(|(idx, line)| (idx + 1, line.split("//").next().unwrap_or(line)))
        .collect()
}

/// Lines under `dir` (relative to the workspace root) whose code matches
/// `is_violation`, formatted as `path:line - code`
pub fn find_violations<F>(dir: &str, is_violation: F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let root = workspace_root().join(dir);
    assert!(root.exists(), "{} does not exist", root.display());

    let mut violations = Vec::new();
    for path in rust_files(&root) {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };

        for (line_number, code) in production_lines(&content) {
            if is_violation(code) {
                violations.push(format!(
                    "{}:{} - {}",
                    path.display(),
                    line_number,
                    code.trim()
                ));
            }
        }
    }
    violations
}

/// Panic with every violation listed
pub fn report(title: &str, violations: &[String]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ {title}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    panic!(
        "\nFound {} violation(s).\nFix these before merging!",
        violations.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_strip_comments_and_tests() {
        let content = "fn a() {} // sleep(1)\n/// docs\n#[cfg(test)]\nmod tests { sleep(1) }\n";
        let lines = production_lines(content);

        assert_eq!(lines, vec![(1, "fn a() {} "), (2, "")]);
    }

    #[test]
    fn test_workspace_root_has_manifest() {
        assert!(workspace_root().join("Cargo.toml").exists());
    }
}
