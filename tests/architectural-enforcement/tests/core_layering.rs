//! Integration Test: Core Layering
//!
//! **Policy**: `tracevis-core` knows nothing about the terminal. Drawing
//! goes through `TextRenderer`; ratatui and crossterm belong to the TUI.

use std::fs;

use architectural_enforcement::{find_violations, report, workspace_root};

const FORBIDDEN: &[&str] = &["ratatui", "crossterm"];

fn mentions_toolkit(code: &str) -> bool {
    FORBIDDEN.iter().any(|name| code.contains(name))
}

#[test]
fn test_core_sources_do_not_use_toolkit() {
    report(
        "CRITICAL: Terminal toolkit used in tracevis-core",
        &find_violations("core/src", mentions_toolkit),
    );
}

#[test]
fn test_core_manifest_does_not_depend_on_toolkit() {
    let manifest = fs::read_to_string(workspace_root().join("core").join("Cargo.toml")).unwrap();

    let violations: Vec<String> = manifest
        .lines()
        .filter(|line| {
            let key = line.split('=').next().unwrap_or("").trim();
            FORBIDDEN.contains(&key)
        })
        .map(str::to_owned)
        .collect();

    report("CRITICAL: tracevis-core depends on a terminal toolkit", &violations);
}
