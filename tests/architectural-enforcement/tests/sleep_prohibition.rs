//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT call sleep methods. The frame loop
//! paces itself with `tokio::time::interval`, and loaders only wait on
//! file I/O.
//! **Exceptions**: Test code

use architectural_enforcement::{find_violations, report};

fn is_sleep_call(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(".sleep(")
}

#[test]
fn test_no_sleep_in_core() {
    report(
        "CRITICAL: Sleep calls found in tracevis-core",
        &find_violations("core/src", is_sleep_call),
    );
}

#[test]
fn test_no_sleep_in_tui() {
    report(
        "CRITICAL: Sleep calls found in tracevis-tui",
        &find_violations("tui/src", is_sleep_call),
    );
}

#[test]
fn test_sleep_detection() {
    assert!(is_sleep_call("    std::thread::sleep(Duration::from_millis(10));"));
    assert!(is_sleep_call("    tokio::time::sleep(d).await;"));
    assert!(!is_sleep_call("    interval.tick().await;"));
}
