//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code waits on I/O, not on the clock.
//! **Exception**: the TUI event loop's frame wait, which sits inside the
//! `tokio::select!` alongside terminal events and proxy replies.

use architectural_enforcement::{code_part, production_sources};

/// How far above a sleep the enclosing `select!` may start
const SELECT_WINDOW: usize = 25;

fn is_select_branch(lines: &[String], idx: usize) -> bool {
    lines[idx.saturating_sub(SELECT_WINDOW)..idx]
        .iter()
        .any(|line| line.contains("tokio::select!"))
}

fn find_sleep_violations(dir: &str, allow_frame_wait: bool) -> Vec<String> {
    let mut violations = Vec::new();
    for file in production_sources(dir) {
        for (idx, line) in file.lines.iter().enumerate() {
            let code = code_part(line);
            if !(code.contains("::sleep(") || code.contains(".sleep(")) {
                continue;
            }
            if allow_frame_wait
                && file.path.ends_with("tui/src/app.rs")
                && is_select_branch(&file.lines, idx)
            {
                continue;
            }
            violations.push(format!(
                "{}:{} - {}",
                file.path.display(),
                idx + 1,
                line.trim()
            ));
        }
    }
    violations
}

#[test]
fn test_no_sleep_in_core_or_proxy() {
    let mut violations = find_sleep_violations("chat/core/src", false);
    violations.extend(find_sleep_violations("chat/proxy/src", false));
    assert!(
        violations.is_empty(),
        "Sleep calls found:\n{}",
        violations.join("\n")
    );
}

#[test]
fn test_tui_sleeps_only_in_frame_wait() {
    let violations = find_sleep_violations("tui/src", true);
    assert!(
        violations.is_empty(),
        "Sleep calls outside the frame wait:\n{}",
        violations.join("\n")
    );
}
