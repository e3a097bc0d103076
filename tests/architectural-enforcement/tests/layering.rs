//! Integration Test: Layering
//!
//! **Policy**: The chat core is surface-agnostic. It MUST NOT depend on the
//! terminal stack or the HTTP server stack; those belong to the TUI and the
//! proxy. The proxy MUST NOT depend on the terminal stack.

use architectural_enforcement::{code_part, production_sources};

fn find_imports(dir: &str, forbidden: &[&str]) -> Vec<String> {
    let mut violations = Vec::new();
    for file in production_sources(dir) {
        for (idx, line) in file.lines.iter().enumerate() {
            let code = code_part(line);
            for krate in forbidden {
                if code.contains(&format!("{krate}::")) {
                    violations.push(format!(
                        "{}:{} - {}",
                        file.path.display(),
                        idx + 1,
                        line.trim()
                    ));
                }
            }
        }
    }
    violations
}

#[test]
fn test_core_has_no_surface_dependencies() {
    let violations = find_imports(
        "chat/core/src",
        &["ratatui", "crossterm", "axum", "tower_http"],
    );
    assert!(
        violations.is_empty(),
        "Chat core reaches into a surface crate:\n{}",
        violations.join("\n")
    );
}

#[test]
fn test_proxy_has_no_terminal_dependencies() {
    let violations = find_imports("chat/proxy/src", &["ratatui", "crossterm"]);
    assert!(
        violations.is_empty(),
        "Proxy reaches into the terminal stack:\n{}",
        violations.join("\n")
    );
}

#[test]
fn test_sources_are_found() {
    assert!(!production_sources("chat/core/src").is_empty());
    assert!(!production_sources("chat/proxy/src").is_empty());
    assert!(!production_sources("tui/src").is_empty());
}
