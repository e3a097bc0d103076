//! Integration Test: Panic Prohibition
//!
//! **Policy**: Production code returns errors with `?` and typed error
//! enums. `.unwrap()` and `.expect(..)` are allowed only in test modules.

use architectural_enforcement::{code_part, production_sources};

const CHECKED_DIRS: &[&str] = &["chat/core/src", "chat/proxy/src", "tui/src"];

#[test]
fn test_no_unwrap_in_production_code() {
    let mut violations = Vec::new();

    for dir in CHECKED_DIRS {
        for file in production_sources(dir) {
            for (idx, line) in file.lines.iter().enumerate() {
                let code = code_part(line);
                if code.contains(".unwrap()") || code.contains(".expect(") {
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

    if !violations.is_empty() {
        eprintln!("\nPanicking calls found in production code:\n");
        for violation in &violations {
            eprintln!("  {violation}");
        }
        panic!(
            "\nFound {} unwrap/expect call(s) outside test modules.",
            violations.len()
        );
    }
}
