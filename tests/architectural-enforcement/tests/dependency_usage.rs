//! Integration Test: Dependency Usage
//!
//! **Policy**: Every crate listed under `[dependencies]` is referenced from
//! that package's production code. Test-only crates go under
//! `[dev-dependencies]`.

use std::fs;

use architectural_enforcement::{code_part, production_sources, workspace_root};

const PACKAGES: &[&str] = &["chat/core", "chat/proxy", "tui"];

/// Names declared in the `[dependencies]` table of `package`
fn declared_dependencies(package: &str) -> Vec<String> {
    let manifest = workspace_root().join(package).join("Cargo.toml");
    let Ok(content) = fs::read_to_string(&manifest) else {
        return Vec::new();
    };

    let mut in_table = false;
    let mut names = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_table = line == "[dependencies]";
            continue;
        }
        if !in_table || line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((name, _)) = line.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

fn is_referenced(package: &str, dependency: &str) -> bool {
    let ident = dependency.replace('-', "_");
    let path_use = format!("{ident}::");
    let plain_use = format!("use {ident}");

    production_sources(&format!("{package}/src")).iter().any(|file| {
        file.lines.iter().any(|line| {
            let code = code_part(line);
            code.contains(&path_use) || code.contains(&plain_use)
        })
    })
}

#[test]
fn test_manifests_are_found() {
    for package in PACKAGES {
        assert!(
            !declared_dependencies(package).is_empty(),
            "No [dependencies] found for {package}"
        );
    }
}

#[test]
fn test_no_unused_dependencies() {
    let mut unused = Vec::new();
    for package in PACKAGES {
        for dependency in declared_dependencies(package) {
            if !is_referenced(package, &dependency) {
                unused.push(format!("{package}: {dependency}"));
            }
        }
    }
    assert!(
        unused.is_empty(),
        "Dependencies never referenced from production code:\n{}",
        unused.join("\n")
    );
}
