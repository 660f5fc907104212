//! Integration Test: Pure Simulation
//!
//! **Policy**: The pet model, evolution rules, activity records and the
//! catch-up reducer are arithmetic only. They receive the current time and the
//! commit history from their caller and never touch the filesystem, git, the
//! environment, the clock or the terminal.
//!
//! Side effects belong in `store`, `git`, `config` and the CLI.

use architectural_enforcement::{assert_clean, scan, workspace_root};

const PURE_MODULES: &[&str] = &["pet.rs", "evolution.rs", "activity.rs", "reducer.rs"];

const FORBIDDEN: &[&str] = &[
    "std::fs",
    "std::env",
    "std::process",
    "git2::",
    "tempfile",
    "Utc::now",
    "SystemTime",
    "println!",
    "eprintln!",
];

#[test]
fn test_simulation_modules_have_no_side_effects() {
    let src = workspace_root().join("gitpet").join("core").join("src");

    let mut violations = Vec::new();
    for module in PURE_MODULES {
        let path = src.join(module);
        let content = std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
        violations.extend(scan(&path, &content, FORBIDDEN));
    }

    assert_clean(
        "Side effects in the pure simulation modules (pet, evolution, activity, reducer)",
        &violations,
    );
}

#[test]
fn test_core_never_reads_the_wall_clock() {
    // `now` is always passed in, so catch-ups are reproducible
    let src = workspace_root().join("gitpet").join("core").join("src");
    let violations = architectural_enforcement::find_violations(&src, &["Utc::now", "Local::now"]);

    assert_clean("Wall-clock reads in gitpet-core", &violations);
}
