//! Integration Test: Panic Prohibition
//!
//! **Policy**: Production code returns errors. `unwrap()`, `expect()`,
//! `panic!`, `unreachable!` and `todo!` are only allowed in tests.
//!
//! **Required**: `?` with `PetError` in the library, `anyhow::Context` in the
//! binary.

use architectural_enforcement::{assert_clean, find_violations, workspace_root};

const FORBIDDEN: &[&str] = &[
    ".unwrap()",
    ".expect(",
    "panic!(",
    "unreachable!(",
    "todo!(",
    "unimplemented!(",
];

#[test]
fn test_no_panics_in_core() {
    let src = workspace_root().join("gitpet").join("core").join("src");
    assert_clean(
        "Panicking calls in gitpet-core production code",
        &find_violations(&src, FORBIDDEN),
    );
}

#[test]
fn test_no_panics_in_cli() {
    let src = workspace_root().join("gitpet").join("cli").join("src");
    assert_clean(
        "Panicking calls in gitpet-cli production code",
        &find_violations(&src, FORBIDDEN),
    );
}
