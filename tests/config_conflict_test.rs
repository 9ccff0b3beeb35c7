//! End-to-end test for the `--privacy strict` / `--offline false` conflict

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[allow(deprecated)]
fn get_cmd() -> Command {
    Command::cargo_bin("bardscan").unwrap()
}

#[test]
fn strict_privacy_rejects_explicit_online() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("package-lock.json"),
        r#"{"name": "fixture", "lockfileVersion": 3, "packages": {"": {"name": "fixture"}}}"#,
    )
    .unwrap();

    get_cmd()
        .current_dir(temp_dir.path())
        .args(["scan", "--privacy", "strict", "--offline", "false"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Hint:"));
}

#[test]
fn strict_privacy_rejects_explicit_fallback_calls() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("package-lock.json"),
        r#"{"name": "fixture", "lockfileVersion": 3, "packages": {"": {"name": "fixture"}}}"#,
    )
    .unwrap();

    get_cmd()
        .current_dir(temp_dir.path())
        .args([
            "scan",
            "--privacy",
            "strict",
            "--fallback-calls",
            "true",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Hint:"));
}
