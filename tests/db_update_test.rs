//! End-to-end tests for the `db update` command

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[allow(deprecated)]
fn get_cmd() -> Command {
    Command::cargo_bin("bardscan").unwrap()
}

fn write_npm_lockfile(dir: &std::path::Path) {
    fs::write(
        dir.join("package-lock.json"),
        r#"{
  "name": "fixture",
  "lockfileVersion": 3,
  "packages": {
    "": { "name": "fixture" },
    "node_modules/left-pad": {
      "version": "1.3.0",
      "resolved": "https://registry.npmjs.org/left-pad/-/left-pad-1.3.0.tgz"
    }
  }
}
"#,
    )
    .unwrap();
}

#[test]
fn db_update_warms_cache_and_exits_zero() {
    let temp_dir = TempDir::new().unwrap();
    write_npm_lockfile(temp_dir.path());
    let out_dir = temp_dir.path().join(".bardcheck");

    get_cmd()
        .current_dir(temp_dir.path())
        .args(["db", "update", "--out-dir"])
        .arg(&out_dir)
        .assert()
        .code(0);

    assert!(out_dir.exists(), "db update should create the cache directory");
    assert!(
        fs::read_dir(&out_dir).unwrap().next().is_some(),
        "cache directory should not be empty after db update"
    );
}

#[test]
fn db_update_without_lockfile_errors() {
    let temp_dir = TempDir::new().unwrap();

    get_cmd()
        .current_dir(temp_dir.path())
        .args(["db", "update"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
}
