//! End-to-end dialect detection: `scan --offline` against yarn.lock and
//! bun.lock fixtures.

use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

#[allow(deprecated)]
fn get_cmd() -> Command {
    Command::cargo_bin("bardscan").unwrap()
}

#[test]
fn yarn_lock_fixture_resolves_via_yarn_dialect() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("package.json"),
        r#"{"name": "fixture", "dependencies": {"lodash": "^4.17.21"}}"#,
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("yarn.lock"),
        "lodash@^4.17.21:\n  version \"4.17.21\"\n  resolved \"https://registry.yarnpkg.com/lodash/-/lodash-4.17.21.tgz\"\n",
    )
    .unwrap();

    let out_dir = temp_dir.path().join(".bardcheck");
    get_cmd()
        .current_dir(temp_dir.path())
        .args(["scan", "--offline", "true", "--out-dir"])
        .arg(&out_dir)
        .assert()
        .code(0);

    let report_path = out_dir.join("report.json");
    let content = fs::read_to_string(&report_path).unwrap();
    let report: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(report["summary"]["dependencyCount"], 1);
}

#[test]
fn bun_lock_fixture_marks_every_dependency_direct() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("package.json"),
        r#"{"name": "fixture", "dependencies": {"left-pad": "1.3.0", "chalk": "^5.0.0"}}"#,
    )
    .unwrap();
    // Content is irrelevant: the bun dialect is read from package.json, the
    // binary bun.lockb body is never parsed.
    fs::write(temp_dir.path().join("bun.lock"), "").unwrap();

    let out_dir = temp_dir.path().join(".bardcheck");
    get_cmd()
        .current_dir(temp_dir.path())
        .args(["scan", "--offline", "true", "--out-dir"])
        .arg(&out_dir)
        .assert()
        .code(0);

    let content = fs::read_to_string(out_dir.join("report.json")).unwrap();
    let report: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(report["summary"]["dependencyCount"], 2);
    let findings = report["findings"].as_array().unwrap();
    // Offline with an empty cache yields unknown findings for every
    // dependency, each of which must be marked direct for this dialect.
    assert!(findings.iter().all(|f| f["direct"] == true));
}
