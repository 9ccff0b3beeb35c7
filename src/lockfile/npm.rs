//! `package-lock.json` parsing.
//!
//! Grounded in the lockfileVersion-2+ `packages` map shape: every installed
//! package gets a key of the form `node_modules/<name>` or
//! `node_modules/.../node_modules/<name>` for nested installs. Falls back to
//! the legacy `dependencies` tree for lockfileVersion 1.

use super::package_name_from_segments;
use crate::error::LockfileError;
use crate::model::{DependencyNode, LockfileDialect, ParsedLock};
use serde_json::Value;
use std::path::Path;

pub fn parse(path: &Path) -> Result<ParsedLock, LockfileError> {
    let content = std::fs::read_to_string(path).map_err(|e| LockfileError::Corrupt {
        dialect: "npm".to_string(),
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;
    let doc: Value = serde_json::from_str(&content).map_err(|e| LockfileError::Corrupt {
        dialect: "npm".to_string(),
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;

    let mut lock = ParsedLock::new(LockfileDialect::Npm);

    let lockfile_version = doc.get("lockfileVersion").and_then(Value::as_i64).unwrap_or(0);

    match doc.get("packages").and_then(Value::as_object) {
        Some(packages) if lockfile_version >= 2 && !packages.is_empty() => {
            for (key, entry) in packages {
                if key.is_empty() {
                    continue; // root entry
                }
                let Some(version) = entry.get("version").and_then(Value::as_str) else {
                    continue;
                };
                let Some(last) = key.rfind("node_modules/") else {
                    continue;
                };
                let after = &key[last + "node_modules/".len()..];
                let name = package_name_from_segments(after);
                let direct = last == 0;
                lock.insert(DependencyNode::new(name, version, direct));
            }
        }
        _ => {
            if let Some(deps) = doc.get("dependencies").and_then(Value::as_object) {
                walk_legacy_tree(deps, true, &mut lock);
            }
        }
    }

    Ok(lock)
}

fn walk_legacy_tree(
    deps: &serde_json::Map<String, Value>,
    direct: bool,
    lock: &mut ParsedLock,
) {
    for (name, entry) in deps {
        let Some(version) = entry.get("version").and_then(Value::as_str) else {
            continue;
        };
        lock.insert(DependencyNode::new(name.clone(), version, direct));
        if let Some(nested) = entry.get("dependencies").and_then(Value::as_object) {
            walk_legacy_tree(nested, false, lock);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_lockfile(dir: &Path, content: &str) -> std::path::PathBuf {
        let path = dir.join("package-lock.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn parses_v2_packages_with_nesting_and_scopes() {
        let temp = TempDir::new().unwrap();
        let path = write_lockfile(
            temp.path(),
            r#"{
                "lockfileVersion": 3,
                "packages": {
                    "": {},
                    "node_modules/lodash": {"version": "4.17.21"},
                    "node_modules/chalk": {"version": "5.0.0"},
                    "node_modules/chalk/node_modules/ansi-styles": {"version": "6.2.1"},
                    "node_modules/@scope/thing": {"version": "1.2.3"}
                }
            }"#,
        );
        let lock = parse(&path).unwrap();
        assert_eq!(lock.len(), 4);
        let nodes: Vec<_> = lock.iter().cloned().collect();
        let lodash = nodes.iter().find(|n| n.name == "lodash").unwrap();
        assert!(lodash.direct);
        let ansi = nodes.iter().find(|n| n.name == "ansi-styles").unwrap();
        assert!(!ansi.direct);
        let scoped = nodes.iter().find(|n| n.name == "@scope/thing").unwrap();
        assert!(scoped.direct);
        assert_eq!(scoped.version, "1.2.3");
    }

    #[test]
    fn falls_back_to_legacy_dependencies_tree() {
        let temp = TempDir::new().unwrap();
        let path = write_lockfile(
            temp.path(),
            r#"{
                "lockfileVersion": 1,
                "dependencies": {
                    "lodash": {
                        "version": "4.17.21",
                        "dependencies": {
                            "inner": {"version": "1.0.0"}
                        }
                    }
                }
            }"#,
        );
        let lock = parse(&path).unwrap();
        assert_eq!(lock.len(), 2);
        let nodes: Vec<_> = lock.iter().cloned().collect();
        assert!(nodes.iter().find(|n| n.name == "lodash").unwrap().direct);
        assert!(!nodes.iter().find(|n| n.name == "inner").unwrap().direct);
    }

    #[test]
    fn v1_lockfile_ignores_packages_map_and_uses_legacy_tree() {
        let temp = TempDir::new().unwrap();
        let path = write_lockfile(
            temp.path(),
            r#"{
                "lockfileVersion": 1,
                "packages": {
                    "node_modules/stale": {"version": "0.0.1"}
                },
                "dependencies": {
                    "lodash": {"version": "4.17.21"}
                }
            }"#,
        );
        let lock = parse(&path).unwrap();
        assert_eq!(lock.len(), 1);
        assert_eq!(lock.iter().next().unwrap().name, "lodash");
    }

    #[test]
    fn corrupt_json_errors() {
        let temp = TempDir::new().unwrap();
        let path = write_lockfile(temp.path(), "not json");
        let err = parse(&path).unwrap_err();
        assert!(matches!(err, LockfileError::Corrupt { .. }));
    }
}
