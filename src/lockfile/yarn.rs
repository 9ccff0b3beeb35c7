//! `yarn.lock` (classic) parsing.
//!
//! `yarn.lock` has no structured package manifest of its own, so "direct"
//! classification is read from `package.json` (root and workspace
//! manifests); the lockfile itself is parsed line-oriented: a column-0 line
//! ending in `:` starts a selector group, and the next indented
//! `version "X"` line supplies the version for every selector in that group.

use crate::error::LockfileError;
use crate::model::{DependencyNode, LockfileDialect, ParsedLock};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

pub fn parse(project_root: &Path, path: &Path) -> Result<ParsedLock, LockfileError> {
    let content = std::fs::read_to_string(path).map_err(|e| LockfileError::Corrupt {
        dialect: "yarn".to_string(),
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;

    let direct_names = collect_direct_names(project_root);

    let mut lock = ParsedLock::new(LockfileDialect::Yarn);
    let mut pending_selectors: Vec<String> = Vec::new();

    for line in content.lines() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !line.starts_with(' ') && !line.starts_with('\t') {
            if let Some(header) = line.strip_suffix(':') {
                pending_selectors = header.split(", ").map(|s| s.trim().to_string()).collect();
            }
            continue;
        }
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("version ") {
            let version = rest.trim().trim_matches('"');
            if pending_selectors.is_empty() {
                continue;
            }
            for selector in &pending_selectors {
                let name = extract_name_from_selector(selector);
                let direct = direct_names.contains(name);
                lock.insert(DependencyNode::new(name, version, direct));
            }
            pending_selectors.clear();
        }
    }

    Ok(lock)
}

fn extract_name_from_selector(selector: &str) -> String {
    let s = selector.trim().trim_matches('"');
    if let Some(rest) = s.strip_prefix('@') {
        match rest.find('@') {
            Some(idx) => s[..1 + idx].to_string(),
            None => s.to_string(),
        }
    } else {
        match s.find('@') {
            Some(idx) => s[..idx].to_string(),
            None => s.to_string(),
        }
    }
}

fn collect_direct_names(project_root: &Path) -> HashSet<String> {
    let mut names = HashSet::new();
    let root_manifest = project_root.join("package.json");
    let Some(root) = read_manifest(&root_manifest) else {
        return names;
    };
    collect_manifest_deps(&root, &mut names);

    for workspace_dir in workspace_dirs(project_root, &root) {
        let manifest_path = workspace_dir.join("package.json");
        if let Some(manifest) = read_manifest(&manifest_path) {
            collect_manifest_deps(&manifest, &mut names);
        }
    }

    names
}

fn read_manifest(path: &Path) -> Option<Value> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

fn collect_manifest_deps(manifest: &Value, names: &mut HashSet<String>) {
    for dep_kind in ["dependencies", "devDependencies", "optionalDependencies"] {
        if let Some(deps) = manifest.get(dep_kind).and_then(Value::as_object) {
            for name in deps.keys() {
                names.insert(name.clone());
            }
        }
    }
}

/// Resolve `workspaces` (either a bare array or `{ packages: [...] }`) into
/// concrete directories. Only a trailing `/*` glob segment is expanded (to
/// each immediate subdirectory); anything more elaborate is treated as a
/// literal path.
fn workspace_dirs(project_root: &Path, manifest: &Value) -> Vec<std::path::PathBuf> {
    let patterns: Vec<String> = match manifest.get("workspaces") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        Some(Value::Object(obj)) => obj
            .get("packages")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    let mut dirs = Vec::new();
    for pattern in patterns {
        if let Some(prefix) = pattern.strip_suffix("/*") {
            let base = project_root.join(prefix);
            if let Ok(entries) = std::fs::read_dir(&base) {
                for entry in entries.flatten() {
                    if entry.path().is_dir() {
                        dirs.push(entry.path());
                    }
                }
            }
        } else {
            dirs.push(project_root.join(&pattern));
        }
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_selector_groups_and_versions() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("package.json"),
            r#"{"dependencies": {"lodash": "^4.17.21"}}"#,
        )
        .unwrap();
        let lockfile = temp.path().join("yarn.lock");
        std::fs::write(
            &lockfile,
            "lodash@^4.17.21, lodash@^4.17.0:\n  version \"4.17.21\"\n  resolved \"https://x\"\n\nansi-styles@^6.2.1:\n  version \"6.2.1\"\n",
        )
        .unwrap();

        let lock = parse(temp.path(), &lockfile).unwrap();
        assert_eq!(lock.len(), 2);
        let nodes: Vec<_> = lock.iter().cloned().collect();
        let lodash = nodes.iter().find(|n| n.name == "lodash").unwrap();
        assert!(lodash.direct);
        assert_eq!(lodash.version, "4.17.21");
        let ansi = nodes.iter().find(|n| n.name == "ansi-styles").unwrap();
        assert!(!ansi.direct);
    }

    #[test]
    fn extract_name_handles_scoped_and_npm_protocol() {
        assert_eq!(extract_name_from_selector("@scope/name@^1.0.0"), "@scope/name");
        assert_eq!(extract_name_from_selector("lodash@npm:^4.17.21"), "lodash");
    }

    #[test]
    fn workspace_manifests_contribute_direct_names() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("package.json"),
            r#"{"workspaces": ["packages/*"]}"#,
        )
        .unwrap();
        std::fs::create_dir_all(temp.path().join("packages/app")).unwrap();
        std::fs::write(
            temp.path().join("packages/app/package.json"),
            r#"{"dependencies": {"chalk": "^5.0.0"}}"#,
        )
        .unwrap();
        let lockfile = temp.path().join("yarn.lock");
        std::fs::write(&lockfile, "chalk@^5.0.0:\n  version \"5.0.0\"\n").unwrap();

        let lock = parse(temp.path(), &lockfile).unwrap();
        assert!(lock.iter().next().unwrap().direct);
    }
}
