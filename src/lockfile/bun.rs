//! `bun.lock` / `bun.lockb` handling.
//!
//! The binary `bun.lockb` format is deliberately NOT parsed — a known
//! fidelity loss. Instead the manifest (and any workspace manifests) is
//! read directly and every declared dependency is emitted as a direct
//! `DependencyNode`; transitives are unavailable without parsing the binary
//! lock.

use crate::error::LockfileError;
use crate::model::{DependencyNode, LockfileDialect, ParsedLock};
use regex::Regex;
use serde_json::Value;
use std::path::Path;

pub fn parse(project_root: &Path, _lockfile_path: &Path) -> Result<ParsedLock, LockfileError> {
    let manifest_path = project_root.join("package.json");
    let content = std::fs::read_to_string(&manifest_path).map_err(|e| LockfileError::Corrupt {
        dialect: "bun".to_string(),
        path: manifest_path.display().to_string(),
        detail: e.to_string(),
    })?;
    let manifest: Value = serde_json::from_str(&content).map_err(|e| LockfileError::Corrupt {
        dialect: "bun".to_string(),
        path: manifest_path.display().to_string(),
        detail: e.to_string(),
    })?;

    let version_re = Regex::new(r"\d+\.\d+\.\d+(?:[-+][0-9A-Za-z.-]+)?").unwrap();
    let mut lock = ParsedLock::new(LockfileDialect::Bun);

    collect_manifest_deps(&manifest, &version_re, &mut lock);
    for workspace_dir in workspace_dirs(project_root, &manifest) {
        if let Some(workspace_manifest) = read_manifest(&workspace_dir.join("package.json")) {
            collect_manifest_deps(&workspace_manifest, &version_re, &mut lock);
        }
    }

    Ok(lock)
}

fn collect_manifest_deps(manifest: &Value, version_re: &Regex, lock: &mut ParsedLock) {
    for dep_kind in ["dependencies", "devDependencies", "optionalDependencies"] {
        if let Some(deps) = manifest.get(dep_kind).and_then(Value::as_object) {
            for (name, spec) in deps {
                let spec_str = spec.as_str().unwrap_or("");
                let version = version_re
                    .find(spec_str)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| spec_str.to_string());
                lock.insert(DependencyNode::new(name.clone(), version, true));
            }
        }
    }
}

fn read_manifest(path: &Path) -> Option<Value> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
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
