//! `pnpm-lock.yaml` parsing.
//!
//! Direct dependencies are the union of every importer's `dependencies`,
//! `devDependencies` and `optionalDependencies` keys. The `packages` map
//! lists every resolved package, keyed by a peer-suffixed specifier that
//! needs normalizing before it yields a clean `name@version` pair.

use super::split_name_at_last_at;
use crate::error::LockfileError;
use crate::model::{DependencyNode, LockfileDialect, ParsedLock};
use serde_yaml::Value;
use std::collections::HashSet;
use std::path::Path;

pub fn parse(_project_root: &Path, path: &Path) -> Result<ParsedLock, LockfileError> {
    let content = std::fs::read_to_string(path).map_err(|e| LockfileError::Corrupt {
        dialect: "pnpm".to_string(),
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;
    let doc: Value = serde_yaml::from_str(&content).map_err(|e| LockfileError::Corrupt {
        dialect: "pnpm".to_string(),
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;

    let mut direct_names: HashSet<String> = HashSet::new();
    if let Some(importers) = doc.get("importers").and_then(Value::as_mapping) {
        for (_, importer) in importers {
            for dep_kind in ["dependencies", "devDependencies", "optionalDependencies"] {
                if let Some(deps) = importer.get(dep_kind).and_then(Value::as_mapping) {
                    for (name, _) in deps {
                        if let Some(name) = name.as_str() {
                            direct_names.insert(name.to_string());
                        }
                    }
                }
            }
        }
    }

    let mut lock = ParsedLock::new(LockfileDialect::Pnpm);

    if let Some(packages) = doc.get("packages").and_then(Value::as_mapping) {
        for (key, _) in packages {
            let Some(key) = key.as_str() else { continue };
            let stripped = key.strip_prefix('/').unwrap_or(key);
            let without_peers = match stripped.find('(') {
                Some(idx) => &stripped[..idx],
                None => stripped,
            };
            let Some((name, version)) = split_name_at_last_at(without_peers) else {
                continue;
            };
            let direct = direct_names.contains(name);
            lock.insert(DependencyNode::new(name, version, direct));
        }
    }

    Ok(lock)
}
