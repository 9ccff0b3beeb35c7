//! # Lockfile Resolver
//!
//! Detects which of the four supported npm-ecosystem lockfile dialects a
//! project uses and parses it into a normalized [`ParsedLock`]. Only
//! lockfile-pinned versions are consulted — semver ranges are never resolved
//! against a registry, and the dependency set is a flat multiset; direct vs.
//! transitive is a boolean, not a graph.

mod bun;
mod npm;
mod pnpm;
mod yarn;

use crate::error::LockfileError;
use crate::model::{LockfileDialect, ParsedLock};
use std::path::Path;

/// Detect the lockfile dialect present in `dir` and parse it.
///
/// Probes, in order: `package-lock.json`, `pnpm-lock.yaml`, `yarn.lock`,
/// `bun.lock` or `bun.lockb`. Uses the first match.
pub fn resolve(dir: &Path) -> Result<ParsedLock, LockfileError> {
    if dir.join("package-lock.json").is_file() {
        return npm::parse(&dir.join("package-lock.json"));
    }
    if dir.join("pnpm-lock.yaml").is_file() {
        return pnpm::parse(dir, &dir.join("pnpm-lock.yaml"));
    }
    if dir.join("yarn.lock").is_file() {
        return yarn::parse(dir, &dir.join("yarn.lock"));
    }
    if dir.join("bun.lock").is_file() {
        return bun::parse(dir, &dir.join("bun.lock"));
    }
    if dir.join("bun.lockb").is_file() {
        return bun::parse(dir, &dir.join("bun.lockb"));
    }
    Err(LockfileError::NoLockfile {
        dir: dir.display().to_string(),
    })
}

/// Split a package specifier of the form `name@version` (or
/// `@scope/name@version`) at the LAST `@`, so scoped names survive intact.
/// Used by the pnpm and yarn parsers.
pub(crate) fn split_name_at_last_at(spec: &str) -> Option<(&str, &str)> {
    let idx = spec.rfind('@')?;
    if idx == 0 {
        return None;
    }
    Some((&spec[..idx], &spec[idx + 1..]))
}

/// Extract a package name from a `/`-delimited path segment sequence,
/// consuming two segments for a scoped name (`@scope/name`) and one
/// otherwise. Used by the npm `node_modules/...` path parser.
pub(crate) fn package_name_from_segments(segments: &str) -> &str {
    if let Some(rest) = segments.strip_prefix('@') {
        match rest.find('/') {
            Some(first_slash) => {
                let after_scope = &rest[first_slash + 1..];
                let end = after_scope.find('/').unwrap_or(after_scope.len());
                &segments[..1 + first_slash + 1 + end]
            }
            None => segments,
        }
    } else {
        let end = segments.find('/').unwrap_or(segments.len());
        &segments[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn detects_npm_first() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("package-lock.json"),
            r#"{"lockfileVersion": 3, "packages": {"": {}}}"#,
        )
        .unwrap();
        std::fs::write(temp.path().join("yarn.lock"), "").unwrap();
        let lock = resolve(temp.path()).unwrap();
        assert_eq!(lock.dialect.as_str(), "npm");
    }

    #[test]
    fn no_lockfile_errors() {
        let temp = TempDir::new().unwrap();
        let err = resolve(temp.path()).unwrap_err();
        assert!(matches!(err, LockfileError::NoLockfile { .. }));
    }

    #[test]
    fn split_name_at_last_at_handles_scoped() {
        assert_eq!(
            split_name_at_last_at("@scope/name@1.0.0"),
            Some(("@scope/name", "1.0.0"))
        );
        assert_eq!(split_name_at_last_at("lodash@4.17.21"), Some(("lodash", "4.17.21")));
    }

    #[test]
    fn package_name_from_segments_handles_scoped() {
        assert_eq!(package_name_from_segments("@scope/name/nested"), "@scope/name");
        assert_eq!(package_name_from_segments("lodash"), "lodash");
        assert_eq!(package_name_from_segments("chalk/node_modules/ansi-styles"), "chalk");
    }
}
