//! # Evidence Indexer
//!
//! Walks the project directory collecting import/require specifiers from
//! source files, building a `package -> file list` index used to derive
//! confidence for a finding. Grounded in the donor's
//! `ignore::WalkBuilder` + `rayon::par_bridge` directory-walking idiom, with
//! extension-based filtering in place of gitignore-based filtering.

use crate::model::EvidenceIndex;
use ignore::WalkBuilder;
use rayon::prelude::*;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;

const EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs", "vue"];
const EXCLUDED_SEGMENTS: &[&str] = &["node_modules", "dist", ".next"];

fn static_import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:import(?:[^'";]*?from)?|require\()\s*['"]([^'"]+)['"]"#).unwrap()
    })
}

fn dynamic_import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"import\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap())
}

/// Walk `root` and build an [`EvidenceIndex`] of import specifiers.
pub fn build_index(root: &Path) -> EvidenceIndex {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .ignore(true)
        .parents(true)
        .build();

    let files: Vec<_> = walker
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .filter(|entry| has_tracked_extension(entry.path()))
        .filter(|entry| !has_excluded_segment(entry.path(), root))
        .collect();

    let per_file: Vec<(String, Vec<String>)> = files
        .par_iter()
        .filter_map(|entry| {
            let path = entry.path();
            let content = std::fs::read_to_string(path).ok()?;
            let relative = path.strip_prefix(root).unwrap_or(path);
            let relative = relative.to_string_lossy().replace('\\', "/");
            Some((relative, extract_packages(&content)))
        })
        .collect();

    let mut by_package: BTreeMap<String, HashSet<String>> = BTreeMap::new();
    for (file, packages) in &per_file {
        for package in packages {
            by_package
                .entry(package.clone())
                .or_default()
                .insert(file.clone());
        }
    }

    EvidenceIndex {
        scanned_files: per_file.len(),
        by_package: by_package
            .into_iter()
            .map(|(pkg, files)| {
                let mut sorted: Vec<String> = files.into_iter().collect();
                sorted.sort();
                (pkg, sorted)
            })
            .collect(),
    }
}

fn has_tracked_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| EXTENSIONS.contains(&ext))
}

fn has_excluded_segment(path: &Path, root: &Path) -> bool {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .any(|c| {
            let s = c.as_os_str().to_string_lossy();
            EXCLUDED_SEGMENTS.contains(&s.as_ref())
        })
}

fn extract_packages(content: &str) -> Vec<String> {
    let mut names = HashSet::new();
    for caps in static_import_re().captures_iter(content) {
        if let Some(spec) = caps.get(1) {
            if let Some(name) = normalize_specifier(spec.as_str()) {
                names.insert(name);
            }
        }
    }
    for caps in dynamic_import_re().captures_iter(content) {
        if let Some(spec) = caps.get(1) {
            if let Some(name) = normalize_specifier(spec.as_str()) {
                names.insert(name);
            }
        }
    }
    names.into_iter().collect()
}

/// Normalize a raw import specifier to a package name, or `None` if it is a
/// relative/absolute path.
fn normalize_specifier(spec: &str) -> Option<String> {
    if spec.starts_with('.') || spec.starts_with('/') {
        return None;
    }
    if let Some(rest) = spec.strip_prefix('@') {
        let mut segments = rest.splitn(2, '/');
        let scope = segments.next()?;
        let name = segments.next()?.split('/').next()?;
        return Some(format!("@{}/{}", scope, name));
    }
    spec.split('/').next().map(String::from)
}
