//! # Advisory Cache
//!
//! Content-addressed, on-disk cache for the OSV client, rooted at
//! `<outDir>/.cache/osv`. Four sub-namespaces, each keyed by the SHA-256 hash
//! of a small JSON value:
//!
//! | Namespace | Key | Value | Path |
//! |---|---|---|---|
//! | Batch result | `{name, version}` | `Vec<Vulnerability>` | `<root>/<hash>.json` |
//! | Detail doc | `{id}` | raw OSV detail document | `<root>/details/<hash>.json` |
//! | NVD CVSS | `{cveId}` | `{score}` | `<root>/nvd/<hash>.json` |
//! | GHSA severity | `{ghsaId}` | `{severity, severitySource}` | `<root>/ghsa/<hash>.json` |
//!
//! TTL is 24 hours, interpreted against file modification time. An expired
//! file is treated as a miss; it is not removed on read. `refresh_cache`
//! forces every read to miss while writes still occur.

use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::error::{BardscanError, CacheError};

/// Default TTL for every namespace, in hours.
pub const DEFAULT_TTL_HOURS: u64 = 24;

/// Content-addressed advisory cache rooted at `<outDir>/.cache/osv`.
#[derive(Debug, Clone)]
pub struct AdvisoryCache {
    root: PathBuf,
    ttl_hours: u64,
    refresh: bool,
    writes: Arc<AtomicUsize>,
}

impl AdvisoryCache {
    /// Create a cache rooted at `<out_dir>/.cache/osv`, creating the
    /// directory tree up front so later writes don't each need to.
    pub fn new(out_dir: &Path, refresh: bool) -> Result<Self, BardscanError> {
        let root = out_dir.join(".cache").join("osv");
        for sub in ["", "details", "nvd", "ghsa"] {
            let dir = if sub.is_empty() {
                root.clone()
            } else {
                root.join(sub)
            };
            fs::create_dir_all(&dir).map_err(|e| {
                BardscanError::Cache(CacheError::OutDirUnwritable {
                    path: dir.display().to_string(),
                    source: e,
                })
            })?;
        }
        Ok(Self {
            root,
            ttl_hours: DEFAULT_TTL_HOURS,
            refresh,
            writes: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of successful cache writes since this instance (or any clone
    /// sharing its counter) was created.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    fn path_for(&self, namespace: Namespace, hash: &str) -> PathBuf {
        match namespace {
            Namespace::Batch => self.root.join(format!("{}.json", hash)),
            Namespace::Detail => self.root.join("details").join(format!("{}.json", hash)),
            Namespace::Nvd => self.root.join("nvd").join(format!("{}.json", hash)),
            Namespace::Ghsa => self.root.join("ghsa").join(format!("{}.json", hash)),
        }
    }

    /// Read a cached value if present and within TTL. Any I/O or parse
    /// error is treated as a miss; callers fold that into `unknown` data,
    /// never a [`BardscanError`]. Records written before `severitySource`
    /// existed are recovered rather than treated as a miss: it is derived
    /// from `severity` before the value is deserialized into `T`.
    pub fn read<T: DeserializeOwned>(&self, namespace: Namespace, hash: &str) -> Option<T> {
        if self.refresh {
            return None;
        }
        let path = self.path_for(namespace, hash);
        let metadata = fs::metadata(&path).ok()?;
        let modified = metadata.modified().ok()?;
        let age = SystemTime::now().duration_since(modified).ok()?;
        if age > Duration::from_secs(self.ttl_hours * 3600) {
            return None;
        }
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(_) => {
                let mut value: serde_json::Value = serde_json::from_str(&content).ok()?;
                backfill_severity_source(&mut value);
                serde_json::from_value(value).ok()
            }
        }
    }

    /// Write a value into the cache. Failures are swallowed: cache I/O
    /// errors never abort a scan.
    pub fn write<T: Serialize>(&self, namespace: Namespace, hash: &str, value: &T) {
        let path = self.path_for(namespace, hash);
        match serde_json::to_string_pretty(value) {
            Ok(content) => match fs::write(&path, content) {
                Ok(()) => {
                    self.writes.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "cache write failed");
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cache serialize failed");
            }
        }
    }

    /// Best-effort prune of every file older than the TTL, across all
    /// namespaces. Read errors are swallowed so pruning never fails a scan.
    pub fn prune_expired(&self) {
        let cutoff = Duration::from_secs(self.ttl_hours * 3600);
        for dir in [
            self.root.clone(),
            self.root.join("details"),
            self.root.join("nvd"),
            self.root.join("ghsa"),
        ] {
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let Ok(metadata) = entry.metadata() else {
                    continue;
                };
                let Ok(modified) = metadata.modified() else {
                    continue;
                };
                let Ok(age) = SystemTime::now().duration_since(modified) else {
                    continue;
                };
                if age > cutoff {
                    let _ = fs::remove_file(&path);
                }
            }
        }
    }
}

/// Back-fill `severitySource` on cached records written before that field
/// existed, deriving it from `severity`: `unknown` stays `unknown` (tagging
/// `unknownReason: missing_score` if absent), everything else becomes
/// `osv_label`. Walks arrays so it applies to both a lone cached record and
/// a batch result list.
fn backfill_severity_source(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Array(items) => {
            for item in items {
                backfill_severity_source(item);
            }
        }
        serde_json::Value::Object(map) => {
            if map.contains_key("severity") && !map.contains_key("severitySource") {
                if map.get("severity").and_then(serde_json::Value::as_str) == Some("unknown") {
                    map.insert(
                        "severitySource".to_string(),
                        serde_json::Value::String("unknown".to_string()),
                    );
                    map.entry("unknownReason".to_string())
                        .or_insert_with(|| serde_json::Value::String("missing_score".to_string()));
                } else {
                    map.insert(
                        "severitySource".to_string(),
                        serde_json::Value::String("osv_label".to_string()),
                    );
                }
            }
        }
        _ => {}
    }
}

/// Which cache sub-namespace a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Batch,
    Detail,
    Nvd,
    Ghsa,
}

/// Hash a small JSON-serializable key into the hex digest used as a
/// cache filename stem.
pub fn hash_key<T: Serialize>(key: &T) -> String {
    let encoded = serde_json::to_vec(key).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(&encoded);
    format!("{:x}", hasher.finalize())
}
