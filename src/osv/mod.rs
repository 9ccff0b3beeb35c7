//! # OSV Client and Fallback Chain
//!
//! Batched lookup against an OSV-compatible advisory API, backed by the
//! on-disk [`crate::cache::AdvisoryCache`], with a bounded-concurrency
//! enrichment pass (OSV detail → NVD CVSS → GHSA label) for vulnerabilities
//! that come back without a usable severity.
//!
//! Network errors never surface as a [`crate::error::BardscanError`] — every
//! failure here folds into `source = unknown` or `unknownReason =
//! lookup_failed` data on the affected [`crate::model::Vulnerability`].

mod severity;
mod types;

pub use severity::normalize_severity;
pub use types::*;

use crate::cache::{hash_key, AdvisoryCache, Namespace};
use crate::model::{Severity, SeveritySource, Source, UnknownReason, Vulnerability};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const ENRICHMENT_WORKERS: usize = 6;

/// The outcome of a batch lookup for a single `(name, version)` pair.
#[derive(Debug, Clone)]
pub struct LookupResult {
    pub source: Source,
    pub vulnerabilities: Vec<Vulnerability>,
}

/// Batched OSV client. Holds a shared `reqwest::Client` (cheap to clone,
/// internally `Arc`'d connection pool) rather than building one per request.
pub struct OsvClient {
    http: reqwest::Client,
    cache: Arc<AdvisoryCache>,
    osv_url: String,
    offline: bool,
    enable_fallbacks: bool,
}

impl OsvClient {
    pub fn new(
        cache: Arc<AdvisoryCache>,
        osv_url: String,
        offline: bool,
        enable_fallbacks: bool,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            cache,
            osv_url,
            offline,
            enable_fallbacks,
        }
    }

    /// Resolve advisories for every `(name, version)` pair, keyed by
    /// `name@version`.
    pub async fn batch_query(
        &self,
        packages: &[(String, String)],
    ) -> HashMap<String, LookupResult> {
        if !self.offline {
            self.cache.prune_expired();
        }

        let mut results: HashMap<String, LookupResult> = HashMap::new();
        let mut fetch_queue: Vec<(String, String)> = Vec::new();

        for (name, version) in packages {
            let key = format!("{}@{}", name, version);
            let hash = hash_key(&json!({"name": name, "version": version}));
            if let Some(vulns) = self.cache.read::<Vec<Vulnerability>>(Namespace::Batch, &hash) {
                results.insert(
                    key,
                    LookupResult {
                        source: Source::Cache,
                        vulnerabilities: vulns,
                    },
                );
                continue;
            }
            if self.offline {
                results.insert(
                    key,
                    LookupResult {
                        source: Source::Unknown,
                        vulnerabilities: Vec::new(),
                    },
                );
                continue;
            }
            fetch_queue.push((name.clone(), version.clone()));
        }

        if fetch_queue.is_empty() {
            return results;
        }

        match self.fetch_batch(&fetch_queue).await {
            Some(raw_results) => {
                for ((name, version), raw_vulns) in fetch_queue.iter().zip(raw_results) {
                    let key = format!("{}@{}", name, version);
                    let mut vulns: Vec<Vulnerability> = raw_vulns
                        .into_iter()
                        .map(|v| normalize_severity(&v, "osv"))
                        .collect();

                    if self.enable_fallbacks {
                        self.enrich(&mut vulns).await;
                    }

                    let hash = hash_key(&json!({"name": name, "version": version}));
                    self.cache.write(Namespace::Batch, &hash, &vulns);

                    results.insert(
                        key,
                        LookupResult {
                            source: Source::Osv,
                            vulnerabilities: vulns,
                        },
                    );
                }
            }
            None => {
                for (name, version) in &fetch_queue {
                    let key = format!("{}@{}", name, version);
                    results.entry(key).or_insert(LookupResult {
                        source: Source::Unknown,
                        vulnerabilities: Vec::new(),
                    });
                }
            }
        }

        results
    }

    /// POST a single batched query. Returns `None` if the whole batch fails
    /// (non-2xx, timeout, or transport error) — the caller marks the whole
    /// queue unknown, with no partial retry.
    async fn fetch_batch(&self, queue: &[(String, String)]) -> Option<Vec<Vec<RawOsvVuln>>> {
        let body = json!({
            "queries": queue.iter().map(|(name, version)| json!({
                "package": {"name": name, "ecosystem": "npm"},
                "version": version,
            })).collect::<Vec<_>>()
        });

        let url = format!("{}/v1/querybatch", self.osv_url.trim_end_matches('/'));
        let response = self.http.post(&url).json(&body).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let parsed: OsvBatchResponse = response.json().await.ok()?;
        Some(
            parsed
                .results
                .into_iter()
                .map(|r| r.vulns.unwrap_or_default())
                .collect(),
        )
    }

    /// Run the bounded-concurrency enrichment pass over every vulnerability
    /// whose severity is still `unknown`.
    async fn enrich(&self, vulns: &mut [Vulnerability]) {
        let unknown_indices: Vec<usize> = vulns
            .iter()
            .enumerate()
            .filter(|(_, v)| v.severity == Severity::Unknown)
            .map(|(i, _)| i)
            .collect();
        if unknown_indices.is_empty() {
            return;
        }

        let semaphore = Arc::new(Semaphore::new(ENRICHMENT_WORKERS));
        let mut tasks = Vec::new();
        for idx in unknown_indices {
            let vuln = vulns[idx].clone();
            let semaphore = Arc::clone(&semaphore);
            let http = self.http.clone();
            let cache = Arc::clone(&self.cache);
            let osv_url = self.osv_url.clone();
            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let enriched = enrich_one(&http, &cache, &osv_url, vuln.clone()).await;
                (idx, enriched)
            }));
        }

        for task in tasks {
            if let Ok((idx, enriched)) = task.await {
                vulns[idx] = enriched;
            }
        }
    }
}

/// Run the OSV-detail → NVD CVSS → GHSA fallback chain for one vulnerability.
async fn enrich_one(
    http: &reqwest::Client,
    cache: &AdvisoryCache,
    osv_url: &str,
    mut vuln: Vulnerability,
) -> Vulnerability {
    if let Some(resolved) = fetch_osv_detail(http, cache, osv_url, &vuln.id).await {
        vuln.severity = resolved.0;
        vuln.severity_source = resolved.1;
        vuln.unknown_reason = None;
        return vuln;
    }

    for alias in vuln.aliases.clone() {
        if let Some(alias_id) = alias.strip_prefix("CVE-").map(|_| alias.clone()) {
            if let Some(score) = fetch_nvd_score(http, cache, &alias_id).await {
                vuln.severity = Severity::from_cvss_score(score);
                vuln.severity_source = SeveritySource::AliasCvss;
                vuln.unknown_reason = None;
                return vuln;
            }
        }
    }

    let mut ghsa_candidates = vec![vuln.id.clone()];
    ghsa_candidates.extend(vuln.aliases.clone());
    for candidate in ghsa_candidates {
        if candidate.starts_with("GHSA-") {
            if let Some((severity, source)) = fetch_ghsa(http, cache, &candidate).await {
                vuln.severity = severity;
                vuln.severity_source = source;
                vuln.unknown_reason = None;
                return vuln;
            }
        }
    }

    vuln.severity = Severity::Unknown;
    vuln.severity_source = SeveritySource::Unknown;
    vuln.unknown_reason = Some(UnknownReason::LookupFailed);
    vuln
}

async fn fetch_osv_detail(
    http: &reqwest::Client,
    cache: &AdvisoryCache,
    osv_url: &str,
    id: &str,
) -> Option<(Severity, SeveritySource)> {
    let hash = hash_key(&json!({"id": id}));
    if let Some(doc) = cache.read::<RawOsvVuln>(Namespace::Detail, &hash) {
        return severity::resolve(&doc, "osv_detail");
    }

    let url = format!("{}/v1/vulns/{}", osv_url.trim_end_matches('/'), id);
    let response = http.get(&url).send().await.ok()?;
    if !response.status().is_success() {
        return None;
    }
    let doc: RawOsvVuln = response.json().await.ok()?;
    cache.write(Namespace::Detail, &hash, &doc);
    severity::resolve(&doc, "osv_detail")
}

async fn fetch_nvd_score(http: &reqwest::Client, cache: &AdvisoryCache, cve_id: &str) -> Option<f64> {
    let hash = hash_key(&json!({"cveId": cve_id}));
    if let Some(cached) = cache.read::<NvdScore>(Namespace::Nvd, &hash) {
        return cached.score;
    }

    let url = format!(
        "https://services.nvd.nist.gov/rest/json/cves/2.0?cveId={}",
        cve_id
    );
    let response = http.get(&url).send().await.ok()?;
    if !response.status().is_success() {
        return None;
    }
    let body: serde_json::Value = response.json().await.ok()?;
    let score = severity::extract_nvd_base_score(&body);
    cache.write(Namespace::Nvd, &hash, &NvdScore { score });
    score
}

async fn fetch_ghsa(
    http: &reqwest::Client,
    cache: &AdvisoryCache,
    ghsa_id: &str,
) -> Option<(Severity, SeveritySource)> {
    let hash = hash_key(&json!({"ghsaId": ghsa_id}));
    if let Some(cached) = cache.read::<GhsaOutcome>(Namespace::Ghsa, &hash) {
        return cached.severity.map(|s| (s, cached.severity_source));
    }

    let url = format!("https://api.github.com/advisories/{}", ghsa_id);
    let response = http
        .get(&url)
        .header("Accept", "application/vnd.github+json")
        .header("User-Agent", "bardscan")
        .send()
        .await
        .ok()?;
    if !response.status().is_success() {
        return None;
    }
    let body: serde_json::Value = response.json().await.ok()?;

    let outcome = if let Some(score) = body
        .get("cvss")
        .and_then(|c| c.get("score"))
        .and_then(|s| s.as_f64())
    {
        GhsaOutcome {
            severity: Some(Severity::from_cvss_score(score)),
            severity_source: SeveritySource::GhsaCvss,
        }
    } else if let Some(label) = body.get("severity").and_then(|s| s.as_str()) {
        match Severity::from_label(label) {
            Some(severity) => GhsaOutcome {
                severity: Some(severity),
                severity_source: SeveritySource::GhsaLabel,
            },
            None => GhsaOutcome {
                severity: None,
                severity_source: SeveritySource::Unknown,
            },
        }
    } else {
        GhsaOutcome {
            severity: None,
            severity_source: SeveritySource::Unknown,
        }
    };

    cache.write(Namespace::Ghsa, &hash, &outcome);
    outcome.severity.map(|s| (s, outcome.severity_source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_client(offline: bool, fallbacks: bool) -> OsvClient {
        let temp = TempDir::new().unwrap();
        let cache = Arc::new(AdvisoryCache::new(temp.path(), false).unwrap());
        OsvClient::new(
            cache,
            "https://api.osv.dev".to_string(),
            offline,
            fallbacks,
        )
    }

    #[tokio::test]
    async fn offline_with_empty_cache_yields_unknown() {
        let client = test_client(true, false);
        let packages = vec![("lodash".to_string(), "4.17.21".to_string())];
        let results = client.batch_query(&packages).await;
        let result = results.get("lodash@4.17.21").unwrap();
        assert_eq!(result.source, Source::Unknown);
        assert!(result.vulnerabilities.is_empty());
    }

    #[tokio::test]
    async fn cache_hit_short_circuits_network() {
        let temp = TempDir::new().unwrap();
        let cache = Arc::new(AdvisoryCache::new(temp.path(), false).unwrap());
        let hash = hash_key(&json!({"name": "lodash", "version": "4.17.21"}));
        let vulns = vec![Vulnerability {
            id: "GHSA-aaaa".to_string(),
            summary: None,
            aliases: vec![],
            severity: Severity::High,
            severity_source: SeveritySource::OsvLabel,
            unknown_reason: None,
            modified: None,
            references: vec![],
            fixed_version: None,
        }];
        cache.write(Namespace::Batch, &hash, &vulns);

        let client = OsvClient::new(cache, "https://api.osv.dev".to_string(), false, false);
        let packages = vec![("lodash".to_string(), "4.17.21".to_string())];
        let results = client.batch_query(&packages).await;
        let result = results.get("lodash@4.17.21").unwrap();
        assert_eq!(result.source, Source::Cache);
        assert_eq!(result.vulnerabilities.len(), 1);
    }
}
