use bardscan::model::Severity;
use bardscan::osv::{
    normalize_severity, RawOsvAffected, RawOsvEvent, RawOsvRange, RawOsvReference,
    RawOsvSeverity, RawOsvVuln,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn cvss_vuln(id: &str, score: &str) -> RawOsvVuln {
    RawOsvVuln {
        id: id.to_string(),
        summary: Some(format!("summary for {id}")),
        details: None,
        aliases: vec![format!("CVE-2024-{id}")],
        modified: Some("2024-01-01T00:00:00Z".to_string()),
        severity: vec![RawOsvSeverity {
            severity_type: "CVSS_V3".to_string(),
            score: score.to_string(),
        }],
        affected: vec![RawOsvAffected {
            ranges: vec![RawOsvRange {
                events: vec![
                    RawOsvEvent {
                        introduced: Some("0".to_string()),
                        fixed: None,
                    },
                    RawOsvEvent {
                        introduced: None,
                        fixed: Some("2.1.0".to_string()),
                    },
                ],
            }],
        }],
        references: vec![
            RawOsvReference {
                url: Some(format!("https://osv.dev/vulnerability/{id}")),
            },
            RawOsvReference {
                url: Some(format!("https://github.com/advisories/{id}")),
            },
        ],
        database_specific: None,
    }
}

fn label_vuln(id: &str, label: &str) -> RawOsvVuln {
    let mut vuln = cvss_vuln(id, "");
    vuln.severity.clear();
    vuln.database_specific = Some(serde_json::json!({ "severity": label }));
    vuln
}

fn bench_normalize_cvss(c: &mut Criterion) {
    let vuln = cvss_vuln("GHSA-bench-0001", "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H/9.8");

    c.bench_function("normalize_severity_cvss_vector", |b| {
        b.iter(|| black_box(normalize_severity(black_box(&vuln), "osv")));
    });
}

fn bench_normalize_label_fallback(c: &mut Criterion) {
    let vuln = label_vuln("GHSA-bench-0002", "MODERATE");

    c.bench_function("normalize_severity_label_fallback", |b| {
        b.iter(|| black_box(normalize_severity(black_box(&vuln), "osv_detail")));
    });
}

fn bench_severity_rank_sort(c: &mut Criterion) {
    let mut severities: Vec<Severity> = (0..500)
        .map(|i| match i % 5 {
            0 => Severity::Critical,
            1 => Severity::High,
            2 => Severity::Medium,
            3 => Severity::Low,
            _ => Severity::Unknown,
        })
        .collect();

    c.bench_function("severity_rank_sort_unstable", |b| {
        b.iter(|| {
            let mut copy = severities.clone();
            copy.sort_unstable_by_key(|s| std::cmp::Reverse(s.rank()));
            black_box(&copy);
        });
    });

    severities.sort_unstable_by_key(|s| std::cmp::Reverse(s.rank()));
    black_box(&severities);
}

criterion_group!(
    benches,
    bench_normalize_cvss,
    bench_normalize_label_fallback,
    bench_severity_rank_sort,
);
criterion_main!(benches);
