use bardscan::lockfile;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fs;
use tempfile::TempDir;

fn generate_package_lock(count: usize) -> String {
    let mut deps = String::new();
    for i in 0..count {
        if i > 0 {
            deps.push(',');
        }
        deps.push_str(&format!(
            r#""node_modules/dep{i}": {{"version": "1.0.{i}", "resolved": "https://registry.npmjs.org/dep{i}/-/dep{i}-1.0.{i}.tgz"}}"#,
        ));
    }
    format!(
        r#"{{"name": "bench", "lockfileVersion": 3, "packages": {{"": {{"name": "bench"}}, {deps}}}}}"#,
    )
}

fn generate_yarn_lock(count: usize) -> String {
    let mut content = String::from("# THIS IS AN AUTOGENERATED FILE\n\n");
    for i in 0..count {
        content.push_str(&format!(
            "dep{i}@^1.0.0:\n  version \"1.0.{i}\"\n  resolved \"https://registry.yarnpkg.com/dep{i}/-/dep{i}-1.0.{i}.tgz\"\n\n",
        ));
    }
    content
}

fn bench_npm_dialect(c: &mut Criterion) {
    let mut group = c.benchmark_group("lockfile_resolve_npm");

    for count in &[10usize, 50, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let temp_dir = TempDir::new().unwrap();
            fs::write(
                temp_dir.path().join("package-lock.json"),
                generate_package_lock(count),
            )
            .unwrap();

            b.iter(|| lockfile::resolve(black_box(temp_dir.path())));
        });
    }

    group.finish();
}

fn bench_yarn_dialect(c: &mut Criterion) {
    let mut group = c.benchmark_group("lockfile_resolve_yarn");

    for count in &[10usize, 50, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let temp_dir = TempDir::new().unwrap();
            fs::write(temp_dir.path().join("yarn.lock"), generate_yarn_lock(count)).unwrap();

            b.iter(|| lockfile::resolve(black_box(temp_dir.path())));
        });
    }

    group.finish();
}

fn bench_dialect_probe_order(c: &mut Criterion) {
    // Only a yarn.lock present: resolve() must walk past the npm/pnpm
    // probes before reaching the yarn parser.
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("yarn.lock"), generate_yarn_lock(20)).unwrap();

    c.bench_function("lockfile_resolve_probe_miss_npm_pnpm", |b| {
        b.iter(|| lockfile::resolve(black_box(temp_dir.path())));
    });
}

criterion_group!(
    benches,
    bench_npm_dialect,
    bench_yarn_dialect,
    bench_dialect_probe_order,
);
criterion_main!(benches);
