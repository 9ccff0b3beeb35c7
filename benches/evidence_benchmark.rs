use bardscan::evidence;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fs;
use tempfile::TempDir;

fn create_source_tree(file_count: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("src/components")).unwrap();
    fs::create_dir_all(root.join("node_modules/lodash")).unwrap();

    for i in 0..file_count {
        fs::write(
            root.join(format!("src/components/widget{i}.tsx")),
            format!(
                "import React from 'react';\nimport {{ debounce }} from 'lodash';\nimport utils{i} from '../utils{i}';\n\nexport const Widget{i} = () => <div />;\n",
            ),
        )
        .unwrap();
    }

    // Should be excluded from the walk.
    fs::write(
        root.join("node_modules/lodash/index.js"),
        "module.exports = {};",
    )
    .unwrap();

    temp_dir
}

fn bench_build_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("evidence_build_index");

    for size in &[10usize, 50, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let temp_dir = create_source_tree(size);

            b.iter(|| evidence::build_index(black_box(temp_dir.path())));
        });
    }

    group.finish();
}

fn bench_paths_for_lookup(c: &mut Criterion) {
    let temp_dir = create_source_tree(100);
    let index = evidence::build_index(temp_dir.path());

    c.bench_function("evidence_paths_for_hit", |b| {
        b.iter(|| black_box(index.paths_for("lodash")));
    });

    c.bench_function("evidence_paths_for_miss", |b| {
        b.iter(|| black_box(index.paths_for("left-pad")));
    });
}

criterion_group!(benches, bench_build_index, bench_paths_for_lookup);
criterion_main!(benches);
