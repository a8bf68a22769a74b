use std::fs;
use std::hint::black_box;
use std::path::Path;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use gunk_language_server::core::PackageId;
use gunk_language_server::graph::{FsPackageGraph, PackageGraph};
use tempfile::TempDir;

/// Workspace with `packages` directories of `files` sources each
fn generate_workspace(packages: usize, files: usize) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for p in 0..packages {
        let pkg_dir = dir.path().join(format!("pkg{p}"));
        fs::create_dir_all(&pkg_dir).expect("create package dir");
        for f in 0..files {
            let mut text = format!("// file {f}\npackage pkg{p}\n\n");
            for m in 0..20 {
                text.push_str(&format!("type Message{m} struct {{\n\tID int `pb:\"1\"`\n}}\n\n"));
            }
            fs::write(pkg_dir.join(format!("file{f}.gunk")), text).expect("write source");
        }
    }
    dir
}

fn benchmark_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    for packages in [10, 50, 200] {
        let dir = generate_workspace(packages, 5);
        let graph = FsPackageGraph::new(dir.path());

        group.throughput(Throughput::Elements(packages as u64));
        group.bench_with_input(BenchmarkId::from_parameter(packages), &graph, |b, graph| {
            b.iter(|| black_box(graph.load().expect("load workspace")))
        });
    }

    group.finish();
}

fn benchmark_update_and_errors(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_and_errors");

    for packages in [10, 200] {
        let dir = generate_workspace(packages, 5);
        let graph = FsPackageGraph::new(dir.path());
        let pkgs = graph.load().expect("load workspace");
        let file = dir.path().join("pkg0").join("file0.gunk");
        let id = PackageId::from("pkg0");
        let edited = fs::read_to_string(&file).expect("read source") + "// edited\n";

        group.bench_with_input(BenchmarkId::from_parameter(packages), &packages, |b, _| {
            b.iter(|| {
                let next = graph
                    .update_file(&pkgs, black_box(&file), black_box(&edited))
                    .expect("update file");
                black_box(graph.errors(&next, &id).expect("fetch errors"))
            })
        });
    }

    group.finish();
}

fn benchmark_open_new_package(c: &mut Criterion) {
    let dir = generate_workspace(50, 5);
    let graph = FsPackageGraph::new(dir.path());
    let pkgs = graph.load().expect("load workspace");
    let file = dir.path().join(Path::new("fresh/new.gunk"));

    c.bench_function("open_new_package", |b| {
        b.iter(|| {
            black_box(
                graph
                    .add_file(&pkgs, black_box(&file), "package fresh\n")
                    .expect("add file"),
            )
        })
    });
}

criterion_group!(
    benches,
    benchmark_load,
    benchmark_update_and_errors,
    benchmark_open_new_package
);
criterion_main!(benches);
