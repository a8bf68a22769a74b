use std::fs;
use std::hint::black_box;
use std::path::Path;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use gunk_language_server::core::Diagnostic;
use gunk_language_server::graph::FsPackageGraph;
use gunk_language_server::lint::NoopLinter;
use gunk_language_server::sync::{DiagnosticSink, Session, SyncEngine};
use tempfile::TempDir;
use tower_lsp::lsp_types::Url;

/// Sink that drops everything
struct NullSink;

#[tower_lsp::async_trait]
impl DiagnosticSink for NullSink {
    async fn publish(&self, _file: &Path, diagnostics: Vec<Diagnostic>) {
        black_box(diagnostics);
    }
}

fn generate_workspace(packages: usize) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for p in 0..packages {
        let pkg_dir = dir.path().join(format!("pkg{p}"));
        fs::create_dir_all(&pkg_dir).expect("create package dir");
        for f in 0..5 {
            fs::write(
                pkg_dir.join(format!("file{f}.gunk")),
                format!("package pkg{p}\n\ntype Message{f} struct {{}}\n"),
            )
            .expect("write source");
        }
    }
    dir
}

fn start_engine(dir: &TempDir) -> SyncEngine {
    let uri = Url::from_file_path(dir.path()).expect("file uri").to_string();
    SyncEngine::load(
        Session::new(uri, false),
        |root: &Path| FsPackageGraph::new(root),
        Box::new(NoopLinter),
        Arc::new(NullSink),
    )
    .expect("load workspace")
}

/// One edit in a large workspace only sweeps the edited package.
fn benchmark_update_sweep(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("build runtime");
    let mut group = c.benchmark_group("update_sweep");

    for packages in [10, 100, 500] {
        let dir = generate_workspace(packages);
        let mut engine = start_engine(&dir);
        let file = dir.path().join("pkg0").join("file0.gunk");
        rt.block_on(engine.open(&file, "package pkg0\n"));

        let mut toggle = false;
        group.bench_with_input(BenchmarkId::from_parameter(packages), &packages, |b, _| {
            b.iter(|| {
                toggle = !toggle;
                let text = if toggle { "package pkg0\n" } else { "package broken\n" };
                black_box(rt.block_on(engine.update(&file, text)))
            })
        });
    }

    group.finish();
}

fn benchmark_idle_sweep(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("build runtime");
    let dir = generate_workspace(500);
    let mut engine = start_engine(&dir);

    c.bench_function("idle_sweep", |b| {
        b.iter(|| black_box(rt.block_on(engine.sweep())))
    });
}

criterion_group!(benches, benchmark_update_sweep, benchmark_idle_sweep);
criterion_main!(benches);
