//! Filesystem package graph against temporary workspaces
use std::fs;
use std::path::Path;

use gunk_language_server::core::{Freshness, Origin, PackageId, PackageSet};
use gunk_language_server::graph::{FsPackageGraph, GraphError, PackageGraph};
use tempfile::TempDir;

fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for (rel, text) in files {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }
    dir
}

fn messages(graph: &FsPackageGraph, pkgs: &PackageSet, id: &str, file: &Path) -> Vec<String> {
    graph
        .errors(pkgs, &PackageId::from(id))
        .unwrap()
        .get(file)
        .expect("file is reported")
        .iter()
        .map(|d| d.message.clone())
        .collect()
}

#[test]
fn test_load_groups_files_by_directory() {
    let dir = workspace(&[
        ("root.gunk", "package root"),
        ("api/a.gunk", "package api"),
        ("api/b.gunk", "// comment\npackage api"),
        ("api/v1/c.gunk", "package v1"),
        ("docs/readme.md", "# docs"),
    ]);

    let pkgs = FsPackageGraph::new(dir.path()).load().unwrap();

    let ids: Vec<_> = pkgs.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec![".", "api", "api/v1"]);
    let api = pkgs.get(&PackageId::from("api")).unwrap();
    assert_eq!(api.files.len(), 2);
    assert_eq!(api.name.as_deref(), Some("api"));
    assert!(api.errors.is_empty());
    assert!(pkgs.dirty().is_empty());
}

#[test]
fn test_load_rejects_missing_root_and_plain_file() {
    let dir = workspace(&[("file.gunk", "package x")]);

    let err = FsPackageGraph::new(dir.path().join("missing"))
        .load()
        .unwrap_err();
    assert!(matches!(err, GraphError::Io { .. }));

    let err = FsPackageGraph::new(dir.path().join("file.gunk"))
        .load()
        .unwrap_err();
    assert!(matches!(err, GraphError::NotADirectory(_)));
}

#[test]
fn test_load_keeps_broken_packages_with_their_errors() {
    let dir = workspace(&[("api/a.gunk", "message A {}"), ("api/b.gunk", "")]);
    let graph = FsPackageGraph::new(dir.path());

    let pkgs = graph.load().unwrap();
    let api = pkgs.get(&PackageId::from("api")).unwrap();

    assert_eq!(api.errors.len(), 2);
    assert_eq!(api.state, Freshness::Clean);
    assert_eq!(
        messages(&graph, &pkgs, "api", &dir.path().join("api/b.gunk")),
        vec!["missing package clause"]
    );
}

#[test]
fn test_add_file_overlays_editor_text_and_marks_dirty() {
    let dir = workspace(&[("api/a.gunk", "package api")]);
    let graph = FsPackageGraph::new(dir.path());
    let pkgs = graph.load().unwrap();
    let file = dir.path().join("api/a.gunk");

    let (next, added) = graph.add_file(&pkgs, &file, "package nope\n").unwrap();

    assert_eq!(added.package, PackageId::from("api"));
    assert!(!added.new_package);
    let api = next.get(&added.package).unwrap();
    assert_eq!(api.state, Freshness::Dirty);
    assert_eq!(api.files[&file].origin, Origin::Editor);
    assert_eq!(api.name.as_deref(), Some("nope"));
    // The input set is untouched.
    assert_eq!(pkgs.get(&added.package).unwrap().state, Freshness::Clean);
}

#[test]
fn test_add_file_in_new_directory_creates_package() {
    let dir = workspace(&[("api/a.gunk", "package api")]);
    let graph = FsPackageGraph::new(dir.path());
    let pkgs = graph.load().unwrap();

    let file = dir.path().join("billing/invoice.gunk");
    let (next, added) = graph.add_file(&pkgs, &file, "package billing").unwrap();

    assert!(added.new_package);
    assert_eq!(added.package, PackageId::from("billing"));
    assert_eq!(next.len(), 2);
    assert_eq!(next.dirty(), vec![PackageId::from("billing")]);
}

#[test]
fn test_add_file_rejects_foreign_and_outside_paths() {
    let dir = workspace(&[]);
    let graph = FsPackageGraph::new(dir.path().join("ws"));
    let pkgs = PackageSet::default();

    let err = graph
        .add_file(&pkgs, &dir.path().join("ws/notes.txt"), "")
        .unwrap_err();
    assert!(matches!(err, GraphError::UnsupportedFile { .. }));

    let err = graph
        .add_file(&pkgs, &dir.path().join("other/x.gunk"), "package x")
        .unwrap_err();
    assert!(matches!(err, GraphError::OutsideWorkspace(_)));
}

#[test]
fn test_update_requires_a_registered_file() {
    let dir = workspace(&[("api/a.gunk", "package api")]);
    let graph = FsPackageGraph::new(dir.path());
    let pkgs = graph.load().unwrap();

    let err = graph
        .update_file(&pkgs, &dir.path().join("api/new.gunk"), "package api")
        .unwrap_err();
    assert!(matches!(err, GraphError::UnknownFile(_)));

    let file = dir.path().join("api/a.gunk");
    let next = graph.update_file(&pkgs, &file, "garbage").unwrap();
    assert_eq!(
        messages(&graph, &next, "api", &file),
        vec!["expected package clause, found `garbage`"]
    );
}

#[test]
fn test_close_rereads_disk_content() {
    let dir = workspace(&[("api/a.gunk", "package api")]);
    let graph = FsPackageGraph::new(dir.path());
    let file = dir.path().join("api/a.gunk");

    let pkgs = graph.load().unwrap();
    let (pkgs, _) = graph.add_file(&pkgs, &file, "unsaved").unwrap();
    // Saved with different content before closing.
    fs::write(&file, "package api\n// saved\n").unwrap();
    let pkgs = graph.close_file(&pkgs, &file).unwrap();

    let api = pkgs.get(&PackageId::from("api")).unwrap();
    assert_eq!(api.files[&file].origin, Origin::Disk);
    assert_eq!(&*api.files[&file].text, "package api\n// saved\n");
    assert!(api.errors.is_empty());
    assert!(api.is_dirty());
}

#[test]
fn test_close_of_unsaved_file_keeps_it_reportable() {
    let dir = workspace(&[("api/a.gunk", "package api")]);
    let graph = FsPackageGraph::new(dir.path());
    let scratch = dir.path().join("api/scratch.gunk");

    let pkgs = graph.load().unwrap();
    let (pkgs, _) = graph.add_file(&pkgs, &scratch, "bad").unwrap();
    let pkgs = graph.close_file(&pkgs, &scratch).unwrap();

    let api = pkgs.get(&PackageId::from("api")).unwrap();
    assert!(!api.contains(&scratch));
    // Still listed so its old diagnostics can be cleared.
    assert!(messages(&graph, &pkgs, "api", &scratch).is_empty());

    let clean = pkgs.into_clean(&PackageId::from("api"));
    let report = graph.errors(&clean, &PackageId::from("api")).unwrap();
    assert!(report.get(&scratch).is_none());
}

#[test]
fn test_errors_for_unknown_package() {
    let dir = workspace(&[]);
    let graph = FsPackageGraph::new(dir.path());

    let err = graph
        .errors(&PackageSet::default(), &PackageId::from("ghost"))
        .unwrap_err();
    assert!(matches!(err, GraphError::UnknownPackage(_)));
}

#[test]
fn test_configured_extension_and_skip_dirs() {
    let dir = workspace(&[
        ("api/a.proto", "package api"),
        ("api/b.gunk", "package ignored"),
        ("gen/c.proto", "package gen"),
        ("vendor/d.proto", "package vendor"),
    ]);
    let graph = FsPackageGraph::new(dir.path())
        .with_extension("proto")
        .with_skip_dirs(vec!["gen".to_string()]);

    let pkgs = graph.load().unwrap();

    let ids: Vec<_> = pkgs.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["api", "vendor"]);
    assert_eq!(pkgs.get(&PackageId::from("api")).unwrap().files.len(), 1);
}

#[test]
fn test_add_file_under_skipped_directory_is_rejected() {
    let dir = workspace(&[
        ("api/a.gunk", "package api"),
        ("vendor/v.gunk", "package vendored"),
    ]);
    let graph = FsPackageGraph::new(dir.path());
    let pkgs = graph.load().unwrap();

    for rel in ["vendor/v.gunk", ".git/x.gunk", "api/node_modules/m.gunk"] {
        let err = graph
            .add_file(&pkgs, &dir.path().join(rel), "package x")
            .unwrap_err();
        assert!(matches!(err, GraphError::Skipped(_)), "{rel}: {err}");
    }

    let ids: Vec<_> = pkgs.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["api"]);
}
