//! Package Graph
//!
//! The capability the sync engine consumes to load packages, register
//! document lifecycle events and fetch per-package errors. Every mutating
//! call takes the current set by reference and hands back a new one, so a
//! failed call leaves the caller's set untouched.

pub mod clause;
pub mod fs;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::{FileDiagnostics, PackageId, PackageSet};

pub use fs::FsPackageGraph;

/// Failure reported by a package graph
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is outside the workspace", .0.display())]
    OutsideWorkspace(PathBuf),

    #[error("{} is not a .{extension} file", path.display())]
    UnsupportedFile { path: PathBuf, extension: String },

    #[error("{} is inside a skipped directory", .0.display())]
    Skipped(PathBuf),

    #[error("{} is not tracked by any package", .0.display())]
    UnknownFile(PathBuf),

    #[error("unknown package {0}")]
    UnknownPackage(PackageId),
}

/// What `add_file` did with a newly visible file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedFile {
    pub package: PackageId,
    /// The file introduced a package that did not exist before
    pub new_package: bool,
}

/// Narrow interface over a package loading and analysis engine
pub trait PackageGraph: Send + Sync {
    /// Workspace root the graph is scoped to
    fn root(&self) -> &Path;

    /// Full recursive load of every package under the root
    fn load(&self) -> Result<PackageSet, GraphError>;

    /// Make `path` visible with editor `content`; owning package becomes Dirty
    fn add_file(
        &self,
        pkgs: &PackageSet,
        path: &Path,
        content: &str,
    ) -> Result<(PackageSet, AddedFile), GraphError>;

    /// Replace the whole tracked content of `path`; owning package becomes Dirty
    fn update_file(
        &self,
        pkgs: &PackageSet,
        path: &Path,
        content: &str,
    ) -> Result<PackageSet, GraphError>;

    /// Drop the editor overlay of `path`; affected packages become Dirty
    fn close_file(&self, pkgs: &PackageSet, path: &Path) -> Result<PackageSet, GraphError>;

    /// Authoritative diagnostics of one package, keyed by file
    fn errors(&self, pkgs: &PackageSet, package: &PackageId)
    -> Result<FileDiagnostics, GraphError>;
}
