//! Filesystem package graph.
//!
//! Every directory under the workspace root that holds source files is one
//! package. Editor text overlays the on-disk content of open files.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use super::clause::{self, ClauseScan};
use super::{AddedFile, GraphError, PackageGraph};
use crate::core::{
    Diagnostic, FileDiagnostics, Freshness, Package, PackageId, PackageSet, SourceFile, Span,
};

pub const DEFAULT_EXTENSION: &str = "gunk";
pub const DEFAULT_SKIP_DIRS: &[&str] = &["vendor", "node_modules", "target"];

/// Source attached to hard errors reported by this graph
const SOURCE: &str = "gunk";

#[derive(Debug, Clone)]
pub struct FsPackageGraph {
    root: PathBuf,
    extension: String,
    skip_dirs: Vec<String>,
}

impl FsPackageGraph {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    pub fn with_skip_dirs(mut self, skip_dirs: Vec<String>) -> Self {
        self.skip_dirs = skip_dirs;
        self
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    fn is_source(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str())
    }

    fn skips(&self, dir_name: &str) -> bool {
        dir_name.starts_with('.') || self.skip_dirs.iter().any(|d| d == dir_name)
    }

    /// Package id of `dir`: its path under the root, `/`-separated, `.` for the root itself.
    fn package_id(&self, dir: &Path) -> Result<PackageId, GraphError> {
        let rel = dir
            .strip_prefix(&self.root)
            .map_err(|_| GraphError::OutsideWorkspace(dir.to_path_buf()))?;

        let mut parts = Vec::new();
        for component in rel.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                Component::CurDir => {}
                _ => return Err(GraphError::OutsideWorkspace(dir.to_path_buf())),
            }
        }

        if parts.is_empty() {
            Ok(PackageId::new("."))
        } else {
            Ok(PackageId::new(parts.join("/")))
        }
    }

    /// Package a file would belong to, after checking it is a workspace source file.
    fn locate(&self, path: &Path) -> Result<(PackageId, PathBuf), GraphError> {
        if !self.is_source(path) {
            return Err(GraphError::UnsupportedFile {
                path: path.to_path_buf(),
                extension: self.extension.clone(),
            });
        }
        let dir = path
            .parent()
            .ok_or_else(|| GraphError::OutsideWorkspace(path.to_path_buf()))?;
        let id = self.package_id(dir)?;
        // Same rule as `walk`: nothing under a skipped directory is a package.
        if id.as_str() != "." && id.as_str().split('/').any(|part| self.skips(part)) {
            return Err(GraphError::Skipped(path.to_path_buf()));
        }
        Ok((id, dir.to_path_buf()))
    }

    fn walk(&self, dir: &Path, packages: &mut Vec<Package>) -> Result<(), GraphError> {
        let io_err = |source| GraphError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut entries = fs::read_dir(dir)
            .map_err(io_err)?
            .collect::<io::Result<Vec<_>>>()
            .map_err(io_err)?;
        entries.sort_by_key(|e| e.file_name());

        let mut package: Option<Package> = None;
        let mut subdirs = Vec::new();

        for entry in entries {
            let path = entry.path();
            let file_type = entry.file_type().map_err(|source| GraphError::Io {
                path: path.clone(),
                source,
            })?;

            if file_type.is_dir() {
                let name = entry.file_name();
                if !self.skips(&name.to_string_lossy()) {
                    subdirs.push(path);
                }
            } else if self.is_source(&path) {
                if package.is_none() {
                    package = Some(Package::new(self.package_id(dir)?, dir));
                }
                if let Some(pkg) = package.as_mut() {
                    pkg.files.insert(path.clone(), read_source(&path));
                }
            }
        }

        if let Some(mut pkg) = package {
            analyze(&mut pkg);
            log::debug!("loaded package {} ({} files)", pkg.id, pkg.files.len());
            packages.push(pkg);
        }

        for subdir in subdirs {
            self.walk(&subdir, packages)?;
        }

        Ok(())
    }
}

impl PackageGraph for FsPackageGraph {
    fn root(&self) -> &Path {
        &self.root
    }

    fn load(&self) -> Result<PackageSet, GraphError> {
        let meta = fs::metadata(&self.root).map_err(|source| GraphError::Io {
            path: self.root.clone(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(GraphError::NotADirectory(self.root.clone()));
        }

        let mut packages = Vec::new();
        self.walk(&self.root, &mut packages)?;
        log::info!(
            "loaded {} packages under {}",
            packages.len(),
            self.root.display()
        );
        Ok(PackageSet::new(packages))
    }

    fn add_file(
        &self,
        pkgs: &PackageSet,
        path: &Path,
        content: &str,
    ) -> Result<(PackageSet, AddedFile), GraphError> {
        let (id, dir) = self.locate(path)?;
        let mut next = pkgs.clone();

        let new_package = match next.get_mut(&id) {
            Some(pkg) => {
                pkg.removed.remove(path);
                pkg.files
                    .insert(path.to_path_buf(), SourceFile::from_editor(content));
                pkg.state = Freshness::Dirty;
                analyze(pkg);
                false
            }
            None => {
                let mut pkg = Package::new(id.clone(), dir)
                    .with_file(path, SourceFile::from_editor(content));
                pkg.state = Freshness::Dirty;
                analyze(&mut pkg);
                next.upsert(pkg);
                true
            }
        };

        Ok((
            next,
            AddedFile {
                package: id,
                new_package,
            },
        ))
    }

    fn update_file(
        &self,
        pkgs: &PackageSet,
        path: &Path,
        content: &str,
    ) -> Result<PackageSet, GraphError> {
        let id = owner(pkgs, path)?;
        let mut next = pkgs.clone();
        if let Some(pkg) = next.get_mut(&id) {
            pkg.files
                .insert(path.to_path_buf(), SourceFile::from_editor(content));
            pkg.state = Freshness::Dirty;
            analyze(pkg);
        }
        Ok(next)
    }

    fn close_file(&self, pkgs: &PackageSet, path: &Path) -> Result<PackageSet, GraphError> {
        let id = owner(pkgs, path)?;
        let mut next = pkgs.clone();
        if let Some(pkg) = next.get_mut(&id) {
            match fs::read_to_string(path) {
                Ok(text) => {
                    pkg.files
                        .insert(path.to_path_buf(), SourceFile::from_disk(text));
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    pkg.files.remove(path);
                    pkg.removed.insert(path.to_path_buf());
                }
                Err(e) => {
                    pkg.files
                        .insert(path.to_path_buf(), SourceFile::unreadable(e.to_string()));
                }
            }
            pkg.state = Freshness::Dirty;
            analyze(pkg);
        }
        Ok(next)
    }

    fn errors(
        &self,
        pkgs: &PackageSet,
        package: &PackageId,
    ) -> Result<FileDiagnostics, GraphError> {
        let pkg = pkgs
            .get(package)
            .ok_or_else(|| GraphError::UnknownPackage(package.clone()))?;

        let mut diagnostics = FileDiagnostics::new();
        for path in pkg.files.keys().chain(pkg.removed.iter()) {
            diagnostics.touch(path.clone());
        }
        for error in &pkg.errors {
            diagnostics.push(error.clone());
        }
        Ok(diagnostics)
    }
}

fn owner(pkgs: &PackageSet, path: &Path) -> Result<PackageId, GraphError> {
    pkgs.owner_of(path)
        .map(|p| p.id.clone())
        .ok_or_else(|| GraphError::UnknownFile(path.to_path_buf()))
}

fn read_source(path: &Path) -> SourceFile {
    match fs::read_to_string(path) {
        Ok(text) => SourceFile::from_disk(text),
        Err(e) => {
            log::warn!("could not read {}: {}", path.display(), e);
            SourceFile::unreadable(e.to_string())
        }
    }
}

/// Recompute the declared name and the hard errors of a package from its files.
fn analyze(pkg: &mut Package) {
    let mut errors = Vec::new();
    let mut declared: Option<(String, PathBuf)> = None;

    for (path, file) in &pkg.files {
        if let Some(err) = &file.read_error {
            errors.push(
                Diagnostic::error(path, Span::default(), format!("could not read file: {err}"))
                    .with_source(SOURCE),
            );
            continue;
        }

        match clause::scan(&file.text) {
            ClauseScan::Found(found) => {
                if let Some((name, first)) = &declared {
                    if *name != found.name {
                        let first = first.file_name().unwrap_or(first.as_os_str());
                        errors.push(
                            Diagnostic::error(
                                path,
                                found.span,
                                format!(
                                    "package {} does not match package {} declared in {}",
                                    found.name,
                                    name,
                                    first.to_string_lossy()
                                ),
                            )
                            .with_source(SOURCE),
                        );
                    }
                } else {
                    declared = Some((found.name, path.clone()));
                }
            }
            ClauseScan::Malformed { line, text } => {
                errors.push(
                    Diagnostic::error(
                        path,
                        Span::on_line(line, 0, text.encode_utf16().count() as u32),
                        format!("expected package clause, found `{text}`"),
                    )
                    .with_source(SOURCE),
                );
            }
            ClauseScan::Missing => {
                errors.push(
                    Diagnostic::error(path, Span::default(), "missing package clause")
                        .with_source(SOURCE),
                );
            }
        }
    }

    pkg.name = declared.map(|(name, _)| name);
    pkg.errors = errors;
}
