//! Packages
//!
//! A package is one compiled unit of source files. The engine only ever
//! holds a `PackageSet` handed back by the package graph and replaces it
//! wholesale; the transformations here return new values.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::diagnostics::Diagnostic;

/// Import key of a package: its directory relative to the workspace root
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageId(String);

impl PackageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PackageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Whether a package's published diagnostics are current
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    #[default]
    Clean,
    Dirty,
}

/// Where the tracked text of a file came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Disk,
    /// Open in the editor; the text may differ from disk
    Editor,
}

/// Tracked content of one member file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub text: Arc<str>,
    pub origin: Origin,
    /// Set when the file exists on disk but could not be read
    pub read_error: Option<String>,
}

impl SourceFile {
    pub fn from_disk(text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::Disk,
            read_error: None,
        }
    }

    pub fn from_editor(text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::Editor,
            read_error: None,
        }
    }

    pub fn unreadable(error: impl Into<String>) -> Self {
        Self {
            text: Arc::from(""),
            origin: Origin::Disk,
            read_error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub id: PackageId,
    pub dir: PathBuf,
    /// Declared package name, when one could be determined
    pub name: Option<String>,
    pub files: BTreeMap<PathBuf, SourceFile>,
    pub state: Freshness,
    /// Hard errors from analysis, in discovery order
    pub errors: Vec<Diagnostic>,
    /// Files dropped from the package since its diagnostics were last published
    pub removed: BTreeSet<PathBuf>,
}

impl Package {
    pub fn new(id: impl Into<PackageId>, dir: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            dir: dir.into(),
            name: None,
            files: BTreeMap::new(),
            state: Freshness::Clean,
            errors: Vec::new(),
            removed: BTreeSet::new(),
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, file: SourceFile) -> Self {
        self.files.insert(path.into(), file);
        self
    }

    pub fn is_dirty(&self) -> bool {
        self.state == Freshness::Dirty
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

/// Ordered collection of the workspace's packages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSet {
    packages: Vec<Package>,
}

impl PackageSet {
    pub fn new(mut packages: Vec<Package>) -> Self {
        packages.sort_by(|a, b| a.id.cmp(&b.id));
        Self { packages }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn get(&self, id: &PackageId) -> Option<&Package> {
        self.packages.iter().find(|p| &p.id == id)
    }

    pub fn get_mut(&mut self, id: &PackageId) -> Option<&mut Package> {
        self.packages.iter_mut().find(|p| &p.id == id)
    }

    /// Package that currently owns `path` as a member file
    pub fn owner_of(&self, path: &Path) -> Option<&Package> {
        self.packages.iter().find(|p| p.contains(path))
    }

    /// Ids of packages awaiting a diagnostics pass, in set order
    pub fn dirty(&self) -> Vec<PackageId> {
        self.packages
            .iter()
            .filter(|p| p.is_dirty())
            .map(|p| p.id.clone())
            .collect()
    }

    /// Insert or replace a package, keeping id order.
    pub fn upsert(&mut self, package: Package) {
        match self.packages.binary_search_by(|p| p.id.cmp(&package.id)) {
            Ok(idx) => self.packages[idx] = package,
            Err(idx) => self.packages.insert(idx, package),
        }
    }

    /// Set after `id`'s diagnostics were published: the package is Clean,
    /// its removed-file memory is spent, and it is dropped if no files remain.
    pub fn into_clean(mut self, id: &PackageId) -> Self {
        if let Some(idx) = self.packages.iter().position(|p| &p.id == id) {
            let package = &mut self.packages[idx];
            package.state = Freshness::Clean;
            package.removed.clear();
            if package.files.is_empty() {
                self.packages.remove(idx);
            }
        }
        self
    }
}

impl<'a> IntoIterator for &'a PackageSet {
    type Item = &'a Package;
    type IntoIter = std::slice::Iter<'a, Package>;

    fn into_iter(self) -> Self::IntoIter {
        self.packages.iter()
    }
}
