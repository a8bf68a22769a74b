//! Lint Collaborator
//!
//! Advisory findings layered on top of a package's hard errors. Lint is
//! best-effort: implementations log their own failures and return whatever
//! findings they have.

pub mod command;

use std::path::Path;

use crate::core::{FileDiagnostics, Package, PackageSet};
use crate::graph::PackageGraph;

pub use command::CommandLinter;

/// Read access to the workspace while a package is being linted
#[derive(Clone, Copy)]
pub struct LintContext<'a> {
    pub packages: &'a PackageSet,
    pub graph: &'a dyn PackageGraph,
}

impl LintContext<'_> {
    pub fn root(&self) -> &Path {
        self.graph.root()
    }
}

#[tower_lsp::async_trait]
pub trait Linter: Send + Sync {
    /// Findings for the files of `package`, keyed by file
    async fn lint_package(&self, cx: LintContext<'_>, package: &Package) -> FileDiagnostics;
}

/// Linter that never reports anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLinter;

#[tower_lsp::async_trait]
impl Linter for NoopLinter {
    async fn lint_package(&self, _: LintContext<'_>, _: &Package) -> FileDiagnostics {
        FileDiagnostics::new()
    }
}
