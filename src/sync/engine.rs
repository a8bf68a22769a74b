//! Synchronization Engine
//!
//! Applies document lifecycle events to the package set and republishes
//! diagnostics for every package the event left Dirty. Callers must feed
//! events one at a time; each handler runs its sweep to completion before
//! returning.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tower_lsp::lsp_types::Url;

use super::error::{DocumentEvent, SyncError};
use super::sink::DiagnosticSink;
use crate::core::{PackageId, PackageSet};
use crate::graph::{GraphError, PackageGraph};
use crate::lint::{LintContext, Linter};

/// Per-session settings the engine is started with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Workspace root as a `file://` URI
    pub workspace_uri: String,
    /// Append lint findings to packages without hard errors
    pub lint: bool,
}

impl Session {
    pub fn new(workspace_uri: impl Into<String>, lint: bool) -> Self {
        Self {
            workspace_uri: workspace_uri.into(),
            lint,
        }
    }
}

/// What one diagnostics sweep did
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Packages whose diagnostics were published and are now Clean
    pub swept: Vec<PackageId>,
    /// Number of publish calls made
    pub published: usize,
    /// Packages skipped this sweep; they stay Dirty
    pub failures: Vec<SyncError>,
}

/// Result of one lifecycle handler: its own registration result plus the sweep that followed
#[derive(Debug)]
pub struct EventOutcome {
    pub registration: Result<(), SyncError>,
    pub sweep: SweepReport,
}

impl EventOutcome {
    pub fn into_result(self) -> Result<SweepReport, SyncError> {
        self.registration.map(|()| self.sweep)
    }
}

/// Resolve a `file://` workspace URI to a local directory path.
pub fn resolve_workspace(uri: &str) -> Result<PathBuf, SyncError> {
    let invalid = |reason: String| SyncError::InvalidWorkspaceRoot {
        uri: uri.to_string(),
        reason,
    };

    let url = Url::parse(uri).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "file" {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    url.to_file_path()
        .map_err(|()| invalid("not a local file path".to_string()))
}

pub struct SyncEngine {
    session: Session,
    graph: Box<dyn PackageGraph>,
    linter: Box<dyn Linter>,
    sink: Arc<dyn DiagnosticSink>,
    packages: PackageSet,
}

impl SyncEngine {
    /// Resolve the session's workspace, build a graph scoped to it with
    /// `connect` and load every package under the root.
    ///
    /// Nothing is kept on failure.
    pub fn load<G, F>(
        session: Session,
        connect: F,
        linter: Box<dyn Linter>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, SyncError>
    where
        G: PackageGraph + 'static,
        F: FnOnce(&Path) -> G,
    {
        let root = resolve_workspace(&session.workspace_uri)?;
        let graph = connect(&root);
        let packages = graph
            .load()
            .map_err(|source| SyncError::WorkspaceLoad { root, source })?;

        log::info!(
            "workspace {} loaded with {} packages (lint {})",
            session.workspace_uri,
            packages.len(),
            if session.lint { "on" } else { "off" }
        );

        Ok(Self {
            session,
            graph: Box::new(graph),
            linter,
            sink,
            packages,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn packages(&self) -> &PackageSet {
        &self.packages
    }

    /// A document became visible in the editor with `text`.
    pub async fn open(&mut self, path: &Path, text: &str) -> EventOutcome {
        let registration = match self.graph.add_file(&self.packages, path, text) {
            Ok((packages, added)) => {
                if added.new_package {
                    log::info!("{} introduced package {}", path.display(), added.package);
                }
                self.packages = packages;
                Ok(())
            }
            Err(source) => Err(registration_error(DocumentEvent::Open, path, source)),
        };
        self.finish(registration).await
    }

    /// The document's whole content is now `text`. Incremental deltas are not accepted here.
    pub async fn update(&mut self, path: &Path, text: &str) -> EventOutcome {
        let registration = self
            .graph
            .update_file(&self.packages, path, text)
            .map(|packages| self.packages = packages)
            .map_err(|source| registration_error(DocumentEvent::Update, path, source));
        self.finish(registration).await
    }

    /// An update arrived without a whole document body. Nothing is
    /// registered; Dirty packages are still swept.
    pub async fn reject_update(&mut self, path: &Path) -> EventOutcome {
        let registration = Err(SyncError::IncompleteUpdate {
            path: path.to_path_buf(),
        });
        self.finish(registration).await
    }

    /// The editor closed the document; the graph falls back to disk.
    pub async fn close(&mut self, path: &Path) -> EventOutcome {
        let registration = self
            .graph
            .close_file(&self.packages, path)
            .map(|packages| self.packages = packages)
            .map_err(|source| registration_error(DocumentEvent::Close, path, source));
        self.finish(registration).await
    }

    async fn finish(&mut self, registration: Result<(), SyncError>) -> EventOutcome {
        if let Err(e) = &registration {
            log::warn!("{}", e);
        }
        let sweep = self.sweep().await;
        EventOutcome {
            registration,
            sweep,
        }
    }

    /// Recompute and publish diagnostics for every Dirty package.
    ///
    /// Clean packages cost nothing. A package whose diagnostics cannot be
    /// fetched is left Dirty for the next event.
    pub async fn sweep(&mut self) -> SweepReport {
        let mut report = SweepReport::default();

        for id in self.packages.dirty() {
            let mut diagnostics = match self.graph.errors(&self.packages, &id) {
                Ok(diagnostics) => diagnostics,
                Err(source) => {
                    let err = SyncError::DiagnosticsFetch {
                        package: id,
                        source,
                    };
                    log::warn!("{}", err);
                    report.failures.push(err);
                    continue;
                }
            };

            let Some(package) = self.packages.get(&id) else {
                continue;
            };

            // Hard errors suppress advisory findings for the whole package.
            if self.session.lint && package.errors.is_empty() {
                let cx = LintContext {
                    packages: &self.packages,
                    graph: &*self.graph,
                };
                diagnostics.append(self.linter.lint_package(cx, package).await);
            }

            log::debug!(
                "publishing {} diagnostics across {} files of package {}",
                diagnostics.count(),
                diagnostics.len(),
                id
            );
            for (file, list) in diagnostics {
                self.sink.publish(&file, list).await;
                report.published += 1;
            }

            self.packages = std::mem::take(&mut self.packages).into_clean(&id);
            report.swept.push(id);
        }

        report
    }
}

fn registration_error(event: DocumentEvent, path: &Path, source: GraphError) -> SyncError {
    SyncError::Registration {
        event,
        path: path.to_path_buf(),
        source,
    }
}
