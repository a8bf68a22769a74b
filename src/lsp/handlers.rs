use std::path::PathBuf;
use std::sync::Arc;

use tower_lsp::lsp_types::*;

use crate::Config;
use crate::graph::FsPackageGraph;
use crate::lint::{CommandLinter, Linter, NoopLinter};
use crate::lsp::backend::Backend;
use crate::lsp::sink::ClientSink;
use crate::sync::{EventOutcome, Session, SyncEngine};

/// Trait for bootstrapping the workspace
#[tower_lsp::async_trait]
pub trait HandleWorkspace {
    async fn load_workspace(&self);
}

/// Trait for handling document lifecycle notifications
#[tower_lsp::async_trait]
pub trait HandleDocumentSync {
    async fn handle_did_open(&self, params: DidOpenTextDocumentParams);
    async fn handle_did_change(&self, params: DidChangeTextDocumentParams);
    async fn handle_did_close(&self, params: DidCloseTextDocumentParams);
}

#[tower_lsp::async_trait]
impl HandleWorkspace for Backend {
    /// Load every package under the workspace root and start the engine.
    async fn load_workspace(&self) {
        // Taken first so lifecycle events wait for the load to finish.
        let mut engine = self.engine.lock().await;

        let root = match self.workspace.lock().await.clone() {
            Some(root) => root,
            None => {
                log::warn!("no workspace root; diagnostics are disabled for this session");
                return;
            }
        };

        let mut config = self.config.lock().await;
        if let Ok(path) = root.to_file_path() {
            match config.load_project(&path) {
                Ok(Some(file)) => log::info!("applied project settings {}", file.display()),
                Ok(None) => {}
                Err(e) => {
                    log::warn!("{:#}", e);
                    self.client
                        .show_message(MessageType::WARNING, format!("{:#}", e))
                        .await;
                }
            }
        }

        let session = Session::new(root.as_str(), config.lint);
        let linter = create_linter(&config);
        let extension = config.extension.clone();
        let skip_dirs = config.skip_dirs.clone();
        drop(config);

        let sink = Arc::new(ClientSink::new(self.client.clone()));
        let connect = |path: &std::path::Path| {
            FsPackageGraph::new(path)
                .with_extension(extension)
                .with_skip_dirs(skip_dirs)
        };

        match SyncEngine::load(session, connect, linter, sink) {
            Ok(loaded) => *engine = Some(loaded),
            Err(e) => {
                log::error!("{}", e);
                self.client
                    .show_message(MessageType::ERROR, e.to_string())
                    .await;
            }
        }
    }
}

#[tower_lsp::async_trait]
impl HandleDocumentSync for Backend {
    async fn handle_did_open(&self, params: DidOpenTextDocumentParams) {
        let Some(path) = document_path(&params.text_document.uri) else {
            return;
        };

        let mut engine = self.engine.lock().await;
        if let Some(engine) = engine.as_mut() {
            let outcome = engine.open(&path, &params.text_document.text).await;
            log_outcome("open", &path, &outcome);
        }
    }

    async fn handle_did_change(&self, params: DidChangeTextDocumentParams) {
        let Some(path) = document_path(&params.text_document.uri) else {
            return;
        };
        let text = full_text(params.content_changes);

        let mut engine = self.engine.lock().await;
        if let Some(engine) = engine.as_mut() {
            let outcome = match text {
                Some(text) => engine.update(&path, &text).await,
                None => engine.reject_update(&path).await,
            };
            log_outcome("update", &path, &outcome);
        }
    }

    async fn handle_did_close(&self, params: DidCloseTextDocumentParams) {
        let Some(path) = document_path(&params.text_document.uri) else {
            return;
        };

        let mut engine = self.engine.lock().await;
        if let Some(engine) = engine.as_mut() {
            let outcome = engine.close(&path).await;
            log_outcome("close", &path, &outcome);
        }
    }
}

/// Linter for the session: the configured command, or nothing.
pub fn create_linter(config: &Config) -> Box<dyn Linter> {
    if !config.lint {
        return Box::new(NoopLinter);
    }
    match CommandLinter::new(config.lint_command.clone()) {
        Some(linter) => Box::new(linter),
        None => {
            log::warn!("lint is enabled but no lint command is configured");
            Box::new(NoopLinter)
        }
    }
}

/// New document text from a change notification.
///
/// The server only accepts whole-document replacement: the last change
/// without a range wins and ranged (incremental) changes are ignored.
pub fn full_text(changes: Vec<TextDocumentContentChangeEvent>) -> Option<String> {
    let mut text = None;
    for change in changes {
        if change.range.is_some() {
            log::warn!("ignoring incremental change; only full document sync is supported");
            continue;
        }
        text = Some(change.text);
    }
    text
}

fn document_path(uri: &Url) -> Option<PathBuf> {
    match uri.to_file_path() {
        Ok(path) => Some(path),
        Err(()) => {
            log::debug!("ignoring non-file document {}", uri);
            None
        }
    }
}

fn log_outcome(event: &str, path: &std::path::Path, outcome: &EventOutcome) {
    log::debug!(
        "{} {}: swept {} packages, {} publications, {} failures",
        event,
        path.display(),
        outcome.sweep.swept.len(),
        outcome.sweep.published,
        outcome.sweep.failures.len()
    );
}
