use std::path::Path;

use tower_lsp::Client;
use tower_lsp::lsp_types::{DiagnosticSeverity, NumberOrString, Position, Range, Url};

use crate::core::{Diagnostic, Severity};
use crate::sync::DiagnosticSink;

/// Publishes engine diagnostics to the editor as `textDocument/publishDiagnostics`
#[derive(Clone)]
pub struct ClientSink {
    client: Client,
}

impl ClientSink {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[tower_lsp::async_trait]
impl DiagnosticSink for ClientSink {
    async fn publish(&self, file: &Path, diagnostics: Vec<Diagnostic>) {
        let uri = match Url::from_file_path(file) {
            Ok(uri) => uri,
            Err(()) => {
                log::warn!("cannot publish diagnostics for {}: not an absolute path", file.display());
                return;
            }
        };

        let diagnostics = diagnostics.into_iter().map(create_lsp_diagnostic).collect();
        self.client.publish_diagnostics(uri, diagnostics, None).await;
    }
}

pub fn create_lsp_diagnostic(diagnostic: Diagnostic) -> tower_lsp::lsp_types::Diagnostic {
    let severity = match diagnostic.severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Info => DiagnosticSeverity::INFORMATION,
        Severity::Hint => DiagnosticSeverity::HINT,
    };

    let span = diagnostic.span;
    tower_lsp::lsp_types::Diagnostic::new(
        Range::new(
            Position::new(span.start_line, span.start_column),
            Position::new(span.end_line, span.end_column),
        ),
        Some(severity),
        None::<NumberOrString>,
        Some(diagnostic.source.unwrap_or_else(|| "gunkls".to_string())),
        diagnostic.message,
        None,
        None,
    )
}
