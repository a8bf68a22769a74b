use std::path::Path;

use crate::core::Diagnostic;

/// Receiver of per-file diagnostic publications.
///
/// Each call carries the complete list for the file and replaces whatever
/// was published for it before; an empty list clears the file.
#[tower_lsp::async_trait]
pub trait DiagnosticSink: Send + Sync {
    async fn publish(&self, file: &Path, diagnostics: Vec<Diagnostic>);
}
