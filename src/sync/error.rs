use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::PackageId;
use crate::graph::GraphError;

/// Document lifecycle event that triggered a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    Open,
    Update,
    Close,
}

impl fmt::Display for DocumentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentEvent::Open => "open",
            DocumentEvent::Update => "update",
            DocumentEvent::Close => "close",
        };
        f.write_str(s)
    }
}

/// Failure classes of the synchronization engine.
///
/// Only `WorkspaceLoad` is fatal; the others are absorbed by the engine and
/// reported back for logging and inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    WorkspaceLoad,
    Registration,
    DiagnosticsFetch,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("could not load workspace: invalid root `{uri}`: {reason}")]
    InvalidWorkspaceRoot { uri: String, reason: String },

    #[error("could not load workspace {}: {source}", root.display())]
    WorkspaceLoad {
        root: PathBuf,
        #[source]
        source: GraphError,
    },

    #[error("could not {event} {}: {source}", path.display())]
    Registration {
        event: DocumentEvent,
        path: PathBuf,
        #[source]
        source: GraphError,
    },

    #[error("could not update {}: the change carried no full document text", path.display())]
    IncompleteUpdate { path: PathBuf },

    #[error("could not load diagnostics for package {package}: {source}")]
    DiagnosticsFetch {
        package: PackageId,
        #[source]
        source: GraphError,
    },
}

impl SyncError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::InvalidWorkspaceRoot { .. } | SyncError::WorkspaceLoad { .. } => {
                ErrorCategory::WorkspaceLoad
            }
            SyncError::Registration { .. } | SyncError::IncompleteUpdate { .. } => {
                ErrorCategory::Registration
            }
            SyncError::DiagnosticsFetch { .. } => ErrorCategory::DiagnosticsFetch,
        }
    }
}
