//! Synchronization and diagnostics dispatch.

pub mod engine;
pub mod error;
pub mod sink;

pub use engine::{EventOutcome, Session, SweepReport, SyncEngine, resolve_workspace};
pub use error::{DocumentEvent, ErrorCategory, SyncError};
pub use sink::DiagnosticSink;
