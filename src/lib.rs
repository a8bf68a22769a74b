//! Gunk Language Server
//!
//! Keeps an in-memory model of a workspace's packages in step with the
//! editor's document lifecycle events and publishes per-file diagnostics.
//!
//! This library provides:
//! - A package graph abstraction with a filesystem implementation
//! - Optional lint findings from an external tool
//! - The synchronization engine that decides what to recompute and publish
//! - LSP protocol implementation
//! - Configuration management

pub mod config;
pub mod core;
pub mod graph;
pub mod lint;
pub mod lsp;
pub mod sync;

// Re-exports for clean public API
pub use config::Config;
pub use crate::core::{Diagnostic, FileDiagnostics, Package, PackageId, PackageSet, Severity};
pub use graph::{FsPackageGraph, PackageGraph};
pub use lint::Linter;
pub use sync::{DiagnosticSink, Session, SyncEngine, SyncError};
