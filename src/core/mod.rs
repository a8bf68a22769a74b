//! Core Data Model
//!
//! Packages, package sets and diagnostics shared by the graph, lint and sync layers.

pub mod diagnostics;
pub mod package;

pub use diagnostics::{Diagnostic, FileDiagnostics, Severity, Span};
pub use package::{Freshness, Origin, Package, PackageId, PackageSet, SourceFile};
