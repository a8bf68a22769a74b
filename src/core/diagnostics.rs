//! Diagnostics
//!
//! Engine-side diagnostic records, independent of the LSP wire types.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Severity of a diagnostic message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Hint => "hint",
        };
        f.write_str(s)
    }
}

/// Zero-based line/column range inside a file. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Span {
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Span covering `len` columns of a single line.
    pub fn on_line(line: u32, column: u32, len: u32) -> Self {
        Self::new(line, column, line, column + len)
    }
}

/// One issue in one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: PathBuf,
    pub message: String,
    pub severity: Severity,
    pub span: Span,
    /// Producer of the diagnostic, e.g. `gunk` for hard errors or `gunk-lint`
    pub source: Option<String>,
}

impl Diagnostic {
    pub fn error(file: impl Into<PathBuf>, span: Span, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            message: message.into(),
            severity: Severity::Error,
            span,
            source: None,
        }
    }

    pub fn warning(file: impl Into<PathBuf>, span: Span, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(file, span, message)
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {}",
            self.file.display(),
            self.span.start_line + 1,
            self.span.start_column + 1,
            self.severity,
            self.message
        )
    }
}

/// Per-file diagnostics of one package, ordered by path for stable publication.
///
/// Within a file, entries keep discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDiagnostics {
    files: BTreeMap<PathBuf, Vec<Diagnostic>>,
}

impl FileDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `file` is present, even with no diagnostics, so it gets cleared on publish.
    pub fn touch(&mut self, file: impl Into<PathBuf>) {
        self.files.entry(file.into()).or_default();
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.files
            .entry(diagnostic.file.clone())
            .or_default()
            .push(diagnostic);
    }

    /// Append another map file by file, after whatever is already recorded.
    pub fn append(&mut self, other: FileDiagnostics) {
        for (file, diagnostics) in other.files {
            self.files.entry(file).or_default().extend(diagnostics);
        }
    }

    pub fn get(&self, file: &Path) -> Option<&[Diagnostic]> {
        self.files.get(file).map(Vec::as_slice)
    }

    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total number of diagnostics across all files
    pub fn count(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }
}

impl IntoIterator for FileDiagnostics {
    type Item = (PathBuf, Vec<Diagnostic>);
    type IntoIter = std::collections::btree_map::IntoIter<PathBuf, Vec<Diagnostic>>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl FromIterator<Diagnostic> for FileDiagnostics {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        let mut map = Self::new();
        for diagnostic in iter {
            map.push(diagnostic);
        }
        map
    }
}
