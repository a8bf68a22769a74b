//! Package clause scanning.
//!
//! The filesystem graph only checks package structure: each file names its
//! package on the first significant line and all files of a directory agree.

use regex::Regex;
use std::sync::LazyLock;

use crate::core::Span;

static CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)package\s+([A-Za-z_][A-Za-z0-9_]*)\s*(//.*)?$").expect("valid clause regex")
});

/// A `package <name>` declaration found in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageClause {
    pub name: String,
    /// Location of the name token
    pub span: Span,
}

/// Result of scanning a file's header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClauseScan {
    Found(PackageClause),
    /// The first significant line is not a package clause
    Malformed { line: u32, text: String },
    /// Only blank lines and comments
    Missing,
}

/// Find the package clause on the first non-blank, non-`//` line.
pub fn scan(text: &str) -> ClauseScan {
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        let line_no = idx as u32;
        return match CLAUSE.captures(line) {
            Some(caps) => {
                let name = &caps[2];
                // LSP columns count UTF-16 code units.
                let start = caps
                    .get(2)
                    .map(|m| line[..m.start()].encode_utf16().count())
                    .unwrap_or(0);
                ClauseScan::Found(PackageClause {
                    name: name.to_string(),
                    span: Span::on_line(line_no, start as u32, name.encode_utf16().count() as u32),
                })
            }
            None => ClauseScan::Malformed {
                line: line_no,
                text: trimmed.to_string(),
            },
        };
    }
    ClauseScan::Missing
}
