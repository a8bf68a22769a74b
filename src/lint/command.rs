//! External lint tool runner.
//!
//! The tool is run once per file with the file's current text on stdin, so
//! unsaved editor content is what gets linted. Output lines look like
//! `[path:]line:col: message` with 1-based positions.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time;

use super::{LintContext, Linter};
use crate::core::{Diagnostic, FileDiagnostics, Package, Span};

/// Placeholder in the argv replaced by the linted file's path
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Source attached to lint findings
pub const LINT_SOURCE: &str = "gunk-lint";

/// How long one tool run may take before it is killed
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

static FINDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<path>.+?):)?(?P<line>\d+):(?P<col>\d+):\s*(?P<msg>.+)$")
        .expect("valid finding regex")
});

#[derive(Debug, Clone)]
pub struct CommandLinter {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandLinter {
    /// `None` when `argv` is empty
    pub fn new(argv: Vec<String>) -> Option<Self> {
        let mut argv = argv.into_iter();
        let program = argv.next()?;
        Some(Self {
            program,
            args: argv.collect(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn lint_file(
        &self,
        root: &Path,
        path: &Path,
        text: Arc<str>,
    ) -> io::Result<Vec<Diagnostic>> {
        let file = path.to_string_lossy();
        let mut child = Command::new(&self.program)
            .args(self.args.iter().map(|a| a.replace(FILE_PLACEHOLDER, &file)))
            .current_dir(root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Written alongside the output reads so a chatty tool cannot block on
        // a full pipe. Dropping stdin at the end closes it.
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                match stdin.write_all(text.as_bytes()).await {
                    Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e),
                    _ => {}
                }
            }
            Ok(())
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        fed?;
        let output = output?;

        let mut diagnostics = parse_output(root, path, &String::from_utf8_lossy(&output.stdout));
        diagnostics.extend(parse_output(
            root,
            path,
            &String::from_utf8_lossy(&output.stderr),
        ));
        Ok(diagnostics)
    }
}

#[tower_lsp::async_trait]
impl Linter for CommandLinter {
    async fn lint_package(&self, cx: LintContext<'_>, package: &Package) -> FileDiagnostics {
        let mut findings = FileDiagnostics::new();

        for (path, file) in &package.files {
            if file.read_error.is_some() {
                continue;
            }
            // A run that times out is dropped, which kills the tool.
            match time::timeout(self.timeout, self.lint_file(cx.root(), path, file.text.clone()))
                .await
            {
                Ok(Ok(diagnostics)) => {
                    for diagnostic in diagnostics {
                        findings.push(diagnostic);
                    }
                }
                Ok(Err(e)) => {
                    log::warn!("lint command `{}` failed: {}", self.program, e);
                    break;
                }
                Err(_) => {
                    log::warn!(
                        "lint command `{}` timed out after {:?} on {}",
                        self.program,
                        self.timeout,
                        path.display()
                    );
                    break;
                }
            }
        }

        log::debug!(
            "lint found {} issues in package {}",
            findings.count(),
            package.id
        );
        findings
    }
}

/// Turn tool output into warnings on `file`.
///
/// Lines naming another file are dropped; `-` and `<stdin>` mean the linted file.
pub fn parse_output(root: &Path, file: &Path, output: &str) -> Vec<Diagnostic> {
    output
        .lines()
        .filter_map(|line| {
            let caps = FINDING.captures(line.trim_end())?;

            if let Some(named) = caps.name("path").map(|m| m.as_str()) {
                if named != "-" && named != "<stdin>" && resolve(root, named) != file {
                    return None;
                }
            }

            let line_no = caps["line"].parse::<u32>().ok()?.saturating_sub(1);
            let column = caps["col"].parse::<u32>().ok()?.saturating_sub(1);
            Some(
                Diagnostic::warning(file, Span::on_line(line_no, column, 1), caps["msg"].trim())
                    .with_source(LINT_SOURCE),
            )
        })
        .collect()
}

fn resolve(root: &Path, named: &str) -> PathBuf {
    let named = Path::new(named);
    if named.is_absolute() {
        named.to_path_buf()
    } else {
        root.join(named)
    }
}
