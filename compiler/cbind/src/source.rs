//! Declaration source boundary.
//!
//! The header parser lives outside this workspace. It hands over one
//! [`TranslationUnit`] per parsed file, or fails with the diagnostics it
//! produced.

use std::fmt;
use std::path::PathBuf;

use cbind_lower::TranslationUnit;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Note,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    pub fn is_error(self) -> bool {
        matches!(self, Severity::Error | Severity::Fatal)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        })
    }
}

/// One parser message, located by file, line and column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({},{}): {}: {}",
            self.file, self.line, self.column, self.severity, self.message
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DeclarationError {
    #[error("failed to parse {} header(s): {} error(s)", files.len(), error_count(diagnostics))]
    Parse {
        files: Vec<PathBuf>,
        diagnostics: Vec<Diagnostic>,
    },

    #[error("header not found: {}", path.display())]
    FileNotFound { path: PathBuf },
}

impl DeclarationError {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            DeclarationError::Parse { diagnostics, .. } => diagnostics,
            DeclarationError::FileNotFound { .. } => &[],
        }
    }
}

fn error_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.severity.is_error()).count()
}

/// Header parser front end.
pub trait DeclarationSource {
    fn parse(&mut self, files: &[PathBuf]) -> Result<Vec<TranslationUnit>, DeclarationError>;
}
