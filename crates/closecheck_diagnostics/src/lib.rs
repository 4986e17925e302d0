//! closecheck_diagnostics: Diagnostic messages and reporting infrastructure.
//!
//! Every message the tool can print lives in [`messages`], keyed by a stable
//! code. Front-end problems (scanning, parsing) are `Error`s that make a unit
//! unanalyzable; analyzer findings are `Finding`s.

use closecheck_core::text::TextSpan;
use std::fmt;

/// What kind of report a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    /// The input could not be processed.
    Error,
    /// A lifecycle violation reported by the analyzer.
    Finding,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Error => write!(f, "error"),
            DiagnosticCategory::Finding => write!(f, "finding"),
        }
    }
}

/// A message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    /// Template text; `{0}`, `{1}`, ... are replaced by arguments.
    pub message: &'static str,
}

/// A realized diagnostic with location and resolved message text.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub file: Option<String>,
    pub span: Option<TextSpan>,
    pub message_text: String,
    pub code: u32,
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// A diagnostic not tied to a location.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            span: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    pub fn with_location(
        file: String,
        span: TextSpan,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            file: Some(file),
            span: Some(span),
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    /// A located diagnostic whose file is filled in later via
    /// [`DiagnosticCollection::set_file`].
    pub fn with_span(span: TextSpan, message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            span: Some(span),
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }

    pub fn is_finding(&self) -> bool {
        self.category == DiagnosticCategory::Finding
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}", file)?;
            if let Some(span) = self.span {
                write!(f, "({})", span.start)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{} CC{}: {}", self.category, self.code, self.message_text)
    }
}

/// Replace `{0}`, `{1}`, ... in `template` with `args`.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// Diagnostics accumulated by one phase or one whole run.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Drop everything reported after the first `len` diagnostics.
    pub fn truncate(&mut self, len: usize) {
        self.diagnostics.truncate(len);
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Attach `file` to every diagnostic that has none yet.
    pub fn set_file(&mut self, file: &str) {
        for d in &mut self.diagnostics {
            if d.file.is_none() {
                d.file = Some(file.to_string());
            }
        }
    }

    /// Sort by file, then by position. Stable, so same-position reports
    /// keep the order in which they were produced.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            let file_cmp = a.file.cmp(&b.file);
            if file_cmp != std::cmp::Ordering::Equal {
                return file_cmp;
            }
            let a_pos = a.span.map(|s| s.start).unwrap_or(0);
            let b_pos = b.span.map(|s| s.start).unwrap_or(0);
            a_pos.cmp(&b_pos)
        });
    }
}

impl IntoIterator for DiagnosticCollection {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Finding, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Finding, message: $msg }
        };
    }

    // ========================================================================
    // Scanner errors (100-199)
    // ========================================================================
    pub const INVALID_CHARACTER: DiagnosticMessage = diag!(101, Error, "invalid character {0}");
    pub const STRING_LITERAL_NOT_TERMINATED: DiagnosticMessage = diag!(102, Error, "string literal not terminated");
    pub const RAW_STRING_LITERAL_NOT_TERMINATED: DiagnosticMessage = diag!(103, Error, "raw string literal not terminated");
    pub const RUNE_LITERAL_NOT_TERMINATED: DiagnosticMessage = diag!(104, Error, "rune literal not terminated");
    pub const COMMENT_NOT_TERMINATED: DiagnosticMessage = diag!(105, Error, "comment not terminated");
    pub const ILLEGAL_RUNE_LITERAL: DiagnosticMessage = diag!(106, Error, "illegal rune literal");
    pub const INVALID_DIGIT_IN_LITERAL: DiagnosticMessage = diag!(107, Error, "invalid digit {0} in {1} literal");
    pub const UNKNOWN_ESCAPE_SEQUENCE: DiagnosticMessage = diag!(108, Error, "unknown escape sequence");

    // ========================================================================
    // Parser errors (200-299)
    // ========================================================================
    pub const EXPECTED_0_FOUND_1: DiagnosticMessage = diag!(201, Error, "expected {0}, found {1}");
    pub const EXPECTED_PACKAGE_CLAUSE: DiagnosticMessage = diag!(202, Error, "expected 'package', found {0}");
    pub const EXPECTED_DECLARATION: DiagnosticMessage = diag!(203, Error, "expected declaration, found {0}");
    pub const EXPECTED_STATEMENT: DiagnosticMessage = diag!(204, Error, "expected statement, found {0}");
    pub const EXPECTED_OPERAND: DiagnosticMessage = diag!(205, Error, "expected operand, found {0}");
    pub const EXPECTED_TYPE: DiagnosticMessage = diag!(206, Error, "expected type, found {0}");
    pub const EXPECTED_EXPRESSION_IN_CONDITION: DiagnosticMessage = diag!(207, Error, "missing condition in if statement");
    pub const EXPECTED_SELECTOR_OR_TYPE_ASSERTION: DiagnosticMessage = diag!(208, Error, "expected selector or type assertion, found {0}");
    pub const INVALID_RANGE_CLAUSE: DiagnosticMessage = diag!(209, Error, "range clause permits at most two iteration variables");
    pub const NON_NAME_ON_LEFT_SIDE_OF_DEFINE: DiagnosticMessage = diag!(210, Error, "non-name {0} on left side of :=");
    pub const MIXED_NAMED_AND_UNNAMED_PARAMETERS: DiagnosticMessage = diag!(212, Error, "mixed named and unnamed parameters");
    pub const GENERIC_TYPE_PARAMETERS_NOT_SUPPORTED: DiagnosticMessage = diag!(213, Error, "type parameters are not supported");
    pub const EXPRESSION_NESTING_TOO_DEEP: DiagnosticMessage = diag!(214, Error, "expression nesting too deep");

    // ========================================================================
    // Driver errors (300-399)
    // ========================================================================
    pub const PACKAGE_NAME_MISMATCH_0_1: DiagnosticMessage = diag!(301, Error, "found packages {0} and {1} in the same directory");

    // ========================================================================
    // Closecheck findings (1000-1099)
    // ========================================================================
    pub const ERROR_0_NOT_CHECKED_IMMEDIATELY: DiagnosticMessage = diag!(1001, Finding, "error {0} not checked immediately");
    pub const _0_CLOSE_NOT_CALLED: DiagnosticMessage = diag!(1002, Finding, "{0}.Close() not called");
    pub const _0_CLOSE_CALLED_MULTIPLE_TIMES: DiagnosticMessage = diag!(1003, Finding, "{0}.Close() called multiple times");
}
