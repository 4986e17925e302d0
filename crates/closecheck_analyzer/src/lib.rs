//! closecheck_analyzer: resource lifecycle checks over a type-checked unit.
//!
//! For every short variable declaration (`:=`) that introduces a value
//! with a `Close() error` method, the analyzer looks at the statements that
//! follow it in the same block:
//!
//! - an error declared alongside must be tested by the very next statement,
//!   an `if` whose condition mentions it;
//! - the resource must be closed by exactly one `x.Close()` statement.
//!
//! The analysis is purely positional. It does not follow control flow and
//! does not look into nested blocks when counting close calls.

pub mod finding;
pub mod oracle;
mod queries;
mod rule;

pub use finding::FindingKind;
pub use oracle::{is_closeable_resource, is_error_value, CLOSER_SHAPE, ERROR_SHAPE};
pub use queries::TypeQueries;

use closecheck_ast::node::SourceFile;
use closecheck_core::intern::StringInterner;
use closecheck_diagnostics::DiagnosticCollection;
use tracing::debug;

/// Tunables for the block scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyzerOptions {
    /// Count `defer x.Close()` in the declaring block as a release.
    pub count_deferred_close: bool,
}

/// Runs the lifecycle rule over source files of one analysis unit.
pub struct Analyzer<'q, Q: TypeQueries + ?Sized> {
    queries: &'q Q,
    interner: &'q StringInterner,
    options: AnalyzerOptions,
}

impl<'q, Q: TypeQueries + ?Sized> Analyzer<'q, Q> {
    pub fn new(queries: &'q Q, interner: &'q StringInterner, options: AnalyzerOptions) -> Self {
        Self {
            queries,
            interner,
            options,
        }
    }

    pub fn options(&self) -> AnalyzerOptions {
        self.options
    }

    /// Findings for one file, sorted by position and tagged with the
    /// file's name.
    pub fn analyze_file(&self, file: &SourceFile<'_>) -> DiagnosticCollection {
        let mut diagnostics =
            rule::BlockScan::new(self.queries, self.interner, self.options).scan(file);
        diagnostics.set_file(&file.file_name);
        diagnostics.sort();
        debug!(
            file = %file.file_name,
            findings = diagnostics.len(),
            "analyzed file"
        );
        diagnostics
    }

    /// Findings for several files, in the order given.
    pub fn analyze_files<'f, 'a: 'f>(
        &self,
        files: impl IntoIterator<Item = &'f SourceFile<'a>>,
    ) -> DiagnosticCollection {
        let mut all = DiagnosticCollection::new();
        for file in files {
            all.extend(self.analyze_file(file));
        }
        all
    }
}
