//! closecheck_driver: analysis orchestration.
//!
//! Creates the program, groups source files into analysis units (one per
//! directory and package clause), and runs parse, bind, check and analyze
//! for each unit. Directories are processed in parallel and share nothing.

mod library;
mod stubs;
mod unit;

pub use stubs::{stub_paths, stub_source};

use closecheck_analyzer::AnalyzerOptions;
use closecheck_core::text::LineMap;
use closecheck_diagnostics::{Diagnostic, DiagnosticCollection};
use library::Libraries;
use closecheck_module::{discover_source_files, import_path_for, DiscoveryOptions};
use closecheck_options::AnalysisOptions;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("cannot read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A source file's name and text.
#[derive(Debug, Clone)]
pub struct SourceText {
    pub file_name: String,
    pub text: String,
}

/// Identifies one analysis unit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnitKey {
    pub directory: PathBuf,
    pub package: String,
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (package {})", self.directory.display(), self.package)
    }
}

/// The outcome of [`Program::analyze`].
#[derive(Debug, Default)]
pub struct AnalysisResult {
    /// Findings and front-end errors, sorted by file and position.
    pub diagnostics: DiagnosticCollection,
    /// Units that could not be analyzed.
    pub failed_units: Vec<UnitKey>,
}

impl AnalysisResult {
    pub fn findings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.diagnostics().iter().filter(|d| d.is_finding())
    }

    pub fn has_findings(&self) -> bool {
        self.findings().next().is_some()
    }
}

/// The set of files to analyze and the options to analyze them with.
pub struct Program {
    pub options: AnalysisOptions,
    pub root_files: Vec<PathBuf>,
    sources: Vec<SourceText>,
}

impl Program {
    pub fn new(options: AnalysisOptions) -> Self {
        Self {
            options,
            root_files: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Resolve the configured patterns against `root_dir` into
    /// `root_files`. Returns the patterns that matched nothing.
    pub fn discover(&mut self, root_dir: &Path) -> Vec<String> {
        let discovery_options = DiscoveryOptions {
            exclude: &self.options.exclude,
            tests: self.options.tests,
        };
        let discovery = discover_source_files(
            root_dir,
            &self.options.include,
            self.options.files.as_deref(),
            &discovery_options,
        );
        debug!(files = discovery.files.len(), "discovered source files");
        self.root_files = discovery.files;
        discovery.unmatched
    }

    /// Add an in-memory source file.
    pub fn add_source(&mut self, file_name: impl Into<String>, source_text: impl Into<String>) {
        self.sources.push(SourceText {
            file_name: file_name.into(),
            text: source_text.into(),
        });
    }

    /// Read all root files from disk.
    pub fn load_root_files(&mut self) -> Result<(), DriverError> {
        for path in &self.root_files {
            let text = std::fs::read_to_string(path).map_err(|source| DriverError::Read {
                path: path.clone(),
                source,
            })?;
            self.sources.push(SourceText {
                file_name: path.to_string_lossy().into_owned(),
                text,
            });
        }
        Ok(())
    }

    pub fn sources(&self) -> &[SourceText] {
        &self.sources
    }

    pub fn source_text(&self, file_name: &str) -> Option<&str> {
        self.sources
            .iter()
            .find(|s| s.file_name == file_name)
            .map(|s| s.text.as_str())
    }

    /// Run parse -> bind -> check -> analyze over every unit.
    pub fn analyze(&self) -> AnalysisResult {
        let mut by_directory: BTreeMap<PathBuf, Vec<&SourceText>> = BTreeMap::new();
        for source in &self.sources {
            let dir = Path::new(&source.file_name)
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            by_directory.entry(dir).or_default().push(source);
        }

        let analyzer_options = AnalyzerOptions {
            count_deferred_close: self.options.count_deferred_close,
        };
        let directories: Vec<(PathBuf, String, Vec<&SourceText>)> = by_directory
            .into_iter()
            .map(|(dir, sources)| {
                let import_path = directory_import_path(&dir);
                (dir, import_path, sources)
            })
            .collect();
        let libraries = Libraries::new(
            directories
                .iter()
                .map(|(_, import_path, sources)| (import_path.as_str(), sources.as_slice())),
        );
        let outcomes: Vec<_> = directories
            .par_iter()
            .map(|(dir, import_path, sources)| {
                unit::analyze_directory(dir, import_path, sources, &libraries, analyzer_options)
            })
            .collect();

        let mut result = AnalysisResult::default();
        let mut units = 0;
        for outcome in outcomes {
            units += outcome.units;
            result.diagnostics.extend(outcome.diagnostics);
            result.failed_units.extend(outcome.failed);
        }
        result.diagnostics.sort();
        info!(
            units,
            failed = result.failed_units.len(),
            diagnostics = result.diagnostics.len(),
            "analysis complete"
        );
        result
    }

    /// Render diagnostics as `path:line:col: message`.
    pub fn render(&self, diagnostics: &DiagnosticCollection) -> Vec<String> {
        let mut line_maps: FxHashMap<&str, LineMap> = FxHashMap::default();
        diagnostics
            .diagnostics()
            .iter()
            .map(|d| match (&d.file, d.span) {
                (Some(file), Some(span)) => {
                    let position = self.source_text(file).map(|text| {
                        line_maps
                            .entry(file.as_str())
                            .or_insert_with(|| LineMap::new(text))
                            .position_of(span.start)
                    });
                    match position {
                        Some(position) => format!("{}:{}: {}", file, position, d.message_text),
                        None => format!("{}: {}", file, d.message_text),
                    }
                }
                (Some(file), None) => format!("{}: {}", file, d.message_text),
                _ => d.message_text.clone(),
            })
            .collect()
    }
}

/// Import path of the package in `dir`. In-memory sources have no directory
/// on disk and use the directory name itself.
fn directory_import_path(dir: &Path) -> String {
    let lookup = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    if lookup.is_dir() {
        import_path_for(lookup)
    } else {
        dir.to_string_lossy().into_owned()
    }
}
