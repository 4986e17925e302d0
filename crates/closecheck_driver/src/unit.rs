//! Per-directory pipeline: parse, split into analysis units, load imported
//! packages, bind, check and analyze.
//!
//! Everything allocated here lives in one arena per directory and is
//! dropped when the directory is done.

use crate::library::Libraries;
use crate::{SourceText, UnitKey};
use bumpalo::Bump;
use closecheck_analyzer::{Analyzer, AnalyzerOptions};
use closecheck_ast::node::SourceFile;
use closecheck_binder::Binder;
use closecheck_checker::Checker;
use closecheck_core::intern::StringInterner;
use closecheck_core::AnalysisArena;
use closecheck_diagnostics::{messages, Diagnostic, DiagnosticCollection};
use closecheck_parser::Parser;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::Path;
use tracing::{debug, debug_span, warn};

/// What one directory contributed to the run.
#[derive(Debug, Default)]
pub(crate) struct DirectoryOutcome {
    pub diagnostics: DiagnosticCollection,
    pub failed: Vec<UnitKey>,
    pub units: usize,
}

/// Files of one directory sharing a package clause.
struct Unit<'f, 'a> {
    package: String,
    files: Vec<&'f SourceFile<'a>>,
    parse_errors: DiagnosticCollection,
}

/// An imported package parsed into the directory's arena.
struct Import<'a> {
    path: String,
    files: Vec<SourceFile<'a>>,
}

pub(crate) fn analyze_directory(
    dir: &Path,
    import_path: &str,
    sources: &[&SourceText],
    libraries: &Libraries<'_>,
    options: AnalyzerOptions,
) -> DirectoryOutcome {
    let _span = debug_span!("directory", dir = %dir.display()).entered();
    let source_bytes = sources.iter().map(|s| s.text.len()).sum::<usize>();
    let unit_arena = AnalysisArena::for_source_len(source_bytes);
    let arena = unit_arena.bump();
    let interner = StringInterner::new();
    let mut outcome = DirectoryOutcome::default();

    let mut base = 0;
    let mut parsed = Vec::with_capacity(sources.len());
    for source in sources {
        let mut parser = Parser::new(arena, &interner, &source.file_name, &source.text)
            .with_node_id_base(base);
        let file = parser.parse_source_file();
        base = file.next_node_id;
        parsed.push((file, parser.take_diagnostics()));
    }

    let imports: Vec<String> = parsed
        .iter()
        .flat_map(|(file, _)| file.imports.iter())
        .map(|import| interner.resolve(import.path).to_string())
        .collect();
    let loaded = load_imports(arena, &interner, libraries, imports, &mut base);
    let load_order = dependency_order(&loaded, &interner);

    let units = split_units(&parsed, &interner);
    outcome.units = units.len();
    if let Some(diagnostic) = package_mismatch(&units) {
        outcome.diagnostics.add(diagnostic);
        outcome.failed = units.iter().map(|u| unit_key(dir, &u.package)).collect();
        return outcome;
    }

    for unit in units {
        let key = unit_key(dir, &unit.package);
        if unit.parse_errors.has_errors() {
            debug!(unit = %key, errors = unit.parse_errors.error_count(), "unit failed to parse");
            outcome.diagnostics.extend(unit.parse_errors);
            outcome.failed.push(key);
            continue;
        }

        let path = if unit.package.ends_with("_test") {
            format!("{}_test", import_path)
        } else {
            import_path.to_string()
        };
        let mut binder = Binder::new(&interner);
        for &index in &load_order {
            let import = &loaded[index];
            if import.path == path {
                continue;
            }
            let files: Vec<&SourceFile> = import.files.iter().collect();
            binder.bind_package(&import.path, &files);
        }
        binder.bind_package(&path, &unit.files);

        let mut checker = Checker::new(binder);
        checker.check();

        let analyzer = Analyzer::new(&checker, &interner, options);
        let findings = analyzer.analyze_files(unit.files.iter().copied());
        debug!(unit = %key, files = unit.files.len(), findings = findings.len(), "unit analyzed");
        outcome.diagnostics.extend(findings);
    }
    outcome
}

fn unit_key(dir: &Path, package: &str) -> UnitKey {
    UnitKey {
        directory: dir.to_path_buf(),
        package: package.to_string(),
    }
}

/// Group parsed files by package clause, in order of first appearance.
fn split_units<'f, 'a>(
    parsed: &'f [(SourceFile<'a>, DiagnosticCollection)],
    interner: &StringInterner,
) -> Vec<Unit<'f, 'a>> {
    let mut units: Vec<Unit<'f, 'a>> = Vec::new();
    for (file, diagnostics) in parsed {
        let package = interner.resolve(file.package_name.name);
        let index = match units.iter().position(|u| u.package == package) {
            Some(index) => index,
            None => {
                units.push(Unit {
                    package: package.to_string(),
                    files: Vec::new(),
                    parse_errors: DiagnosticCollection::new(),
                });
                units.len() - 1
            }
        };
        units[index].files.push(file);
        units[index].parse_errors.extend(diagnostics.clone());
    }
    units
}

/// A directory may hold one package plus its external `_test` package.
fn package_mismatch(units: &[Unit<'_, '_>]) -> Option<Diagnostic> {
    let first = units.first()?;
    let base = first.package.trim_end_matches("_test");
    let other = units
        .iter()
        .find(|u| u.package.trim_end_matches("_test") != base)?;
    let file = other.files.first()?;
    Some(Diagnostic::with_location(
        file.file_name.clone(),
        file.package_name.data.range.to_span(),
        &messages::PACKAGE_NAME_MISMATCH_0_1,
        &[first.package.as_str(), other.package.as_str()],
    ))
}

/// Parse every package reachable from `imports`. The directory's own package
/// is among them when its external `_test` package imports it.
fn load_imports<'a>(
    arena: &'a Bump,
    interner: &StringInterner,
    libraries: &Libraries<'_>,
    imports: Vec<String>,
    base: &mut u32,
) -> Vec<Import<'a>> {
    let mut loaded = Vec::new();
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut pending = imports;
    while let Some(path) = pending.pop() {
        if !seen.insert(path.clone()) {
            continue;
        }
        let Some(sources) = libraries.files(&path) else {
            continue;
        };
        let mut files = Vec::with_capacity(sources.len());
        for source in sources {
            let mut parser = Parser::new(arena, interner, &source.file_name, source.text)
                .with_node_id_base(*base);
            let file = parser.parse_source_file();
            *base = file.next_node_id;
            let diagnostics = parser.take_diagnostics();
            if !diagnostics.is_empty() {
                warn!(package = %path, file = %source.file_name, errors = diagnostics.len(), "imported package has syntax errors");
            }
            pending.extend(file.imports.iter().map(|i| interner.resolve(i.path).to_string()));
            files.push(file);
        }
        loaded.push(Import { path, files });
    }
    loaded
}

/// Indices into `loaded` with every package after the packages it imports.
fn dependency_order(loaded: &[Import<'_>], interner: &StringInterner) -> Vec<usize> {
    let by_path: FxHashMap<&str, usize> = loaded
        .iter()
        .enumerate()
        .map(|(i, import)| (import.path.as_str(), i))
        .collect();
    let mut order = Vec::with_capacity(loaded.len());
    let mut visited = vec![false; loaded.len()];

    fn visit(
        index: usize,
        loaded: &[Import<'_>],
        by_path: &FxHashMap<&str, usize>,
        interner: &StringInterner,
        visited: &mut [bool],
        order: &mut Vec<usize>,
    ) {
        if visited[index] {
            return;
        }
        visited[index] = true;
        let imports = loaded[index].files.iter().flat_map(|f| f.imports.iter());
        for import in imports {
            if let Some(&dep) = by_path.get(interner.resolve(import.path)) {
                visit(dep, loaded, by_path, interner, visited, order);
            }
        }
        order.push(index);
    }

    for index in 0..loaded.len() {
        visit(index, loaded, &by_path, interner, &mut visited, &mut order);
    }
    order
}
