//! closecheck_module: Go source discovery and module paths.
//!
//! Turns command-line and config patterns into the list of `.go` files to
//! analyze, and derives import paths from the enclosing `go.mod`.
//!
//! Patterns follow the go tool:
//! - `path/to/file.go` names one file;
//! - `dir` names the `.go` files directly inside `dir`;
//! - `dir/...` names every `.go` file below `dir`, skipping `vendor`,
//!   `testdata` and directories whose name starts with `.` or `_`.

use std::path::{Component, Path, PathBuf};
use tracing::trace;

const RECURSIVE_SUFFIX: &str = "...";

/// A parsed source pattern, with paths joined onto the root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcePattern {
    File(PathBuf),
    Directory(PathBuf),
    Recursive(PathBuf),
}

impl SourcePattern {
    pub fn parse(root_dir: &Path, pattern: &str) -> Self {
        if let Some(prefix) = pattern.strip_suffix(RECURSIVE_SUFFIX) {
            let prefix = prefix.trim_end_matches('/');
            return SourcePattern::Recursive(join_clean(root_dir, prefix));
        }
        let path = join_clean(root_dir, pattern);
        if path.is_dir() {
            SourcePattern::Directory(path)
        } else {
            SourcePattern::File(path)
        }
    }
}

/// Files selected by a set of patterns.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Sorted and free of duplicates.
    pub files: Vec<PathBuf>,
    /// Patterns that matched no file.
    pub unmatched: Vec<String>,
}

/// Filters applied while discovering files.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions<'o> {
    pub exclude: &'o [String],
    /// Include `_test.go` files found in directories.
    pub tests: bool,
}

/// Discover source files. When `files` is given it replaces `include`;
/// explicitly named files are taken as they are.
pub fn discover_source_files(
    root_dir: &Path,
    include: &[String],
    files: Option<&[String]>,
    options: &DiscoveryOptions<'_>,
) -> Discovery {
    let mut discovery = Discovery::default();

    if let Some(file_list) = files {
        for f in file_list {
            let path = join_clean(root_dir, f);
            if path.is_file() {
                discovery.files.push(path);
            } else {
                discovery.unmatched.push(f.clone());
            }
        }
    } else {
        for pattern in include {
            let before = discovery.files.len();
            collect_pattern(root_dir, pattern, options, &mut discovery.files);
            if discovery.files.len() == before {
                discovery.unmatched.push(pattern.clone());
            }
        }
    }

    for file in &mut discovery.files {
        *file = clean(file);
    }
    discovery.files.sort();
    discovery.files.dedup();
    discovery
}

fn collect_pattern(
    root_dir: &Path,
    pattern: &str,
    options: &DiscoveryOptions<'_>,
    result: &mut Vec<PathBuf>,
) {
    match SourcePattern::parse(root_dir, pattern) {
        SourcePattern::File(path) => {
            if path.is_file() && !is_excluded(root_dir, &path, options.exclude) {
                result.push(path);
            }
        }
        SourcePattern::Directory(dir) => collect_directory(root_dir, &dir, options, false, result),
        SourcePattern::Recursive(dir) => collect_directory(root_dir, &dir, options, true, result),
    }
}

fn collect_directory(
    root_dir: &Path,
    dir: &Path,
    options: &DiscoveryOptions<'_>,
    recursive: bool,
    result: &mut Vec<PathBuf>,
) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if is_excluded(root_dir, &path, options.exclude) {
            trace!(path = %path.display(), "excluded");
            continue;
        }

        if path.is_dir() {
            if recursive && !is_ignored_directory(&path) {
                collect_directory(root_dir, &path, options, recursive, result);
            }
        } else if is_go_source(&path, options.tests) {
            result.push(path);
        }
    }
}

/// Directories the go tool never descends into.
pub fn is_ignored_directory(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name == "vendor" || name == "testdata" || name.starts_with('.') || name.starts_with('_')
}

pub fn is_test_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with("_test.go"))
}

/// A `.go` file, leaving out tests unless `tests` is set.
pub fn is_go_source(path: &Path, tests: bool) -> bool {
    let is_go = path.extension().and_then(|e| e.to_str()) == Some("go");
    is_go && (tests || !is_test_file(path))
}

fn is_excluded(root_dir: &Path, path: &Path, exclude: &[String]) -> bool {
    let path = normalize(path);
    exclude
        .iter()
        .any(|pattern| path.starts_with(normalize(&root_dir.join(pattern))))
}

/// Drop `.` components so that `./a/b` and `a/b` compare equal.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Like [`normalize`], but the current directory stays `.`.
fn clean(path: &Path) -> PathBuf {
    let cleaned = normalize(path);
    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}

fn join_clean(root_dir: &Path, pattern: &str) -> PathBuf {
    clean(&root_dir.join(pattern))
}

// ============================================================================
// Modules
// ============================================================================

/// The nearest directory at or above `start` holding a `go.mod`.
pub fn find_module_root(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        if current.join("go.mod").is_file() {
            return Some(current.to_path_buf());
        }
        dir = current.parent();
    }
    None
}

/// The path declared by the `module` directive of a go.mod file.
pub fn parse_module_path(go_mod: &str) -> Option<&str> {
    go_mod.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let path = rest.split("//").next()?.trim().trim_matches('"');
        (!path.is_empty()).then_some(path)
    })
}

/// Import path of the package in `dir`: the module path followed by the
/// directory's location in the module, or the directory path itself when
/// `dir` is outside any module.
pub fn import_path_for(dir: &Path) -> String {
    let Some(root) = find_module_root(dir) else {
        return dir.to_string_lossy().into_owned();
    };
    let module = std::fs::read_to_string(root.join("go.mod"))
        .ok()
        .and_then(|text| parse_module_path(&text).map(str::to_string));
    let Some(module) = module else {
        return dir.to_string_lossy().into_owned();
    };
    let relative: Vec<String> = dir
        .strip_prefix(&root)
        .map(|rel| {
            rel.components()
                .filter_map(|c| match c {
                    Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();
    if relative.is_empty() {
        module
    } else {
        format!("{}/{}", module, relative.join("/"))
    }
}
