//! Sources of imported packages.
//!
//! An import resolves to a package analyzed in the same run when one has
//! that import path, and to an embedded stub otherwise. Test files of
//! other packages are never imported.

use crate::stubs::stub_source;
use crate::SourceText;
use closecheck_module::is_test_file;
use rustc_hash::FxHashMap;
use std::path::Path;

/// One file of an imported package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LibraryFile<'s> {
    pub file_name: String,
    pub text: &'s str,
}

/// Import path -> non-test files of the packages in this run.
#[derive(Debug, Default)]
pub(crate) struct Libraries<'s> {
    packages: FxHashMap<&'s str, Vec<&'s SourceText>>,
}

impl<'s> Libraries<'s> {
    pub fn new(packages: impl IntoIterator<Item = (&'s str, &'s [&'s SourceText])>) -> Self {
        let mut libraries = Libraries::default();
        for (import_path, sources) in packages {
            let files: Vec<&SourceText> = sources
                .iter()
                .copied()
                .filter(|s| !is_test_file(Path::new(&s.file_name)))
                .collect();
            if !files.is_empty() {
                libraries.packages.insert(import_path, files);
            }
        }
        libraries
    }

    /// The files of the package imported as `path`, or `None` when nothing
    /// provides it.
    pub fn files(&self, path: &str) -> Option<Vec<LibraryFile<'s>>> {
        if let Some(sources) = self.packages.get(path) {
            return Some(
                sources
                    .iter()
                    .map(|s| LibraryFile {
                        file_name: s.file_name.clone(),
                        text: s.text.as_str(),
                    })
                    .collect(),
            );
        }
        stub_source(path).map(|text| {
            vec![LibraryFile {
                file_name: format!("$stubs/{}.go", path),
                text,
            }]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str) -> SourceText {
        SourceText {
            file_name: name.to_string(),
            text: "package res\n".to_string(),
        }
    }

    #[test]
    fn test_run_packages_shadow_stubs_and_drop_tests() {
        let lib = source("res/res.go");
        let test = source("res/res_test.go");
        let own_io = source("io/io.go");
        let res: Vec<&SourceText> = vec![&lib, &test];
        let io: Vec<&SourceText> = vec![&own_io];
        let libraries = Libraries::new([("example.com/res", res.as_slice()), ("io", io.as_slice())]);

        let files = libraries.files("example.com/res").unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "res/res.go");

        assert_eq!(libraries.files("io").unwrap()[0].file_name, "io/io.go");
        assert_eq!(libraries.files("os").unwrap()[0].file_name, "$stubs/os.go");
        assert!(libraries.files("example.com/missing").is_none());
    }
}
