//! closecheck_options: closecheck.json parsing and analysis options.
//!
//! A config file only needs the fields it changes; everything absent falls
//! back to [`AnalysisOptions::default`]. Command-line flags are applied on
//! top with [`AnalysisOptions::apply`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "closecheck.json";

/// The closecheck.json file structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CloseCheckConfig {
    /// Files, directories and `dir/...` patterns to analyze.
    pub include: Option<Vec<String>>,
    /// Paths to leave out. A pattern matches a path equal to it or below it.
    pub exclude: Option<Vec<String>>,
    /// Explicit files. When present, `include` is ignored.
    pub files: Option<Vec<String>>,
    /// Analyze `_test.go` files.
    pub tests: Option<bool>,
    /// Count `defer x.Close()` as a release.
    pub count_deferred_close: Option<bool>,
}

/// Fully resolved options for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub files: Option<Vec<String>>,
    pub tests: bool,
    pub count_deferred_close: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            include: vec!["./...".to_string()],
            exclude: Vec::new(),
            files: None,
            tests: true,
            count_deferred_close: false,
        }
    }
}

impl AnalysisOptions {
    /// Overlay the values present in `config`.
    pub fn apply(&mut self, config: CloseCheckConfig) {
        if let Some(include) = config.include {
            self.include = include;
        }
        if let Some(exclude) = config.exclude {
            self.exclude = exclude;
        }
        if config.files.is_some() {
            self.files = config.files;
        }
        if let Some(tests) = config.tests {
            self.tests = tests;
        }
        if let Some(count) = config.count_deferred_close {
            self.count_deferred_close = count;
        }
    }

    pub fn from_config(config: CloseCheckConfig) -> Self {
        let mut options = Self::default();
        options.apply(config);
        options
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse a closecheck.json file from a string.
pub fn parse_config(content: &str) -> Result<CloseCheckConfig, serde_json::Error> {
    serde_json::from_str(content)
}

/// Parse a closecheck.json file from a path.
pub fn parse_config_file(path: &Path) -> Result<CloseCheckConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// The config file in `dir`, if there is one.
pub fn find_config(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}
