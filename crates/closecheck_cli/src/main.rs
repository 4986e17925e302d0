//! closecheck: report Go resources that are not closed exactly once.
//!
//! Usage:
//!   closecheck [options] [pattern...]
//!
//! Patterns are files, directories or `dir/...`. Findings go to stdout as
//! `path:line:col: message`; logs and errors go to stderr.
//!
//! Exit status: 3 if anything was found, 1 if the input could not be
//! loaded or parsed, 0 otherwise.

use clap::Parser as ClapParser;
use closecheck_diagnostics::Diagnostic;
use closecheck_driver::{AnalysisResult, Program};
use closecheck_options::{find_config, parse_config_file, AnalysisOptions};
use miette::{miette, IntoDiagnostic, LabeledSpan, NamedSource, Severity};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const EXIT_OK: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_FINDINGS: i32 = 3;

#[derive(ClapParser, Debug)]
#[command(
    name = "closecheck",
    version,
    about = "Checks that errors are tested and resources are closed exactly once"
)]
struct Cli {
    /// Files, directories or `dir/...` patterns to analyze.
    #[arg(value_name = "PATTERN")]
    patterns: Vec<String>,

    /// Path to closecheck.json.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Count `defer x.Close()` as closing the resource.
    #[arg(long = "count-deferred-close")]
    count_deferred_close: bool,

    /// Skip `_test.go` files.
    #[arg(long = "no-tests")]
    no_tests: bool,

    /// List all files that are analyzed.
    #[arg(long = "list-files")]
    list_files: bool,

    /// Render diagnostics with source snippets.
    #[arg(long)]
    pretty: bool,

    /// Log progress to stderr.
    #[arg(short = 'v', long)]
    verbose: bool,
}

// ANSI color codes
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const GRAY: &str = "\x1b[90m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let exit_code = run(&cli);
    process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("closecheck=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("closecheck=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> i32 {
    let start = Instant::now();

    let (options, root_dir) = match resolve_options(cli) {
        Ok(resolved) => resolved,
        Err(report) => {
            eprintln!("{:?}", report);
            return EXIT_FAILURE;
        }
    };
    debug!(?options, root = %root_dir.display(), "resolved options");

    let mut program = Program::new(options);
    for pattern in program.discover(&root_dir) {
        warn!(pattern = %pattern, "pattern matched no Go files");
    }

    if program.root_files.is_empty() {
        print_error("no Go files to analyze");
        return EXIT_FAILURE;
    }

    if cli.list_files {
        for f in &program.root_files {
            println!("{}", f.display());
        }
    }

    if let Err(e) = program.load_root_files() {
        eprintln!("{:?}", miette::Report::from_err(e));
        return EXIT_FAILURE;
    }

    let result = program.analyze();
    if cli.pretty {
        print_pretty(&program, &result);
    } else {
        print_plain(&program, &result);
    }

    let use_color = atty_is_terminal();
    if use_color {
        eprintln!(
            "{}Analyzed {} files in {:.2}s.{}",
            GRAY,
            program.root_files.len(),
            start.elapsed().as_secs_f64(),
            RESET
        );
    }

    exit_code(&result)
}

/// Options from the config file (given or found in the root directory),
/// with command-line flags on top. Also returns the directory patterns are
/// resolved against.
fn resolve_options(cli: &Cli) -> miette::Result<(AnalysisOptions, PathBuf)> {
    let config_path = cli.config.clone().or_else(|| find_config(Path::new(".")));
    let mut options = AnalysisOptions::default();
    let mut root_dir = PathBuf::from(".");

    if let Some(path) = config_path {
        debug!(config = %path.display(), "loading config");
        let config = parse_config_file(&path).into_diagnostic()?;
        options.apply(config);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            root_dir = parent.to_path_buf();
        }
    }

    apply_cli(&mut options, cli);
    if !cli.patterns.is_empty() {
        root_dir = PathBuf::from(".");
    }
    Ok((options, root_dir))
}

fn apply_cli(options: &mut AnalysisOptions, cli: &Cli) {
    if !cli.patterns.is_empty() {
        options.include = cli.patterns.clone();
        options.files = None;
    }
    if cli.count_deferred_close {
        options.count_deferred_close = true;
    }
    if cli.no_tests {
        options.tests = false;
    }
}

fn exit_code(result: &AnalysisResult) -> i32 {
    if !result.failed_units.is_empty() {
        EXIT_FAILURE
    } else if result.has_findings() {
        EXIT_FINDINGS
    } else {
        EXIT_OK
    }
}

/// Findings on stdout, front-end errors on stderr.
fn print_plain(program: &Program, result: &AnalysisResult) {
    let rendered = program.render(&result.diagnostics);
    let use_color = atty_is_terminal();
    for (diag, line) in result.diagnostics.diagnostics().iter().zip(rendered) {
        if diag.is_finding() {
            println!("{}", line);
        } else if use_color {
            eprintln!("{}{}error{}: {}", BOLD, RED, RESET, line);
        } else {
            eprintln!("error: {}", line);
        }
    }
    for unit in &result.failed_units {
        if use_color {
            eprintln!("{}{}skipped{} {}", BOLD, YELLOW, RESET, unit);
        } else {
            eprintln!("skipped {}", unit);
        }
    }
}

fn print_pretty(program: &Program, result: &AnalysisResult) {
    for diag in result.diagnostics.diagnostics() {
        let report = to_report(program, diag);
        if diag.is_finding() {
            println!("{:?}", report);
        } else {
            eprintln!("{:?}", report);
        }
    }
}

fn to_report(program: &Program, diag: &Diagnostic) -> miette::Report {
    let severity = if diag.is_finding() {
        Severity::Warning
    } else {
        Severity::Error
    };
    let code = format!("CC{}", diag.code);
    let labels = diag
        .span
        .map(|span| vec![LabeledSpan::at(span.to_range(), "here")])
        .unwrap_or_default();
    let report = miette!(
        severity = severity,
        code = code,
        labels = labels,
        "{}",
        diag.message_text
    );
    let source = diag
        .file
        .as_deref()
        .and_then(|file| Some((file, program.source_text(file)?)));
    match source {
        Some((file, text)) => report.with_source_code(NamedSource::new(file, text.to_string())),
        None => report,
    }
}

fn print_error(msg: &str) {
    if atty_is_terminal() {
        eprintln!("{}{}error{}: {}", BOLD, RED, RESET, msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

fn atty_is_terminal() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::isatty(2) != 0 }
    }
    #[cfg(not(unix))]
    {
        true
    }
}
