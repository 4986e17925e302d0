//! Analyzer integration tests.
//!
//! Each test runs parse -> bind -> check -> analyze over one package that
//! may import the `os` and `io` stubs below, and compares the rendered
//! findings (`line:col: message`).

use bumpalo::Bump;
use closecheck_analyzer::{Analyzer, AnalyzerOptions, FindingKind};
use closecheck_ast::node::SourceFile;
use closecheck_binder::Binder;
use closecheck_checker::Checker;
use closecheck_core::intern::StringInterner;
use closecheck_core::text::LineMap;
use closecheck_parser::Parser;

const OS: &str = r#"package os

type File struct {
	name string
}

func Open(name string) (*File, error)

func Create(name string) (*File, error)

func (f *File) Close() error

func (f *File) Name() string
"#;

const IO: &str = r#"package io

type Reader interface {
	Read(p []byte) (n int, err error)
}

type Closer interface {
	Close() error
}

type ReadCloser interface {
	Reader
	Closer
}
"#;

/// Helper: analyze `source` as package `example.com/p` and render findings.
fn analyze_with(source: &str, options: AnalyzerOptions) -> Vec<String> {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let packages: [(&str, &str, &str); 3] = [
        ("os", "os.go", OS),
        ("io", "io.go", IO),
        ("example.com/p", "p.go", source),
    ];

    let mut files: Vec<SourceFile> = Vec::new();
    let mut base = 0;
    for (_, name, text) in packages.iter() {
        let mut parser = Parser::new(&arena, &interner, name, text).with_node_id_base(base);
        let file = parser.parse_source_file();
        let diagnostics = parser.take_diagnostics();
        assert!(diagnostics.is_empty(), "{}: {:?}", name, diagnostics.diagnostics());
        base = file.next_node_id;
        files.push(file);
    }

    let mut binder = Binder::new(&interner);
    for ((path, _, _), file) in packages.iter().zip(files.iter()) {
        binder.bind_package(path, &[file]);
    }
    let mut checker = Checker::new(binder);
    checker.check();

    let target = &files[2];
    let analyzer = Analyzer::new(&checker, &interner, options);
    let diagnostics = analyzer.analyze_file(target);
    let lines = LineMap::new(&target.text);
    diagnostics
        .diagnostics()
        .iter()
        .map(|d| {
            assert_eq!(d.file.as_deref(), Some("p.go"));
            let span = d.span.expect("findings are located");
            format!("{}: {}", lines.position_of(span.start), d.message_text)
        })
        .collect()
}

fn analyze(source: &str) -> Vec<String> {
    analyze_with(source, AnalyzerOptions::default())
}

fn deferred() -> AnalyzerOptions {
    AnalyzerOptions {
        count_deferred_close: true,
    }
}

// ============================================================================
// Reference scenarios
// ============================================================================

#[test]
fn test_checked_and_closed_once() {
    let src = r#"package p

import "os"

func read(path string) error {
	f, err := os.Open(path)
	if err != nil {
		return err
	}
	f.Close()
	return nil
}
"#;
    assert!(analyze(src).is_empty());
}

#[test]
fn test_error_not_checked_immediately() {
    let src = r#"package p

import "os"

func read(path string) {
	f, err := os.Open(path)
	_ = err
	f.Close()
}
"#;
    assert_eq!(analyze(src), vec!["6:5: error err not checked immediately"]);
}

#[test]
fn test_close_not_called() {
    let src = r#"package p

import "os"

func read(path string) {
	f, _ := os.Open(path)
}
"#;
    assert_eq!(analyze(src), vec!["6:7: f.Close() not called"]);
}

#[test]
fn test_close_called_twice() {
    let src = r#"package p

import "os"

func read(path string) {
	f, _ := os.Open(path)
	f.Close()
	f.Close()
}
"#;
    assert_eq!(analyze(src), vec!["6:7: f.Close() called multiple times"]);
}

#[test]
fn test_close_called_three_times_reports_once() {
    let src = r#"package p

import "os"

func read(path string) {
	f, _ := os.Open(path)
	f.Close()
	f.Close()
	f.Close()
}
"#;
    assert_eq!(analyze(src), vec!["6:7: f.Close() called multiple times"]);
}

// ============================================================================
// Error-check policy
// ============================================================================

#[test]
fn test_unchecked_error_still_counts_closes() {
    let src = r#"package p

import "os"

func read(path string) {
	f, err := os.Open(path)
	_ = err
}
"#;
    assert_eq!(
        analyze(src),
        vec![
            "6:5: error err not checked immediately",
            "6:9: f.Close() not called",
        ]
    );
}

#[test]
fn test_declaration_last_in_block() {
    let src = r#"package p

import "os"

func read(path string) {
	f, err := os.Open(path)
}
"#;
    assert_eq!(
        analyze(src),
        vec![
            "6:5: error err not checked immediately",
            "6:9: f.Close() not called",
        ]
    );
}

#[test]
fn test_condition_must_mention_the_error() {
    let src = r#"package p

import "os"

func read(path string, ok bool) {
	f, err := os.Open(path)
	if !ok {
		return
	}
	_ = err
	f.Close()
}
"#;
    assert_eq!(analyze(src), vec!["6:5: error err not checked immediately"]);
}

#[test]
fn test_error_mentioned_anywhere_in_condition() {
    let src = r#"package p

import "os"

func read(path string, strict bool) {
	f, err := os.Open(path)
	if strict && (err != nil || path == "") {
		return
	}
	f.Close()
}
"#;
    assert!(analyze(src).is_empty());
}

#[test]
fn test_error_mentioned_inside_function_literal() {
    let src = r#"package p

import "os"

func read(path string) {
	f, err := os.Open(path)
	if func() bool { return err != nil }() {
		return
	}
	f.Close()
}
"#;
    assert!(analyze(src).is_empty());
}

#[test]
fn test_error_name_is_reported() {
    let src = r#"package p

import "os"

func read(path string) {
	f, openErr := os.Open(path)
	f.Close()
}
"#;
    assert_eq!(analyze(src), vec!["6:5: error openErr not checked immediately"]);
}

#[test]
fn test_shadowed_error_does_not_count() {
    let src = r#"package p

import "os"

func read(path string) {
	err := check()
	f, err2 := os.Open(path)
	if err != nil {
		return
	}
	_ = err2
	f.Close()
}

func check() error
"#;
    assert_eq!(analyze(src), vec!["7:5: error err2 not checked immediately"]);
}

// ============================================================================
// Close-count policy
// ============================================================================

#[test]
fn test_close_inside_nested_block_does_not_count() {
    let src = r#"package p

import "os"

func read(path string) {
	f, err := os.Open(path)
	if err != nil {
		f.Close()
		return
	}
}
"#;
    assert_eq!(analyze(src), vec!["6:9: f.Close() not called"]);
}

#[test]
fn test_nested_close_plus_direct_close_is_single() {
    let src = r#"package p

import "os"

func read(path string, early bool) {
	f, err := os.Open(path)
	if err != nil {
		return
	}
	if early {
		f.Close()
	}
	f.Close()
}
"#;
    assert!(analyze(src).is_empty());
}

#[test]
fn test_closes_of_other_resources_do_not_count() {
    let src = r#"package p

import "os"

func duplicate(a, b string) {
	f, _ := os.Open(a)
	g, _ := os.Create(b)
	g.Close()
	g.Close()
}
"#;
    assert_eq!(
        analyze(src),
        vec![
            "6:7: f.Close() not called",
            "7:7: g.Close() called multiple times",
        ]
    );
}

#[test]
fn test_single_name_declaration() {
    let src = r#"package p

import "os"

func read(path string) {
	f := mustOpen(path)
	f.Name()
}

func mustOpen(path string) *os.File
"#;
    assert_eq!(analyze(src), vec!["6:4: f.Close() not called"]);
}

#[test]
fn test_defer_not_counted_by_default() {
    let src = r#"package p

import "os"

func read(path string) {
	f, _ := os.Open(path)
	defer f.Close()
}
"#;
    assert_eq!(analyze(src), vec!["6:7: f.Close() not called"]);
    assert!(analyze_with(src, deferred()).is_empty());
}

#[test]
fn test_defer_and_explicit_close_with_deferred_counting() {
    let src = r#"package p

import "os"

func read(path string) {
	f, _ := os.Open(path)
	defer f.Close()
	f.Close()
}
"#;
    assert!(analyze(src).is_empty());
    assert_eq!(
        analyze_with(src, deferred()),
        vec!["6:7: f.Close() called multiple times"]
    );
}

#[test]
fn test_close_with_result_used_does_not_count() {
    let src = r#"package p

import "os"

func read(path string) error {
	f, _ := os.Open(path)
	return f.Close()
}
"#;
    assert_eq!(analyze(src), vec!["6:7: f.Close() not called"]);
}

// ============================================================================
// Applicability
// ============================================================================

#[test]
fn test_reassignment_is_ignored() {
    let src = r#"package p

import "os"

func read(path string) {
	var f *os.File
	var err error
	f, err = os.Open(path)
	_ = err
	_ = f
}
"#;
    assert!(analyze(src).is_empty());
}

#[test]
fn test_declaration_without_resource_is_ignored() {
    let src = r#"package p

func parse(s string) (int, error)

func run(s string) {
	n, err := parse(s)
	_ = n
	_ = err
}
"#;
    assert!(analyze(src).is_empty());
}

#[test]
fn test_init_clause_is_not_applicable() {
    let src = r#"package p

import "os"

func read(path string) {
	if f, err := os.Open(path); err != nil {
		_ = f
	}
}
"#;
    assert!(analyze(src).is_empty());
}

#[test]
fn test_labeled_declaration_is_not_applicable() {
    let src = r#"package p

import "os"

func read(path string) {
done:
	f, _ := os.Open(path)
	_ = f
	goto done
}
"#;
    assert!(analyze(src).is_empty());
}

#[test]
fn test_case_clause_body_is_a_block() {
    let src = r#"package p

import "os"

func read(path string, mode int) {
	switch mode {
	case 1:
		f, _ := os.Open(path)
		_ = f
	default:
		g, _ := os.Open(path)
		g.Close()
	}
}
"#;
    assert_eq!(analyze(src), vec!["8:8: f.Close() not called"]);
}

#[test]
fn test_function_literal_body_is_a_block() {
    let src = r#"package p

import "os"

func read(path string) func() {
	return func() {
		f, _ := os.Open(path)
		_ = f
	}
}
"#;
    assert_eq!(analyze(src), vec!["7:8: f.Close() not called"]);
}

// ============================================================================
// Resource shapes
// ============================================================================

#[test]
fn test_value_receiver_resource() {
    let src = r#"package p

type conn struct{}

func (c conn) Close() error { return nil }

func dial() (conn, error)

func run() {
	c, err := dial()
	if err != nil {
		return
	}
}
"#;
    assert_eq!(analyze(src), vec!["10:9: c.Close() not called"]);
}

#[test]
fn test_pointer_receiver_needs_a_pointer() {
    let src = r#"package p

type handle struct{}

func (h *handle) Close() error { return nil }

func run() {
	h := &handle{}
	v := handle{}
	_ = v
	_ = h
}
"#;
    assert_eq!(analyze(src), vec!["8:4: h.Close() not called"]);
}

#[test]
fn test_interface_typed_resource() {
    let src = r#"package p

import "io"

func openReader() (io.ReadCloser, error)

func run() {
	r, err := openReader()
	if err != nil {
		return
	}
	r.Close()
	r.Close()
}
"#;
    assert_eq!(analyze(src), vec!["8:9: r.Close() called multiple times"]);
}

#[test]
fn test_embedded_resource_is_promoted() {
    let src = r#"package p

import "os"

type logFile struct {
	*os.File
	lines int
}

func openLog() (*logFile, error)

func run() {
	l, err := openLog()
	if err != nil {
		return
	}
}
"#;
    assert_eq!(analyze(src), vec!["13:9: l.Close() not called"]);
}

#[test]
fn test_close_with_wrong_signature_is_not_a_resource() {
    let src = r#"package p

type door struct{}

func (d door) Close() {}

type gate struct{}

func (g gate) Close() bool { return true }

func run() {
	d := door{}
	g := gate{}
	_ = d
	_ = g
}
"#;
    assert!(analyze(src).is_empty());
}

#[test]
fn test_name_that_is_both_resource_and_error() {
    let src = r#"package p

type closeErr struct{}

func (e closeErr) Close() error { return nil }

func (e closeErr) Error() string { return "" }

func run() {
	e := closeErr{}
	e.Close()
}
"#;
    assert_eq!(analyze(src), vec!["10:2: error e not checked immediately"]);
}

#[test]
fn test_define_count_mismatch_is_skipped() {
    let src = r#"package p

import "os"

func read(path string) {
	a, b, c := os.Open(path)
	_, _ = b, c
}
"#;
    assert!(analyze(src).is_empty());
}

#[test]
fn test_unresolved_types_are_skipped() {
    let src = r#"package p

import "net"

func run() {
	c, err := net.Dial("tcp", "localhost:80")
	_ = err
	_ = c
}
"#;
    assert!(analyze(src).is_empty());
}

#[test]
fn test_finding_kinds_map_to_messages() {
    assert_eq!(FindingKind::ResourceNotClosed.code(), 1002);
    assert_eq!(
        FindingKind::UnhandledError.message().message,
        "error {0} not checked immediately"
    );
}
