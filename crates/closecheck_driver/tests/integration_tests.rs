//! Driver integration tests.
//!
//! End-to-end tests for the analysis pipeline: units, embedded packages,
//! parse failures and file loading.

use closecheck_driver::{Program, UnitKey};
use closecheck_options::AnalysisOptions;
use std::fs;
use std::path::PathBuf;

/// Helper: analyze in-memory sources and return the rendered diagnostics.
fn analyze_sources(sources: &[(&str, &str)]) -> Vec<String> {
    analyze_sources_with(sources, AnalysisOptions::default())
}

fn analyze_sources_with(sources: &[(&str, &str)], options: AnalysisOptions) -> Vec<String> {
    let mut program = Program::new(options);
    for (name, text) in sources {
        program.add_source(*name, *text);
    }
    let result = program.analyze();
    program.render(&result.diagnostics)
}

// ============================================================================
// Embedded packages
// ============================================================================

#[test]
fn test_os_file_not_closed() {
    let src = r#"package main

import "os"

func main() {
	f, err := os.Open("data.txt")
	if err != nil {
		return
	}
	f.Name()
}
"#;
    assert_eq!(
        analyze_sources(&[("app/main.go", src)]),
        vec!["app/main.go:6:9: f.Close() not called"]
    );
}

#[test]
fn test_http_response_is_not_a_resource() {
    let src = r#"package main

import (
	"io"
	"net/http"
)

func fetch(url string) ([]byte, error) {
	resp, err := http.Get(url)
	if err != nil {
		return nil, err
	}
	body := resp.Body
	data, err := io.ReadAll(body)
	body.Close()
	return data, err
}
"#;
    assert!(analyze_sources(&[("app/fetch.go", src)]).is_empty());
}

#[test]
fn test_database_rows_closed_twice() {
    let src = r#"package store

import "database/sql"

func names(db *sql.DB) {
	rows, err := db.Query("SELECT name FROM users")
	if err != nil {
		return
	}
	for rows.Next() {
	}
	rows.Close()
	rows.Close()
}
"#;
    assert_eq!(
        analyze_sources(&[("store/store.go", src)]),
        vec!["store/store.go:6:12: rows.Close() called multiple times"]
    );
}

#[test]
fn test_net_conn_with_unchecked_error() {
    let src = r#"package client

import "net"

func ping(addr string) {
	conn, err := net.Dial("tcp", addr)
	conn.Close()
	_ = err
}
"#;
    assert_eq!(
        analyze_sources(&[("client/ping.go", src)]),
        vec!["client/ping.go:6:8: error err not checked immediately"]
    );
}

#[test]
fn test_deferred_close_option() {
    let src = r#"package main

import "os"

func main() {
	f, err := os.Create("out.txt")
	if err != nil {
		return
	}
	defer f.Close()
}
"#;
    assert_eq!(
        analyze_sources(&[("main.go", src)]),
        vec!["main.go:6:9: f.Close() not called"]
    );
    let options = AnalysisOptions {
        count_deferred_close: true,
        ..AnalysisOptions::default()
    };
    assert!(analyze_sources_with(&[("main.go", src)], options).is_empty());
}

// ============================================================================
// Units
// ============================================================================

#[test]
fn test_files_of_one_package_share_declarations() {
    let a = r#"package res

type handle struct{}

func (h *handle) Close() error { return nil }
"#;
    let b = r#"package res

func acquire() *handle { return &handle{} }

func use() {
	h := acquire()
	_ = h
}
"#;
    assert_eq!(
        analyze_sources(&[("res/a.go", a), ("res/b.go", b)]),
        vec!["res/b.go:6:4: h.Close() not called"]
    );
}

#[test]
fn test_external_test_package_is_its_own_unit() {
    let lib = "package res\n\nfunc Ok() bool { return true }\n";
    let test = r#"package res_test

import "os"

func check() {
	f, _ := os.Open("x")
}
"#;
    let mut program = Program::new(AnalysisOptions::default());
    program.add_source("res/res.go", lib);
    program.add_source("res/res_test.go", test);
    let result = program.analyze();
    assert!(result.failed_units.is_empty());
    assert_eq!(
        program.render(&result.diagnostics),
        vec!["res/res_test.go:6:7: f.Close() not called"]
    );
}

#[test]
fn test_resources_from_sibling_packages_are_checked() {
    let store = r#"package store

import "os"

type DB struct {
	file *os.File
}

func (db *DB) Close() error { return db.file.Close() }

func Open(path string) (*DB, error)
"#;
    let app = r#"package main

import "store"

func main() {
	db, err := store.Open("data.db")
	if err != nil {
		return
	}
	db.Close()
	db.Close()
}
"#;
    let store_test = r#"package store

func helper() *DB { return nil }
"#;
    assert_eq!(
        analyze_sources(&[
            ("store/store.go", store),
            ("store/store_test.go", store_test),
            ("app/main.go", app),
        ]),
        vec!["app/main.go:6:10: db.Close() called multiple times"]
    );
}

#[test]
fn test_external_test_package_sees_its_package() {
    let lib = r#"package res

import "os"

func Open() (*os.File, error)
"#;
    let test = r#"package res_test

import "res"

func check() {
	f, err := res.Open()
	if err != nil {
		return
	}
}
"#;
    assert_eq!(
        analyze_sources(&[("res/res.go", lib), ("res/res_test.go", test)]),
        vec!["res/res_test.go:6:9: f.Close() not called"]
    );
}

#[test]
fn test_package_mismatch_fails_directory() {
    let mut program = Program::new(AnalysisOptions::default());
    program.add_source("mix/a.go", "package a\n");
    program.add_source("mix/b.go", "package b\n");
    let result = program.analyze();
    assert_eq!(result.failed_units.len(), 2);
    assert_eq!(
        program.render(&result.diagnostics),
        vec!["mix/b.go:1:9: found packages a and b in the same directory"]
    );
}

#[test]
fn test_parse_error_fails_only_its_unit() {
    let broken = "package bad\n\nfunc f() {\n\tx := \n}\n";
    let good = r#"package good

import "os"

func g() {
	f, _ := os.Open("x")
}
"#;
    let mut program = Program::new(AnalysisOptions::default());
    program.add_source("bad/bad.go", broken);
    program.add_source("good/good.go", good);
    let result = program.analyze();

    assert_eq!(
        result.failed_units,
        vec![UnitKey {
            directory: PathBuf::from("bad"),
            package: "bad".to_string(),
        }]
    );
    assert!(result.has_findings());
    let rendered = program.render(&result.diagnostics);
    assert!(rendered.iter().any(|d| d.starts_with("bad/bad.go:")));
    assert!(rendered.contains(&"good/good.go:6:7: f.Close() not called".to_string()));
}

#[test]
fn test_clean_program_has_no_findings() {
    let src = "package main\n\nfunc main() {\n\tx := 1\n\t_ = x\n}\n";
    let mut program = Program::new(AnalysisOptions::default());
    program.add_source("main.go", src);
    let result = program.analyze();
    assert!(!result.has_findings());
    assert!(result.diagnostics.is_empty());
}

// ============================================================================
// Loading from disk
// ============================================================================

#[test]
fn test_discover_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("go.mod"), "module example.com/m\n").unwrap();
    fs::create_dir_all(root.join("cmd")).unwrap();
    fs::write(
        root.join("cmd/main.go"),
        "package main\n\nimport \"os\"\n\nfunc main() {\n\tf, _ := os.Open(\"x\")\n}\n",
    )
    .unwrap();
    fs::write(
        root.join("cmd/main_test.go"),
        "package main\n\nimport \"os\"\n\nfunc t() {\n\tg, _ := os.Open(\"x\")\n}\n",
    )
    .unwrap();

    let options = AnalysisOptions {
        tests: false,
        ..AnalysisOptions::default()
    };
    let mut program = Program::new(options);
    let unmatched = program.discover(root);
    assert!(unmatched.is_empty());
    assert_eq!(program.root_files, vec![root.join("cmd/main.go")]);

    program.load_root_files().unwrap();
    let result = program.analyze();
    let rendered = program.render(&result.diagnostics);
    assert_eq!(rendered.len(), 1);
    assert!(rendered[0].ends_with("main.go:6:7: f.Close() not called"));
}

#[test]
fn test_load_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut program = Program::new(AnalysisOptions::default());
    program.root_files.push(dir.path().join("gone.go"));
    let err = program.load_root_files().unwrap_err();
    assert!(err.to_string().starts_with("cannot read"));
}
