//! Checker integration tests.
//!
//! Tests the full parse -> bind -> check pipeline and verifies inferred
//! types and method-set queries.

use bumpalo::Bump;
use closecheck_ast::node::*;
use closecheck_ast::types::TypeId;
use closecheck_ast::{walk_with_ancestors, NodeRef};
use closecheck_binder::Binder;
use closecheck_checker::{BasicKind, Checker, InterfaceShape, MethodShape, ShapeType, Type};
use closecheck_core::intern::StringInterner;
use closecheck_parser::Parser;

const CLOSER: InterfaceShape = InterfaceShape {
    methods: &[MethodShape {
        name: "Close",
        params: &[],
        results: &[ShapeType::Error],
    }],
};

const ERROR: InterfaceShape = InterfaceShape {
    methods: &[MethodShape {
        name: "Error",
        params: &[],
        results: &[ShapeType::Basic(BasicKind::String)],
    }],
};

const OS: &str = r#"package os

type File struct {
	name string
}

func Open(name string) (*File, error)

func (f *File) Close() error

func (f *File) Name() string
"#;

const FMT: &str = "package fmt\n\nfunc Printf(format string, args ...interface{}) (int, error)\n";

const PATH: &str = "example.com/p";

/// Helper: run the full pipeline (parse -> bind -> check) over packages
/// given as (import path, sources), dependencies first.
fn with_checker<R>(
    packages: &[(&str, &[&str])],
    check: impl FnOnce(&mut Checker<'_>, &[SourceFile<'_>]) -> R,
) -> R {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let mut files = Vec::new();
    let mut owners = Vec::new();
    let mut base = 0;
    for (pi, (_, sources)) in packages.iter().enumerate() {
        for (fi, src) in sources.iter().enumerate() {
            let name = format!("p{}_{}.go", pi, fi);
            let mut parser = Parser::new(&arena, &interner, &name, src).with_node_id_base(base);
            let sf = parser.parse_source_file();
            let diagnostics = parser.take_diagnostics();
            assert!(diagnostics.is_empty(), "{}: {:?}", name, diagnostics.diagnostics());
            base = sf.next_node_id;
            files.push(sf);
            owners.push(pi);
        }
    }

    let mut binder = Binder::new(&interner);
    for (pi, (path, _)) in packages.iter().enumerate() {
        let members: Vec<&SourceFile> = files
            .iter()
            .zip(&owners)
            .filter(|(_, owner)| **owner == pi)
            .map(|(f, _)| f)
            .collect();
        binder.bind_package(path, &members);
    }

    let mut checker = Checker::new(binder);
    checker.check();
    check(&mut checker, &files)
}

/// Helper: a single package at `example.com/p` that may import `os` and `fmt`.
fn with_source<R>(source: &str, check: impl FnOnce(&mut Checker<'_>, &[SourceFile<'_>]) -> R) -> R {
    with_checker(&[("os", &[OS]), ("fmt", &[FMT]), (PATH, &[source])], check)
}

/// Helper: the type of the first identifier expression named `name`.
fn local_type(checker: &Checker<'_>, files: &[SourceFile<'_>], name: &str) -> String {
    nth_local_type(checker, files, name, 0)
}

fn nth_local_type(checker: &Checker<'_>, files: &[SourceFile<'_>], name: &str, n: usize) -> String {
    let mut found = Vec::new();
    for file in files {
        walk_with_ancestors(file, |node, _| {
            if let NodeRef::Expression(Expression::Identifier(id)) = node {
                if checker.interner().resolve(id.name) == name {
                    found.push(*id);
                }
            }
        });
    }
    let id = found
        .get(n)
        .unwrap_or_else(|| panic!("no identifier #{} named {}", n, name));
    let ty = checker
        .type_of_identifier(id)
        .unwrap_or_else(|| panic!("{} is unresolved", name));
    checker.type_to_string(ty)
}

/// Helper: the type of a package-level name (for type names, the type it
/// denotes).
fn package_type(checker: &Checker<'_>, path: &str, name: &str) -> TypeId {
    let binder = checker.binder();
    let package = binder.package_by_path(path).expect("package is bound");
    let symbol = binder
        .lookup_in_package(package, name)
        .unwrap_or_else(|| panic!("{} not declared in {}", name, path));
    checker.type_of_symbol(symbol)
}

fn package_type_string(checker: &Checker<'_>, path: &str, name: &str) -> String {
    checker.type_to_string(package_type(checker, path, name))
}

// ============================================================================
// Inferred types
// ============================================================================

#[test]
fn test_define_from_multi_value_call() {
    let src = r#"package p

import "os"

func f() {
	file, err := os.Open("x")
	_, _ = file, err
}
"#;
    with_source(src, |checker, files| {
        assert_eq!(local_type(checker, files, "file"), "*os.File");
        assert_eq!(local_type(checker, files, "err"), "error");
    });
}

#[test]
fn test_untyped_constants_take_default_types() {
    let src = r#"package p

const c = 1.5

var a = 1

func f() {
	x := c
	s := "hi"
	r := 'a'
	b := 1 < 2
	z := 2 + 0.5
	_, _, _, _, _ = x, s, r, b, z
}
"#;
    with_source(src, |checker, files| {
        assert_eq!(package_type_string(checker, PATH, "c"), "untyped float");
        assert_eq!(package_type_string(checker, PATH, "a"), "int");
        assert_eq!(local_type(checker, files, "x"), "float64");
        assert_eq!(local_type(checker, files, "s"), "string");
        assert_eq!(local_type(checker, files, "r"), "int32");
        assert_eq!(local_type(checker, files, "b"), "bool");
        assert_eq!(local_type(checker, files, "z"), "float64");
    });
}

#[test]
fn test_declared_types_and_multi_name_var() {
    let src = r#"package p

type T struct{}

func two() (int, string)

var first, second = two()

var declared []*T

func f() {
	p := &T{}
	_ = p
}
"#;
    with_source(src, |checker, files| {
        assert_eq!(package_type_string(checker, PATH, "first"), "int");
        assert_eq!(package_type_string(checker, PATH, "second"), "string");
        assert_eq!(package_type_string(checker, PATH, "declared"), "[]*p.T");
        assert_eq!(package_type_string(checker, PATH, "two"), "func() (int, string)");
        assert_eq!(local_type(checker, files, "p"), "*p.T");
    });
}

#[test]
fn test_comma_ok_forms() {
    let src = r#"package p

func f(m map[string]int, x interface{}, ch chan error) {
	v, ok := m["a"]
	n, isInt := x.(int)
	e, open := <-ch
	_, _, _, _, _, _ = v, ok, n, isInt, e, open
}
"#;
    with_source(src, |checker, files| {
        assert_eq!(local_type(checker, files, "v"), "int");
        assert_eq!(local_type(checker, files, "ok"), "bool");
        assert_eq!(local_type(checker, files, "n"), "int");
        assert_eq!(local_type(checker, files, "isInt"), "bool");
        assert_eq!(local_type(checker, files, "e"), "error");
        assert_eq!(local_type(checker, files, "open"), "bool");
    });
}

#[test]
fn test_range_variables() {
    let src = r#"package p

func f(m map[string]int, s string, xs []float64) {
	for k, v := range m {
		_, _ = k, v
	}
	for i, r := range s {
		_, _ = i, r
	}
	for _, x := range xs {
		_ = x
	}
}
"#;
    with_source(src, |checker, files| {
        assert_eq!(local_type(checker, files, "k"), "string");
        assert_eq!(local_type(checker, files, "v"), "int");
        assert_eq!(local_type(checker, files, "i"), "int");
        assert_eq!(local_type(checker, files, "r"), "int32");
        assert_eq!(local_type(checker, files, "x"), "float64");
    });
}

#[test]
fn test_type_switch_variables() {
    let src = r#"package p

type T struct{}

func f(x interface{}) {
	switch v := x.(type) {
	case *T:
		_ = v
	case int, string:
		_ = v
	}
}
"#;
    with_source(src, |checker, files| {
        assert_eq!(nth_local_type(checker, files, "v", 0), "*p.T");
        assert_eq!(nth_local_type(checker, files, "v", 1), "interface{}");
    });
}

#[test]
fn test_builtins_and_conversions() {
    let src = r#"package p

type T struct{}

func f(xs []string) {
	n := len(xs)
	q := new(T)
	m := make(map[string]int)
	ys := append(xs, "a")
	bs := []byte("x")
	t := T(T{})
	_, _, _, _, _, _ = n, q, m, ys, bs, t
}
"#;
    with_source(src, |checker, files| {
        assert_eq!(local_type(checker, files, "n"), "int");
        assert_eq!(local_type(checker, files, "q"), "*p.T");
        assert_eq!(local_type(checker, files, "m"), "map[string]int");
        assert_eq!(local_type(checker, files, "ys"), "[]string");
        assert_eq!(local_type(checker, files, "bs"), "[]uint8");
        assert_eq!(local_type(checker, files, "t"), "p.T");
    });
}

#[test]
fn test_selectors_fields_and_methods() {
    let src = r#"package p

import "os"

type T struct {
	name  string
	inner *T
	*os.File
}

func (t *T) Close() error { return nil }

func f(t T) {
	n := t.name
	c := t.Close
	nested := t.inner.name
	promoted := t.Name()
	_, _, _, _ = n, c, nested, promoted
}
"#;
    with_source(src, |checker, files| {
        assert_eq!(local_type(checker, files, "n"), "string");
        assert_eq!(local_type(checker, files, "c"), "func() error");
        assert_eq!(local_type(checker, files, "nested"), "string");
        assert_eq!(local_type(checker, files, "promoted"), "string");
    });
}

#[test]
fn test_signatures_render_like_go() {
    with_source("package p\n", |checker, _| {
        assert_eq!(
            package_type_string(checker, "os", "Open"),
            "func(string) (*os.File, error)"
        );
        assert_eq!(
            package_type_string(checker, "fmt", "Printf"),
            "func(string, ...interface{}) (int, error)"
        );
    });
}

#[test]
fn test_define_count_mismatch_yields_invalid() {
    let src = r#"package p

import "os"

func f() {
	a, b, c := os.Open("x")
	d := os.Open("y")
	_, _, _, _ = a, b, c, d
}
"#;
    with_source(src, |checker, files| {
        for name in ["a", "b", "c", "d"] {
            assert_eq!(local_type(checker, files, name), "invalid type", "{}", name);
        }
    });
}

#[test]
fn test_unbound_import_yields_invalid() {
    let src = r#"package p

import "example.com/missing"

func f() {
	r, err := missing.Open()
	_, _ = r, err
}
"#;
    with_source(src, |checker, files| {
        assert_eq!(local_type(checker, files, "r"), "invalid type");
        assert_eq!(local_type(checker, files, "err"), "invalid type");
    });
}

#[test]
fn test_cyclic_definitions_do_not_hang() {
    let src = "package p\n\ntype A B\n\ntype B A\n\nvar x A\n\nvar y = y\n";
    with_source(src, |checker, _| {
        let a = package_type(checker, PATH, "A");
        assert!(checker.type_table.is_invalid(checker.underlying(a)));
        assert!(!checker.implements_shape(a, &CLOSER));
        assert_eq!(package_type_string(checker, PATH, "y"), "invalid type");
    });
}

#[test]
fn test_structural_identity() {
    let src = "package p\n\nvar a []map[string]int\n\nvar b []map[string]int\n\nvar c []map[string]int8\n";
    with_source(src, |checker, _| {
        let a = package_type(checker, PATH, "a");
        let b = package_type(checker, PATH, "b");
        let c = package_type(checker, PATH, "c");
        assert!(checker.identical(a, b));
        assert!(!checker.identical(a, c));
    });
}

// ============================================================================
// Method sets and shapes
// ============================================================================

const SHAPES: &str = r#"package p

type Value struct{}

func (Value) Close() error { return nil }

type Ptr struct{}

func (p *Ptr) Close() error { return nil }

type Closer interface {
	Close() error
}

type Reader interface {
	Read(p []byte) (int, error)
}

type ReadCloser interface {
	Reader
	Closer
}

type Wrapper struct {
	*Ptr
}

type Holder struct {
	Ptr
}

type Boxed struct {
	Closer
}

type Ambiguous struct {
	Value
	Ptr
}

type Shadowed struct {
	Value
	Close int
}

type Alias = Ptr

type Redefined Ptr

type NoResult struct{}

func (NoResult) Close() {}

type TakesArg struct{}

func (TakesArg) Close(force bool) error { return nil }

type WrongResult struct{}

func (WrongResult) Close() int { return 0 }

type Variadic struct{}

func (Variadic) Close(opts ...int) error { return nil }

type MyErr struct{}

func (e *MyErr) Error() string { return "" }
"#;

/// Helper: whether `name` (or `*name` when `pointer`) has a `Close() error`
/// method in its method set.
fn closes(checker: &mut Checker<'_>, name: &str, pointer: bool) -> bool {
    shape_holds(checker, name, pointer, &CLOSER)
}

fn shape_holds(checker: &mut Checker<'_>, name: &str, pointer: bool, shape: &InterfaceShape) -> bool {
    let mut ty = package_type(checker, PATH, name);
    if pointer {
        ty = checker.type_table.pointer(ty);
    }
    checker.implements_shape(ty, shape)
}

#[test]
fn test_value_and_pointer_receivers() {
    with_source(SHAPES, |checker, _| {
        assert!(closes(checker, "Value", false));
        assert!(closes(checker, "Value", true));
        assert!(!closes(checker, "Ptr", false));
        assert!(closes(checker, "Ptr", true));
    });
}

#[test]
fn test_interfaces() {
    with_source(SHAPES, |checker, _| {
        assert!(closes(checker, "Closer", false));
        assert!(closes(checker, "ReadCloser", false));
        assert!(!closes(checker, "Reader", false));
        // A pointer to an interface has an empty method set.
        assert!(!closes(checker, "Closer", true));
        assert_eq!(
            package_type_string(checker, PATH, "ReadCloser"),
            "p.ReadCloser"
        );
    });
}

#[test]
fn test_embedded_promotion() {
    with_source(SHAPES, |checker, _| {
        assert!(closes(checker, "Wrapper", false));
        assert!(!closes(checker, "Holder", false));
        assert!(closes(checker, "Holder", true));
        assert!(closes(checker, "Boxed", false));
        // Two candidates at the same depth cancel out.
        assert!(!closes(checker, "Ambiguous", true));
        // A field at a shallower depth hides the promoted method.
        assert!(!closes(checker, "Shadowed", false));
    });
}

#[test]
fn test_aliases_share_methods_but_definitions_do_not() {
    with_source(SHAPES, |checker, _| {
        assert!(closes(checker, "Alias", true));
        assert!(!closes(checker, "Redefined", true));
    });
}

#[test]
fn test_signature_must_match_exactly() {
    with_source(SHAPES, |checker, _| {
        assert!(!closes(checker, "NoResult", false));
        assert!(!closes(checker, "TakesArg", false));
        assert!(!closes(checker, "WrongResult", false));
        assert!(!closes(checker, "Variadic", false));
    });
}

#[test]
fn test_error_shape() {
    with_source(SHAPES, |checker, _| {
        let error = checker.error_type();
        assert!(checker.implements_shape(error, &ERROR));
        assert!(!checker.implements_shape(error, &CLOSER));
        assert!(shape_holds(checker, "MyErr", true, &ERROR));
        assert!(!shape_holds(checker, "MyErr", false, &ERROR));
        assert!(!shape_holds(checker, "Closer", false, &ERROR));
    });
}

#[test]
fn test_standard_library_stub_types() {
    let src = r#"package p

import "os"

func f() {
	file, err := os.Open("x")
	_, _ = file, err
}
"#;
    with_source(src, |checker, _| {
        let file = package_type(checker, "os", "File");
        assert!(matches!(checker.type_table.get(file), Type::Named(_)));
        let pointer = checker.type_table.pointer(file);
        assert!(checker.implements_shape(pointer, &CLOSER));
        assert!(!checker.implements_shape(file, &CLOSER));
    });
}

#[test]
fn test_invalid_types_satisfy_nothing() {
    with_source("package p\n", |checker, _| {
        let invalid = checker.type_table.invalid_type;
        assert!(!checker.implements_shape(invalid, &CLOSER));
        assert!(!checker.implements_shape(invalid, &ERROR));
        let nil = checker.type_table.untyped_nil_type;
        assert!(!checker.implements_shape(nil, &ERROR));
    });
}
