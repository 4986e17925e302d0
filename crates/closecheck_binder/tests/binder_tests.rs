//! Binder integration tests.
//!
//! Tests the parse -> bind pipeline and verifies identifier resolution.

use bumpalo::Bump;
use closecheck_ast::node::*;
use closecheck_ast::types::{SymbolFlags, SymbolId};
use closecheck_ast::{walk_with_ancestors, NodeRef};
use closecheck_binder::{Binder, SymbolDecl};
use closecheck_core::intern::StringInterner;
use closecheck_parser::Parser;

/// Helper: parse and bind packages in order; each entry is an import path
/// and the sources of its files.
fn bind_packages<R>(
    packages: &[(&str, &[&str])],
    check: impl FnOnce(&Binder<'_>, &[SourceFile<'_>]) -> R,
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
    check(&binder, &files)
}

/// Helper: bind a single-file package.
fn bind_source<R>(source: &str, check: impl FnOnce(&Binder<'_>, &[SourceFile<'_>]) -> R) -> R {
    bind_packages(&[("example.com/p", &[source])], check)
}

/// Helper: every identifier expression named `name`, in source order.
fn identifiers(binder: &Binder<'_>, files: &[SourceFile<'_>], name: &str) -> Vec<Identifier> {
    let mut found = Vec::new();
    for file in files {
        walk_with_ancestors(file, |node, _| {
            if let NodeRef::Expression(Expression::Identifier(id)) = node {
                if binder.interner().resolve(id.name) == name {
                    found.push(*id);
                }
            }
        });
    }
    found
}

fn symbol(binder: &Binder<'_>, id: &Identifier) -> SymbolId {
    binder
        .symbol_of(id.data.id)
        .unwrap_or_else(|| panic!("identifier at {} is unresolved", id.pos()))
}

// ============================================================================
// Local declarations
// ============================================================================

#[test]
fn test_define_and_use_share_a_symbol() {
    let src = r#"package p

import "os"

func f() {
	f, err := os.Open("x")
	if err != nil {
		return
	}
	f.Close()
}
"#;
    bind_source(src, |binder, files| {
        let fs = identifiers(binder, files, "f");
        assert_eq!(fs.len(), 2);
        let def = symbol(binder, &fs[0]);
        assert_eq!(def, symbol(binder, &fs[1]));
        let sym = binder.get_symbol(def).unwrap();
        assert!(sym.flags.contains(SymbolFlags::VARIABLE));
        assert!(matches!(sym.decl, SymbolDecl::Define { index: 0, .. }));

        let errs = identifiers(binder, files, "err");
        assert_eq!(symbol(binder, &errs[0]), symbol(binder, &errs[1]));

        let os = identifiers(binder, files, "os");
        let pkg = binder.get_symbol(symbol(binder, &os[0])).unwrap();
        assert!(pkg.flags.contains(SymbolFlags::PACKAGE_NAME));
        // Not bound, so the import has no members.
        assert!(matches!(pkg.decl, SymbolDecl::Import { package: None, .. }));
    });
}

#[test]
fn test_define_reuses_names_of_the_same_scope() {
    let src = r#"package p

func f() {
	a, err := g()
	b, err := g()
	{
		err := g()
		_ = err
	}
	_, _ = a, b
}

func g() (int, error) { return 0, nil }
"#;
    bind_source(src, |binder, files| {
        let errs = identifiers(binder, files, "err");
        assert_eq!(errs.len(), 4);
        let outer = symbol(binder, &errs[0]);
        assert_eq!(symbol(binder, &errs[1]), outer);
        let inner = symbol(binder, &errs[2]);
        assert_ne!(inner, outer);
        assert_eq!(symbol(binder, &errs[3]), inner);
    });
}

#[test]
fn test_blank_identifier_has_no_symbol() {
    bind_source("package p\n\nfunc f() {\n\t_, err := g()\n\t_ = err\n}\n", |binder, files| {
        for blank in identifiers(binder, files, "_") {
            assert!(binder.symbol_of(blank.data.id).is_none());
        }
    });
}

#[test]
fn test_if_init_is_scoped_to_the_statement() {
    let src = r#"package p

func f() {
	err := g()
	if err := g(); err != nil {
		_ = err
	}
	_ = err
}
"#;
    bind_source(src, |binder, files| {
        let errs = identifiers(binder, files, "err");
        assert_eq!(errs.len(), 5);
        let outer = symbol(binder, &errs[0]);
        let header = symbol(binder, &errs[1]);
        assert_ne!(outer, header);
        assert_eq!(symbol(binder, &errs[2]), header);
        assert_eq!(symbol(binder, &errs[3]), header);
        assert_eq!(symbol(binder, &errs[4]), outer);
    });
}

#[test]
fn test_range_and_type_switch_variables() {
    let src = r#"package p

func f(xs []int, x interface{}) {
	for i, v := range xs {
		_, _ = i, v
	}
	switch t := x.(type) {
	case int:
		_ = t
	case string:
		_ = t
	}
}
"#;
    bind_source(src, |binder, files| {
        let vs = identifiers(binder, files, "v");
        let v = binder.get_symbol(symbol(binder, &vs[0])).unwrap();
        assert!(matches!(v.decl, SymbolDecl::RangeValue(_)));
        assert_eq!(symbol(binder, &vs[0]), symbol(binder, &vs[1]));

        let ts = identifiers(binder, files, "t");
        assert_eq!(ts.len(), 2);
        let first = symbol(binder, &ts[0]);
        let second = symbol(binder, &ts[1]);
        assert_ne!(first, second);
        assert!(matches!(
            binder.get_symbol(first).unwrap().decl,
            SymbolDecl::TypeSwitch { .. }
        ));
    });
}

#[test]
fn test_function_literal_parameters() {
    let src = "package p\n\nfunc f() {\n\tfn := func(r int) int { return r }\n\t_ = fn\n}\n";
    bind_source(src, |binder, files| {
        let rs = identifiers(binder, files, "r");
        let r = binder.get_symbol(symbol(binder, &rs[0])).unwrap();
        assert!(r.flags.contains(SymbolFlags::PARAMETER));
        assert!(matches!(r.decl, SymbolDecl::Field(_)));
    });
}

// ============================================================================
// Package level
// ============================================================================

#[test]
fn test_package_level_names_are_hoisted_across_files() {
    let first = "package p\n\nfunc f() {\n\thelper()\n\t_ = limit\n}\n";
    let second = "package p\n\nconst limit = 3\n\nfunc helper() {}\n";
    bind_packages(&[("example.com/p", &[first, second])], |binder, files| {
        let helper = identifiers(binder, files, "helper");
        let sym = binder.get_symbol(symbol(binder, &helper[0])).unwrap();
        assert!(sym.flags.contains(SymbolFlags::FUNCTION | SymbolFlags::PACKAGE_LEVEL));

        let limit = identifiers(binder, files, "limit");
        let sym = binder.get_symbol(symbol(binder, &limit[0])).unwrap();
        assert!(sym.flags.contains(SymbolFlags::CONSTANT));
    });
}

#[test]
fn test_methods_are_not_in_package_scope() {
    let src = "package p\n\ntype T struct{}\n\nfunc (t *T) Close() error { return nil }\n";
    bind_source(src, |binder, _| {
        let package = binder.package_by_path("example.com/p").unwrap();
        assert!(binder.lookup_in_package(package, "Close").is_none());
        assert!(binder.lookup_in_package(package, "T").is_some());
        let methods = &binder.package(package).unwrap().methods;
        assert_eq!(methods.len(), 1);
        let close = binder.get_symbol(methods[0]).unwrap();
        assert!(close.flags.contains(SymbolFlags::METHOD));
        assert_eq!(close.name_text, "Close");
    });
}

#[test]
fn test_universe_names() {
    bind_source("package p\n\nvar e error = nil\n\nvar n = len(\"x\")\n", |binder, files| {
        let error = identifiers(binder, files, "error");
        let sym = binder.get_symbol(symbol(binder, &error[0])).unwrap();
        assert!(sym.flags.contains(SymbolFlags::TYPE_NAME | SymbolFlags::PREDECLARED));
        assert!(sym.package.is_none());

        let nil = identifiers(binder, files, "nil");
        let sym = binder.get_symbol(symbol(binder, &nil[0])).unwrap();
        assert!(sym.flags.contains(SymbolFlags::NIL));

        let len = identifiers(binder, files, "len");
        let sym = binder.get_symbol(symbol(binder, &len[0])).unwrap();
        assert!(sym.flags.contains(SymbolFlags::BUILTIN));
    });
}

#[test]
fn test_local_declaration_shadows_universe() {
    bind_source("package p\n\nfunc f() {\n\tlen := 3\n\t_ = len\n}\n", |binder, files| {
        let len = identifiers(binder, files, "len");
        let sym = binder.get_symbol(symbol(binder, &len[1])).unwrap();
        assert!(!sym.flags.contains(SymbolFlags::PREDECLARED));
    });
}

// ============================================================================
// Imports
// ============================================================================

#[test]
fn test_imports_resolve_to_bound_packages() {
    let io = "package io\n\ntype Closer interface {\n\tClose() error\n}\n";
    let main = "package main\n\nimport \"io\"\n\nvar c io.Closer\n";
    bind_packages(&[("io", &[io]), ("example.com/main", &[main])], |binder, files| {
        let io_id = binder.package_by_path("io").unwrap();
        let uses = identifiers(binder, files, "io");
        let pkg = binder.get_symbol(symbol(binder, &uses[0])).unwrap();
        assert!(matches!(pkg.decl, SymbolDecl::Import { package: Some(p), .. } if p == io_id));

        let closer = binder.lookup_in_package(io_id, "Closer").unwrap();
        assert!(binder.get_symbol(closer).unwrap().flags.contains(SymbolFlags::TYPE_NAME));
    });
}

#[test]
fn test_aliased_and_dot_imports() {
    let io = "package io\n\ntype Reader interface{}\n\ntype writer interface{}\n";
    let main = "package main\n\nimport (\n\tstream \"io\"\n\t. \"io\"\n)\n\nvar a stream.Reader\n\nvar b Reader\n";
    bind_packages(&[("io", &[io]), ("example.com/main", &[main])], |binder, files| {
        let stream = identifiers(binder, files, "stream");
        let sym = binder.get_symbol(symbol(binder, &stream[0])).unwrap();
        assert!(sym.flags.contains(SymbolFlags::PACKAGE_NAME));

        let io_id = binder.package_by_path("io").unwrap();
        let reader = identifiers(binder, files, "Reader");
        assert_eq!(
            Some(symbol(binder, &reader[0])),
            binder.lookup_in_package(io_id, "Reader")
        );
    });
}

#[test]
fn test_composite_literal_keys_are_not_resolved() {
    let src = "package p\n\ntype T struct{ Name int }\n\nvar Name = 1\n\nvar t = T{Name: Name}\n";
    bind_source(src, |binder, files| {
        let names = identifiers(binder, files, "Name");
        assert_eq!(names.len(), 2);
        assert!(binder.symbol_of(names[0].data.id).is_none());
        assert!(binder.symbol_of(names[1].data.id).is_some());
    });
}
