//! Parser integration tests.
//!
//! Verifies that the parser correctly builds AST structures from Go source.

use bumpalo::Bump;
use closecheck_ast::node::*;
use closecheck_ast::syntax_kind::SyntaxKind;
use closecheck_ast::types::NodeFlags;
use closecheck_core::intern::StringInterner;
use closecheck_parser::Parser;

/// Helper: parse source text and hand the file, interner and diagnostic
/// messages to `check`.
fn parse_with<R>(source: &str, check: impl FnOnce(&SourceFile<'_>, &StringInterner, &[String]) -> R) -> R {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let mut parser = Parser::new(&arena, &interner, "test.go", source);
    let sf = parser.parse_source_file();
    let messages: Vec<String> = parser
        .take_diagnostics()
        .into_iter()
        .map(|d| d.message_text)
        .collect();
    check(&sf, &interner, &messages)
}

/// Helper: assert that a source parses without diagnostics.
fn assert_parses(source: &str) {
    parse_with(source, |_, _, messages| {
        assert!(messages.is_empty(), "source: {}\nerrors: {:?}", source, messages);
    });
}

/// Helper: the body of the first function declaration.
fn first_body<'s, 'a>(sf: &'s SourceFile<'a>) -> &'a [Statement<'a>] {
    for decl in sf.declarations {
        if let Declaration::Function(func) = decl {
            if let Some(body) = func.body {
                return body.statements;
            }
        }
    }
    panic!("no function with a body");
}

fn wrap(body: &str) -> String {
    format!("package p\n\nfunc f() {{\n{}\n}}\n", body)
}

// ============================================================================
// Package clause and imports
// ============================================================================

#[test]
fn test_package_and_imports() {
    let src = "package main\n\nimport (\n\t\"os\"\n\tf \"fmt\"\n\t_ \"net/http\"\n)\n\nimport \"io\"\n";
    parse_with(src, |sf, interner, messages| {
        assert!(messages.is_empty(), "{:?}", messages);
        assert_eq!(interner.resolve(sf.package_name.name), "main");
        assert_eq!(sf.imports.len(), 4);
        assert!(sf.imports[0].name.is_none());
        assert_eq!(interner.resolve(sf.imports[0].path), "os");
        let alias = sf.imports[1].name.expect("named import");
        assert_eq!(interner.resolve(alias.name), "f");
        assert_eq!(interner.resolve(sf.imports[1].path), "fmt");
        assert_eq!(interner.resolve(sf.imports[2].path), "net/http");
        assert_eq!(interner.resolve(sf.imports[3].path), "io");
    });
}

#[test]
fn test_missing_package_clause() {
    parse_with("foo := 1\n", |sf, _, messages| {
        assert_eq!(messages[0], "expected 'package', found name foo");
        assert!(sf.declarations.is_empty());
    });
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn test_const_iota_repetition() {
    let src = "package p\n\nconst (\n\ta = iota\n\tb\n\tc\n)\n";
    parse_with(src, |sf, _, messages| {
        assert!(messages.is_empty(), "{:?}", messages);
        let Declaration::Gen(decl) = &sf.declarations[0] else {
            panic!("expected a const declaration");
        };
        assert_eq!(decl.keyword, SyntaxKind::ConstKeyword);
        assert_eq!(decl.specs.len(), 3);
        let Spec::Value(b) = &decl.specs[1] else {
            panic!("expected a value spec");
        };
        assert_eq!(b.iota, 1);
        assert_eq!(b.values.len(), 1);
        assert!(b.data.flags.contains(NodeFlags::SYNTHESIZED));
        let Spec::Value(a) = &decl.specs[0] else {
            panic!("expected a value spec");
        };
        assert!(!a.data.flags.contains(NodeFlags::SYNTHESIZED));
    });
}

#[test]
fn test_type_declarations() {
    let src = r#"package p

type Closer interface {
	Close() error
}

type ReadCloser interface {
	io.Reader
	Closer
}

type Record struct {
	ID   int64 `json:"id"`
	A, B string
	io.Writer
	*Store
}

type Alias = Record
"#;
    parse_with(src, |sf, interner, messages| {
        assert!(messages.is_empty(), "{:?}", messages);
        assert_eq!(sf.declarations.len(), 4);

        let Declaration::Gen(closer) = &sf.declarations[0] else {
            panic!("expected a type declaration");
        };
        let Spec::Type(spec) = &closer.specs[0] else {
            panic!("expected a type spec");
        };
        let Expression::InterfaceType(iface) = spec.type_expr else {
            panic!("expected an interface type");
        };
        assert_eq!(iface.methods.fields.len(), 1);
        assert_eq!(interner.resolve(iface.methods.fields[0].names[0].name), "Close");
        assert!(matches!(iface.methods.fields[0].type_expr, Expression::FunctionType(_)));

        let Declaration::Gen(record) = &sf.declarations[2] else {
            panic!("expected a type declaration");
        };
        let Spec::Type(spec) = &record.specs[0] else {
            panic!("expected a type spec");
        };
        let Expression::StructType(st) = spec.type_expr else {
            panic!("expected a struct type");
        };
        let fields = st.fields.fields;
        assert_eq!(fields.len(), 4);
        assert!(fields[0].tag.is_some());
        assert_eq!(fields[1].names.len(), 2);
        assert!(fields[2].names.is_empty());
        assert!(matches!(fields[3].type_expr, Expression::Star(_)));

        let Declaration::Gen(alias) = &sf.declarations[3] else {
            panic!("expected a type declaration");
        };
        let Spec::Type(spec) = &alias.specs[0] else {
            panic!("expected a type spec");
        };
        assert!(spec.is_alias);
    });
}

#[test]
fn test_function_signatures() {
    let src = r#"package p

func (s *Store) Close() error { return nil }

func copyAll(dst io.Writer, src io.Reader) (n int64, err error) { return }

func pair(a, b int, rest ...string) {}

func anon(int, string) {}

func external(x int) bool
"#;
    parse_with(src, |sf, interner, messages| {
        assert!(messages.is_empty(), "{:?}", messages);
        let funcs: Vec<&FunctionDeclaration> = sf
            .declarations
            .iter()
            .filter_map(|d| match d {
                Declaration::Function(f) => Some(f),
                _ => None,
            })
            .collect();
        assert_eq!(funcs.len(), 5);

        let close = funcs[0];
        assert_eq!(interner.resolve(close.name.name), "Close");
        assert_eq!(close.receiver.map(|r| r.arity()), Some(1));
        assert_eq!(close.signature.results.map(|r| r.arity()), Some(1));

        assert_eq!(funcs[1].signature.parameters.arity(), 2);
        assert_eq!(funcs[1].signature.results.map(|r| r.arity()), Some(2));

        let pair = funcs[2];
        assert_eq!(pair.signature.parameters.fields.len(), 2);
        assert_eq!(pair.signature.parameters.fields[0].names.len(), 2);
        assert!(matches!(pair.signature.parameters.fields[1].type_expr, Expression::Ellipsis(_)));

        assert_eq!(funcs[3].signature.parameters.arity(), 2);
        assert!(funcs[3].signature.parameters.fields[0].names.is_empty());

        assert!(funcs[4].body.is_none());
    });
}

#[test]
fn test_mixed_parameters_rejected() {
    parse_with("package p\n\nfunc f(a int, string) {}\n", |_, _, messages| {
        assert_eq!(messages, ["mixed named and unnamed parameters"]);
    });
}

#[test]
fn test_type_parameters_rejected() {
    parse_with("package p\n\nfunc Map[T any](xs []T) {}\n", |sf, _, messages| {
        assert_eq!(messages, ["type parameters are not supported"]);
        assert_eq!(sf.declarations.len(), 1);
    });
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_short_variable_declaration() {
    let src = wrap("\tf, err := os.Open(\"data.txt\")");
    parse_with(&src, |sf, interner, messages| {
        assert!(messages.is_empty(), "{:?}", messages);
        let body = first_body(sf);
        assert_eq!(body.len(), 1);
        let Statement::Assign(assign) = &body[0] else {
            panic!("expected an assignment");
        };
        assert!(assign.is_define());
        assert_eq!(assign.lhs.len(), 2);
        assert_eq!(&src[assign.operator_pos as usize..assign.operator_pos as usize + 2], ":=");
        let name = assign.lhs[1].as_identifier().expect("identifier");
        assert_eq!(interner.resolve(name.name), "err");
        let Expression::Call(call) = &assign.rhs[0] else {
            panic!("expected a call");
        };
        assert!(matches!(call.function, Expression::Selector(_)));
        assert_eq!(call.arguments.len(), 1);
    });
}

#[test]
fn test_non_name_on_left_of_define() {
    parse_with(&wrap("\ta.b := 1"), |_, _, messages| {
        assert_eq!(messages, ["non-name a.b on left side of :="]);
    });
}

#[test]
fn test_if_with_init_and_else_chain() {
    let src = wrap("\tif err := f(); err != nil {\n\t\treturn\n\t} else if x {\n\t} else {\n\t}");
    parse_with(&src, |sf, _, messages| {
        assert!(messages.is_empty(), "{:?}", messages);
        let Statement::If(stmt) = &first_body(sf)[0] else {
            panic!("expected an if statement");
        };
        assert!(matches!(stmt.init, Some(Statement::Assign(_))));
        assert!(matches!(stmt.condition, Expression::Binary(_)));
        assert_eq!(stmt.then_block.statements.len(), 1);
        let Some(Statement::If(nested)) = stmt.else_statement else {
            panic!("expected else if");
        };
        assert!(matches!(nested.else_statement, Some(Statement::Block(_))));
    });
}

#[test]
fn test_composite_literal_in_header() {
    // A bare type name before `{` opens the block; a literal type does not.
    assert_parses(&wrap("\tif x == nil {\n\t}\n\tfor _, r := range []Record{{ID: 1}} {\n\t\t_ = r\n\t}"));
    assert_parses(&wrap("\tif p == (Point{}) {\n\t}"));
}

#[test]
fn test_for_forms() {
    let src = wrap("\tfor {\n\t}\n\tfor ok {\n\t}\n\tfor i := 0; i < n; i++ {\n\t}\n\tfor k, v := range m {\n\t}\n\tfor range ch {\n\t}");
    parse_with(&src, |sf, _, messages| {
        assert!(messages.is_empty(), "{:?}", messages);
        let body = first_body(sf);
        assert_eq!(body.len(), 5);
        let Statement::For(forever) = &body[0] else {
            panic!("expected a for statement");
        };
        assert!(forever.condition.is_none());
        let Statement::For(three) = &body[2] else {
            panic!("expected a for statement");
        };
        assert!(three.init.is_some() && three.condition.is_some() && three.post.is_some());
        let Statement::Range(range) = &body[3] else {
            panic!("expected a range statement");
        };
        assert!(range.is_define);
        assert!(range.key.is_some() && range.value.is_some());
        let Statement::Range(bare) = &body[4] else {
            panic!("expected a range statement");
        };
        assert!(bare.key.is_none());
    });
}

#[test]
fn test_switch_and_type_switch() {
    let src = wrap("\tswitch {\n\tcase a > b:\n\t\tx++\n\tdefault:\n\t}\n\tswitch v := x.(type) {\n\tcase int, string:\n\tcase nil:\n\t}");
    parse_with(&src, |sf, interner, messages| {
        assert!(messages.is_empty(), "{:?}", messages);
        let body = first_body(sf);
        let Statement::Switch(switch) = &body[0] else {
            panic!("expected a switch statement");
        };
        assert!(switch.tag.is_none());
        assert_eq!(switch.clauses.len(), 2);
        assert!(switch.clauses[1].expressions.is_none());
        assert_eq!(switch.clauses[0].body.len(), 1);

        let Statement::TypeSwitch(ts) = &body[1] else {
            panic!("expected a type switch");
        };
        let binding = ts.binding.expect("binding");
        assert_eq!(interner.resolve(binding.name), "v");
        assert_eq!(ts.clauses.len(), 2);
        assert_eq!(ts.clauses[0].expressions.map(|e| e.len()), Some(2));
    });
}

#[test]
fn test_select_statement() {
    let src = wrap("\tselect {\n\tcase r, ok := <-ch:\n\t\t_ = r\n\t\t_ = ok\n\tcase out <- 1:\n\tcase <-done:\n\t\treturn\n\tdefault:\n\t}");
    parse_with(&src, |sf, _, messages| {
        assert!(messages.is_empty(), "{:?}", messages);
        let Statement::Select(select) = &first_body(sf)[0] else {
            panic!("expected a select statement");
        };
        assert_eq!(select.clauses.len(), 4);
        assert!(matches!(select.clauses[0].comm, Some(Statement::Assign(_))));
        assert!(matches!(select.clauses[1].comm, Some(Statement::Send(_))));
        assert!(matches!(select.clauses[2].comm, Some(Statement::Expression(_))));
        assert!(select.clauses[3].comm.is_none());
        assert_eq!(select.clauses[0].body.len(), 2);
    });
}

#[test]
fn test_defer_go_and_function_literals() {
    let src = wrap("\tdefer f.Close()\n\tdefer func() {\n\t\t_ = f.Close()\n\t}()\n\tgo worker(ch)");
    parse_with(&src, |sf, _, messages| {
        assert!(messages.is_empty(), "{:?}", messages);
        let body = first_body(sf);
        assert_eq!(body.len(), 3);
        let Statement::Defer(first) = &body[0] else {
            panic!("expected a defer statement");
        };
        assert!(matches!(first.call, Expression::Call(_)));
        let Statement::Defer(second) = &body[1] else {
            panic!("expected a defer statement");
        };
        let Expression::Call(call) = second.call else {
            panic!("expected a call");
        };
        let Expression::FunctionLiteral(lit) = call.function else {
            panic!("expected a function literal");
        };
        assert_eq!(lit.body.statements.len(), 1);
        assert!(matches!(body[2], Statement::Go(_)));
    });
}

#[test]
fn test_labeled_statement() {
    let src = wrap("outer:\n\tfor {\n\t\tbreak outer\n\t}");
    parse_with(&src, |sf, interner, messages| {
        assert!(messages.is_empty(), "{:?}", messages);
        let body = first_body(sf);
        assert_eq!(body.len(), 1);
        let Statement::Labeled(labeled) = &body[0] else {
            panic!("expected a labeled statement");
        };
        assert_eq!(interner.resolve(labeled.label.name), "outer");
        assert!(matches!(labeled.statement, Statement::For(_)));
    });
}

#[test]
fn test_expressions() {
    assert_parses(&wrap(
        "\tcounts := map[string]int{}\n\tcounts[r.Name]++\n\tbuf := make([]byte, 32*1024)\n\tn := copy(buf[1:], data[:n:cap(data)])\n\tv, ok := x.(io.Closer)\n\tp := &Store{db: db, path: \"x\"}\n\tch <- -a + b*c\n\tfn(args...)\n\tvar r <-chan int = nil",
    ));
}

#[test]
fn test_binary_precedence() {
    parse_with(&wrap("\tx := a || b && c == d + e*f"), |sf, _, messages| {
        assert!(messages.is_empty(), "{:?}", messages);
        let Statement::Assign(assign) = &first_body(sf)[0] else {
            panic!("expected an assignment");
        };
        let Expression::Binary(or) = &assign.rhs[0] else {
            panic!("expected a binary expression");
        };
        assert_eq!(or.operator, SyntaxKind::BarBarToken);
        let Expression::Binary(and) = or.right else {
            panic!("expected a binary expression");
        };
        assert_eq!(and.operator, SyntaxKind::AmpersandAmpersandToken);
    });
}

// ============================================================================
// Error recovery
// ============================================================================

#[test]
fn test_unexpected_token_in_block() {
    parse_with(&wrap("\t)\n\tx := 1"), |sf, _, messages| {
        assert_eq!(messages[0], "expected statement, found ')'");
        assert!(first_body(sf).iter().any(|s| matches!(s, Statement::Assign(_))));
    });
}

#[test]
fn test_missing_declaration_keyword() {
    parse_with("package p\n\nx := 1\n\nfunc f() {}\n", |sf, _, messages| {
        assert_eq!(messages[0], "expected declaration, found name x");
        assert!(sf
            .declarations
            .iter()
            .any(|d| matches!(d, Declaration::Function(_))));
    });
}

#[test]
fn test_deep_nesting_is_reported() {
    let handle = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(|| {
            let expr = format!("{}1{}", "(".repeat(400), ")".repeat(400));
            parse_with(&wrap(&format!("\tx := {}", expr)), |_, _, messages| {
                assert_eq!(messages.len(), 1, "{:?}", messages);
                assert_eq!(messages[0], "expression nesting too deep");
            });
        })
        .unwrap();
    handle.join().unwrap();
}

// ============================================================================
// Node identities
// ============================================================================

#[test]
fn test_node_ids_start_at_base() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let mut parser =
        Parser::new(&arena, &interner, "a.go", "package p\n\nvar x = 1\n").with_node_id_base(100);
    let sf = parser.parse_source_file();
    assert_eq!(sf.package_name.data.id.0, 100);
    assert_eq!(sf.next_node_id, sf.data.id.0 + 1);
}

#[test]
fn test_diagnostics_carry_file_name() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let mut parser = Parser::new(&arena, &interner, "broken.go", "package p\n\nfunc f() { if {} }\n");
    parser.parse_source_file();
    let diagnostics = parser.take_diagnostics();
    assert!(!diagnostics.is_empty());
    assert!(diagnostics
        .diagnostics()
        .iter()
        .all(|d| d.file.as_deref() == Some("broken.go")));
}
