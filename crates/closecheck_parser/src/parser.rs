//! The Go parser implementation.
//!
//! A recursive descent parser over the scanner's token stream that builds an
//! arena-allocated AST. Every node receives an id that is unique within the
//! analysis unit, starting from the base the caller supplies.

use bumpalo::Bump;
use closecheck_ast::node::*;
use closecheck_ast::syntax_kind::SyntaxKind;
use closecheck_ast::types::*;
use closecheck_core::intern::StringInterner;
use closecheck_core::text::TextSpan;
use closecheck_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};
use closecheck_scanner::Scanner;

use crate::precedence::{binary_operator_precedence, OperatorPrecedence};
use crate::utilities::{can_start_type, is_recovery_point, unquote_import_path};

/// Maximum recursion depth to prevent stack overflow on deeply nested input.
const MAX_RECURSION_DEPTH: u32 = 200;

/// Move a Vec into the arena as a slice.
fn alloc_vec_in<T>(arena: &Bump, vec: Vec<T>) -> &[T] {
    if vec.is_empty() {
        return &[];
    }
    arena.alloc_slice_fill_iter(vec)
}

/// Which forms `parse_simple_statement` may produce besides the basic ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimpleMode {
    Basic,
    LabelOk,
    RangeOk,
}

/// A simple statement, or the header of a range clause.
enum Simple<'a> {
    Statement(Statement<'a>),
    Range {
        key: Option<&'a Expression<'a>>,
        value: Option<&'a Expression<'a>>,
        is_define: bool,
        range_expression: &'a Expression<'a>,
    },
}

/// One entry of a parameter list before names and types are grouped.
enum ParamEntry<'a> {
    /// A lone identifier: a parameter name or a type name.
    Ambiguous(Identifier),
    Named(Identifier, &'a Expression<'a>),
    Type(&'a Expression<'a>),
}

/// The parser produces a SourceFile AST from Go source text.
pub struct Parser<'a, 't> {
    arena: &'a Bump,
    interner: StringInterner,
    scanner: Scanner<'t>,
    file_name: String,
    source_text: &'t str,
    diagnostics: DiagnosticCollection,
    /// Tracks recursion depth to prevent stack overflow on deeply nested input.
    recursion_depth: u32,
    /// Set once the rest of the file has been skipped; later errors are
    /// consequences of the skip and are dropped.
    abandoned: bool,
    next_node_id: u32,
    prev_token_end: u32,
    /// Negative inside control clause headers, where `T {` opens a block
    /// rather than a composite literal.
    expr_level: i32,
}

impl<'a, 't> Parser<'a, 't> {
    pub fn new(
        arena: &'a Bump,
        interner: &StringInterner,
        file_name: &str,
        source_text: &'t str,
    ) -> Self {
        Self {
            arena,
            interner: interner.clone(),
            scanner: Scanner::new(source_text),
            file_name: file_name.to_string(),
            source_text,
            diagnostics: DiagnosticCollection::new(),
            recursion_depth: 0,
            abandoned: false,
            next_node_id: 0,
            prev_token_end: 0,
            expr_level: 0,
        }
    }

    /// Start numbering nodes at `base`, so that several files of one unit
    /// get disjoint ids.
    pub fn with_node_id_base(mut self, base: u32) -> Self {
        self.next_node_id = base;
        self
    }

    pub fn parse_source_file(&mut self) -> SourceFile<'a> {
        self.next_token();
        let end = self.source_text.len() as u32;

        let package_name = if self.token() == SyntaxKind::PackageKeyword {
            self.next_token();
            let name = self.parse_identifier();
            self.expect_semicolon();
            name
        } else {
            let found = self.found();
            self.error(&messages::EXPECTED_PACKAGE_CLAUSE, &[found.as_str()]);
            self.skip_to_end();
            self.missing_identifier()
        };

        let mut imports = Vec::new();
        while self.token() == SyntaxKind::ImportKeyword {
            self.parse_import_declaration(&mut imports);
            self.expect_semicolon();
        }

        let mut declarations = Vec::new();
        while self.token() != SyntaxKind::EndOfFileToken {
            let start = self.token_pos();
            match self.token() {
                SyntaxKind::VarKeyword | SyntaxKind::ConstKeyword | SyntaxKind::TypeKeyword => {
                    declarations.push(Declaration::Gen(self.parse_gen_declaration()));
                    self.expect_semicolon();
                }
                SyntaxKind::FuncKeyword => {
                    declarations.push(Declaration::Function(self.parse_function_declaration()));
                    self.expect_semicolon();
                }
                _ => {
                    let found = self.found();
                    self.error(&messages::EXPECTED_DECLARATION, &[found.as_str()]);
                    self.skip_to_next_statement();
                }
            }
            if self.token_pos() == start && self.token() != SyntaxKind::EndOfFileToken {
                self.next_token();
            }
        }

        SourceFile {
            data: NodeData::new(SyntaxKind::SourceFile, 0, end).with_id(self.fresh_id()),
            package_name,
            imports: alloc_vec_in(self.arena, imports),
            declarations: alloc_vec_in(self.arena, declarations),
            file_name: self.file_name.clone(),
            text: self.source_text.to_string(),
            next_node_id: self.next_node_id,
        }
    }

    /// Scanner and parser diagnostics, located in this file and sorted.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        let mut diagnostics = self.scanner.take_diagnostics();
        diagnostics.extend(std::mem::take(&mut self.diagnostics));
        diagnostics.set_file(&self.file_name);
        diagnostics.sort();
        diagnostics
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    fn token(&self) -> SyntaxKind {
        self.scanner.token()
    }

    #[inline]
    fn next_token(&mut self) -> SyntaxKind {
        self.prev_token_end = self.scanner.token_end();
        self.scanner.scan()
    }

    #[inline]
    fn token_pos(&self) -> u32 {
        self.scanner.token_start()
    }

    #[inline]
    fn fresh_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// Node data for a node starting at `pos` and ending at the last
    /// consumed token.
    fn finish(&mut self, kind: SyntaxKind, pos: u32) -> NodeData {
        let end = self.prev_token_end.max(pos);
        NodeData::new(kind, pos, end).with_id(self.fresh_id())
    }

    fn finish_range(&mut self, kind: SyntaxKind, pos: u32, end: u32) -> NodeData {
        NodeData::new(kind, pos, end).with_id(self.fresh_id())
    }

    fn alloc<T>(&self, value: T) -> &'a T {
        self.arena.alloc(value)
    }

    /// Describe the current token for "found X" messages.
    fn found(&self) -> String {
        match self.token() {
            SyntaxKind::SemicolonToken if self.scanner.is_auto_semicolon() => {
                if self.scanner.token_text().is_empty() {
                    "EOF".to_string()
                } else {
                    "newline".to_string()
                }
            }
            SyntaxKind::Identifier => format!("name {}", self.scanner.token_text()),
            kind if kind.is_literal() => format!("literal {}", self.scanner.token_text()),
            kind => kind.describe(),
        }
    }

    fn error(&mut self, message: &DiagnosticMessage, args: &[&str]) {
        if self.abandoned {
            return;
        }
        let span = TextSpan::from_bounds(self.token_pos(), self.scanner.token_end().max(self.token_pos()));
        self.diagnostics.add(Diagnostic::with_span(span, message, args));
    }

    fn error_at(&mut self, pos: u32, end: u32, message: &DiagnosticMessage, args: &[&str]) {
        if self.abandoned {
            return;
        }
        self.diagnostics
            .add(Diagnostic::with_span(TextSpan::from_bounds(pos, end.max(pos)), message, args));
    }

    fn error_expected(&mut self, what: &str) {
        let found = self.found();
        self.error(&messages::EXPECTED_0_FOUND_1, &[what, found.as_str()]);
    }

    fn expect_token(&mut self, kind: SyntaxKind) -> u32 {
        let pos = self.token_pos();
        if self.token() == kind {
            self.next_token();
        } else {
            self.error_expected(&kind.describe());
        }
        pos
    }

    fn optional_token(&mut self, kind: SyntaxKind) -> bool {
        if self.token() == kind {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// A semicolon ends every statement and declaration; it may be omitted
    /// before a closing `)` or `}`.
    fn expect_semicolon(&mut self) {
        match self.token() {
            SyntaxKind::SemicolonToken => {
                self.next_token();
            }
            SyntaxKind::CloseParenToken | SyntaxKind::CloseBraceToken => {}
            _ => {
                self.error_expected("';'");
                self.skip_to_next_statement();
            }
        }
    }

    /// Error recovery: skip tokens up to and including the next semicolon,
    /// or up to a token that starts a statement or declaration.
    fn skip_to_next_statement(&mut self) {
        loop {
            match self.token() {
                SyntaxKind::SemicolonToken => {
                    self.next_token();
                    return;
                }
                kind if is_recovery_point(kind) => return,
                _ => {
                    self.next_token();
                }
            }
        }
    }

    fn skip_to_end(&mut self) {
        self.abandoned = true;
        while self.token() != SyntaxKind::EndOfFileToken {
            self.next_token();
        }
    }

    /// Skip a bracketed type parameter list, which this front end rejects.
    fn skip_type_parameters(&mut self) {
        self.error(&messages::GENERIC_TYPE_PARAMETERS_NOT_SUPPORTED, &[]);
        let mut depth = 0u32;
        loop {
            match self.token() {
                SyntaxKind::OpenBracketToken => depth += 1,
                SyntaxKind::CloseBracketToken => {
                    depth -= 1;
                    if depth == 0 {
                        self.next_token();
                        return;
                    }
                }
                SyntaxKind::EndOfFileToken => return,
                _ => {}
            }
            self.next_token();
        }
    }

    /// Enter a recursive production. On excessive nesting the rest of the
    /// file is abandoned.
    fn enter(&mut self) -> bool {
        self.recursion_depth += 1;
        if self.recursion_depth > MAX_RECURSION_DEPTH {
            if self.token() != SyntaxKind::EndOfFileToken {
                self.error(&messages::EXPRESSION_NESTING_TOO_DEEP, &[]);
                self.skip_to_end();
            }
            self.recursion_depth -= 1;
            return false;
        }
        true
    }

    #[inline]
    fn leave(&mut self) {
        self.recursion_depth -= 1;
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    fn parse_identifier(&mut self) -> Identifier {
        let pos = self.token_pos();
        if self.token() == SyntaxKind::Identifier {
            let name = self.interner.intern(self.scanner.token_text());
            self.next_token();
            Identifier {
                data: self.finish(SyntaxKind::Identifier, pos),
                name,
            }
        } else {
            self.error_expected("name");
            self.missing_identifier()
        }
    }

    /// A `_` standing in for a name the source does not have.
    fn missing_identifier(&mut self) -> Identifier {
        let pos = self.token_pos();
        let mut data = self.finish_range(SyntaxKind::Identifier, pos, pos);
        data.flags |= NodeFlags::HAS_ERROR;
        Identifier {
            data,
            name: self.interner.intern_static("_"),
        }
    }

    fn parse_identifier_list(&mut self) -> Vec<Identifier> {
        let mut names = vec![self.parse_identifier()];
        while self.optional_token(SyntaxKind::CommaToken) {
            names.push(self.parse_identifier());
        }
        names
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn parse_import_declaration(&mut self, imports: &mut Vec<ImportSpec>) {
        self.next_token(); // 'import'
        if self.optional_token(SyntaxKind::OpenParenToken) {
            while self.token() != SyntaxKind::CloseParenToken
                && self.token() != SyntaxKind::EndOfFileToken
            {
                let start = self.token_pos();
                imports.push(self.parse_import_spec());
                self.expect_semicolon();
                if self.token_pos() == start {
                    self.next_token();
                }
            }
            self.expect_token(SyntaxKind::CloseParenToken);
        } else {
            imports.push(self.parse_import_spec());
        }
    }

    fn parse_import_spec(&mut self) -> ImportSpec {
        let pos = self.token_pos();
        let name = match self.token() {
            SyntaxKind::Identifier => Some(self.parse_identifier()),
            SyntaxKind::DotToken => {
                self.next_token();
                let name = self.interner.intern_static(".");
                Some(Identifier {
                    data: self.finish(SyntaxKind::Identifier, pos),
                    name,
                })
            }
            _ => None,
        };
        let path = if self.token() == SyntaxKind::StringLiteral {
            let path = self.interner.intern(unquote_import_path(self.scanner.token_text()));
            self.next_token();
            path
        } else {
            self.error_expected("import path");
            self.interner.intern_static("")
        };
        ImportSpec {
            data: self.finish(SyntaxKind::ImportSpec, pos),
            name,
            path,
        }
    }

    /// `var`, `const` or `type`, either a single spec or a parenthesized group.
    fn parse_gen_declaration(&mut self) -> GenDeclaration<'a> {
        let pos = self.token_pos();
        let keyword = self.token();
        self.next_token();

        let mut specs = Vec::new();
        let mut previous: Option<(Option<&'a Expression<'a>>, &'a [Expression<'a>])> = None;
        if self.optional_token(SyntaxKind::OpenParenToken) {
            let mut iota = 0;
            while self.token() != SyntaxKind::CloseParenToken
                && self.token() != SyntaxKind::EndOfFileToken
            {
                let start = self.token_pos();
                specs.push(self.parse_spec(keyword, iota, &mut previous));
                self.expect_semicolon();
                iota += 1;
                if self.token_pos() == start {
                    self.next_token();
                }
            }
            self.expect_token(SyntaxKind::CloseParenToken);
        } else {
            specs.push(self.parse_spec(keyword, 0, &mut previous));
        }

        GenDeclaration {
            data: self.finish(SyntaxKind::GenDeclaration, pos),
            keyword,
            specs: alloc_vec_in(self.arena, specs),
        }
    }

    fn parse_spec(
        &mut self,
        keyword: SyntaxKind,
        iota: u32,
        previous: &mut Option<(Option<&'a Expression<'a>>, &'a [Expression<'a>])>,
    ) -> Spec<'a> {
        if keyword == SyntaxKind::TypeKeyword {
            Spec::Type(self.parse_type_spec())
        } else {
            Spec::Value(self.parse_value_spec(keyword == SyntaxKind::ConstKeyword, iota, previous))
        }
    }

    fn parse_value_spec(
        &mut self,
        is_const: bool,
        iota: u32,
        previous: &mut Option<(Option<&'a Expression<'a>>, &'a [Expression<'a>])>,
    ) -> ValueSpec<'a> {
        let pos = self.token_pos();
        let names = self.parse_identifier_list();
        let mut type_expr = match self.token() {
            SyntaxKind::EqualsToken | SyntaxKind::SemicolonToken | SyntaxKind::CloseParenToken => None,
            _ => {
                let ty = self.parse_type();
                Some(self.alloc(ty))
            }
        };
        let mut values: &'a [Expression<'a>] = if self.optional_token(SyntaxKind::EqualsToken) {
            let list = self.parse_expression_list();
            alloc_vec_in(self.arena, list)
        } else {
            &[]
        };

        let mut synthesized = false;
        if is_const {
            if type_expr.is_none() && values.is_empty() {
                // Implicit repetition of the previous expression list.
                if let Some((prev_type, prev_values)) = *previous {
                    type_expr = prev_type;
                    values = prev_values;
                    synthesized = true;
                }
            } else {
                *previous = Some((type_expr, values));
            }
        }

        let mut data = self.finish(SyntaxKind::ValueSpec, pos);
        if synthesized {
            data.flags |= NodeFlags::SYNTHESIZED;
        }
        ValueSpec {
            data,
            names: alloc_vec_in(self.arena, names),
            type_expr,
            values,
            iota,
        }
    }

    fn parse_type_spec(&mut self) -> TypeSpec<'a> {
        let pos = self.token_pos();
        let name = self.parse_identifier();
        if self.token() == SyntaxKind::OpenBracketToken && self.is_type_parameter_list() {
            self.skip_type_parameters();
        }
        let is_alias = self.optional_token(SyntaxKind::EqualsToken);
        let type_expr = self.parse_type();
        TypeSpec {
            data: self.finish(SyntaxKind::TypeSpec, pos),
            name,
            is_alias,
            type_expr: self.alloc(type_expr),
        }
    }

    /// `type L[T any] ...` versus the array type in `type A [N]int`.
    fn is_type_parameter_list(&mut self) -> bool {
        self.scanner.look_ahead(|s| {
            s.scan() == SyntaxKind::Identifier
                && matches!(
                    s.scan(),
                    SyntaxKind::Identifier | SyntaxKind::InterfaceKeyword | SyntaxKind::TildeToken
                )
        })
    }

    fn parse_function_declaration(&mut self) -> FunctionDeclaration<'a> {
        let pos = self.token_pos();
        self.next_token(); // 'func'
        let receiver = if self.token() == SyntaxKind::OpenParenToken {
            let list = self.parse_parameters();
            Some(self.alloc(list))
        } else {
            None
        };
        let name = self.parse_identifier();
        if self.token() == SyntaxKind::OpenBracketToken {
            self.skip_type_parameters();
        }
        let signature = self.parse_signature(pos);
        let body = if self.token() == SyntaxKind::OpenBraceToken {
            self.expr_level += 1;
            let block = self.parse_block();
            self.expr_level -= 1;
            Some(self.alloc(block))
        } else {
            None
        };
        FunctionDeclaration {
            data: self.finish(SyntaxKind::FunctionDeclaration, pos),
            receiver,
            name,
            signature,
            body,
        }
    }

    // ========================================================================
    // Signatures and parameter lists
    // ========================================================================

    fn parse_signature(&mut self, pos: u32) -> &'a FunctionTypeNode<'a> {
        let parameters = self.parse_parameters();
        let results = self.parse_results();
        let signature = FunctionTypeNode {
            data: self.finish(SyntaxKind::FunctionType, pos),
            parameters: self.alloc(parameters),
            results,
        };
        self.alloc(signature)
    }

    fn parse_results(&mut self) -> Option<&'a FieldList<'a>> {
        if self.token() == SyntaxKind::OpenParenToken {
            let list = self.parse_parameters();
            return Some(self.alloc(list));
        }
        if !can_start_type(self.token()) {
            return None;
        }
        let pos = self.token_pos();
        let ty = self.parse_type();
        let ty = self.alloc(ty);
        let field = Field {
            data: self.finish(SyntaxKind::Field, pos),
            names: &[],
            type_expr: ty,
            tag: None,
        };
        let list = FieldList {
            data: self.finish(SyntaxKind::FieldList, pos),
            fields: alloc_vec_in(self.arena, vec![field]),
        };
        Some(self.alloc(list))
    }

    /// `(a, b int, c ...string)` or `(int, error)`.
    fn parse_parameters(&mut self) -> FieldList<'a> {
        let pos = self.expect_token(SyntaxKind::OpenParenToken);
        let mut entries = Vec::new();
        while self.token() != SyntaxKind::CloseParenToken
            && self.token() != SyntaxKind::EndOfFileToken
        {
            let start = self.token_pos();
            if self.token() == SyntaxKind::Identifier {
                let id = self.parse_identifier();
                match self.token() {
                    SyntaxKind::CommaToken | SyntaxKind::CloseParenToken => {
                        entries.push(ParamEntry::Ambiguous(id))
                    }
                    SyntaxKind::DotToken => {
                        let ty = self.parse_qualified_rest(id);
                        entries.push(ParamEntry::Type(self.alloc(ty)));
                    }
                    _ => {
                        let ty = self.parse_variadic_or_type();
                        entries.push(ParamEntry::Named(id, self.alloc(ty)));
                    }
                }
            } else {
                let ty = self.parse_variadic_or_type();
                entries.push(ParamEntry::Type(self.alloc(ty)));
            }
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
            if self.token_pos() == start {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseParenToken);

        let fields = self.group_parameters(entries);
        FieldList {
            data: self.finish(SyntaxKind::FieldList, pos),
            fields: alloc_vec_in(self.arena, fields),
        }
    }

    /// Attach pending names to the type that follows them.
    fn group_parameters(&mut self, entries: Vec<ParamEntry<'a>>) -> Vec<Field<'a>> {
        let named = entries.iter().any(|e| matches!(e, ParamEntry::Named(..)));
        let mut fields = Vec::new();

        if !named {
            for entry in entries {
                let ty: &'a Expression<'a> = match entry {
                    ParamEntry::Ambiguous(id) => self.alloc(Expression::Identifier(id)),
                    ParamEntry::Type(ty) | ParamEntry::Named(_, ty) => ty,
                };
                let range = ty.range();
                fields.push(Field {
                    data: self.finish_range(SyntaxKind::Field, range.pos, range.end),
                    names: &[],
                    type_expr: ty,
                    tag: None,
                });
            }
            return fields;
        }

        let mut pending: Vec<Identifier> = Vec::new();
        for entry in entries {
            match entry {
                ParamEntry::Ambiguous(id) => pending.push(id),
                ParamEntry::Named(id, ty) => {
                    pending.push(id);
                    let pos = pending[0].pos();
                    fields.push(Field {
                        data: self.finish_range(SyntaxKind::Field, pos, ty.range().end),
                        names: alloc_vec_in(self.arena, std::mem::take(&mut pending)),
                        type_expr: ty,
                        tag: None,
                    });
                }
                ParamEntry::Type(ty) => {
                    let range = ty.range();
                    self.error_at(range.pos, range.end, &messages::MIXED_NAMED_AND_UNNAMED_PARAMETERS, &[]);
                    fields.push(Field {
                        data: self.finish_range(SyntaxKind::Field, range.pos, range.end),
                        names: &[],
                        type_expr: ty,
                        tag: None,
                    });
                }
            }
        }
        if let Some(first) = pending.first() {
            let pos = first.pos();
            self.error_at(pos, pos, &messages::MIXED_NAMED_AND_UNNAMED_PARAMETERS, &[]);
            for id in pending {
                let range = id.data.range;
                let ty = self.alloc(Expression::Identifier(id));
                fields.push(Field {
                    data: self.finish_range(SyntaxKind::Field, range.pos, range.end),
                    names: &[],
                    type_expr: ty,
                    tag: None,
                });
            }
        }
        fields
    }

    fn parse_variadic_or_type(&mut self) -> Expression<'a> {
        if self.token() == SyntaxKind::DotDotDotToken {
            let pos = self.token_pos();
            self.next_token();
            let element = self.parse_type();
            let element = self.alloc(element);
            Expression::Ellipsis(EllipsisExpression {
                data: self.finish(SyntaxKind::EllipsisExpression, pos),
                element: Some(element),
            })
        } else {
            self.parse_type()
        }
    }

    // ========================================================================
    // Types
    // ========================================================================

    fn parse_type(&mut self) -> Expression<'a> {
        if !self.enter() {
            let pos = self.token_pos();
            return Expression::Bad(self.finish_range(SyntaxKind::BadExpression, pos, pos));
        }
        let pos = self.token_pos();
        let result = match self.token() {
            SyntaxKind::Identifier => self.parse_type_name(),
            SyntaxKind::OpenBracketToken => self.parse_array_type(),
            SyntaxKind::StructKeyword => self.parse_struct_type(),
            SyntaxKind::AsteriskToken => {
                self.next_token();
                let inner = self.parse_type();
                let inner = self.alloc(inner);
                Expression::Star(StarExpression {
                    data: self.finish(SyntaxKind::StarExpression, pos),
                    expression: inner,
                })
            }
            SyntaxKind::FuncKeyword => {
                self.next_token();
                Expression::FunctionType(self.parse_signature(pos))
            }
            SyntaxKind::InterfaceKeyword => self.parse_interface_type(),
            SyntaxKind::MapKeyword => self.parse_map_type(),
            SyntaxKind::ChanKeyword | SyntaxKind::LessThanMinusToken => self.parse_chan_type(),
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let inner = self.parse_type();
                let inner = self.alloc(inner);
                self.expect_token(SyntaxKind::CloseParenToken);
                Expression::Parenthesized(ParenthesizedExpression {
                    data: self.finish(SyntaxKind::ParenthesizedExpression, pos),
                    expression: inner,
                })
            }
            _ => {
                let found = self.found();
                self.error(&messages::EXPECTED_TYPE, &[found.as_str()]);
                Expression::Bad(self.finish_range(SyntaxKind::BadExpression, pos, pos))
            }
        };
        self.leave();
        result
    }

    /// `T` or `pkg.T`.
    fn parse_type_name(&mut self) -> Expression<'a> {
        let id = self.parse_identifier();
        let ty = if self.token() == SyntaxKind::DotToken {
            self.parse_qualified_rest(id)
        } else {
            Expression::Identifier(id)
        };
        if self.token() == SyntaxKind::OpenBracketToken {
            self.skip_type_parameters();
        }
        ty
    }

    /// The `.T` after a package name in a qualified type.
    fn parse_qualified_rest(&mut self, package: Identifier) -> Expression<'a> {
        let pos = package.pos();
        self.next_token(); // '.'
        let name = self.parse_identifier();
        let package = self.alloc(Expression::Identifier(package));
        Expression::Selector(SelectorExpression {
            data: self.finish(SyntaxKind::SelectorExpression, pos),
            expression: package,
            name,
        })
    }

    fn parse_array_type(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        self.next_token(); // '['
        let length = match self.token() {
            SyntaxKind::CloseBracketToken => None,
            SyntaxKind::DotDotDotToken => {
                let dots = self.token_pos();
                self.next_token();
                let data = self.finish(SyntaxKind::EllipsisExpression, dots);
                Some(self.alloc(Expression::Ellipsis(EllipsisExpression { data, element: None })))
            }
            _ => {
                self.expr_level += 1;
                let len = self.parse_expression();
                self.expr_level -= 1;
                Some(self.alloc(len))
            }
        };
        self.expect_token(SyntaxKind::CloseBracketToken);
        let element = self.parse_type();
        let element = self.alloc(element);
        Expression::ArrayType(ArrayTypeNode {
            data: self.finish(SyntaxKind::ArrayType, pos),
            length,
            element,
        })
    }

    fn parse_struct_type(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        self.next_token(); // 'struct'
        let list_pos = self.expect_token(SyntaxKind::OpenBraceToken);
        let mut fields = Vec::new();
        while self.token() != SyntaxKind::CloseBraceToken
            && self.token() != SyntaxKind::EndOfFileToken
        {
            let start = self.token_pos();
            fields.push(self.parse_struct_field());
            self.expect_semicolon();
            if self.token_pos() == start {
                self.next_token();
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken);
        let list = FieldList {
            data: self.finish(SyntaxKind::FieldList, list_pos),
            fields: alloc_vec_in(self.arena, fields),
        };
        Expression::StructType(StructTypeNode {
            data: self.finish(SyntaxKind::StructType, pos),
            fields: self.alloc(list),
        })
    }

    fn parse_struct_field(&mut self) -> Field<'a> {
        let pos = self.token_pos();
        let (names, type_expr) = match self.token() {
            SyntaxKind::AsteriskToken => (Vec::new(), self.parse_type()),
            SyntaxKind::Identifier => {
                let id = self.parse_identifier();
                match self.token() {
                    SyntaxKind::DotToken => (Vec::new(), self.parse_qualified_rest(id)),
                    SyntaxKind::SemicolonToken
                    | SyntaxKind::CloseBraceToken
                    | SyntaxKind::StringLiteral => (Vec::new(), Expression::Identifier(id)),
                    _ => {
                        let mut names = vec![id];
                        while self.optional_token(SyntaxKind::CommaToken) {
                            names.push(self.parse_identifier());
                        }
                        (names, self.parse_type())
                    }
                }
            }
            _ => {
                self.error_expected("field name or embedded type");
                let bad = self.finish_range(SyntaxKind::BadExpression, pos, pos);
                (Vec::new(), Expression::Bad(bad))
            }
        };
        let tag = if self.token() == SyntaxKind::StringLiteral {
            Some(self.parse_basic_literal())
        } else {
            None
        };
        let type_expr = self.alloc(type_expr);
        Field {
            data: self.finish(SyntaxKind::Field, pos),
            names: alloc_vec_in(self.arena, names),
            type_expr,
            tag,
        }
    }

    fn parse_interface_type(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        self.next_token(); // 'interface'
        let list_pos = self.expect_token(SyntaxKind::OpenBraceToken);
        let mut methods = Vec::new();
        while self.token() != SyntaxKind::CloseBraceToken
            && self.token() != SyntaxKind::EndOfFileToken
        {
            let start = self.token_pos();
            if self.token() == SyntaxKind::Identifier {
                let id = self.parse_identifier();
                let field = match self.token() {
                    SyntaxKind::OpenParenToken => {
                        let signature = self.parse_signature(start);
                        let ty = self.alloc(Expression::FunctionType(signature));
                        Field {
                            data: self.finish(SyntaxKind::Field, start),
                            names: alloc_vec_in(self.arena, vec![id]),
                            type_expr: ty,
                            tag: None,
                        }
                    }
                    SyntaxKind::DotToken => {
                        let ty = self.parse_qualified_rest(id);
                        let ty = self.alloc(ty);
                        Field {
                            data: self.finish(SyntaxKind::Field, start),
                            names: &[],
                            type_expr: ty,
                            tag: None,
                        }
                    }
                    _ => {
                        let ty = self.alloc(Expression::Identifier(id));
                        Field {
                            data: self.finish(SyntaxKind::Field, start),
                            names: &[],
                            type_expr: ty,
                            tag: None,
                        }
                    }
                };
                methods.push(field);
            } else {
                self.error_expected("method or embedded interface");
            }
            self.expect_semicolon();
            if self.token_pos() == start {
                self.next_token();
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken);
        let list = FieldList {
            data: self.finish(SyntaxKind::FieldList, list_pos),
            fields: alloc_vec_in(self.arena, methods),
        };
        Expression::InterfaceType(InterfaceTypeNode {
            data: self.finish(SyntaxKind::InterfaceType, pos),
            methods: self.alloc(list),
        })
    }

    fn parse_map_type(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        self.next_token(); // 'map'
        self.expect_token(SyntaxKind::OpenBracketToken);
        let key = self.parse_type();
        let key = self.alloc(key);
        self.expect_token(SyntaxKind::CloseBracketToken);
        let value = self.parse_type();
        let value = self.alloc(value);
        Expression::MapType(MapTypeNode {
            data: self.finish(SyntaxKind::MapType, pos),
            key,
            value,
        })
    }

    /// `chan T`, `chan<- T` or `<-chan T`.
    fn parse_chan_type(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        let direction = if self.optional_token(SyntaxKind::LessThanMinusToken) {
            self.expect_token(SyntaxKind::ChanKeyword);
            ChanDir::RECV
        } else {
            self.next_token(); // 'chan'
            if self.optional_token(SyntaxKind::LessThanMinusToken) {
                ChanDir::SEND
            } else {
                ChanDir::BOTH
            }
        };
        let element = self.parse_type();
        let element = self.alloc(element);
        Expression::ChanType(ChanTypeNode {
            data: self.finish(SyntaxKind::ChanType, pos),
            direction,
            element,
        })
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_expression(&mut self) -> Expression<'a> {
        self.parse_binary_expression(OperatorPrecedence::Lowest)
    }

    fn parse_expression_list(&mut self) -> Vec<Expression<'a>> {
        let mut list = vec![self.parse_expression()];
        while self.optional_token(SyntaxKind::CommaToken) {
            list.push(self.parse_expression());
        }
        list
    }

    fn parse_binary_expression(&mut self, min_precedence: OperatorPrecedence) -> Expression<'a> {
        let mut left = self.parse_unary_expression();
        loop {
            let operator = self.token();
            let precedence = binary_operator_precedence(operator);
            if precedence <= min_precedence {
                break;
            }
            self.next_token();
            let right = self.parse_binary_expression(precedence);
            let pos = left.range().pos;
            let left_ref = self.alloc(left);
            let right_ref = self.alloc(right);
            left = Expression::Binary(BinaryExpression {
                data: self.finish(SyntaxKind::BinaryExpression, pos),
                left: left_ref,
                operator,
                right: right_ref,
            });
        }
        left
    }

    fn parse_unary_expression(&mut self) -> Expression<'a> {
        if !self.enter() {
            let pos = self.token_pos();
            return Expression::Bad(self.finish_range(SyntaxKind::BadExpression, pos, pos));
        }
        let pos = self.token_pos();
        let result = match self.token() {
            SyntaxKind::PlusToken
            | SyntaxKind::MinusToken
            | SyntaxKind::ExclamationToken
            | SyntaxKind::CaretToken
            | SyntaxKind::AmpersandToken
            | SyntaxKind::TildeToken => {
                let operator = self.token();
                self.next_token();
                let operand = self.parse_unary_expression();
                let operand = self.alloc(operand);
                Expression::Unary(UnaryExpression {
                    data: self.finish(SyntaxKind::UnaryExpression, pos),
                    operator,
                    operand,
                })
            }
            SyntaxKind::AsteriskToken => {
                self.next_token();
                let operand = self.parse_unary_expression();
                let operand = self.alloc(operand);
                Expression::Star(StarExpression {
                    data: self.finish(SyntaxKind::StarExpression, pos),
                    expression: operand,
                })
            }
            SyntaxKind::LessThanMinusToken => {
                let is_chan_type = self
                    .scanner
                    .look_ahead(|s| s.scan() == SyntaxKind::ChanKeyword);
                if is_chan_type {
                    let ty = self.parse_chan_type();
                    self.parse_primary_suffixes(ty)
                } else {
                    self.next_token();
                    let operand = self.parse_unary_expression();
                    let operand = self.alloc(operand);
                    Expression::Unary(UnaryExpression {
                        data: self.finish(SyntaxKind::UnaryExpression, pos),
                        operator: SyntaxKind::LessThanMinusToken,
                        operand,
                    })
                }
            }
            _ => self.parse_primary_expression(),
        };
        self.leave();
        result
    }

    fn parse_primary_expression(&mut self) -> Expression<'a> {
        let operand = self.parse_operand();
        self.parse_primary_suffixes(operand)
    }

    fn parse_basic_literal(&mut self) -> BasicLiteral {
        let pos = self.token_pos();
        let kind = self.token();
        let value = self.interner.intern(self.scanner.token_text());
        self.next_token();
        BasicLiteral {
            data: self.finish(SyntaxKind::BasicLiteral, pos),
            kind,
            value,
        }
    }

    fn parse_operand(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        match self.token() {
            SyntaxKind::Identifier => Expression::Identifier(self.parse_identifier()),
            kind if kind.is_literal() => Expression::BasicLiteral(self.parse_basic_literal()),
            SyntaxKind::OpenParenToken => {
                self.next_token();
                self.expr_level += 1;
                let inner = self.parse_expression();
                self.expr_level -= 1;
                let inner = self.alloc(inner);
                self.expect_token(SyntaxKind::CloseParenToken);
                Expression::Parenthesized(ParenthesizedExpression {
                    data: self.finish(SyntaxKind::ParenthesizedExpression, pos),
                    expression: inner,
                })
            }
            SyntaxKind::FuncKeyword => self.parse_function_type_or_literal(),
            SyntaxKind::OpenBracketToken
            | SyntaxKind::StructKeyword
            | SyntaxKind::MapKeyword
            | SyntaxKind::ChanKeyword
            | SyntaxKind::InterfaceKeyword => self.parse_type(),
            _ => {
                let found = self.found();
                self.error(&messages::EXPECTED_OPERAND, &[found.as_str()]);
                Expression::Bad(self.finish_range(SyntaxKind::BadExpression, pos, pos))
            }
        }
    }

    fn parse_function_type_or_literal(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        self.next_token(); // 'func'
        let signature = self.parse_signature(pos);
        if self.token() != SyntaxKind::OpenBraceToken {
            return Expression::FunctionType(signature);
        }
        self.expr_level += 1;
        let body = self.parse_block();
        self.expr_level -= 1;
        let body = self.alloc(body);
        Expression::FunctionLiteral(FunctionLiteral {
            data: self.finish(SyntaxKind::FunctionLiteral, pos),
            signature,
            body,
        })
    }

    fn parse_primary_suffixes(&mut self, mut x: Expression<'a>) -> Expression<'a> {
        loop {
            let pos = x.range().pos;
            match self.token() {
                SyntaxKind::DotToken => {
                    self.next_token();
                    match self.token() {
                        SyntaxKind::Identifier => {
                            let name = self.parse_identifier();
                            let target = self.alloc(x);
                            x = Expression::Selector(SelectorExpression {
                                data: self.finish(SyntaxKind::SelectorExpression, pos),
                                expression: target,
                                name,
                            });
                        }
                        SyntaxKind::OpenParenToken => {
                            self.next_token();
                            let type_expr = if self.optional_token(SyntaxKind::TypeKeyword) {
                                None
                            } else {
                                let ty = self.parse_type();
                                Some(self.alloc(ty))
                            };
                            self.expect_token(SyntaxKind::CloseParenToken);
                            let target = self.alloc(x);
                            x = Expression::TypeAssert(TypeAssertExpression {
                                data: self.finish(SyntaxKind::TypeAssertExpression, pos),
                                expression: target,
                                type_expr,
                            });
                        }
                        _ => {
                            let found = self.found();
                            self.error(&messages::EXPECTED_SELECTOR_OR_TYPE_ASSERTION, &[found.as_str()]);
                            return x;
                        }
                    }
                }
                SyntaxKind::OpenBracketToken => x = self.parse_index_or_slice(x),
                SyntaxKind::OpenParenToken => x = self.parse_call(x),
                SyntaxKind::OpenBraceToken => {
                    if is_literal_type(&x) && (self.expr_level >= 0 || !is_type_name(&x)) {
                        let ty = self.alloc(x);
                        x = self.parse_composite_literal(Some(ty), pos);
                    } else {
                        return x;
                    }
                }
                _ => return x,
            }
        }
    }

    fn parse_index_or_slice(&mut self, x: Expression<'a>) -> Expression<'a> {
        let pos = x.range().pos;
        self.next_token(); // '['
        self.expr_level += 1;
        let mut index: [Option<&'a Expression<'a>>; 3] = [None, None, None];
        let mut colons = 0;
        if self.token() != SyntaxKind::ColonToken {
            let e = self.parse_expression();
            index[0] = Some(self.alloc(e));
        }
        while self.token() == SyntaxKind::ColonToken && colons < 2 {
            colons += 1;
            self.next_token();
            if self.token() != SyntaxKind::ColonToken && self.token() != SyntaxKind::CloseBracketToken {
                let e = self.parse_expression();
                index[colons] = Some(self.alloc(e));
            }
        }
        self.expr_level -= 1;
        self.expect_token(SyntaxKind::CloseBracketToken);
        let target = self.alloc(x);

        if colons > 0 {
            return Expression::Slice(SliceExpression {
                data: self.finish(SyntaxKind::SliceExpression, pos),
                expression: target,
                low: index[0],
                high: index[1],
                max: index[2],
            });
        }
        let index = match index[0] {
            Some(e) => e,
            None => {
                let end = self.prev_token_end;
                let bad = self.finish_range(SyntaxKind::BadExpression, end, end);
                self.alloc(Expression::Bad(bad))
            }
        };
        Expression::Index(IndexExpression {
            data: self.finish(SyntaxKind::IndexExpression, pos),
            expression: target,
            index,
        })
    }

    fn parse_call(&mut self, function: Expression<'a>) -> Expression<'a> {
        let pos = function.range().pos;
        self.next_token(); // '('
        self.expr_level += 1;
        let mut arguments = Vec::new();
        let mut has_ellipsis = false;
        while self.token() != SyntaxKind::CloseParenToken
            && self.token() != SyntaxKind::EndOfFileToken
        {
            arguments.push(self.parse_expression());
            if self.optional_token(SyntaxKind::DotDotDotToken) {
                has_ellipsis = true;
            }
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expr_level -= 1;
        self.expect_token(SyntaxKind::CloseParenToken);
        let function = self.alloc(function);
        Expression::Call(CallExpression {
            data: self.finish(SyntaxKind::CallExpression, pos),
            function,
            arguments: alloc_vec_in(self.arena, arguments),
            has_ellipsis,
        })
    }

    /// `{ elements }`, after an optional literal type.
    fn parse_composite_literal(
        &mut self,
        type_expr: Option<&'a Expression<'a>>,
        pos: u32,
    ) -> Expression<'a> {
        self.expect_token(SyntaxKind::OpenBraceToken);
        self.expr_level += 1;
        let mut elements = Vec::new();
        while self.token() != SyntaxKind::CloseBraceToken
            && self.token() != SyntaxKind::EndOfFileToken
        {
            let start = self.token_pos();
            let element = self.parse_element();
            let element = if self.optional_token(SyntaxKind::ColonToken) {
                let value = self.parse_element();
                let key = self.alloc(element);
                let value = self.alloc(value);
                Expression::KeyValue(KeyValueExpression {
                    data: self.finish(SyntaxKind::KeyValueExpression, start),
                    key,
                    value,
                })
            } else {
                element
            };
            elements.push(element);
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expr_level -= 1;
        self.expect_token(SyntaxKind::CloseBraceToken);
        Expression::CompositeLiteral(CompositeLiteral {
            data: self.finish(SyntaxKind::CompositeLiteral, pos),
            type_expr,
            elements: alloc_vec_in(self.arena, elements),
        })
    }

    fn parse_element(&mut self) -> Expression<'a> {
        if self.token() == SyntaxKind::OpenBraceToken {
            let pos = self.token_pos();
            self.parse_composite_literal(None, pos)
        } else {
            self.parse_expression()
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_block(&mut self) -> BlockStatement<'a> {
        let pos = self.expect_token(SyntaxKind::OpenBraceToken);
        let statements = self.parse_statement_list();
        self.expect_token(SyntaxKind::CloseBraceToken);
        BlockStatement {
            data: self.finish(SyntaxKind::BlockStatement, pos),
            statements,
        }
    }

    fn parse_statement_list(&mut self) -> &'a [Statement<'a>] {
        let mut statements = Vec::new();
        while !matches!(
            self.token(),
            SyntaxKind::CaseKeyword
                | SyntaxKind::DefaultKeyword
                | SyntaxKind::CloseBraceToken
                | SyntaxKind::EndOfFileToken
        ) {
            let start = self.token_pos();
            let statement = self.parse_statement();
            let terminated = matches!(statement, Statement::Labeled(_) | Statement::Empty(_));
            statements.push(statement);
            if !terminated {
                self.expect_semicolon();
            }
            // Error recovery: never spin on a token no production accepts.
            if self.token_pos() == start && self.token() != SyntaxKind::EndOfFileToken {
                self.next_token();
            }
        }
        alloc_vec_in(self.arena, statements)
    }

    fn parse_statement(&mut self) -> Statement<'a> {
        if !self.enter() {
            let pos = self.token_pos();
            return Statement::Bad(self.finish_range(SyntaxKind::BadStatement, pos, pos));
        }
        let pos = self.token_pos();
        let result = match self.token() {
            SyntaxKind::VarKeyword | SyntaxKind::ConstKeyword | SyntaxKind::TypeKeyword => {
                let decl = self.parse_gen_declaration();
                Statement::Declaration(self.alloc(decl))
            }
            SyntaxKind::GoKeyword | SyntaxKind::DeferKeyword => {
                let keyword = self.token();
                self.next_token();
                let call = self.parse_expression();
                let call = self.alloc(call);
                if keyword == SyntaxKind::GoKeyword {
                    Statement::Go(GoStatement {
                        data: self.finish(SyntaxKind::GoStatement, pos),
                        call,
                    })
                } else {
                    Statement::Defer(DeferStatement {
                        data: self.finish(SyntaxKind::DeferStatement, pos),
                        call,
                    })
                }
            }
            SyntaxKind::ReturnKeyword => {
                self.next_token();
                let results = match self.token() {
                    SyntaxKind::SemicolonToken | SyntaxKind::CloseBraceToken => Vec::new(),
                    _ => self.parse_expression_list(),
                };
                Statement::Return(ReturnStatement {
                    data: self.finish(SyntaxKind::ReturnStatement, pos),
                    results: alloc_vec_in(self.arena, results),
                })
            }
            SyntaxKind::BreakKeyword
            | SyntaxKind::ContinueKeyword
            | SyntaxKind::GotoKeyword
            | SyntaxKind::FallthroughKeyword => {
                let keyword = self.token();
                self.next_token();
                let label = if keyword != SyntaxKind::FallthroughKeyword
                    && self.token() == SyntaxKind::Identifier
                {
                    Some(self.parse_identifier())
                } else {
                    None
                };
                Statement::Branch(BranchStatement {
                    data: self.finish(SyntaxKind::BranchStatement, pos),
                    keyword,
                    label,
                })
            }
            SyntaxKind::OpenBraceToken => Statement::Block(self.parse_block()),
            SyntaxKind::IfKeyword => Statement::If(self.parse_if_statement()),
            SyntaxKind::SwitchKeyword => self.parse_switch_statement(),
            SyntaxKind::SelectKeyword => self.parse_select_statement(),
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::SemicolonToken => {
                self.next_token();
                Statement::Empty(self.finish(SyntaxKind::EmptyStatement, pos))
            }
            SyntaxKind::Identifier
            | SyntaxKind::IntLiteral
            | SyntaxKind::FloatLiteral
            | SyntaxKind::ImaginaryLiteral
            | SyntaxKind::RuneLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::FuncKeyword
            | SyntaxKind::OpenParenToken
            | SyntaxKind::OpenBracketToken
            | SyntaxKind::StructKeyword
            | SyntaxKind::MapKeyword
            | SyntaxKind::ChanKeyword
            | SyntaxKind::InterfaceKeyword
            | SyntaxKind::PlusToken
            | SyntaxKind::MinusToken
            | SyntaxKind::AsteriskToken
            | SyntaxKind::AmpersandToken
            | SyntaxKind::CaretToken
            | SyntaxKind::ExclamationToken
            | SyntaxKind::LessThanMinusToken => self.parse_simple_statement_only(SimpleMode::LabelOk),
            _ => {
                let found = self.found();
                self.error(&messages::EXPECTED_STATEMENT, &[found.as_str()]);
                Statement::Bad(self.finish_range(SyntaxKind::BadStatement, pos, pos))
            }
        };
        self.leave();
        result
    }

    fn parse_simple_statement_only(&mut self, mode: SimpleMode) -> Statement<'a> {
        match self.parse_simple_statement(mode) {
            Simple::Statement(s) => s,
            // Only RangeOk produces a range header.
            Simple::Range { range_expression, .. } => {
                let range = range_expression.range();
                Statement::Bad(self.finish_range(SyntaxKind::BadStatement, range.pos, range.end))
            }
        }
    }

    fn parse_simple_statement(&mut self, mode: SimpleMode) -> Simple<'a> {
        let pos = self.token_pos();

        if mode == SimpleMode::RangeOk && self.token() == SyntaxKind::RangeKeyword {
            self.next_token();
            let e = self.parse_expression();
            return Simple::Range {
                key: None,
                value: None,
                is_define: false,
                range_expression: self.alloc(e),
            };
        }

        let lhs = self.parse_expression_list();
        let operator = self.token();
        match operator {
            kind if kind.is_assignment_operator() => {
                let operator_pos = self.token_pos();
                self.next_token();
                let is_define = operator == SyntaxKind::ColonEqualsToken;

                if mode == SimpleMode::RangeOk
                    && self.token() == SyntaxKind::RangeKeyword
                    && (is_define || operator == SyntaxKind::EqualsToken)
                {
                    self.next_token();
                    let e = self.parse_expression();
                    if lhs.len() > 2 {
                        let range = lhs[2].range();
                        self.error_at(range.pos, range.end, &messages::INVALID_RANGE_CLAUSE, &[]);
                    }
                    if is_define {
                        self.check_define_targets(&lhs);
                    }
                    let mut vars = lhs.into_iter();
                    let key = vars.next().map(|k| self.alloc(k));
                    let value = vars.next().map(|v| self.alloc(v));
                    return Simple::Range {
                        key,
                        value,
                        is_define,
                        range_expression: self.alloc(e),
                    };
                }

                let rhs = self.parse_expression_list();
                if is_define {
                    self.check_define_targets(&lhs);
                }
                Simple::Statement(Statement::Assign(AssignStatement {
                    data: self.finish(SyntaxKind::AssignStatement, pos),
                    lhs: alloc_vec_in(self.arena, lhs),
                    operator,
                    operator_pos,
                    rhs: alloc_vec_in(self.arena, rhs),
                }))
            }
            SyntaxKind::ColonToken
                if mode == SimpleMode::LabelOk
                    && lhs.len() == 1
                    && lhs[0].as_identifier().is_some() =>
            {
                let label = match lhs[0].as_identifier() {
                    Some(id) => *id,
                    None => self.missing_identifier(),
                };
                self.next_token(); // ':'
                let statement = if self.token() == SyntaxKind::CloseBraceToken {
                    let here = self.prev_token_end;
                    Statement::Empty(self.finish_range(SyntaxKind::EmptyStatement, here, here))
                } else {
                    let s = self.parse_statement();
                    if !matches!(s, Statement::Labeled(_) | Statement::Empty(_)) {
                        self.expect_semicolon();
                    }
                    s
                };
                let statement = self.alloc(statement);
                Simple::Statement(Statement::Labeled(LabeledStatement {
                    data: self.finish(SyntaxKind::LabeledStatement, pos),
                    label,
                    statement,
                }))
            }
            SyntaxKind::LessThanMinusToken => {
                self.next_token();
                let value = self.parse_expression();
                let value = self.alloc(value);
                let channel = self.first_of(lhs);
                Simple::Statement(Statement::Send(SendStatement {
                    data: self.finish(SyntaxKind::SendStatement, pos),
                    channel,
                    value,
                }))
            }
            SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken => {
                self.next_token();
                let expression = self.first_of(lhs);
                Simple::Statement(Statement::IncDec(IncDecStatement {
                    data: self.finish(SyntaxKind::IncDecStatement, pos),
                    expression,
                    operator,
                }))
            }
            _ => {
                if lhs.len() > 1 {
                    self.error_expected("':=' or '=' or ','");
                }
                let expression = self.first_of(lhs);
                Simple::Statement(Statement::Expression(ExpressionStatement {
                    data: self.finish(SyntaxKind::ExpressionStatement, pos),
                    expression,
                }))
            }
        }
    }

    /// The first expression of a non-empty list, allocated.
    fn first_of(&mut self, list: Vec<Expression<'a>>) -> &'a Expression<'a> {
        match list.into_iter().next() {
            Some(e) => self.alloc(e),
            None => {
                let pos = self.token_pos();
                let bad = self.finish_range(SyntaxKind::BadExpression, pos, pos);
                self.alloc(Expression::Bad(bad))
            }
        }
    }

    /// Every target of `:=` must be a plain name.
    fn check_define_targets(&mut self, lhs: &[Expression<'a>]) {
        for target in lhs {
            if target.as_identifier().is_none() {
                let range = target.range();
                let text = self.source_text[range.pos as usize..range.end as usize].to_string();
                self.error_at(range.pos, range.end, &messages::NON_NAME_ON_LEFT_SIDE_OF_DEFINE, &[text.as_str()]);
            }
        }
    }

    /// The expression of an expression statement used as a condition.
    fn statement_to_condition(&mut self, statement: Option<Statement<'a>>, pos: u32) -> &'a Expression<'a> {
        match statement {
            Some(Statement::Expression(e)) => e.expression,
            Some(other) => {
                let range = other.range();
                self.error_at(range.pos, range.end, &messages::EXPECTED_EXPRESSION_IN_CONDITION, &[]);
                let bad = self.finish_range(SyntaxKind::BadExpression, range.pos, range.end);
                self.alloc(Expression::Bad(bad))
            }
            None => {
                self.error(&messages::EXPECTED_EXPRESSION_IN_CONDITION, &[]);
                let bad = self.finish_range(SyntaxKind::BadExpression, pos, pos);
                self.alloc(Expression::Bad(bad))
            }
        }
    }

    fn parse_if_statement(&mut self) -> IfStatement<'a> {
        let pos = self.token_pos();
        self.next_token(); // 'if'

        let outer = self.expr_level;
        self.expr_level = -1;
        let mut init = None;
        let mut condition = None;
        if self.token() != SyntaxKind::OpenBraceToken {
            let first = if self.token() != SyntaxKind::SemicolonToken {
                Some(self.parse_simple_statement_only(SimpleMode::Basic))
            } else {
                None
            };
            if self.optional_token(SyntaxKind::SemicolonToken) {
                init = first.map(|s| self.alloc(s));
                if self.token() != SyntaxKind::OpenBraceToken {
                    condition = Some(self.parse_simple_statement_only(SimpleMode::Basic));
                }
            } else {
                condition = first;
            }
        }
        self.expr_level = outer;
        let condition = self.statement_to_condition(condition, pos);

        let then_block = self.parse_block();
        let then_block = self.alloc(then_block);
        let else_statement = if self.optional_token(SyntaxKind::ElseKeyword) {
            match self.token() {
                SyntaxKind::IfKeyword => {
                    let nested = self.parse_if_statement();
                    Some(self.alloc(Statement::If(nested)))
                }
                SyntaxKind::OpenBraceToken => {
                    let block = self.parse_block();
                    Some(self.alloc(Statement::Block(block)))
                }
                _ => {
                    self.error_expected("if statement or block");
                    None
                }
            }
        } else {
            None
        };

        IfStatement {
            data: self.finish(SyntaxKind::IfStatement, pos),
            init,
            condition,
            then_block,
            else_statement,
        }
    }

    /// Parse the `init; tag` header shared by switch statements. Returns
    /// `(init, tag)`.
    fn parse_switch_header(&mut self) -> (Option<Statement<'a>>, Option<Statement<'a>>) {
        let outer = self.expr_level;
        self.expr_level = -1;
        let mut init = None;
        let mut tag = None;
        if self.token() != SyntaxKind::OpenBraceToken {
            if self.token() != SyntaxKind::SemicolonToken {
                tag = Some(self.parse_simple_statement_only(SimpleMode::Basic));
            }
            if self.optional_token(SyntaxKind::SemicolonToken) {
                init = tag.take();
                if self.token() != SyntaxKind::OpenBraceToken {
                    tag = Some(self.parse_simple_statement_only(SimpleMode::Basic));
                }
            }
        }
        self.expr_level = outer;
        (init, tag)
    }

    fn parse_switch_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.next_token(); // 'switch'
        let (init, tag) = self.parse_switch_header();
        let init = init.map(|s| self.alloc(s));

        // `switch x := y.(type)` or `switch y.(type)`
        let type_switch: Option<(Option<Identifier>, &'a Expression<'a>)> = match &tag {
            Some(Statement::Assign(assign))
                if assign.is_define() && assign.lhs.len() == 1 && assign.rhs.len() == 1 =>
            {
                let lhs: &'a [Expression<'a>] = assign.lhs;
                let rhs: &'a [Expression<'a>] = assign.rhs;
                match &rhs[0] {
                    Expression::TypeAssert(ta) if ta.type_expr.is_none() => {
                        Some((lhs[0].as_identifier().copied(), ta.expression))
                    }
                    _ => None,
                }
            }
            Some(Statement::Expression(stmt)) => {
                let expression: &'a Expression<'a> = stmt.expression;
                match expression {
                    Expression::TypeAssert(ta) if ta.type_expr.is_none() => Some((None, ta.expression)),
                    _ => None,
                }
            }
            _ => None,
        };

        self.expect_token(SyntaxKind::OpenBraceToken);
        let mut clauses = Vec::new();
        while matches!(self.token(), SyntaxKind::CaseKeyword | SyntaxKind::DefaultKeyword) {
            clauses.push(self.parse_case_clause());
        }
        self.expect_token(SyntaxKind::CloseBraceToken);
        let clauses = alloc_vec_in(self.arena, clauses);

        if let Some((binding, subject)) = type_switch {
            return Statement::TypeSwitch(TypeSwitchStatement {
                data: self.finish(SyntaxKind::TypeSwitchStatement, pos),
                init,
                binding,
                subject,
                clauses,
            });
        }
        let tag = match tag {
            None => None,
            Some(statement) => Some(self.statement_to_condition(Some(statement), pos)),
        };
        Statement::Switch(SwitchStatement {
            data: self.finish(SyntaxKind::SwitchStatement, pos),
            init,
            tag,
            clauses,
        })
    }

    fn parse_case_clause(&mut self) -> CaseClause<'a> {
        let pos = self.token_pos();
        let expressions = if self.optional_token(SyntaxKind::CaseKeyword) {
            let list = self.parse_expression_list();
            Some(alloc_vec_in(self.arena, list))
        } else {
            self.next_token(); // 'default'
            None
        };
        self.expect_token(SyntaxKind::ColonToken);
        let body = self.parse_statement_list();
        CaseClause {
            data: self.finish(SyntaxKind::CaseClause, pos),
            expressions,
            body,
        }
    }

    fn parse_select_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.next_token(); // 'select'
        self.expect_token(SyntaxKind::OpenBraceToken);
        let mut clauses = Vec::new();
        while matches!(self.token(), SyntaxKind::CaseKeyword | SyntaxKind::DefaultKeyword) {
            let clause_pos = self.token_pos();
            let comm = if self.optional_token(SyntaxKind::CaseKeyword) {
                let s = self.parse_simple_statement_only(SimpleMode::Basic);
                Some(self.alloc(s))
            } else {
                self.next_token(); // 'default'
                None
            };
            self.expect_token(SyntaxKind::ColonToken);
            let body = self.parse_statement_list();
            clauses.push(CommClause {
                data: self.finish(SyntaxKind::CommClause, clause_pos),
                comm,
                body,
            });
        }
        self.expect_token(SyntaxKind::CloseBraceToken);
        Statement::Select(SelectStatement {
            data: self.finish(SyntaxKind::SelectStatement, pos),
            clauses: alloc_vec_in(self.arena, clauses),
        })
    }

    fn parse_for_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.next_token(); // 'for'

        let outer = self.expr_level;
        self.expr_level = -1;
        let mut init = None;
        let mut condition = None;
        let mut post = None;
        let mut range = None;
        if self.token() != SyntaxKind::OpenBraceToken {
            if self.token() != SyntaxKind::SemicolonToken {
                match self.parse_simple_statement(SimpleMode::RangeOk) {
                    Simple::Statement(s) => condition = Some(s),
                    header @ Simple::Range { .. } => range = Some(header),
                }
            }
            if range.is_none() && self.optional_token(SyntaxKind::SemicolonToken) {
                init = condition.take();
                if self.token() != SyntaxKind::SemicolonToken {
                    condition = Some(self.parse_simple_statement_only(SimpleMode::Basic));
                }
                self.expect_token(SyntaxKind::SemicolonToken);
                if self.token() != SyntaxKind::OpenBraceToken {
                    post = Some(self.parse_simple_statement_only(SimpleMode::Basic));
                }
            }
        }
        self.expr_level = outer;

        let body = self.parse_block();
        let body = self.alloc(body);

        if let Some(Simple::Range { key, value, is_define, range_expression }) = range {
            return Statement::Range(RangeStatement {
                data: self.finish(SyntaxKind::RangeStatement, pos),
                key,
                value,
                is_define,
                range_expression,
                body,
            });
        }

        let condition = match condition {
            None => None,
            Some(statement) => Some(self.statement_to_condition(Some(statement), pos)),
        };
        Statement::For(ForStatement {
            data: self.finish(SyntaxKind::ForStatement, pos),
            init: init.map(|s| self.alloc(s)),
            condition,
            post: post.map(|s| self.alloc(s)),
            body,
        })
    }
}

/// Whether `x` may be the type of a composite literal.
fn is_literal_type(x: &Expression<'_>) -> bool {
    match x {
        Expression::Bad(_)
        | Expression::Identifier(_)
        | Expression::ArrayType(_)
        | Expression::StructType(_)
        | Expression::MapType(_) => true,
        Expression::Selector(sel) => matches!(sel.expression, Expression::Identifier(_)),
        _ => false,
    }
}

/// A bare or qualified type name, which in a control clause header is
/// taken to be an operand rather than a literal type.
fn is_type_name(x: &Expression<'_>) -> bool {
    matches!(
        x,
        Expression::Bad(_) | Expression::Identifier(_) | Expression::Selector(_)
    )
}
