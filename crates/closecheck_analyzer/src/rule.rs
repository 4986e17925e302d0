//! The block-scan rule.
//!
//! Every `:=` statement is classified by the types of the names it
//! declares. Statements declaring a closeable resource are then judged
//! against their siblings in the enclosing statement list.

use crate::finding::FindingKind;
use crate::oracle::{is_closeable_resource, is_error_value};
use crate::queries::TypeQueries;
use crate::AnalyzerOptions;
use closecheck_ast::node::*;
use closecheck_ast::visitor::{for_each_child, walk_with_ancestors, NodeRef};
use closecheck_core::intern::StringInterner;
use closecheck_core::text::TextSpan;
use closecheck_diagnostics::{Diagnostic, DiagnosticCollection};
use tracing::trace;

/// Length of the `:=` token.
const DEFINE_TOKEN_LEN: u32 = 2;

/// The names of interest declared by one `:=` statement.
#[derive(Debug, Clone, Copy, Default)]
struct Bindings<'n> {
    closer: Option<&'n Identifier>,
    error: Option<&'n Identifier>,
}

pub(crate) struct BlockScan<'q, Q: TypeQueries + ?Sized> {
    queries: &'q Q,
    interner: &'q StringInterner,
    options: AnalyzerOptions,
    diagnostics: DiagnosticCollection,
}

impl<'q, Q: TypeQueries + ?Sized> BlockScan<'q, Q> {
    pub(crate) fn new(queries: &'q Q, interner: &'q StringInterner, options: AnalyzerOptions) -> Self {
        Self {
            queries,
            interner,
            options,
            diagnostics: DiagnosticCollection::new(),
        }
    }

    pub(crate) fn scan(mut self, file: &SourceFile<'_>) -> DiagnosticCollection {
        walk_with_ancestors(file, |node, ancestors| {
            if let Some(statement) = node.as_statement() {
                self.visit_statement(statement, ancestors);
            }
        });
        self.diagnostics
    }

    fn visit_statement<'n, 'a: 'n>(
        &mut self,
        statement: &'n Statement<'a>,
        ancestors: &[NodeRef<'n, 'a>],
    ) {
        let Statement::Assign(assign) = statement else {
            return;
        };
        if !assign.is_define() {
            return;
        }

        let bindings = self.classify(assign);
        let Some(closer) = bindings.closer else {
            return;
        };

        // Init clauses, labeled statements and select cases have no
        // following siblings to inspect.
        let Some(list) = ancestors.last().and_then(|parent| parent.as_statement_list()) else {
            trace!(pos = assign.data.range.pos, "declaration not in a statement list");
            return;
        };
        let Some(index) = list.iter().position(|s| std::ptr::eq(s, statement)) else {
            return;
        };
        let following = &list[index + 1..];

        trace!(
            name = self.name(closer),
            index,
            following = following.len(),
            "closeable declaration"
        );

        if let Some(error) = bindings.error {
            if !self.error_checked_by(error, following.first()) {
                self.report(error.data.range.to_span(), FindingKind::UnhandledError, error);
            }
        }

        let closes = following
            .iter()
            .filter(|s| self.is_release(s, closer))
            .count();
        let span = TextSpan::new(assign.operator_pos, DEFINE_TOKEN_LEN);
        match closes {
            0 => self.report(span, FindingKind::ResourceNotClosed, closer),
            1 => {}
            _ => self.report(span, FindingKind::ResourceDoubleClosed, closer),
        }
    }

    /// First closeable name and first error name on the left-hand side.
    fn classify<'n>(&self, assign: &'n AssignStatement<'_>) -> Bindings<'n> {
        let mut bindings = Bindings::default();
        for id in assign.lhs.iter().filter_map(|e| e.as_identifier()) {
            let ty = self.queries.declared_type(id);
            if bindings.closer.is_none() && is_closeable_resource(self.queries, ty) {
                bindings.closer = Some(id);
            }
            if bindings.error.is_none() && is_error_value(self.queries, ty) {
                bindings.error = Some(id);
            }
        }
        bindings
    }

    /// Whether `next` is an `if` whose condition mentions `error`.
    fn error_checked_by(&self, error: &Identifier, next: Option<&Statement<'_>>) -> bool {
        match next {
            Some(Statement::If(if_statement)) => {
                self.mentions(NodeRef::Expression(if_statement.condition), error)
            }
            _ => false,
        }
    }

    fn mentions<'n, 'a: 'n>(&self, node: NodeRef<'n, 'a>, target: &Identifier) -> bool {
        if let NodeRef::Expression(Expression::Identifier(id)) = node {
            if self.queries.same_binding(id, target) {
                return true;
            }
        }
        let mut found = false;
        for_each_child(node, &mut |child| {
            if !found && self.mentions(child, target) {
                found = true;
            }
        });
        found
    }

    /// A statement releasing `closer`: `closer.Close()`, or with
    /// `count_deferred_close`, `defer closer.Close()`.
    fn is_release(&self, statement: &Statement<'_>, closer: &Identifier) -> bool {
        match statement {
            Statement::Expression(s) => self.is_close_call(s.expression, closer),
            Statement::Defer(s) if self.options.count_deferred_close => {
                self.is_close_call(s.call, closer)
            }
            _ => false,
        }
    }

    fn is_close_call(&self, expression: &Expression<'_>, closer: &Identifier) -> bool {
        let Expression::Call(call) = expression else {
            return false;
        };
        if !call.arguments.is_empty() {
            return false;
        }
        let Expression::Selector(selector) = call.function else {
            return false;
        };
        if self.interner.resolve(selector.name.name) != "Close" {
            return false;
        }
        selector
            .expression
            .as_identifier()
            .is_some_and(|receiver| self.queries.same_binding(receiver, closer))
    }

    fn name(&self, id: &Identifier) -> &str {
        self.interner.resolve(id.name)
    }

    fn report(&mut self, span: TextSpan, kind: FindingKind, subject: &Identifier) {
        let interner = self.interner;
        let name = interner.resolve(subject.name);
        trace!(name, %kind, pos = span.start, "finding");
        self.diagnostics
            .add(Diagnostic::with_span(span, kind.message(), &[name]));
    }
}
