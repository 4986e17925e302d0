//! Generic traversal over the syntax tree.
//!
//! [`for_each_child`] enumerates the direct children of any node;
//! [`walk_with_ancestors`] builds a pre-order walk on top of it that hands
//! each node to a callback together with the chain of nodes enclosing it.

use crate::node::*;

/// A borrowed reference to any node the walker can stop at.
///
/// Statement lists get a node of their own so that a statement's parent
/// tells whether it sits directly in a block or case body.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'n, 'a> {
    File(&'n SourceFile<'a>),
    Declaration(&'n Declaration<'a>),
    Spec(&'n Spec<'a>),
    Statement(&'n Statement<'a>),
    StatementList(&'n [Statement<'a>]),
    CaseClause(&'n CaseClause<'a>),
    CommClause(&'n CommClause<'a>),
    Expression(&'n Expression<'a>),
    FieldList(&'n FieldList<'a>),
}

impl<'n, 'a> NodeRef<'n, 'a> {
    pub fn as_statement(&self) -> Option<&'n Statement<'a>> {
        match self {
            NodeRef::Statement(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_statement_list(&self) -> Option<&'n [Statement<'a>]> {
        match self {
            NodeRef::StatementList(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_expression(&self) -> Option<&'n Expression<'a>> {
        match self {
            NodeRef::Expression(e) => Some(e),
            _ => None,
        }
    }
}

/// Call `f` for each direct child of `node`, in source order.
pub fn for_each_child<'n, 'a: 'n>(node: NodeRef<'n, 'a>, f: &mut impl FnMut(NodeRef<'n, 'a>)) {
    match node {
        NodeRef::File(file) => {
            for decl in file.declarations.iter() {
                f(NodeRef::Declaration(decl));
            }
        }
        NodeRef::Declaration(decl) => match decl {
            Declaration::Gen(gen) => gen_children(gen, f),
            Declaration::Function(func) => {
                if let Some(recv) = func.receiver {
                    f(NodeRef::FieldList(recv));
                }
                signature_children(func.signature, f);
                if let Some(body) = func.body {
                    f(NodeRef::StatementList(body.statements));
                }
            }
        },
        NodeRef::Spec(spec) => match spec {
            Spec::Value(v) => {
                if let Some(ty) = v.type_expr {
                    f(NodeRef::Expression(ty));
                }
                // Implicitly repeated const values belong to the earlier spec.
                if !v.data.flags.contains(crate::types::NodeFlags::SYNTHESIZED) {
                    for value in v.values.iter() {
                        f(NodeRef::Expression(value));
                    }
                }
            }
            Spec::Type(t) => f(NodeRef::Expression(t.type_expr)),
        },
        NodeRef::Statement(stmt) => statement_children(stmt, f),
        NodeRef::StatementList(list) => {
            for stmt in list.iter() {
                f(NodeRef::Statement(stmt));
            }
        }
        NodeRef::CaseClause(clause) => {
            if let Some(exprs) = clause.expressions {
                for e in exprs.iter() {
                    f(NodeRef::Expression(e));
                }
            }
            f(NodeRef::StatementList(clause.body));
        }
        NodeRef::CommClause(clause) => {
            if let Some(comm) = clause.comm {
                f(NodeRef::Statement(comm));
            }
            f(NodeRef::StatementList(clause.body));
        }
        NodeRef::Expression(expr) => expression_children(expr, f),
        NodeRef::FieldList(list) => {
            for field in list.fields.iter() {
                f(NodeRef::Expression(field.type_expr));
            }
        }
    }
}

fn gen_children<'n, 'a: 'n>(gen: &'n GenDeclaration<'a>, f: &mut impl FnMut(NodeRef<'n, 'a>)) {
    for spec in gen.specs.iter() {
        f(NodeRef::Spec(spec));
    }
}

fn signature_children<'n, 'a: 'n>(
    sig: &'n FunctionTypeNode<'a>,
    f: &mut impl FnMut(NodeRef<'n, 'a>),
) {
    f(NodeRef::FieldList(sig.parameters));
    if let Some(results) = sig.results {
        f(NodeRef::FieldList(results));
    }
}

fn opt_stmt<'n, 'a: 'n>(s: Option<&'n Statement<'a>>, f: &mut impl FnMut(NodeRef<'n, 'a>)) {
    if let Some(s) = s {
        f(NodeRef::Statement(s));
    }
}

fn opt<'n, 'a: 'n>(e: Option<&'n Expression<'a>>, f: &mut impl FnMut(NodeRef<'n, 'a>)) {
    if let Some(e) = e {
        f(NodeRef::Expression(e));
    }
}

fn statement_children<'n, 'a: 'n>(stmt: &'n Statement<'a>, f: &mut impl FnMut(NodeRef<'n, 'a>)) {
    match stmt {
        Statement::Bad(_) | Statement::Empty(_) | Statement::Branch(_) => {}
        Statement::Declaration(gen) => {
            for spec in gen.specs.iter() {
                f(NodeRef::Spec(spec));
            }
        }
        Statement::Labeled(n) => f(NodeRef::Statement(n.statement)),
        Statement::Expression(n) => f(NodeRef::Expression(n.expression)),
        Statement::Send(n) => {
            f(NodeRef::Expression(n.channel));
            f(NodeRef::Expression(n.value));
        }
        Statement::IncDec(n) => f(NodeRef::Expression(n.expression)),
        Statement::Assign(n) => {
            for e in n.lhs.iter() {
                f(NodeRef::Expression(e));
            }
            for e in n.rhs.iter() {
                f(NodeRef::Expression(e));
            }
        }
        Statement::Go(n) => f(NodeRef::Expression(n.call)),
        Statement::Defer(n) => f(NodeRef::Expression(n.call)),
        Statement::Return(n) => {
            for e in n.results.iter() {
                f(NodeRef::Expression(e));
            }
        }
        Statement::Block(n) => f(NodeRef::StatementList(n.statements)),
        Statement::If(n) => {
            opt_stmt(n.init, f);
            f(NodeRef::Expression(n.condition));
            f(NodeRef::StatementList(n.then_block.statements));
            opt_stmt(n.else_statement, f);
        }
        Statement::Switch(n) => {
            opt_stmt(n.init, f);
            if let Some(tag) = n.tag {
                f(NodeRef::Expression(tag));
            }
            for clause in n.clauses.iter() {
                f(NodeRef::CaseClause(clause));
            }
        }
        Statement::TypeSwitch(n) => {
            opt_stmt(n.init, f);
            f(NodeRef::Expression(n.subject));
            for clause in n.clauses.iter() {
                f(NodeRef::CaseClause(clause));
            }
        }
        Statement::Select(n) => {
            for clause in n.clauses.iter() {
                f(NodeRef::CommClause(clause));
            }
        }
        Statement::For(n) => {
            opt_stmt(n.init, f);
            if let Some(cond) = n.condition {
                f(NodeRef::Expression(cond));
            }
            opt_stmt(n.post, f);
            f(NodeRef::StatementList(n.body.statements));
        }
        Statement::Range(n) => {
            if let Some(k) = n.key {
                f(NodeRef::Expression(k));
            }
            if let Some(v) = n.value {
                f(NodeRef::Expression(v));
            }
            f(NodeRef::Expression(n.range_expression));
            f(NodeRef::StatementList(n.body.statements));
        }
    }
}

fn expression_children<'n, 'a: 'n>(
    expr: &'n Expression<'a>,
    f: &mut impl FnMut(NodeRef<'n, 'a>),
) {
    match expr {
        Expression::Bad(_) | Expression::Identifier(_) | Expression::BasicLiteral(_) => {}
        Expression::CompositeLiteral(n) => {
            opt(n.type_expr, f);
            for e in n.elements.iter() {
                f(NodeRef::Expression(e));
            }
        }
        Expression::FunctionLiteral(n) => {
            signature_children(n.signature, f);
            f(NodeRef::StatementList(n.body.statements));
        }
        Expression::Parenthesized(n) => f(NodeRef::Expression(n.expression)),
        Expression::Selector(n) => f(NodeRef::Expression(n.expression)),
        Expression::Index(n) => {
            f(NodeRef::Expression(n.expression));
            f(NodeRef::Expression(n.index));
        }
        Expression::Slice(n) => {
            f(NodeRef::Expression(n.expression));
            opt(n.low, f);
            opt(n.high, f);
            opt(n.max, f);
        }
        Expression::TypeAssert(n) => {
            f(NodeRef::Expression(n.expression));
            opt(n.type_expr, f);
        }
        Expression::Call(n) => {
            f(NodeRef::Expression(n.function));
            for arg in n.arguments.iter() {
                f(NodeRef::Expression(arg));
            }
        }
        Expression::Star(n) => f(NodeRef::Expression(n.expression)),
        Expression::Unary(n) => f(NodeRef::Expression(n.operand)),
        Expression::Binary(n) => {
            f(NodeRef::Expression(n.left));
            f(NodeRef::Expression(n.right));
        }
        Expression::KeyValue(n) => {
            f(NodeRef::Expression(n.key));
            f(NodeRef::Expression(n.value));
        }
        Expression::Ellipsis(n) => opt(n.element, f),
        Expression::ArrayType(n) => {
            opt(n.length, f);
            f(NodeRef::Expression(n.element));
        }
        Expression::StructType(n) => f(NodeRef::FieldList(n.fields)),
        Expression::FunctionType(n) => signature_children(n, f),
        Expression::InterfaceType(n) => f(NodeRef::FieldList(n.methods)),
        Expression::MapType(n) => {
            f(NodeRef::Expression(n.key));
            f(NodeRef::Expression(n.value));
        }
        Expression::ChanType(n) => f(NodeRef::Expression(n.element)),
    }
}

/// Pre-order walk over `file`. The callback receives each node and its
/// ancestors, outermost first; the last ancestor is the direct parent.
pub fn walk_with_ancestors<'n, 'a: 'n>(
    file: &'n SourceFile<'a>,
    mut f: impl FnMut(NodeRef<'n, 'a>, &[NodeRef<'n, 'a>]),
) {
    let mut ancestors: Vec<NodeRef<'n, 'a>> = Vec::with_capacity(32);
    walk_node(NodeRef::File(file), &mut ancestors, &mut f);
}

fn walk_node<'n, 'a: 'n, F>(node: NodeRef<'n, 'a>, ancestors: &mut Vec<NodeRef<'n, 'a>>, f: &mut F)
where
    F: FnMut(NodeRef<'n, 'a>, &[NodeRef<'n, 'a>]),
{
    f(node, ancestors.as_slice());
    ancestors.push(node);
    let mut children: Vec<NodeRef<'n, 'a>> = Vec::new();
    for_each_child(node, &mut |child| children.push(child));
    for child in children {
        walk_node(child, ancestors, f);
    }
    ancestors.pop();
}
