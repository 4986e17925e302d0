//! AST node definitions for the Go front end.
//!
//! The tree follows Go's own AST closely: type expressions are ordinary
//! [`Expression`]s, so conversions and composite literals need no special
//! casing. Nodes reference children via arena-allocated references; no node
//! owns heap memory, so dropping the arena frees the whole tree.

use crate::syntax_kind::SyntaxKind;
use crate::types::*;
use closecheck_core::intern::InternedString;
use closecheck_core::text::TextRange;

// ============================================================================
// Core Node Wrapper
// ============================================================================

/// Common data shared by all AST nodes.
#[derive(Debug, Clone, Copy)]
pub struct NodeData {
    pub kind: SyntaxKind,
    pub range: TextRange,
    pub flags: NodeFlags,
    /// Unique within the analysis unit; assigned by the parser.
    pub id: NodeId,
}

impl NodeData {
    pub fn new(kind: SyntaxKind, pos: u32, end: u32) -> Self {
        Self {
            kind,
            range: TextRange::new(pos, end),
            flags: NodeFlags::NONE,
            id: NodeId::INVALID,
        }
    }

    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = id;
        self
    }
}

/// A list of nodes, allocated in the arena.
pub type NodeList<'a, T> = &'a [T];

/// An optional arena-allocated node.
pub type OptionalNode<'a, T> = Option<&'a T>;

// ============================================================================
// Source File
// ============================================================================

#[derive(Debug)]
pub struct SourceFile<'a> {
    pub data: NodeData,
    pub package_name: Identifier,
    pub imports: NodeList<'a, ImportSpec>,
    pub declarations: NodeList<'a, Declaration<'a>>,
    pub file_name: String,
    pub text: String,
    /// One past the largest node id the parser handed out for this file.
    pub next_node_id: u32,
}

/// `import name "path"`.
#[derive(Debug, Clone, Copy)]
pub struct ImportSpec {
    pub data: NodeData,
    /// Explicit local name, including `_` and `.`.
    pub name: Option<Identifier>,
    /// The unquoted import path.
    pub path: InternedString,
}

// ============================================================================
// Identifier and literals
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Identifier {
    pub data: NodeData,
    pub name: InternedString,
}

impl Identifier {
    #[inline]
    pub fn pos(&self) -> u32 {
        self.data.range.pos
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BasicLiteral {
    pub data: NodeData,
    /// One of the literal token kinds.
    pub kind: SyntaxKind,
    /// The literal's source text (for strings, including quotes).
    pub value: InternedString,
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug)]
pub enum Declaration<'a> {
    Gen(GenDeclaration<'a>),
    Function(FunctionDeclaration<'a>),
}

/// A `var`, `const` or `type` declaration, possibly grouped.
#[derive(Debug)]
pub struct GenDeclaration<'a> {
    pub data: NodeData,
    /// `VarKeyword`, `ConstKeyword` or `TypeKeyword`.
    pub keyword: SyntaxKind,
    pub specs: NodeList<'a, Spec<'a>>,
}

#[derive(Debug)]
pub enum Spec<'a> {
    Value(ValueSpec<'a>),
    Type(TypeSpec<'a>),
}

#[derive(Debug)]
pub struct ValueSpec<'a> {
    pub data: NodeData,
    pub names: NodeList<'a, Identifier>,
    pub type_expr: OptionalNode<'a, Expression<'a>>,
    /// For a const spec without values, the previous spec's list
    /// (flagged `SYNTHESIZED`).
    pub values: NodeList<'a, Expression<'a>>,
    /// Index of this spec within a const group (the value of `iota`).
    pub iota: u32,
}

#[derive(Debug)]
pub struct TypeSpec<'a> {
    pub data: NodeData,
    pub name: Identifier,
    /// `type A = B`
    pub is_alias: bool,
    pub type_expr: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct FunctionDeclaration<'a> {
    pub data: NodeData,
    pub receiver: OptionalNode<'a, FieldList<'a>>,
    pub name: Identifier,
    pub signature: &'a FunctionTypeNode<'a>,
    /// Absent for declarations implemented elsewhere.
    pub body: OptionalNode<'a, BlockStatement<'a>>,
}

#[derive(Debug)]
pub struct FieldList<'a> {
    pub data: NodeData,
    pub fields: NodeList<'a, Field<'a>>,
}

impl<'a> FieldList<'a> {
    /// Number of values the list describes (`a, b int` counts two).
    pub fn arity(&self) -> usize {
        self.fields.iter().map(|f| f.names.len().max(1)).sum()
    }
}

/// A parameter, result, struct field or interface element.
#[derive(Debug)]
pub struct Field<'a> {
    pub data: NodeData,
    /// Empty for anonymous parameters and embedded fields.
    pub names: NodeList<'a, Identifier>,
    pub type_expr: &'a Expression<'a>,
    pub tag: Option<BasicLiteral>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug)]
pub enum Statement<'a> {
    Bad(NodeData),
    Empty(NodeData),
    Declaration(&'a GenDeclaration<'a>),
    Labeled(LabeledStatement<'a>),
    Expression(ExpressionStatement<'a>),
    Send(SendStatement<'a>),
    IncDec(IncDecStatement<'a>),
    Assign(AssignStatement<'a>),
    Go(GoStatement<'a>),
    Defer(DeferStatement<'a>),
    Return(ReturnStatement<'a>),
    Branch(BranchStatement),
    Block(BlockStatement<'a>),
    If(IfStatement<'a>),
    Switch(SwitchStatement<'a>),
    TypeSwitch(TypeSwitchStatement<'a>),
    Select(SelectStatement<'a>),
    For(ForStatement<'a>),
    Range(RangeStatement<'a>),
}

impl<'a> Statement<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            Statement::Bad(d) | Statement::Empty(d) => d,
            Statement::Declaration(n) => &n.data,
            Statement::Labeled(n) => &n.data,
            Statement::Expression(n) => &n.data,
            Statement::Send(n) => &n.data,
            Statement::IncDec(n) => &n.data,
            Statement::Assign(n) => &n.data,
            Statement::Go(n) => &n.data,
            Statement::Defer(n) => &n.data,
            Statement::Return(n) => &n.data,
            Statement::Branch(n) => &n.data,
            Statement::Block(n) => &n.data,
            Statement::If(n) => &n.data,
            Statement::Switch(n) => &n.data,
            Statement::TypeSwitch(n) => &n.data,
            Statement::Select(n) => &n.data,
            Statement::For(n) => &n.data,
            Statement::Range(n) => &n.data,
        }
    }

    pub fn range(&self) -> TextRange {
        self.data().range
    }
}

#[derive(Debug)]
pub struct LabeledStatement<'a> {
    pub data: NodeData,
    pub label: Identifier,
    pub statement: &'a Statement<'a>,
}

#[derive(Debug)]
pub struct ExpressionStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

/// `ch <- v`
#[derive(Debug)]
pub struct SendStatement<'a> {
    pub data: NodeData,
    pub channel: &'a Expression<'a>,
    pub value: &'a Expression<'a>,
}

/// `x++` / `x--`
#[derive(Debug)]
pub struct IncDecStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub operator: SyntaxKind,
}

/// `lhs op rhs` where op is `=`, `:=` or `op=`.
#[derive(Debug)]
pub struct AssignStatement<'a> {
    pub data: NodeData,
    pub lhs: NodeList<'a, Expression<'a>>,
    pub operator: SyntaxKind,
    /// Offset of the operator token.
    pub operator_pos: u32,
    pub rhs: NodeList<'a, Expression<'a>>,
}

impl<'a> AssignStatement<'a> {
    /// Whether this is the short variable declaration form `:=`.
    #[inline]
    pub fn is_define(&self) -> bool {
        self.operator == SyntaxKind::ColonEqualsToken
    }
}

#[derive(Debug)]
pub struct GoStatement<'a> {
    pub data: NodeData,
    pub call: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct DeferStatement<'a> {
    pub data: NodeData,
    pub call: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct ReturnStatement<'a> {
    pub data: NodeData,
    pub results: NodeList<'a, Expression<'a>>,
}

/// `break`, `continue`, `goto` or `fallthrough`.
#[derive(Debug)]
pub struct BranchStatement {
    pub data: NodeData,
    pub keyword: SyntaxKind,
    pub label: Option<Identifier>,
}

#[derive(Debug)]
pub struct BlockStatement<'a> {
    pub data: NodeData,
    pub statements: NodeList<'a, Statement<'a>>,
}

#[derive(Debug)]
pub struct IfStatement<'a> {
    pub data: NodeData,
    pub init: OptionalNode<'a, Statement<'a>>,
    pub condition: &'a Expression<'a>,
    pub then_block: &'a BlockStatement<'a>,
    /// Either another `If` or a `Block`.
    pub else_statement: OptionalNode<'a, Statement<'a>>,
}

/// A `case`/`default` clause of an expression or type switch.
#[derive(Debug)]
pub struct CaseClause<'a> {
    pub data: NodeData,
    /// `None` for `default`.
    pub expressions: Option<NodeList<'a, Expression<'a>>>,
    pub body: NodeList<'a, Statement<'a>>,
}

#[derive(Debug)]
pub struct SwitchStatement<'a> {
    pub data: NodeData,
    pub init: OptionalNode<'a, Statement<'a>>,
    pub tag: OptionalNode<'a, Expression<'a>>,
    pub clauses: NodeList<'a, CaseClause<'a>>,
}

/// `switch [init;] [v :=] x.(type) { ... }`
#[derive(Debug)]
pub struct TypeSwitchStatement<'a> {
    pub data: NodeData,
    pub init: OptionalNode<'a, Statement<'a>>,
    /// The symbol name bound in each clause, if any.
    pub binding: Option<Identifier>,
    /// The `x` in `x.(type)`.
    pub subject: &'a Expression<'a>,
    pub clauses: NodeList<'a, CaseClause<'a>>,
}

/// A `case`/`default` clause of a select statement.
#[derive(Debug)]
pub struct CommClause<'a> {
    pub data: NodeData,
    /// Send or receive statement; `None` for `default`.
    pub comm: OptionalNode<'a, Statement<'a>>,
    pub body: NodeList<'a, Statement<'a>>,
}

#[derive(Debug)]
pub struct SelectStatement<'a> {
    pub data: NodeData,
    pub clauses: NodeList<'a, CommClause<'a>>,
}

#[derive(Debug)]
pub struct ForStatement<'a> {
    pub data: NodeData,
    pub init: OptionalNode<'a, Statement<'a>>,
    pub condition: OptionalNode<'a, Expression<'a>>,
    pub post: OptionalNode<'a, Statement<'a>>,
    pub body: &'a BlockStatement<'a>,
}

/// `for k, v := range x { ... }`
#[derive(Debug)]
pub struct RangeStatement<'a> {
    pub data: NodeData,
    pub key: OptionalNode<'a, Expression<'a>>,
    pub value: OptionalNode<'a, Expression<'a>>,
    /// `:=` (declares key/value) versus `=` or no variables.
    pub is_define: bool,
    pub range_expression: &'a Expression<'a>,
    pub body: &'a BlockStatement<'a>,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug)]
pub enum Expression<'a> {
    Bad(NodeData),
    Identifier(Identifier),
    BasicLiteral(BasicLiteral),
    CompositeLiteral(CompositeLiteral<'a>),
    FunctionLiteral(FunctionLiteral<'a>),
    Parenthesized(ParenthesizedExpression<'a>),
    Selector(SelectorExpression<'a>),
    Index(IndexExpression<'a>),
    Slice(SliceExpression<'a>),
    TypeAssert(TypeAssertExpression<'a>),
    Call(CallExpression<'a>),
    Star(StarExpression<'a>),
    Unary(UnaryExpression<'a>),
    Binary(BinaryExpression<'a>),
    KeyValue(KeyValueExpression<'a>),
    Ellipsis(EllipsisExpression<'a>),
    // Type expressions
    ArrayType(ArrayTypeNode<'a>),
    StructType(StructTypeNode<'a>),
    FunctionType(&'a FunctionTypeNode<'a>),
    InterfaceType(InterfaceTypeNode<'a>),
    MapType(MapTypeNode<'a>),
    ChanType(ChanTypeNode<'a>),
}

impl<'a> Expression<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            Expression::Bad(d) => d,
            Expression::Identifier(n) => &n.data,
            Expression::BasicLiteral(n) => &n.data,
            Expression::CompositeLiteral(n) => &n.data,
            Expression::FunctionLiteral(n) => &n.data,
            Expression::Parenthesized(n) => &n.data,
            Expression::Selector(n) => &n.data,
            Expression::Index(n) => &n.data,
            Expression::Slice(n) => &n.data,
            Expression::TypeAssert(n) => &n.data,
            Expression::Call(n) => &n.data,
            Expression::Star(n) => &n.data,
            Expression::Unary(n) => &n.data,
            Expression::Binary(n) => &n.data,
            Expression::KeyValue(n) => &n.data,
            Expression::Ellipsis(n) => &n.data,
            Expression::ArrayType(n) => &n.data,
            Expression::StructType(n) => &n.data,
            Expression::FunctionType(n) => &n.data,
            Expression::InterfaceType(n) => &n.data,
            Expression::MapType(n) => &n.data,
            Expression::ChanType(n) => &n.data,
        }
    }

    pub fn range(&self) -> TextRange {
        self.data().range
    }

    /// The identifier, if this expression is a bare name.
    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Expression::Identifier(id) => Some(id),
            _ => None,
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparen(&self) -> &Expression<'a> {
        let mut expr = self;
        while let Expression::Parenthesized(p) = expr {
            expr = p.expression;
        }
        expr
    }
}

/// `T{elements}`; `type_expr` is `None` for elided element literals.
#[derive(Debug)]
pub struct CompositeLiteral<'a> {
    pub data: NodeData,
    pub type_expr: OptionalNode<'a, Expression<'a>>,
    pub elements: NodeList<'a, Expression<'a>>,
}

#[derive(Debug)]
pub struct FunctionLiteral<'a> {
    pub data: NodeData,
    pub signature: &'a FunctionTypeNode<'a>,
    pub body: &'a BlockStatement<'a>,
}

#[derive(Debug)]
pub struct ParenthesizedExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

/// `x.name`
#[derive(Debug)]
pub struct SelectorExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub name: Identifier,
}

#[derive(Debug)]
pub struct IndexExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub index: &'a Expression<'a>,
}

/// `x[low:high:max]`
#[derive(Debug)]
pub struct SliceExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub low: OptionalNode<'a, Expression<'a>>,
    pub high: OptionalNode<'a, Expression<'a>>,
    pub max: OptionalNode<'a, Expression<'a>>,
}

/// `x.(T)`; `type_expr` is `None` for `x.(type)` in a type switch.
#[derive(Debug)]
pub struct TypeAssertExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub type_expr: OptionalNode<'a, Expression<'a>>,
}

#[derive(Debug)]
pub struct CallExpression<'a> {
    pub data: NodeData,
    pub function: &'a Expression<'a>,
    pub arguments: NodeList<'a, Expression<'a>>,
    /// `f(xs...)`
    pub has_ellipsis: bool,
}

/// `*x`: a dereference or a pointer type.
#[derive(Debug)]
pub struct StarExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct UnaryExpression<'a> {
    pub data: NodeData,
    pub operator: SyntaxKind,
    pub operand: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct BinaryExpression<'a> {
    pub data: NodeData,
    pub left: &'a Expression<'a>,
    pub operator: SyntaxKind,
    pub right: &'a Expression<'a>,
}

/// `key: value` inside a composite literal.
#[derive(Debug)]
pub struct KeyValueExpression<'a> {
    pub data: NodeData,
    pub key: &'a Expression<'a>,
    pub value: &'a Expression<'a>,
}

/// `...T` in a parameter list, or `[...]T` (element absent).
#[derive(Debug)]
pub struct EllipsisExpression<'a> {
    pub data: NodeData,
    pub element: OptionalNode<'a, Expression<'a>>,
}

// -- Type expressions --

/// `[N]T`, `[...]T` or `[]T` (length absent).
#[derive(Debug)]
pub struct ArrayTypeNode<'a> {
    pub data: NodeData,
    pub length: OptionalNode<'a, Expression<'a>>,
    pub element: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct StructTypeNode<'a> {
    pub data: NodeData,
    pub fields: &'a FieldList<'a>,
}

#[derive(Debug)]
pub struct FunctionTypeNode<'a> {
    pub data: NodeData,
    pub parameters: &'a FieldList<'a>,
    pub results: OptionalNode<'a, FieldList<'a>>,
}

/// Methods have names and a `FunctionType`; embedded interfaces have none.
#[derive(Debug)]
pub struct InterfaceTypeNode<'a> {
    pub data: NodeData,
    pub methods: &'a FieldList<'a>,
}

#[derive(Debug)]
pub struct MapTypeNode<'a> {
    pub data: NodeData,
    pub key: &'a Expression<'a>,
    pub value: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct ChanTypeNode<'a> {
    pub data: NodeData,
    pub direction: ChanDir,
    pub element: &'a Expression<'a>,
}
