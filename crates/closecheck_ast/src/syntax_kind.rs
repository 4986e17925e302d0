//! SyntaxKind enum - all token and node kinds of the Go syntax tree.

/// The kind of a token or node.
///
/// Tokens come first, grouped so that range checks (`is_keyword`,
/// `is_assignment_operator`, ...) are integer comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    // ========================================================================
    // Tokens
    // ========================================================================
    Unknown = 0,
    EndOfFileToken,

    // Literals
    Identifier,
    IntLiteral,
    FloatLiteral,
    ImaginaryLiteral,
    RuneLiteral,
    StringLiteral,

    // Binary operators
    PlusToken,
    MinusToken,
    AsteriskToken,
    SlashToken,
    PercentToken,
    AmpersandToken,
    BarToken,
    CaretToken,
    LessThanLessThanToken,
    GreaterThanGreaterThanToken,
    AmpersandCaretToken,
    AmpersandAmpersandToken,
    BarBarToken,
    EqualsEqualsToken,
    ExclamationEqualsToken,
    LessThanToken,
    LessThanEqualsToken,
    GreaterThanToken,
    GreaterThanEqualsToken,

    // Assignment operators
    EqualsToken,
    ColonEqualsToken,
    PlusEqualsToken,
    MinusEqualsToken,
    AsteriskEqualsToken,
    SlashEqualsToken,
    PercentEqualsToken,
    AmpersandEqualsToken,
    BarEqualsToken,
    CaretEqualsToken,
    LessThanLessThanEqualsToken,
    GreaterThanGreaterThanEqualsToken,
    AmpersandCaretEqualsToken,

    // Other punctuation
    LessThanMinusToken,
    PlusPlusToken,
    MinusMinusToken,
    ExclamationToken,
    TildeToken,
    DotDotDotToken,
    OpenParenToken,
    CloseParenToken,
    OpenBracketToken,
    CloseBracketToken,
    OpenBraceToken,
    CloseBraceToken,
    CommaToken,
    DotToken,
    SemicolonToken,
    ColonToken,

    // Keywords
    BreakKeyword,
    CaseKeyword,
    ChanKeyword,
    ConstKeyword,
    ContinueKeyword,
    DefaultKeyword,
    DeferKeyword,
    ElseKeyword,
    FallthroughKeyword,
    ForKeyword,
    FuncKeyword,
    GoKeyword,
    GotoKeyword,
    IfKeyword,
    ImportKeyword,
    InterfaceKeyword,
    MapKeyword,
    PackageKeyword,
    RangeKeyword,
    ReturnKeyword,
    SelectKeyword,
    StructKeyword,
    SwitchKeyword,
    TypeKeyword,
    VarKeyword,

    // ========================================================================
    // Nodes
    // ========================================================================
    SourceFile,
    ImportSpec,
    ValueSpec,
    TypeSpec,
    GenDeclaration,
    FunctionDeclaration,
    FieldList,
    Field,

    // Statements
    BadStatement,
    EmptyStatement,
    DeclarationStatement,
    LabeledStatement,
    ExpressionStatement,
    SendStatement,
    IncDecStatement,
    AssignStatement,
    GoStatement,
    DeferStatement,
    ReturnStatement,
    BranchStatement,
    BlockStatement,
    IfStatement,
    CaseClause,
    SwitchStatement,
    TypeSwitchStatement,
    CommClause,
    SelectStatement,
    ForStatement,
    RangeStatement,

    // Expressions
    BadExpression,
    BasicLiteral,
    CompositeLiteral,
    FunctionLiteral,
    ParenthesizedExpression,
    SelectorExpression,
    IndexExpression,
    SliceExpression,
    TypeAssertExpression,
    CallExpression,
    StarExpression,
    UnaryExpression,
    BinaryExpression,
    KeyValueExpression,
    EllipsisExpression,

    // Type expressions
    ArrayType,
    StructType,
    FunctionType,
    InterfaceType,
    MapType,
    ChanType,
}

// Marker constants for SyntaxKind ranges.
impl SyntaxKind {
    pub const FIRST_LITERAL: SyntaxKind = SyntaxKind::IntLiteral;
    pub const LAST_LITERAL: SyntaxKind = SyntaxKind::StringLiteral;
    pub const FIRST_BINARY_OPERATOR: SyntaxKind = SyntaxKind::PlusToken;
    pub const LAST_BINARY_OPERATOR: SyntaxKind = SyntaxKind::GreaterThanEqualsToken;
    pub const FIRST_ASSIGNMENT: SyntaxKind = SyntaxKind::EqualsToken;
    pub const LAST_ASSIGNMENT: SyntaxKind = SyntaxKind::AmpersandCaretEqualsToken;
    pub const FIRST_COMPOUND_ASSIGNMENT: SyntaxKind = SyntaxKind::PlusEqualsToken;
    pub const FIRST_KEYWORD: SyntaxKind = SyntaxKind::BreakKeyword;
    pub const LAST_KEYWORD: SyntaxKind = SyntaxKind::VarKeyword;
    pub const FIRST_NODE: SyntaxKind = SyntaxKind::SourceFile;
}

impl SyntaxKind {
    #[inline]
    fn in_range(self, first: SyntaxKind, last: SyntaxKind) -> bool {
        let v = self as u16;
        v >= first as u16 && v <= last as u16
    }

    pub fn is_keyword(self) -> bool {
        self.in_range(Self::FIRST_KEYWORD, Self::LAST_KEYWORD)
    }

    pub fn is_literal(self) -> bool {
        self.in_range(Self::FIRST_LITERAL, Self::LAST_LITERAL)
    }

    pub fn is_binary_operator(self) -> bool {
        self.in_range(Self::FIRST_BINARY_OPERATOR, Self::LAST_BINARY_OPERATOR)
    }

    /// `=`, `:=` and every `op=` form.
    pub fn is_assignment_operator(self) -> bool {
        self.in_range(Self::FIRST_ASSIGNMENT, Self::LAST_ASSIGNMENT)
    }

    /// `op=` forms only.
    pub fn is_compound_assignment(self) -> bool {
        self.in_range(Self::FIRST_COMPOUND_ASSIGNMENT, Self::LAST_ASSIGNMENT)
    }

    pub fn is_token(self) -> bool {
        (self as u16) < Self::FIRST_NODE as u16
    }

    /// Whether the scanner inserts a semicolon when a line ends after this token.
    pub fn ends_statement_at_newline(self) -> bool {
        matches!(
            self,
            SyntaxKind::Identifier
                | SyntaxKind::IntLiteral
                | SyntaxKind::FloatLiteral
                | SyntaxKind::ImaginaryLiteral
                | SyntaxKind::RuneLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::BreakKeyword
                | SyntaxKind::ContinueKeyword
                | SyntaxKind::FallthroughKeyword
                | SyntaxKind::ReturnKeyword
                | SyntaxKind::PlusPlusToken
                | SyntaxKind::MinusMinusToken
                | SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken
                | SyntaxKind::CloseBraceToken
        )
    }

    /// The binary operator an `op=` assignment applies.
    pub fn compound_assignment_operator(self) -> Option<SyntaxKind> {
        Some(match self {
            SyntaxKind::PlusEqualsToken => SyntaxKind::PlusToken,
            SyntaxKind::MinusEqualsToken => SyntaxKind::MinusToken,
            SyntaxKind::AsteriskEqualsToken => SyntaxKind::AsteriskToken,
            SyntaxKind::SlashEqualsToken => SyntaxKind::SlashToken,
            SyntaxKind::PercentEqualsToken => SyntaxKind::PercentToken,
            SyntaxKind::AmpersandEqualsToken => SyntaxKind::AmpersandToken,
            SyntaxKind::BarEqualsToken => SyntaxKind::BarToken,
            SyntaxKind::CaretEqualsToken => SyntaxKind::CaretToken,
            SyntaxKind::LessThanLessThanEqualsToken => SyntaxKind::LessThanLessThanToken,
            SyntaxKind::GreaterThanGreaterThanEqualsToken => SyntaxKind::GreaterThanGreaterThanToken,
            SyntaxKind::AmpersandCaretEqualsToken => SyntaxKind::AmpersandCaretToken,
            _ => return None,
        })
    }

    /// Whether this is a comparison operator (result is untyped bool).
    pub fn is_comparison_operator(self) -> bool {
        matches!(
            self,
            SyntaxKind::EqualsEqualsToken
                | SyntaxKind::ExclamationEqualsToken
                | SyntaxKind::LessThanToken
                | SyntaxKind::LessThanEqualsToken
                | SyntaxKind::GreaterThanToken
                | SyntaxKind::GreaterThanEqualsToken
        )
    }

    pub fn keyword_text(self) -> Option<&'static str> {
        match self {
            SyntaxKind::BreakKeyword => Some("break"),
            SyntaxKind::CaseKeyword => Some("case"),
            SyntaxKind::ChanKeyword => Some("chan"),
            SyntaxKind::ConstKeyword => Some("const"),
            SyntaxKind::ContinueKeyword => Some("continue"),
            SyntaxKind::DefaultKeyword => Some("default"),
            SyntaxKind::DeferKeyword => Some("defer"),
            SyntaxKind::ElseKeyword => Some("else"),
            SyntaxKind::FallthroughKeyword => Some("fallthrough"),
            SyntaxKind::ForKeyword => Some("for"),
            SyntaxKind::FuncKeyword => Some("func"),
            SyntaxKind::GoKeyword => Some("go"),
            SyntaxKind::GotoKeyword => Some("goto"),
            SyntaxKind::IfKeyword => Some("if"),
            SyntaxKind::ImportKeyword => Some("import"),
            SyntaxKind::InterfaceKeyword => Some("interface"),
            SyntaxKind::MapKeyword => Some("map"),
            SyntaxKind::PackageKeyword => Some("package"),
            SyntaxKind::RangeKeyword => Some("range"),
            SyntaxKind::ReturnKeyword => Some("return"),
            SyntaxKind::SelectKeyword => Some("select"),
            SyntaxKind::StructKeyword => Some("struct"),
            SyntaxKind::SwitchKeyword => Some("switch"),
            SyntaxKind::TypeKeyword => Some("type"),
            SyntaxKind::VarKeyword => Some("var"),
            _ => None,
        }
    }

    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        match text {
            "break" => Some(SyntaxKind::BreakKeyword),
            "case" => Some(SyntaxKind::CaseKeyword),
            "chan" => Some(SyntaxKind::ChanKeyword),
            "const" => Some(SyntaxKind::ConstKeyword),
            "continue" => Some(SyntaxKind::ContinueKeyword),
            "default" => Some(SyntaxKind::DefaultKeyword),
            "defer" => Some(SyntaxKind::DeferKeyword),
            "else" => Some(SyntaxKind::ElseKeyword),
            "fallthrough" => Some(SyntaxKind::FallthroughKeyword),
            "for" => Some(SyntaxKind::ForKeyword),
            "func" => Some(SyntaxKind::FuncKeyword),
            "go" => Some(SyntaxKind::GoKeyword),
            "goto" => Some(SyntaxKind::GotoKeyword),
            "if" => Some(SyntaxKind::IfKeyword),
            "import" => Some(SyntaxKind::ImportKeyword),
            "interface" => Some(SyntaxKind::InterfaceKeyword),
            "map" => Some(SyntaxKind::MapKeyword),
            "package" => Some(SyntaxKind::PackageKeyword),
            "range" => Some(SyntaxKind::RangeKeyword),
            "return" => Some(SyntaxKind::ReturnKeyword),
            "select" => Some(SyntaxKind::SelectKeyword),
            "struct" => Some(SyntaxKind::StructKeyword),
            "switch" => Some(SyntaxKind::SwitchKeyword),
            "type" => Some(SyntaxKind::TypeKeyword),
            "var" => Some(SyntaxKind::VarKeyword),
            _ => None,
        }
    }

    pub fn punctuation_text(self) -> Option<&'static str> {
        match self {
            SyntaxKind::PlusToken => Some("+"),
            SyntaxKind::MinusToken => Some("-"),
            SyntaxKind::AsteriskToken => Some("*"),
            SyntaxKind::SlashToken => Some("/"),
            SyntaxKind::PercentToken => Some("%"),
            SyntaxKind::AmpersandToken => Some("&"),
            SyntaxKind::BarToken => Some("|"),
            SyntaxKind::CaretToken => Some("^"),
            SyntaxKind::LessThanLessThanToken => Some("<<"),
            SyntaxKind::GreaterThanGreaterThanToken => Some(">>"),
            SyntaxKind::AmpersandCaretToken => Some("&^"),
            SyntaxKind::AmpersandAmpersandToken => Some("&&"),
            SyntaxKind::BarBarToken => Some("||"),
            SyntaxKind::EqualsEqualsToken => Some("=="),
            SyntaxKind::ExclamationEqualsToken => Some("!="),
            SyntaxKind::LessThanToken => Some("<"),
            SyntaxKind::LessThanEqualsToken => Some("<="),
            SyntaxKind::GreaterThanToken => Some(">"),
            SyntaxKind::GreaterThanEqualsToken => Some(">="),
            SyntaxKind::EqualsToken => Some("="),
            SyntaxKind::ColonEqualsToken => Some(":="),
            SyntaxKind::PlusEqualsToken => Some("+="),
            SyntaxKind::MinusEqualsToken => Some("-="),
            SyntaxKind::AsteriskEqualsToken => Some("*="),
            SyntaxKind::SlashEqualsToken => Some("/="),
            SyntaxKind::PercentEqualsToken => Some("%="),
            SyntaxKind::AmpersandEqualsToken => Some("&="),
            SyntaxKind::BarEqualsToken => Some("|="),
            SyntaxKind::CaretEqualsToken => Some("^="),
            SyntaxKind::LessThanLessThanEqualsToken => Some("<<="),
            SyntaxKind::GreaterThanGreaterThanEqualsToken => Some(">>="),
            SyntaxKind::AmpersandCaretEqualsToken => Some("&^="),
            SyntaxKind::LessThanMinusToken => Some("<-"),
            SyntaxKind::PlusPlusToken => Some("++"),
            SyntaxKind::MinusMinusToken => Some("--"),
            SyntaxKind::ExclamationToken => Some("!"),
            SyntaxKind::TildeToken => Some("~"),
            SyntaxKind::DotDotDotToken => Some("..."),
            SyntaxKind::OpenParenToken => Some("("),
            SyntaxKind::CloseParenToken => Some(")"),
            SyntaxKind::OpenBracketToken => Some("["),
            SyntaxKind::CloseBracketToken => Some("]"),
            SyntaxKind::OpenBraceToken => Some("{"),
            SyntaxKind::CloseBraceToken => Some("}"),
            SyntaxKind::CommaToken => Some(","),
            SyntaxKind::DotToken => Some("."),
            SyntaxKind::SemicolonToken => Some(";"),
            SyntaxKind::ColonToken => Some(":"),
            _ => None,
        }
    }

    /// How a token kind is described in "expected X, found Y" messages.
    pub fn describe(self) -> String {
        if let Some(text) = self.punctuation_text().or_else(|| self.keyword_text()) {
            return format!("'{}'", text);
        }
        match self {
            SyntaxKind::EndOfFileToken => "EOF".to_string(),
            SyntaxKind::Identifier => "name".to_string(),
            SyntaxKind::IntLiteral
            | SyntaxKind::FloatLiteral
            | SyntaxKind::ImaginaryLiteral
            | SyntaxKind::RuneLiteral
            | SyntaxKind::StringLiteral => "literal".to_string(),
            other => format!("{:?}", other),
        }
    }
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
