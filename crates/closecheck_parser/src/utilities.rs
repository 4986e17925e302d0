//! Parser utility functions.

use closecheck_ast::syntax_kind::SyntaxKind;

/// Check if a token kind can start a type.
pub fn can_start_type(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Identifier
            | SyntaxKind::OpenBracketToken
            | SyntaxKind::StructKeyword
            | SyntaxKind::AsteriskToken
            | SyntaxKind::FuncKeyword
            | SyntaxKind::InterfaceKeyword
            | SyntaxKind::MapKeyword
            | SyntaxKind::ChanKeyword
            | SyntaxKind::OpenParenToken
            | SyntaxKind::LessThanMinusToken
    )
}

/// Tokens where error recovery stops skipping: the start of a statement
/// or declaration that cannot be mistaken for an expression.
pub fn is_recovery_point(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::BreakKeyword
            | SyntaxKind::ConstKeyword
            | SyntaxKind::ContinueKeyword
            | SyntaxKind::DeferKeyword
            | SyntaxKind::FallthroughKeyword
            | SyntaxKind::ForKeyword
            | SyntaxKind::FuncKeyword
            | SyntaxKind::GoKeyword
            | SyntaxKind::GotoKeyword
            | SyntaxKind::IfKeyword
            | SyntaxKind::ReturnKeyword
            | SyntaxKind::SelectKeyword
            | SyntaxKind::SwitchKeyword
            | SyntaxKind::TypeKeyword
            | SyntaxKind::VarKeyword
            | SyntaxKind::ImportKeyword
            | SyntaxKind::CloseBraceToken
            | SyntaxKind::EndOfFileToken
    )
}

/// Strip the quotes from an import path literal. Import paths never
/// contain escapes in practice, so none are decoded.
pub fn unquote_import_path(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'`' && last == b'`') {
            return &text[1..text.len() - 1];
        }
    }
    text
}
