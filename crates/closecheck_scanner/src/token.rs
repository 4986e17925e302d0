//! Token information produced by the scanner.

use closecheck_ast::syntax_kind::SyntaxKind;
use closecheck_ast::types::TokenFlags;

/// A scanned token detached from the scanner.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub kind: SyntaxKind,
    /// Start position in the source text.
    pub pos: u32,
    /// End position in the source text (exclusive).
    pub end: u32,
    /// The token's source text.
    pub text: String,
    pub flags: TokenFlags,
}

impl TokenInfo {
    /// The length of this token in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.pos
    }

    /// Zero for the semicolon inserted at the end of the file.
    pub fn is_empty(&self) -> bool {
        self.pos == self.end
    }

    pub fn is_auto_semicolon(&self) -> bool {
        self.flags.contains(TokenFlags::AUTO_SEMICOLON)
    }
}

/// Scan `text` to the end, collecting every token. Used by tests and the
/// parser benchmark.
pub fn tokenize(text: &str) -> Vec<TokenInfo> {
    let mut scanner = crate::Scanner::new(text);
    let mut tokens = Vec::new();
    while scanner.scan() != SyntaxKind::EndOfFileToken {
        tokens.push(scanner.token_info());
    }
    tokens
}
