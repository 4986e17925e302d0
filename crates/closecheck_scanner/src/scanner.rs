//! The Go scanner.
//!
//! Converts source text into the token stream the parser consumes. Positions
//! are byte offsets. Newlines are not trivia in Go: after a token that can end
//! a statement, the scanner inserts a semicolon at the next newline or at the
//! end of the file.

use crate::char_codes::*;
use crate::token::TokenInfo;
use closecheck_ast::syntax_kind::SyntaxKind;
use closecheck_ast::types::TokenFlags;
use closecheck_core::text::TextSpan;
use closecheck_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};

/// Saved scanner state for lookahead.
#[derive(Debug, Clone, Copy)]
pub struct ScannerState {
    pub pos: usize,
    pub token_start: usize,
    pub token: SyntaxKind,
    pub token_flags: TokenFlags,
    pub insert_semicolon: bool,
    diagnostic_count: usize,
}

/// The scanner converts Go source text into tokens.
pub struct Scanner<'t> {
    /// The source text being scanned.
    text: &'t str,
    bytes: &'t [u8],
    /// Current position in the text.
    pos: usize,
    /// Start of the current token (after leading trivia).
    token_start: usize,
    /// The current token kind.
    token: SyntaxKind,
    /// Token flags for the current token.
    token_flags: TokenFlags,
    /// Whether a newline after the current token ends the statement.
    insert_semicolon: bool,
    /// Accumulated diagnostics.
    diagnostics: DiagnosticCollection,
}

const BYTE_ORDER_MARK: char = '\u{FEFF}';

impl<'t> Scanner<'t> {
    /// Create a new scanner for the given source text. A leading byte order
    /// mark is skipped.
    pub fn new(text: &'t str) -> Self {
        let start = if text.starts_with(BYTE_ORDER_MARK) {
            BYTE_ORDER_MARK.len_utf8()
        } else {
            0
        };
        Self {
            text,
            bytes: text.as_bytes(),
            pos: start,
            token_start: start,
            token: SyntaxKind::Unknown,
            token_flags: TokenFlags::NONE,
            insert_semicolon: false,
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Get the full source text length.
    pub fn text_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn text(&self) -> &'t str {
        self.text
    }

    /// Look ahead: save state, call f, restore state and return result.
    /// Diagnostics reported during the lookahead are discarded.
    pub fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let state = self.save_state();
        let result = f(self);
        self.restore_state(state);
        result
    }

    /// Get the current token kind.
    #[inline]
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    /// Get the current token's source text. For an inserted semicolon this
    /// is `"\n"` (or empty at the end of the file).
    #[inline]
    pub fn token_text(&self) -> &'t str {
        &self.text[self.token_start..self.pos]
    }

    /// Get the start position of the current token (after trivia).
    #[inline]
    pub fn token_start(&self) -> u32 {
        self.token_start as u32
    }

    /// Get the current position (end of current token).
    #[inline]
    pub fn token_end(&self) -> u32 {
        self.pos as u32
    }

    /// Get the current token flags.
    #[inline]
    pub fn token_flags(&self) -> TokenFlags {
        self.token_flags
    }

    /// Whether the current token was preceded by a line break.
    #[inline]
    pub fn has_preceding_line_break(&self) -> bool {
        self.token_flags.contains(TokenFlags::PRECEDING_LINE_BREAK)
    }

    /// Whether the current token is a semicolon the scanner inserted.
    #[inline]
    pub fn is_auto_semicolon(&self) -> bool {
        self.token == SyntaxKind::SemicolonToken
            && self.token_flags.contains(TokenFlags::AUTO_SEMICOLON)
    }

    /// Get the accumulated diagnostics.
    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    /// Take the accumulated diagnostics, leaving an empty collection.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    /// Get a TokenInfo for the current token.
    pub fn token_info(&self) -> TokenInfo {
        TokenInfo {
            kind: self.token,
            pos: self.token_start as u32,
            end: self.pos as u32,
            text: self.token_text().to_string(),
            flags: self.token_flags,
        }
    }

    /// Save the full scanner state for lookahead.
    pub fn save_state(&self) -> ScannerState {
        ScannerState {
            pos: self.pos,
            token_start: self.token_start,
            token: self.token,
            token_flags: self.token_flags,
            insert_semicolon: self.insert_semicolon,
            diagnostic_count: self.diagnostics.len(),
        }
    }

    /// Restore the full scanner state from a saved state.
    pub fn restore_state(&mut self, state: ScannerState) {
        self.pos = state.pos;
        self.token_start = state.token_start;
        self.token = state.token;
        self.token_flags = state.token_flags;
        self.insert_semicolon = state.insert_semicolon;
        self.diagnostics.truncate(state.diagnostic_count);
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    #[inline]
    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// Decode the character at the current position.
    #[inline]
    fn current_char(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    #[inline]
    fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn error(&mut self, start: usize, message: &DiagnosticMessage, args: &[&str]) {
        let span = TextSpan::from_bounds(start as u32, self.pos.max(start) as u32);
        self.diagnostics.add(Diagnostic::with_span(span, message, args));
    }

    /// Produce an inserted semicolon spanning `start..end`.
    fn auto_semicolon(&mut self, start: usize, end: usize) -> SyntaxKind {
        self.token_start = start;
        self.pos = end;
        self.token_flags |= TokenFlags::AUTO_SEMICOLON;
        self.insert_semicolon = false;
        self.token = SyntaxKind::SemicolonToken;
        self.token
    }

    /// Skip whitespace and comments. Returns `Some` when a newline (or a
    /// comment spanning one) terminates the current statement.
    fn skip_trivia(&mut self) -> Option<SyntaxKind> {
        loop {
            let Some(b) = self.byte_at(0) else {
                return None;
            };
            match b {
                b'\n' => {
                    if self.insert_semicolon {
                        return Some(self.auto_semicolon(self.pos, self.pos + 1));
                    }
                    self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                    self.pos += 1;
                }
                b if is_white_space_single_line(b) => self.pos += 1,
                b'/' if self.byte_at(1) == Some(b'/') => {
                    // Stop at the newline so it can still end the statement.
                    match memchr::memchr(b'\n', &self.bytes[self.pos..]) {
                        Some(offset) => self.pos += offset,
                        None => self.pos = self.bytes.len(),
                    }
                }
                b'/' if self.byte_at(1) == Some(b'*') => {
                    let start = self.pos;
                    let body = &self.bytes[start + 2..];
                    let (end, terminated) = match memchr::memmem::find(body, b"*/") {
                        Some(offset) => (start + 2 + offset + 2, true),
                        None => (self.bytes.len(), false),
                    };
                    let has_newline = memchr::memchr(b'\n', &self.bytes[start..end]).is_some();
                    self.pos = end;
                    if !terminated {
                        self.error(start, &messages::COMMENT_NOT_TERMINATED, &[]);
                    }
                    if has_newline {
                        if self.insert_semicolon {
                            return Some(self.auto_semicolon(start, end));
                        }
                        self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                    }
                }
                _ => return None,
            }
        }
    }

    /// Scan the next token and return its kind.
    pub fn scan(&mut self) -> SyntaxKind {
        self.token_flags = TokenFlags::NONE;

        if let Some(semicolon) = self.skip_trivia() {
            return semicolon;
        }
        self.token_start = self.pos;

        if self.is_eof() {
            if self.insert_semicolon {
                return self.auto_semicolon(self.pos, self.pos);
            }
            self.token = SyntaxKind::EndOfFileToken;
            return self.token;
        }

        let b = self.bytes[self.pos];
        self.token = match b {
            b'(' => self.single(SyntaxKind::OpenParenToken),
            b')' => self.single(SyntaxKind::CloseParenToken),
            b'{' => self.single(SyntaxKind::OpenBraceToken),
            b'}' => self.single(SyntaxKind::CloseBraceToken),
            b'[' => self.single(SyntaxKind::OpenBracketToken),
            b']' => self.single(SyntaxKind::CloseBracketToken),
            b';' => self.single(SyntaxKind::SemicolonToken),
            b',' => self.single(SyntaxKind::CommaToken),
            b'~' => self.single(SyntaxKind::TildeToken),

            b'.' => self.scan_dot(),
            b':' => self.with_equals(SyntaxKind::ColonToken, SyntaxKind::ColonEqualsToken),
            b'+' => self.scan_doubled(b'+', SyntaxKind::PlusToken, SyntaxKind::PlusPlusToken, SyntaxKind::PlusEqualsToken),
            b'-' => self.scan_doubled(b'-', SyntaxKind::MinusToken, SyntaxKind::MinusMinusToken, SyntaxKind::MinusEqualsToken),
            b'*' => self.with_equals(SyntaxKind::AsteriskToken, SyntaxKind::AsteriskEqualsToken),
            b'/' => self.with_equals(SyntaxKind::SlashToken, SyntaxKind::SlashEqualsToken),
            b'%' => self.with_equals(SyntaxKind::PercentToken, SyntaxKind::PercentEqualsToken),
            b'^' => self.with_equals(SyntaxKind::CaretToken, SyntaxKind::CaretEqualsToken),
            b'=' => self.with_equals(SyntaxKind::EqualsToken, SyntaxKind::EqualsEqualsToken),
            b'!' => self.with_equals(SyntaxKind::ExclamationToken, SyntaxKind::ExclamationEqualsToken),
            b'|' => self.scan_doubled(b'|', SyntaxKind::BarToken, SyntaxKind::BarBarToken, SyntaxKind::BarEqualsToken),
            b'&' => self.scan_ampersand(),
            b'<' => self.scan_less_than(),
            b'>' => self.scan_greater_than(),

            b'"' => self.scan_string_literal(),
            b'`' => self.scan_raw_string_literal(),
            b'\'' => self.scan_rune_literal(),

            b'0'..=b'9' => self.scan_number(),

            _ => match self.current_char() {
                Some(ch) if is_identifier_start(ch) => self.scan_identifier(),
                Some(ch) => {
                    let start = self.pos;
                    self.pos += ch.len_utf8();
                    let shown = format!("U+{:04X} '{}'", ch as u32, ch);
                    self.error(start, &messages::INVALID_CHARACTER, &[&shown]);
                    SyntaxKind::Unknown
                }
                None => SyntaxKind::EndOfFileToken,
            },
        };

        self.insert_semicolon = self.token.ends_statement_at_newline();
        self.token
    }

    // ========================================================================
    // Token-specific scanning methods
    // ========================================================================

    #[inline]
    fn single(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.pos += 1;
        kind
    }

    /// `x` or `x=`
    fn with_equals(&mut self, plain: SyntaxKind, assign: SyntaxKind) -> SyntaxKind {
        if self.byte_at(1) == Some(b'=') {
            self.pos += 2;
            assign
        } else {
            self.pos += 1;
            plain
        }
    }

    /// `x`, `xx` or `x=`
    fn scan_doubled(
        &mut self,
        ch: u8,
        plain: SyntaxKind,
        doubled: SyntaxKind,
        assign: SyntaxKind,
    ) -> SyntaxKind {
        if self.byte_at(1) == Some(ch) {
            self.pos += 2;
            doubled
        } else {
            self.with_equals(plain, assign)
        }
    }

    fn scan_dot(&mut self) -> SyntaxKind {
        if self.byte_at(1) == Some(b'.') && self.byte_at(2) == Some(b'.') {
            self.pos += 3;
            SyntaxKind::DotDotDotToken
        } else if self.byte_at(1).map_or(false, |b| b.is_ascii_digit()) {
            self.scan_number()
        } else {
            self.pos += 1;
            SyntaxKind::DotToken
        }
    }

    fn scan_ampersand(&mut self) -> SyntaxKind {
        match self.byte_at(1) {
            Some(b'&') => {
                self.pos += 2;
                SyntaxKind::AmpersandAmpersandToken
            }
            Some(b'^') => {
                if self.byte_at(2) == Some(b'=') {
                    self.pos += 3;
                    SyntaxKind::AmpersandCaretEqualsToken
                } else {
                    self.pos += 2;
                    SyntaxKind::AmpersandCaretToken
                }
            }
            _ => self.with_equals(SyntaxKind::AmpersandToken, SyntaxKind::AmpersandEqualsToken),
        }
    }

    fn scan_less_than(&mut self) -> SyntaxKind {
        match self.byte_at(1) {
            Some(b'-') => {
                self.pos += 2;
                SyntaxKind::LessThanMinusToken
            }
            Some(b'<') => {
                if self.byte_at(2) == Some(b'=') {
                    self.pos += 3;
                    SyntaxKind::LessThanLessThanEqualsToken
                } else {
                    self.pos += 2;
                    SyntaxKind::LessThanLessThanToken
                }
            }
            _ => self.with_equals(SyntaxKind::LessThanToken, SyntaxKind::LessThanEqualsToken),
        }
    }

    fn scan_greater_than(&mut self) -> SyntaxKind {
        if self.byte_at(1) == Some(b'>') {
            if self.byte_at(2) == Some(b'=') {
                self.pos += 3;
                SyntaxKind::GreaterThanGreaterThanEqualsToken
            } else {
                self.pos += 2;
                SyntaxKind::GreaterThanGreaterThanToken
            }
        } else {
            self.with_equals(SyntaxKind::GreaterThanToken, SyntaxKind::GreaterThanEqualsToken)
        }
    }

    /// Scan the escape sequence after a backslash. Returns false if it was
    /// malformed (a diagnostic has been reported).
    fn scan_escape(&mut self, quote: u8) -> bool {
        let start = self.pos;
        self.pos += 1; // backslash
        let Some(ch) = self.byte_at(0) else {
            return false;
        };
        let (count, base, max) = match ch {
            b'a' | b'b' | b'f' | b'n' | b'r' | b't' | b'v' | b'\\' => {
                self.pos += 1;
                return true;
            }
            c if c == quote => {
                self.pos += 1;
                return true;
            }
            b'0'..=b'7' => (3, 8, 255),
            b'x' => {
                self.pos += 1;
                (2, 16, 255)
            }
            b'u' => {
                self.pos += 1;
                (4, 16, 0x10FFFF)
            }
            b'U' => {
                self.pos += 1;
                (8, 16, 0x10FFFF)
            }
            b'\n' => {
                self.error(start, &messages::UNKNOWN_ESCAPE_SEQUENCE, &[]);
                return false;
            }
            _ => {
                if let Some(c) = self.current_char() {
                    self.pos += c.len_utf8();
                }
                self.error(start, &messages::UNKNOWN_ESCAPE_SEQUENCE, &[]);
                return false;
            }
        };

        let mut value: u32 = 0;
        for _ in 0..count {
            let digit = match self.byte_at(0) {
                Some(b) => digit_value(b as char),
                None => 16,
            };
            if digit >= base {
                self.error(start, &messages::UNKNOWN_ESCAPE_SEQUENCE, &[]);
                return false;
            }
            value = value * base + digit;
            self.pos += 1;
        }
        if value > max || (0xD800..0xE000).contains(&value) {
            self.error(start, &messages::UNKNOWN_ESCAPE_SEQUENCE, &[]);
            return false;
        }
        true
    }

    fn scan_string_literal(&mut self) -> SyntaxKind {
        let start = self.pos;
        self.pos += 1; // opening quote
        loop {
            match memchr::memchr3(b'"', b'\\', b'\n', &self.bytes[self.pos..]) {
                Some(offset) => {
                    self.pos += offset;
                    match self.bytes[self.pos] {
                        b'"' => {
                            self.pos += 1;
                            break;
                        }
                        b'\\' => {
                            self.scan_escape(b'"');
                        }
                        _ => {
                            self.token_flags |= TokenFlags::UNTERMINATED;
                            self.error(start, &messages::STRING_LITERAL_NOT_TERMINATED, &[]);
                            break;
                        }
                    }
                }
                None => {
                    self.pos = self.bytes.len();
                    self.token_flags |= TokenFlags::UNTERMINATED;
                    self.error(start, &messages::STRING_LITERAL_NOT_TERMINATED, &[]);
                    break;
                }
            }
        }
        SyntaxKind::StringLiteral
    }

    fn scan_raw_string_literal(&mut self) -> SyntaxKind {
        let start = self.pos;
        self.token_flags |= TokenFlags::RAW;
        match memchr::memchr(b'`', &self.bytes[self.pos + 1..]) {
            Some(offset) => self.pos += offset + 2,
            None => {
                self.pos = self.bytes.len();
                self.token_flags |= TokenFlags::UNTERMINATED;
                self.error(start, &messages::RAW_STRING_LITERAL_NOT_TERMINATED, &[]);
            }
        }
        SyntaxKind::StringLiteral
    }

    fn scan_rune_literal(&mut self) -> SyntaxKind {
        let start = self.pos;
        self.pos += 1; // opening quote
        let mut count = 0;
        let mut valid = true;
        loop {
            match self.current_char() {
                None | Some('\n') => {
                    self.token_flags |= TokenFlags::UNTERMINATED;
                    self.error(start, &messages::RUNE_LITERAL_NOT_TERMINATED, &[]);
                    return SyntaxKind::RuneLiteral;
                }
                Some('\'') => {
                    self.pos += 1;
                    break;
                }
                Some('\\') => {
                    valid &= self.scan_escape(b'\'');
                    count += 1;
                }
                Some(c) => {
                    self.pos += c.len_utf8();
                    count += 1;
                }
            }
        }
        if valid && count != 1 {
            self.error(start, &messages::ILLEGAL_RUNE_LITERAL, &[]);
        }
        SyntaxKind::RuneLiteral
    }

    /// Consume digits of `base` (10 or 16) and `_` separators.
    fn scan_digits(&mut self, base: u32) {
        while let Some(b) = self.byte_at(0) {
            if b == b'_' || digit_value(b as char) < base {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let start = self.pos;
        let mut kind = SyntaxKind::IntLiteral;
        // Base the digits must fit, and the prefix length preceding them.
        let mut base = 10;
        let mut prefix = 0;

        if self.bytes[self.pos] != b'.' {
            if self.bytes[self.pos] == b'0' {
                match self.byte_at(1).map(|b| b.to_ascii_lowercase()) {
                    Some(b'x') => {
                        base = 16;
                        prefix = 2;
                        self.token_flags |= TokenFlags::HEX_SPECIFIER;
                    }
                    Some(b'o') => {
                        base = 8;
                        prefix = 2;
                        self.token_flags |= TokenFlags::OCTAL_SPECIFIER;
                    }
                    Some(b'b') => {
                        base = 2;
                        prefix = 2;
                        self.token_flags |= TokenFlags::BINARY_SPECIFIER;
                    }
                    // Legacy octal such as 0644.
                    _ => base = 8,
                }
            }
            self.pos += prefix;
            self.scan_digits(if base == 16 { 16 } else { 10 });
        }
        let mantissa_end = self.pos;

        // Fraction
        if self.byte_at(0) == Some(b'.') && (prefix == 0 || base == 16) {
            self.pos += 1;
            kind = SyntaxKind::FloatLiteral;
            self.scan_digits(if base == 16 { 16 } else { 10 });
        }

        // Exponent
        if let Some(e) = self.byte_at(0).map(|b| b.to_ascii_lowercase()) {
            if (e == b'e' && base != 16) || (e == b'p' && base == 16) {
                self.pos += 1;
                kind = SyntaxKind::FloatLiteral;
                if let Some(b'+') | Some(b'-') = self.byte_at(0) {
                    self.pos += 1;
                }
                self.scan_digits(10);
            }
        }

        if self.byte_at(0) == Some(b'i') {
            self.pos += 1;
            kind = SyntaxKind::ImaginaryLiteral;
        }

        // Out-of-range digits only matter for integer literals; 0789.5 is a
        // valid decimal float and 0789i a valid imaginary literal.
        if kind == SyntaxKind::IntLiteral && base < 10 {
            let digits = &self.text[start + prefix..mantissa_end];
            if let Some(ch) = digits.chars().find(|&c| c != '_' && digit_value(c) >= base) {
                let base_name = if base == 2 { "binary" } else { "octal" };
                let shown = format!("'{}'", ch);
                self.error(start, &messages::INVALID_DIGIT_IN_LITERAL, &[&shown, base_name]);
            }
        }
        kind
    }

    fn scan_identifier(&mut self) -> SyntaxKind {
        let start = self.pos;
        while let Some(ch) = self.current_char() {
            if !is_identifier_part(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        let text = &self.text[start..self.pos];
        SyntaxKind::from_keyword(text).unwrap_or(SyntaxKind::Identifier)
    }
}
