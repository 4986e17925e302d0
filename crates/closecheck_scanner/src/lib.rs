//! closecheck_scanner: Lexer for Go source code.
//!
//! Produces tokens from source text with support for:
//! - Automatic semicolon insertion at line ends
//! - Interpreted, raw and rune literals with escape validation
//! - Integer literals in every base, floats and imaginary literals
//! - Unicode identifiers

mod char_codes;
mod scanner;
mod token;

pub use scanner::{Scanner, ScannerState};
pub use token::{tokenize, TokenInfo};
