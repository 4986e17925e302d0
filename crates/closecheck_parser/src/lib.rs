//! closecheck_parser: Recursive descent parser for Go.
//!
//! Parses the scanner's token stream into an arena-allocated AST. Type
//! parameters are rejected with a diagnostic; everything else in the Go
//! grammar is accepted.

mod parser;
mod precedence;
mod utilities;

pub use parser::Parser;
