//! closecheck_binder: Symbol table construction and scope analysis.
//!
//! The binder walks the AST package by package, creates symbols for every
//! declaration and links each identifier to the symbol it denotes.

mod binder;
mod scope;
mod symbol;

pub use binder::Binder;
pub use symbol::{Package, PackageId, Symbol, SymbolDecl, SymbolTable};
