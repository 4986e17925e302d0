//! Scope management for the binder.

use crate::symbol::SymbolTable;
use closecheck_ast::types::SymbolId;
use closecheck_core::intern::InternedString;

/// A local scope: the imports of one file, a function signature plus the
/// top level of its body, or a block, clause or statement header. Scopes
/// live on the binder's stack, innermost last.
#[derive(Debug, Default)]
pub struct Scope {
    /// The symbols declared in this scope.
    pub locals: SymbolTable,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn lookup(&self, name: &InternedString) -> Option<SymbolId> {
        self.locals.get(name)
    }
}
