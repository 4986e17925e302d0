//! The type information the rule engine reads.

use closecheck_ast::node::Identifier;
use closecheck_ast::types::TypeId;
use closecheck_checker::{Checker, InterfaceShape};

/// Read-only questions about a bound and type-checked program.
pub trait TypeQueries {
    /// The static type of the variable `id` declares or refers to. `None`
    /// when the identifier has no binding (blank `_`, unresolved names).
    fn declared_type(&self, id: &Identifier) -> Option<TypeId>;

    /// Whether both identifiers resolve to the same symbol. Unbound
    /// identifiers are never the same as anything.
    fn same_binding(&self, a: &Identifier, b: &Identifier) -> bool;

    /// Whether the method set of `ty` provides every method of `shape`.
    fn satisfies(&self, ty: TypeId, shape: &InterfaceShape) -> bool;
}

impl TypeQueries for Checker<'_> {
    fn declared_type(&self, id: &Identifier) -> Option<TypeId> {
        self.type_of_identifier(id)
    }

    fn same_binding(&self, a: &Identifier, b: &Identifier) -> bool {
        let binder = self.binder();
        match (binder.symbol_of(a.data.id), binder.symbol_of(b.data.id)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    fn satisfies(&self, ty: TypeId, shape: &InterfaceShape) -> bool {
        self.implements_shape(ty, shape)
    }
}
