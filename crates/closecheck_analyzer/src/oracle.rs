//! Resource-shape oracle.
//!
//! Classifies static types by method shape: a closeable resource has
//! `Close() error` in its method set, an error value has `Error() string`.

use crate::TypeQueries;
use closecheck_ast::types::TypeId;
use closecheck_checker::{BasicKind, InterfaceShape, MethodShape, ShapeType};

/// `interface { Close() error }`
pub const CLOSER_SHAPE: InterfaceShape = InterfaceShape {
    methods: &[MethodShape {
        name: "Close",
        params: &[],
        results: &[ShapeType::Error],
    }],
};

/// `interface { Error() string }`
pub const ERROR_SHAPE: InterfaceShape = InterfaceShape {
    methods: &[MethodShape {
        name: "Error",
        params: &[],
        results: &[ShapeType::Basic(BasicKind::String)],
    }],
};

/// Unknown types are never resources.
pub fn is_closeable_resource<Q: TypeQueries + ?Sized>(queries: &Q, ty: Option<TypeId>) -> bool {
    ty.is_some_and(|ty| queries.satisfies(ty, &CLOSER_SHAPE))
}

pub fn is_error_value<Q: TypeQueries + ?Sized>(queries: &Q, ty: Option<TypeId>) -> bool {
    ty.is_some_and(|ty| queries.satisfies(ty, &ERROR_SHAPE))
}
