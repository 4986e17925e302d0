//! Static method-shape descriptors.
//!
//! A shape is a tiny interface declared in Rust rather than Go source, so a
//! caller can ask "does this type have a `Close() error` method?" without
//! any package declaring such an interface.

use crate::types::BasicKind;

/// A parameter or result type in a [`MethodShape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    /// Identical to the predeclared `error` type.
    Error,
    /// Identical to the given predeclared basic type.
    Basic(BasicKind),
}

/// A method required by an [`InterfaceShape`]: name, parameter and result
/// types. Shape methods are never variadic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodShape {
    pub name: &'static str,
    pub params: &'static [ShapeType],
    pub results: &'static [ShapeType],
}

/// A set of methods a type's method set must contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceShape {
    pub methods: &'static [MethodShape],
}
