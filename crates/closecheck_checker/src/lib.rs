//! closecheck_checker: Go type checker for the analyzed subset.
//!
//! Assigns a static type to every symbol the binder produced, models
//! method sets (receiver kinds, embedding, interfaces) and answers
//! structural "does this type have these methods" queries.

mod checker;
mod shape;
mod types;

pub use checker::{Checker, Member, MethodInfo};
pub use shape::{InterfaceShape, MethodShape, ShapeType};
pub use types::{BasicKind, InterfaceMethod, StructField, Type, TypeTable};
