//! Go type representation.
//!
//! Types are stored in a TypeTable (type arena) and referenced by TypeId.
//! Structural types are interned, so two types are identical exactly when
//! their ids are equal.

use closecheck_ast::types::{ChanDir, SymbolId, TypeId};
use closecheck_core::intern::InternedString;
use indexmap::IndexSet;

/// Predeclared basic types, plus the kinds of untyped constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    UntypedBool,
    UntypedInt,
    UntypedRune,
    UntypedFloat,
    UntypedComplex,
    UntypedString,
    UntypedNil,
}

impl BasicKind {
    pub fn name(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::Int => "int",
            BasicKind::Int8 => "int8",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint => "uint",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Uintptr => "uintptr",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::Complex64 => "complex64",
            BasicKind::Complex128 => "complex128",
            BasicKind::String => "string",
            BasicKind::UntypedBool => "untyped bool",
            BasicKind::UntypedInt => "untyped int",
            BasicKind::UntypedRune => "untyped rune",
            BasicKind::UntypedFloat => "untyped float",
            BasicKind::UntypedComplex => "untyped complex",
            BasicKind::UntypedString => "untyped string",
            BasicKind::UntypedNil => "untyped nil",
        }
    }

    /// Look up a predeclared type name.
    pub fn from_name(name: &str) -> Option<BasicKind> {
        Some(match name {
            "bool" => BasicKind::Bool,
            "int" => BasicKind::Int,
            "int8" => BasicKind::Int8,
            "int16" => BasicKind::Int16,
            "int32" | "rune" => BasicKind::Int32,
            "int64" => BasicKind::Int64,
            "uint" => BasicKind::Uint,
            "uint8" | "byte" => BasicKind::Uint8,
            "uint16" => BasicKind::Uint16,
            "uint32" => BasicKind::Uint32,
            "uint64" => BasicKind::Uint64,
            "uintptr" => BasicKind::Uintptr,
            "float32" => BasicKind::Float32,
            "float64" => BasicKind::Float64,
            "complex64" => BasicKind::Complex64,
            "complex128" => BasicKind::Complex128,
            "string" => BasicKind::String,
            _ => return None,
        })
    }

    pub fn is_untyped(self) -> bool {
        matches!(
            self,
            BasicKind::UntypedBool
                | BasicKind::UntypedInt
                | BasicKind::UntypedRune
                | BasicKind::UntypedFloat
                | BasicKind::UntypedComplex
                | BasicKind::UntypedString
                | BasicKind::UntypedNil
        )
    }

    /// The type an untyped constant takes when nothing else decides it.
    /// `nil` has no default.
    pub fn default_kind(self) -> BasicKind {
        match self {
            BasicKind::UntypedBool => BasicKind::Bool,
            BasicKind::UntypedInt => BasicKind::Int,
            BasicKind::UntypedRune => BasicKind::Int32,
            BasicKind::UntypedFloat => BasicKind::Float64,
            BasicKind::UntypedComplex => BasicKind::Complex128,
            BasicKind::UntypedString => BasicKind::String,
            other => other,
        }
    }
}

/// A struct field. Embedded fields are named after their type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructField {
    pub name: InternedString,
    pub ty: TypeId,
    pub embedded: bool,
}

/// An interface method; `signature` is a `Type::Signature`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterfaceMethod {
    pub name: InternedString,
    pub signature: TypeId,
}

/// A type in the Go type system.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Unknown: an unresolved name, an unbound import or a type the checker
    /// does not model. Satisfies nothing.
    Invalid,
    Basic(BasicKind),
    /// A defined type, identified by its type name symbol.
    Named(SymbolId),
    Pointer(TypeId),
    Slice(TypeId),
    Array {
        /// `None` when the length is not a literal.
        length: Option<u64>,
        element: TypeId,
    },
    Map {
        key: TypeId,
        value: TypeId,
    },
    Chan {
        direction: ChanDir,
        element: TypeId,
    },
    Struct(Vec<StructField>),
    /// Methods sorted by name; embedded interfaces are flattened in.
    Interface(Vec<InterfaceMethod>),
    Signature {
        params: Vec<TypeId>,
        results: Vec<TypeId>,
        variadic: bool,
    },
    /// The result of a multi-value call.
    Tuple(Vec<TypeId>),
}

/// The type table stores all types and provides access by TypeId.
#[derive(Debug)]
pub struct TypeTable {
    types: IndexSet<Type>,
    // Well-known types
    pub invalid_type: TypeId,
    pub bool_type: TypeId,
    pub int_type: TypeId,
    pub string_type: TypeId,
    pub untyped_nil_type: TypeId,
    pub empty_interface_type: TypeId,
    pub empty_tuple_type: TypeId,
}

impl TypeTable {
    pub fn new() -> Self {
        let mut table = Self {
            types: IndexSet::with_capacity(256),
            invalid_type: TypeId(0),
            bool_type: TypeId(0),
            int_type: TypeId(0),
            string_type: TypeId(0),
            untyped_nil_type: TypeId(0),
            empty_interface_type: TypeId(0),
            empty_tuple_type: TypeId(0),
        };

        table.invalid_type = table.intern(Type::Invalid);
        table.bool_type = table.basic(BasicKind::Bool);
        table.int_type = table.basic(BasicKind::Int);
        table.string_type = table.basic(BasicKind::String);
        table.untyped_nil_type = table.basic(BasicKind::UntypedNil);
        table.empty_interface_type = table.intern(Type::Interface(Vec::new()));
        table.empty_tuple_type = table.intern(Type::Tuple(Vec::new()));

        table
    }

    /// Add a type to the table, or find the identical type already there.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        let (index, _) = self.types.insert_full(ty);
        TypeId(index as u32)
    }

    pub fn basic(&mut self, kind: BasicKind) -> TypeId {
        self.intern(Type::Basic(kind))
    }

    pub fn pointer(&mut self, base: TypeId) -> TypeId {
        self.intern(Type::Pointer(base))
    }

    pub fn slice(&mut self, element: TypeId) -> TypeId {
        self.intern(Type::Slice(element))
    }

    /// Get a type by its ID. Unknown ids read as `Invalid`.
    pub fn get(&self, id: TypeId) -> &Type {
        self.types.get_index(id.index()).unwrap_or(&Type::Invalid)
    }

    /// Look up a type without adding it.
    pub fn find(&self, ty: &Type) -> Option<TypeId> {
        self.types.get_index_of(ty).map(|index| TypeId(index as u32))
    }

    pub fn is_invalid(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Invalid)
    }

    /// Get the total number of types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}
