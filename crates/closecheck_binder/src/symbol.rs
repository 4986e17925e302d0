//! Symbol and symbol table definitions.

use closecheck_ast::node::*;
use closecheck_ast::types::{NodeId, SymbolFlags, SymbolId};
use closecheck_core::intern::InternedString;
use rustc_hash::FxHashMap;

/// Index of a package bound by a [`crate::Binder`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PackageId(pub u32);

impl PackageId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a symbol was declared. The checker reads the declaration back to
/// compute the symbol's type.
#[derive(Debug, Clone, Copy)]
pub enum SymbolDecl<'a> {
    /// Predeclared in the universe scope.
    Universe,
    /// An imported package name. `package` is `None` when the import path
    /// was not bound.
    Import {
        path: InternedString,
        package: Option<PackageId>,
    },
    Type(&'a TypeSpec<'a>),
    /// The `index`-th name of a `var` or `const` spec.
    Value {
        spec: &'a ValueSpec<'a>,
        index: usize,
    },
    /// A function, or a method when the declaration has a receiver.
    Function(&'a FunctionDeclaration<'a>),
    /// A parameter, result or receiver of the given type.
    Field(&'a Expression<'a>),
    /// The `index`-th name on the left of `:=`.
    Define {
        statement: &'a AssignStatement<'a>,
        index: usize,
    },
    RangeKey(&'a RangeStatement<'a>),
    RangeValue(&'a RangeStatement<'a>),
    /// The implicit per-clause variable of `switch v := x.(type)`.
    TypeSwitch {
        statement: &'a TypeSwitchStatement<'a>,
        clause: &'a CaseClause<'a>,
    },
}

/// A named entity: variable, constant, type, function, method or package.
#[derive(Debug, Clone)]
pub struct Symbol<'a> {
    /// Unique identifier for this symbol.
    pub id: SymbolId,
    /// The name of this symbol (interned).
    pub name: InternedString,
    /// The actual text name of this symbol.
    pub name_text: String,
    /// Symbol flags describing what kind of entity this is.
    pub flags: SymbolFlags,
    /// The defining identifier, or `NodeId::INVALID` for predeclared names.
    pub declaration: NodeId,
    /// The package the symbol belongs to (`None` for the universe).
    pub package: Option<PackageId>,
    pub decl: SymbolDecl<'a>,
}

impl<'a> Symbol<'a> {
    pub fn is_exported(&self) -> bool {
        self.name_text.chars().next().is_some_and(char::is_uppercase)
    }
}

/// A symbol table maps names to symbols.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    table: FxHashMap<InternedString, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            table: FxHashMap::default(),
        }
    }

    pub fn get(&self, name: &InternedString) -> Option<SymbolId> {
        self.table.get(name).copied()
    }

    pub fn set(&mut self, name: InternedString, symbol: SymbolId) {
        self.table.insert(name, symbol);
    }

    pub fn has(&self, name: &InternedString) -> bool {
        self.table.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InternedString, &SymbolId)> {
        self.table.iter()
    }
}

/// A bound package: its import path, name and package-level scope.
#[derive(Debug)]
pub struct Package<'a> {
    pub id: PackageId,
    pub path: String,
    pub name: String,
    pub scope: SymbolTable,
    pub files: Vec<&'a SourceFile<'a>>,
    /// Methods declared in this package, in source order.
    pub methods: Vec<SymbolId>,
}
