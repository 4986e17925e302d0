//! The type checker implementation.
//!
//! Computes the static type of every symbol the binder created: declared
//! types, the inferred types of `:=`, `var`, range and type-switch
//! variables, parameters and results, and function signatures. It also
//! answers method-set questions (value versus pointer receivers, embedded
//! promotion, interfaces) that structural queries are built on.
//!
//! Nothing here reports errors. Unresolved names, unbound imports and
//! constructs outside the modelled subset produce `Type::Invalid`.

use crate::shape::{InterfaceShape, MethodShape, ShapeType};
use crate::types::{BasicKind, InterfaceMethod, StructField, Type, TypeTable};
use closecheck_ast::node::*;
use closecheck_ast::syntax_kind::SyntaxKind;
use closecheck_ast::types::*;
use closecheck_binder::{Binder, SymbolDecl};
use closecheck_core::intern::{InternedString, StringInterner};
use rustc_hash::{FxHashMap, FxHashSet};

/// Maximum depth of embedded fields searched for promoted members.
const MAX_EMBEDDING_DEPTH: usize = 16;

/// Maximum recursion depth for type stringification to prevent stack overflow.
const MAX_TYPE_TO_STRING_DEPTH: u32 = 20;

/// A method declared on a defined type.
#[derive(Debug, Clone, Copy)]
pub struct MethodInfo {
    pub name: InternedString,
    /// The method's symbol; its type is the method signature.
    pub symbol: SymbolId,
    /// Declared with a `*T` receiver.
    pub pointer_receiver: bool,
}

/// What a selector `x.name` denotes on a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member {
    Field(TypeId),
    Method {
        signature: TypeId,
        /// The method has a pointer receiver but was reached without any
        /// pointer indirection, so it is not in the value's method set.
        needs_pointer: bool,
    },
}

/// The type checker resolves the types of symbols and expressions.
pub struct Checker<'a> {
    /// The type table (type arena).
    pub type_table: TypeTable,
    /// The binder with symbol information.
    binder: Binder<'a>,
    interner: StringInterner,
    /// Symbol → type. For type names this is the type the name denotes.
    symbol_types: FxHashMap<SymbolId, TypeId>,
    /// Defined type symbol → underlying type.
    underlying: FxHashMap<SymbolId, TypeId>,
    /// Defined type symbol → methods declared on it.
    methods: FxHashMap<SymbolId, Vec<MethodInfo>>,
    /// Defined types whose members have been resolved.
    prepared: FxHashSet<SymbolId>,
    /// The predeclared `error` type.
    error_type: TypeId,
}

impl<'a> Checker<'a> {
    pub fn new(binder: Binder<'a>) -> Self {
        let interner = binder.interner().clone();
        let type_table = TypeTable::new();
        let error_type = type_table.invalid_type;
        let mut checker = Self {
            type_table,
            binder,
            interner,
            symbol_types: FxHashMap::default(),
            underlying: FxHashMap::default(),
            methods: FxHashMap::default(),
            prepared: FxHashSet::default(),
            error_type,
        };
        checker.declare_error_type();
        checker.collect_methods();
        checker
    }

    /// `error` is a defined type whose underlying type is
    /// `interface{ Error() string }`.
    fn declare_error_type(&mut self) {
        let Some(symbol) = self.binder.lookup_universe("error") else {
            return;
        };
        let string = self.type_table.string_type;
        let signature = self.type_table.intern(Type::Signature {
            params: Vec::new(),
            results: vec![string],
            variadic: false,
        });
        let name = self.interner.intern_static("Error");
        let interface = self
            .type_table
            .intern(Type::Interface(vec![InterfaceMethod { name, signature }]));
        self.error_type = self.type_table.intern(Type::Named(symbol));
        self.underlying.insert(symbol, interface);
        self.symbol_types.insert(symbol, self.error_type);
    }

    /// Attach every method declaration to its receiver's base type.
    fn collect_methods(&mut self) {
        let mut found = Vec::new();
        for package in self.binder.packages() {
            for &method in &package.methods {
                let Some(symbol) = self.binder.get_symbol(method) else {
                    continue;
                };
                let SymbolDecl::Function(func) = symbol.decl else {
                    continue;
                };
                let Some(receiver) = func.receiver.and_then(|r| r.fields.first()) else {
                    continue;
                };
                let (base, pointer_receiver) = match receiver.type_expr.unparen() {
                    Expression::Star(star) => (star.expression.unparen(), true),
                    other => (other, false),
                };
                let Some(base) = base.as_identifier() else {
                    continue;
                };
                let Some(owner) = self.binder.symbol_of(base.data.id) else {
                    continue;
                };
                found.push((
                    owner,
                    MethodInfo {
                        name: symbol.name,
                        symbol: method,
                        pointer_receiver,
                    },
                ));
            }
        }
        for (owner, info) in found {
            self.methods.entry(owner).or_default().push(info);
        }
    }

    /// Resolve the type of every symbol and the underlying type of every
    /// defined type. Afterwards the `&self` queries below see complete
    /// information.
    pub fn check(&mut self) {
        for index in 0..self.binder.symbol_count() {
            let id = SymbolId(index as u32);
            self.get_type_of_symbol(id);
            let is_defined_type = self
                .binder
                .get_symbol(id)
                .is_some_and(|s| matches!(s.decl, SymbolDecl::Type(spec) if !spec.is_alias));
            if is_defined_type {
                let named = self.type_table.intern(Type::Named(id));
                self.prepare_members(named, 0);
            }
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn binder(&self) -> &Binder<'a> {
        &self.binder
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// The predeclared `error` type.
    pub fn error_type(&self) -> TypeId {
        self.error_type
    }

    /// The type of a symbol, or `Invalid` if it was never resolved.
    pub fn type_of_symbol(&self, symbol: SymbolId) -> TypeId {
        self.symbol_types
            .get(&symbol)
            .copied()
            .unwrap_or(self.type_table.invalid_type)
    }

    /// The type of the symbol an identifier defines or refers to.
    pub fn type_of_identifier(&self, id: &Identifier) -> Option<TypeId> {
        self.binder
            .symbol_of(id.data.id)
            .map(|symbol| self.type_of_symbol(symbol))
    }

    /// The underlying type. Only defined types differ from their underlying
    /// type.
    pub fn underlying(&self, ty: TypeId) -> TypeId {
        match self.type_table.get(ty) {
            Type::Named(symbol) => self
                .underlying
                .get(symbol)
                .copied()
                .unwrap_or(self.type_table.invalid_type),
            _ => ty,
        }
    }

    pub fn methods_of(&self, owner: SymbolId) -> &[MethodInfo] {
        self.methods.get(&owner).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Types are interned, so identity is id equality.
    pub fn identical(&self, a: TypeId, b: TypeId) -> bool {
        a == b && !self.type_table.is_invalid(a)
    }

    /// Look up `name` as a field or method of `ty`, searching embedded
    /// fields breadth first. A name found twice at the shallowest depth is
    /// ambiguous and yields `None`.
    pub fn lookup_member(&self, ty: TypeId, name: InternedString) -> Option<Member> {
        let (start, via_pointer) = match self.type_table.get(ty) {
            Type::Pointer(base) => (*base, true),
            _ => (ty, false),
        };
        if let Type::Interface(methods) = self.type_table.get(self.underlying(start)) {
            // A pointer to an interface has no methods.
            if via_pointer {
                return None;
            }
            return methods.iter().find(|m| m.name == name).map(|m| Member::Method {
                signature: m.signature,
                needs_pointer: false,
            });
        }

        let mut level = vec![(start, via_pointer)];
        let mut seen = FxHashSet::default();
        for depth in 0..MAX_EMBEDDING_DEPTH {
            let mut found = None;
            let mut matches = 0;
            let mut next = Vec::new();
            for (current, via_pointer) in level {
                if let Type::Named(owner) = self.type_table.get(current) {
                    if !seen.insert(*owner) {
                        continue;
                    }
                    if let Some(method) = self.methods_of(*owner).iter().find(|m| m.name == name) {
                        matches += 1;
                        found = Some(Member::Method {
                            signature: self.type_of_symbol(method.symbol),
                            needs_pointer: method.pointer_receiver && !via_pointer,
                        });
                    }
                }
                match self.type_table.get(self.underlying(current)) {
                    Type::Struct(fields) => {
                        for field in fields {
                            if field.name == name {
                                matches += 1;
                                found = Some(Member::Field(field.ty));
                            }
                            if field.embedded {
                                match self.type_table.get(field.ty) {
                                    Type::Pointer(inner) => next.push((*inner, true)),
                                    _ => next.push((field.ty, via_pointer)),
                                }
                            }
                        }
                    }
                    // An interface embedded in a struct promotes its methods.
                    Type::Interface(methods) if depth > 0 => {
                        if let Some(m) = methods.iter().find(|m| m.name == name) {
                            matches += 1;
                            found = Some(Member::Method {
                                signature: m.signature,
                                needs_pointer: false,
                            });
                        }
                    }
                    _ => {}
                }
            }
            match matches {
                0 => {}
                1 => return found,
                _ => return None,
            }
            if next.is_empty() {
                break;
            }
            level = next;
        }
        None
    }

    /// The signature of method `name` if it is in the method set of `ty`.
    pub fn method_set_signature(&self, ty: TypeId, name: InternedString) -> Option<TypeId> {
        match self.lookup_member(ty, name)? {
            Member::Method {
                signature,
                needs_pointer: false,
            } => Some(signature),
            _ => None,
        }
    }

    /// Whether the method set of `ty` contains every method of `shape`
    /// with exactly the described signature. Invalid types implement
    /// nothing.
    pub fn implements_shape(&self, ty: TypeId, shape: &InterfaceShape) -> bool {
        if self.type_table.is_invalid(ty) {
            return false;
        }
        shape.methods.iter().all(|method| self.has_method_shape(ty, method))
    }

    fn has_method_shape(&self, ty: TypeId, method: &MethodShape) -> bool {
        // A name nobody interned cannot be declared anywhere.
        let Some(name) = self.interner.get(method.name) else {
            return false;
        };
        let Some(signature) = self.method_set_signature(ty, name) else {
            return false;
        };
        match self.type_table.get(signature) {
            Type::Signature {
                params,
                results,
                variadic,
            } => {
                !variadic
                    && self.matches_shape_types(params, method.params)
                    && self.matches_shape_types(results, method.results)
            }
            _ => false,
        }
    }

    fn matches_shape_types(&self, types: &[TypeId], shapes: &[ShapeType]) -> bool {
        types.len() == shapes.len()
            && types.iter().zip(shapes).all(|(&ty, shape)| match shape {
                ShapeType::Error => ty == self.error_type,
                ShapeType::Basic(kind) => self.type_table.find(&Type::Basic(*kind)) == Some(ty),
            })
    }

    // ========================================================================
    // Symbol types
    // ========================================================================

    fn get_type_of_symbol(&mut self, id: SymbolId) -> TypeId {
        if let Some(&ty) = self.symbol_types.get(&id) {
            return ty;
        }
        let invalid = self.type_table.invalid_type;
        let Some(symbol) = self.binder.get_symbol(id) else {
            return invalid;
        };
        let (flags, name, decl) = (symbol.flags, symbol.name, symbol.decl);

        // A symbol whose type depends on itself is invalid.
        self.symbol_types.insert(id, invalid);
        let ty = match decl {
            SymbolDecl::Universe => self.get_universe_type(flags, name),
            SymbolDecl::Import { .. } => invalid,
            SymbolDecl::Type(spec) => {
                if spec.is_alias {
                    self.get_type_from_type_expression(spec.type_expr)
                } else {
                    self.type_table.intern(Type::Named(id))
                }
            }
            SymbolDecl::Value { spec, index } => {
                if let Some(type_expr) = spec.type_expr {
                    self.get_type_from_type_expression(type_expr)
                } else {
                    let ty = self.get_assigned_type(spec.names.len(), spec.values, index);
                    // Untyped constants stay untyped until used.
                    if flags.contains(SymbolFlags::CONSTANT) {
                        ty
                    } else {
                        self.default_type(ty)
                    }
                }
            }
            SymbolDecl::Function(func) => self.get_signature_type(func.signature),
            SymbolDecl::Field(type_expr) => self.get_parameter_type(type_expr),
            SymbolDecl::Define { statement, index } => {
                let ty = self.get_assigned_type(statement.lhs.len(), statement.rhs, index);
                self.default_type(ty)
            }
            SymbolDecl::RangeKey(node) => self.get_range_types(node).0,
            SymbolDecl::RangeValue(node) => self.get_range_types(node).1,
            SymbolDecl::TypeSwitch { statement, clause } => {
                self.get_type_switch_variable_type(statement, clause)
            }
        };
        self.symbol_types.insert(id, ty);
        ty
    }

    fn get_universe_type(&mut self, flags: SymbolFlags, name: InternedString) -> TypeId {
        let text = self.interner.resolve(name);
        if flags.contains(SymbolFlags::TYPE_NAME) {
            // `any` and `comparable` have no methods.
            return match BasicKind::from_name(text) {
                Some(kind) => self.type_table.basic(kind),
                None => self.type_table.empty_interface_type,
            };
        }
        if flags.contains(SymbolFlags::CONSTANT) {
            let kind = if text == "iota" {
                BasicKind::UntypedInt
            } else {
                BasicKind::UntypedBool
            };
            return self.type_table.basic(kind);
        }
        if flags.contains(SymbolFlags::NIL) {
            return self.type_table.untyped_nil_type;
        }
        // Builtins have no type of their own; calls to them are typed in
        // `check_builtin_call`.
        self.type_table.invalid_type
    }

    /// The type of the `index`-th of `count` names assigned from `values`:
    /// either one value per name, or a single multi-value expression.
    fn get_assigned_type(&mut self, count: usize, values: &'a [Expression<'a>], index: usize) -> TypeId {
        let invalid = self.type_table.invalid_type;
        if values.len() == count {
            let ty = match values.get(index) {
                Some(value) => self.check_expression(value),
                None => invalid,
            };
            // A multi-value call cannot initialize a single name.
            return match self.type_table.get(ty) {
                Type::Tuple(_) => invalid,
                _ => ty,
            };
        }
        match values {
            [single] => {
                let types = self.check_multi_value(single);
                // Mismatched counts leave every name untyped.
                if types.len() != count {
                    return invalid;
                }
                types.get(index).copied().unwrap_or(invalid)
            }
            _ => invalid,
        }
    }

    fn get_parameter_type(&mut self, type_expr: &'a Expression<'a>) -> TypeId {
        match type_expr {
            Expression::Ellipsis(ellipsis) => {
                let element = match ellipsis.element {
                    Some(element) => self.get_type_from_type_expression(element),
                    None => self.type_table.invalid_type,
                };
                self.type_table.slice(element)
            }
            other => self.get_type_from_type_expression(other),
        }
    }

    fn get_range_types(&mut self, node: &'a RangeStatement<'a>) -> (TypeId, TypeId) {
        let invalid = self.type_table.invalid_type;
        let ranged = self.check_expression(node.range_expression);
        let ranged = self.default_type(ranged);
        let mut under = self.get_underlying_type(ranged);
        // Ranging over a pointer to an array ranges over the array.
        if let Type::Pointer(base) = *self.type_table.get(under) {
            let base = self.get_underlying_type(base);
            if matches!(self.type_table.get(base), Type::Array { .. }) {
                under = base;
            }
        }
        match self.type_table.get(under).clone() {
            Type::Basic(BasicKind::String) => {
                let rune = self.type_table.basic(BasicKind::Int32);
                (self.type_table.int_type, rune)
            }
            // Go 1.22 range over an integer.
            Type::Basic(kind) if is_integer(kind) => (ranged, invalid),
            Type::Slice(element) | Type::Array { element, .. } => (self.type_table.int_type, element),
            Type::Map { key, value } => (key, value),
            Type::Chan { element, .. } => (element, invalid),
            _ => (invalid, invalid),
        }
    }

    /// In a clause listing exactly one type the variable has that type;
    /// otherwise it has the type of the switch subject.
    fn get_type_switch_variable_type(
        &mut self,
        statement: &'a TypeSwitchStatement<'a>,
        clause: &'a CaseClause<'a>,
    ) -> TypeId {
        if let Some([single]) = clause.expressions {
            if !self.is_nil(single) {
                return self.get_type_from_type_expression(single);
            }
        }
        self.check_expression(statement.subject)
    }

    /// Lazily compute the underlying type of a defined type.
    fn get_underlying_of_named(&mut self, symbol: SymbolId) -> TypeId {
        if let Some(&ty) = self.underlying.get(&symbol) {
            return ty;
        }
        let invalid = self.type_table.invalid_type;
        self.underlying.insert(symbol, invalid);
        let decl = self.binder.get_symbol(symbol).map(|s| s.decl);
        let ty = match decl {
            Some(SymbolDecl::Type(spec)) => {
                let rhs = self.get_type_from_type_expression(spec.type_expr);
                self.get_underlying_type(rhs)
            }
            _ => invalid,
        };
        self.underlying.insert(symbol, ty);
        ty
    }

    fn get_underlying_type(&mut self, ty: TypeId) -> TypeId {
        match *self.type_table.get(ty) {
            Type::Named(symbol) => self.get_underlying_of_named(symbol),
            _ => ty,
        }
    }

    /// Resolve everything `lookup_member` reads for `ty`: underlying types
    /// and method signatures of it and its embedded fields.
    fn prepare_members(&mut self, ty: TypeId, depth: usize) {
        if depth > MAX_EMBEDDING_DEPTH {
            return;
        }
        let base = match *self.type_table.get(ty) {
            Type::Pointer(base) => base,
            _ => ty,
        };
        if let Type::Named(symbol) = *self.type_table.get(base) {
            if !self.prepared.insert(symbol) {
                return;
            }
            let methods: Vec<SymbolId> = self.methods_of(symbol).iter().map(|m| m.symbol).collect();
            for method in methods {
                self.get_type_of_symbol(method);
            }
        }
        let under = self.get_underlying_type(base);
        if let Type::Struct(fields) = self.type_table.get(under) {
            let embedded: Vec<TypeId> = fields.iter().filter(|f| f.embedded).map(|f| f.ty).collect();
            for field in embedded {
                self.prepare_members(field, depth + 1);
            }
        }
    }

    fn default_type(&mut self, ty: TypeId) -> TypeId {
        match *self.type_table.get(ty) {
            Type::Basic(kind) if kind.is_untyped() => self.type_table.basic(kind.default_kind()),
            _ => ty,
        }
    }

    // ========================================================================
    // Type expressions
    // ========================================================================

    /// The type a type expression denotes.
    pub fn get_type_from_type_expression(&mut self, expr: &'a Expression<'a>) -> TypeId {
        let invalid = self.type_table.invalid_type;
        match expr {
            Expression::Identifier(id) => {
                let symbol = self.binder.symbol_of(id.data.id);
                self.get_type_of_type_name(symbol)
            }
            Expression::Selector(selector) => {
                let symbol = self.package_member(selector);
                self.get_type_of_type_name(symbol)
            }
            Expression::Parenthesized(n) => self.get_type_from_type_expression(n.expression),
            Expression::Star(n) => {
                let base = self.get_type_from_type_expression(n.expression);
                self.type_table.pointer(base)
            }
            Expression::ArrayType(n) => {
                let element = self.get_type_from_type_expression(n.element);
                match n.length {
                    None => self.type_table.slice(element),
                    Some(length) => {
                        let length = self.array_length(length);
                        self.type_table.intern(Type::Array { length, element })
                    }
                }
            }
            Expression::MapType(n) => {
                let key = self.get_type_from_type_expression(n.key);
                let value = self.get_type_from_type_expression(n.value);
                self.type_table.intern(Type::Map { key, value })
            }
            Expression::ChanType(n) => {
                let element = self.get_type_from_type_expression(n.element);
                self.type_table.intern(Type::Chan {
                    direction: n.direction,
                    element,
                })
            }
            Expression::FunctionType(n) => self.get_signature_type(n),
            Expression::StructType(n) => self.get_struct_type(n.fields),
            Expression::InterfaceType(n) => self.get_interface_type(n.methods),
            Expression::Ellipsis(_) => self.get_parameter_type(expr),
            _ => invalid,
        }
    }

    fn get_type_of_type_name(&mut self, symbol: Option<SymbolId>) -> TypeId {
        match symbol {
            Some(symbol) if self.is_type_symbol(symbol) => self.get_type_of_symbol(symbol),
            _ => self.type_table.invalid_type,
        }
    }

    fn array_length(&self, expr: &Expression<'a>) -> Option<u64> {
        match expr {
            Expression::BasicLiteral(lit) if lit.kind == SyntaxKind::IntLiteral => {
                let text = self.interner.resolve(lit.value).replace('_', "");
                text.parse().ok()
            }
            _ => None,
        }
    }

    fn get_signature_type(&mut self, signature: &'a FunctionTypeNode<'a>) -> TypeId {
        let (params, variadic) = self.get_field_list_types(signature.parameters);
        let results = match signature.results {
            Some(results) => self.get_field_list_types(results).0,
            None => Vec::new(),
        };
        self.type_table.intern(Type::Signature {
            params,
            results,
            variadic,
        })
    }

    /// One type per value the list describes, and whether the last
    /// parameter is variadic.
    fn get_field_list_types(&mut self, list: &'a FieldList<'a>) -> (Vec<TypeId>, bool) {
        let mut types = Vec::with_capacity(list.arity());
        let mut variadic = false;
        for (index, field) in list.fields.iter().enumerate() {
            if index + 1 == list.fields.len() && matches!(field.type_expr, Expression::Ellipsis(_)) {
                variadic = true;
            }
            let ty = self.get_parameter_type(field.type_expr);
            for _ in 0..field.names.len().max(1) {
                types.push(ty);
            }
        }
        (types, variadic)
    }

    fn get_struct_type(&mut self, list: &'a FieldList<'a>) -> TypeId {
        let mut fields = Vec::new();
        for field in list.fields.iter() {
            let ty = self.get_type_from_type_expression(field.type_expr);
            if field.names.is_empty() {
                if let Some(name) = embedded_field_name(field.type_expr) {
                    fields.push(StructField {
                        name,
                        ty,
                        embedded: true,
                    });
                }
            } else {
                for name in field.names.iter() {
                    fields.push(StructField {
                        name: name.name,
                        ty,
                        embedded: false,
                    });
                }
            }
        }
        self.type_table.intern(Type::Struct(fields))
    }

    fn get_interface_type(&mut self, list: &'a FieldList<'a>) -> TypeId {
        let mut methods: Vec<InterfaceMethod> = Vec::new();
        for field in list.fields.iter() {
            if field.names.is_empty() {
                let embedded = self.get_type_from_type_expression(field.type_expr);
                let under = self.get_underlying_type(embedded);
                if let Type::Interface(inner) = self.type_table.get(under) {
                    for method in inner.clone() {
                        push_method(&mut methods, method);
                    }
                }
            } else if let Expression::FunctionType(signature) = field.type_expr {
                let signature = self.get_signature_type(signature);
                for name in field.names.iter() {
                    push_method(
                        &mut methods,
                        InterfaceMethod {
                            name: name.name,
                            signature,
                        },
                    );
                }
            }
        }
        methods.sort_by_key(|m| m.name);
        self.type_table.intern(Type::Interface(methods))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// The type of a single-valued expression. Calls of functions with
    /// several results produce a `Tuple`.
    pub fn check_expression(&mut self, expr: &'a Expression<'a>) -> TypeId {
        let invalid = self.type_table.invalid_type;
        match expr {
            Expression::Identifier(id) => self.check_identifier(id),
            Expression::BasicLiteral(lit) => {
                let kind = match lit.kind {
                    SyntaxKind::IntLiteral => BasicKind::UntypedInt,
                    SyntaxKind::FloatLiteral => BasicKind::UntypedFloat,
                    SyntaxKind::ImaginaryLiteral => BasicKind::UntypedComplex,
                    SyntaxKind::RuneLiteral => BasicKind::UntypedRune,
                    SyntaxKind::StringLiteral => BasicKind::UntypedString,
                    _ => return invalid,
                };
                self.type_table.basic(kind)
            }
            Expression::CompositeLiteral(n) => match n.type_expr {
                // `[...]T{a, b}` has as many elements as it lists.
                Some(Expression::ArrayType(array))
                    if matches!(array.length, Some(Expression::Ellipsis(_))) =>
                {
                    let element = self.get_type_from_type_expression(array.element);
                    self.type_table.intern(Type::Array {
                        length: Some(n.elements.len() as u64),
                        element,
                    })
                }
                Some(type_expr) => self.get_type_from_type_expression(type_expr),
                None => invalid,
            },
            Expression::FunctionLiteral(n) => self.get_signature_type(n.signature),
            Expression::Parenthesized(n) => self.check_expression(n.expression),
            Expression::Selector(n) => self.check_selector_expression(n),
            Expression::Index(n) => {
                let base = self.check_expression(n.expression);
                self.get_element_type(base)
            }
            Expression::Slice(n) => self.check_slice_expression(n),
            Expression::TypeAssert(n) => match n.type_expr {
                Some(type_expr) => self.get_type_from_type_expression(type_expr),
                None => invalid,
            },
            Expression::Call(n) => self.check_call_expression(n),
            Expression::Star(n) => {
                let base = self.check_expression(n.expression);
                let under = self.get_underlying_type(base);
                match *self.type_table.get(under) {
                    Type::Pointer(element) => element,
                    _ => invalid,
                }
            }
            Expression::Unary(n) => match n.operator {
                SyntaxKind::AmpersandToken => {
                    let operand = self.check_expression(n.operand);
                    self.type_table.pointer(operand)
                }
                SyntaxKind::LessThanMinusToken => {
                    let channel = self.check_expression(n.operand);
                    self.get_channel_element(channel)
                }
                _ => self.check_expression(n.operand),
            },
            Expression::Binary(n) => self.check_binary_expression(n),
            _ => invalid,
        }
    }

    fn check_identifier(&mut self, id: &Identifier) -> TypeId {
        match self.binder.symbol_of(id.data.id) {
            // A type name is not a value.
            Some(symbol) if !self.is_type_symbol(symbol) => self.get_type_of_symbol(symbol),
            _ => self.type_table.invalid_type,
        }
    }

    /// The types of an expression on the right of a multi-name assignment,
    /// including the comma-ok forms.
    fn check_multi_value(&mut self, expr: &'a Expression<'a>) -> Vec<TypeId> {
        let ok = self.type_table.bool_type;
        match expr.unparen() {
            Expression::Index(n) => {
                let base = self.check_expression(n.expression);
                vec![self.get_element_type(base), ok]
            }
            Expression::TypeAssert(n) => {
                let asserted = match n.type_expr {
                    Some(type_expr) => self.get_type_from_type_expression(type_expr),
                    None => self.type_table.invalid_type,
                };
                vec![asserted, ok]
            }
            Expression::Unary(n) if n.operator == SyntaxKind::LessThanMinusToken => {
                let channel = self.check_expression(n.operand);
                vec![self.get_channel_element(channel), ok]
            }
            other => {
                let ty = self.check_expression(other);
                match self.type_table.get(ty) {
                    Type::Tuple(items) => items.clone(),
                    _ => vec![ty],
                }
            }
        }
    }

    fn check_selector_expression(&mut self, node: &'a SelectorExpression<'a>) -> TypeId {
        let invalid = self.type_table.invalid_type;
        if self.is_package_qualifier(node.expression) {
            return match self.package_member(node) {
                Some(member) if !self.is_type_symbol(member) => self.get_type_of_symbol(member),
                _ => invalid,
            };
        }
        let receiver = self.check_expression(node.expression);
        self.prepare_members(receiver, 0);
        match self.lookup_member(receiver, node.name.name) {
            Some(Member::Field(ty)) => ty,
            Some(Member::Method { signature, .. }) => signature,
            None => invalid,
        }
    }

    fn check_slice_expression(&mut self, node: &'a SliceExpression<'a>) -> TypeId {
        let base = self.check_expression(node.expression);
        let under = self.get_underlying_type(base);
        match self.type_table.get(under).clone() {
            Type::Basic(BasicKind::String | BasicKind::UntypedString) => self.type_table.string_type,
            Type::Slice(_) => base,
            Type::Array { element, .. } => self.type_table.slice(element),
            Type::Pointer(inner) => {
                let inner = self.get_underlying_type(inner);
                match *self.type_table.get(inner) {
                    Type::Array { element, .. } => self.type_table.slice(element),
                    _ => self.type_table.invalid_type,
                }
            }
            _ => self.type_table.invalid_type,
        }
    }

    fn check_call_expression(&mut self, node: &'a CallExpression<'a>) -> TypeId {
        let callee = node.function.unparen();
        // `T(x)` is a conversion.
        if self.is_type_expression(callee) {
            return self.get_type_from_type_expression(callee);
        }
        if let Expression::Identifier(id) = callee {
            let builtin = self
                .binder
                .symbol_of(id.data.id)
                .and_then(|s| self.binder.get_symbol(s))
                .filter(|s| s.flags.contains(SymbolFlags::BUILTIN))
                .map(|s| s.name_text.clone());
            if let Some(name) = builtin {
                return self.check_builtin_call(&name, node);
            }
        }
        let function = self.check_expression(callee);
        let under = self.get_underlying_type(function);
        match self.type_table.get(under).clone() {
            Type::Signature { results, .. } => match results.len() {
                0 => self.type_table.empty_tuple_type,
                1 => results[0],
                _ => self.type_table.intern(Type::Tuple(results)),
            },
            _ => self.type_table.invalid_type,
        }
    }

    fn check_builtin_call(&mut self, name: &str, node: &'a CallExpression<'a>) -> TypeId {
        let first = node.arguments.first();
        match (name, first) {
            ("len" | "cap" | "copy", _) => self.type_table.int_type,
            ("new", Some(arg)) => {
                let element = self.get_type_from_type_expression(arg);
                self.type_table.pointer(element)
            }
            ("make", Some(arg)) => self.get_type_from_type_expression(arg),
            ("append", Some(arg)) => self.check_expression(arg),
            ("min" | "max", Some(arg)) => {
                let ty = self.check_expression(arg);
                self.default_type(ty)
            }
            ("recover", _) => self.type_table.empty_interface_type,
            ("complex", _) => self.type_table.basic(BasicKind::Complex128),
            ("real" | "imag", _) => self.type_table.basic(BasicKind::Float64),
            ("new" | "make" | "append" | "min" | "max", None) => self.type_table.invalid_type,
            _ => self.type_table.empty_tuple_type,
        }
    }

    fn check_binary_expression(&mut self, node: &'a BinaryExpression<'a>) -> TypeId {
        match node.operator {
            SyntaxKind::EqualsEqualsToken
            | SyntaxKind::ExclamationEqualsToken
            | SyntaxKind::LessThanToken
            | SyntaxKind::LessThanEqualsToken
            | SyntaxKind::GreaterThanToken
            | SyntaxKind::GreaterThanEqualsToken
            | SyntaxKind::AmpersandAmpersandToken
            | SyntaxKind::BarBarToken => self.type_table.basic(BasicKind::UntypedBool),
            SyntaxKind::LessThanLessThanToken | SyntaxKind::GreaterThanGreaterThanToken => {
                self.check_expression(node.left)
            }
            _ => {
                let left = self.check_expression(node.left);
                let right = self.check_expression(node.right);
                match (self.untyped_kind(left), self.untyped_kind(right)) {
                    (Some(_), None) => right,
                    (Some(l), Some(r)) if untyped_rank(r) > untyped_rank(l) => right,
                    _ => left,
                }
            }
        }
    }

    fn get_element_type(&mut self, base: TypeId) -> TypeId {
        let mut under = self.get_underlying_type(base);
        if let Type::Pointer(inner) = *self.type_table.get(under) {
            let inner = self.get_underlying_type(inner);
            if matches!(self.type_table.get(inner), Type::Array { .. }) {
                under = inner;
            }
        }
        match self.type_table.get(under).clone() {
            Type::Basic(BasicKind::String | BasicKind::UntypedString) => {
                self.type_table.basic(BasicKind::Uint8)
            }
            Type::Slice(element) | Type::Array { element, .. } => element,
            Type::Map { value, .. } => value,
            _ => self.type_table.invalid_type,
        }
    }

    fn get_channel_element(&mut self, channel: TypeId) -> TypeId {
        let under = self.get_underlying_type(channel);
        match *self.type_table.get(under) {
            Type::Chan { element, .. } => element,
            _ => self.type_table.invalid_type,
        }
    }

    // ========================================================================
    // Name helpers
    // ========================================================================

    fn is_type_symbol(&self, symbol: SymbolId) -> bool {
        self.binder
            .get_symbol(symbol)
            .is_some_and(|s| s.flags.contains(SymbolFlags::TYPE_NAME))
    }

    fn is_nil(&self, expr: &Expression<'_>) -> bool {
        match expr.unparen() {
            Expression::Identifier(id) => self
                .binder
                .symbol_of(id.data.id)
                .and_then(|s| self.binder.get_symbol(s))
                .is_some_and(|s| s.flags.contains(SymbolFlags::NIL)),
            _ => false,
        }
    }

    fn is_package_qualifier(&self, expr: &Expression<'_>) -> bool {
        match expr.unparen() {
            Expression::Identifier(id) => self
                .binder
                .symbol_of(id.data.id)
                .and_then(|s| self.binder.get_symbol(s))
                .is_some_and(|s| s.flags.contains(SymbolFlags::PACKAGE_NAME)),
            _ => false,
        }
    }

    /// The symbol `pkg.Name` refers to, if the qualifier is an import of a
    /// bound package that declares `Name`.
    fn package_member(&self, selector: &SelectorExpression<'_>) -> Option<SymbolId> {
        let Expression::Identifier(qualifier) = selector.expression.unparen() else {
            return None;
        };
        let symbol = self.binder.get_symbol(self.binder.symbol_of(qualifier.data.id)?)?;
        let SymbolDecl::Import {
            package: Some(package),
            ..
        } = symbol.decl
        else {
            return None;
        };
        self.binder.package(package)?.scope.get(&selector.name.name)
    }

    fn is_type_expression(&self, expr: &Expression<'_>) -> bool {
        match expr.unparen() {
            Expression::Identifier(id) => self
                .binder
                .symbol_of(id.data.id)
                .is_some_and(|s| self.is_type_symbol(s)),
            Expression::Selector(selector) => self
                .package_member(selector)
                .is_some_and(|s| self.is_type_symbol(s)),
            Expression::Star(star) => self.is_type_expression(star.expression),
            Expression::ArrayType(_)
            | Expression::StructType(_)
            | Expression::FunctionType(_)
            | Expression::InterfaceType(_)
            | Expression::MapType(_)
            | Expression::ChanType(_) => true,
            _ => false,
        }
    }

    fn untyped_kind(&self, ty: TypeId) -> Option<BasicKind> {
        match self.type_table.get(ty) {
            Type::Basic(kind) if kind.is_untyped() => Some(*kind),
            _ => None,
        }
    }

    // ========================================================================
    // Type to string
    // ========================================================================

    /// Render a type the way Go prints it.
    pub fn type_to_string(&self, ty: TypeId) -> String {
        self.type_to_string_inner(ty, 0)
    }

    fn type_to_string_inner(&self, ty: TypeId, depth: u32) -> String {
        if depth > MAX_TYPE_TO_STRING_DEPTH {
            return "...".to_string();
        }
        let inner = |t: TypeId| self.type_to_string_inner(t, depth + 1);
        let list = |types: &[TypeId]| types.iter().map(|&t| inner(t)).collect::<Vec<_>>().join(", ");
        match self.type_table.get(ty) {
            Type::Invalid => "invalid type".to_string(),
            Type::Basic(kind) => kind.name().to_string(),
            Type::Named(symbol) => match self.binder.get_symbol(*symbol) {
                Some(s) => match s.package.and_then(|p| self.binder.package(p)) {
                    Some(package) => format!("{}.{}", package.name, s.name_text),
                    None => s.name_text.clone(),
                },
                None => "invalid type".to_string(),
            },
            Type::Pointer(base) => format!("*{}", inner(*base)),
            Type::Slice(element) => format!("[]{}", inner(*element)),
            Type::Array { length, element } => match length {
                Some(n) => format!("[{}]{}", n, inner(*element)),
                None => format!("[?]{}", inner(*element)),
            },
            Type::Map { key, value } => format!("map[{}]{}", inner(*key), inner(*value)),
            Type::Chan { direction, element } => {
                let prefix = if *direction == ChanDir::SEND {
                    "chan<- "
                } else if *direction == ChanDir::RECV {
                    "<-chan "
                } else {
                    "chan "
                };
                format!("{}{}", prefix, inner(*element))
            }
            Type::Struct(fields) => {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|f| {
                        if f.embedded {
                            inner(f.ty)
                        } else {
                            format!("{} {}", self.interner.resolve(f.name), inner(f.ty))
                        }
                    })
                    .collect();
                format!("struct{{{}}}", fields.join("; "))
            }
            Type::Interface(methods) => {
                let methods: Vec<String> = methods
                    .iter()
                    .map(|m| {
                        let signature = inner(m.signature);
                        let signature = signature.strip_prefix("func").unwrap_or(&signature);
                        format!("{}{}", self.interner.resolve(m.name), signature)
                    })
                    .collect();
                format!("interface{{{}}}", methods.join("; "))
            }
            Type::Signature {
                params,
                results,
                variadic,
            } => {
                let mut params_text = list(params);
                if *variadic {
                    // The last parameter is stored as a slice.
                    if let Some(pos) = params_text.rfind("[]") {
                        params_text.replace_range(pos..pos + 2, "...");
                    }
                }
                match results.as_slice() {
                    [] => format!("func({})", params_text),
                    [single] => format!("func({}) {}", params_text, inner(*single)),
                    _ => format!("func({}) ({})", params_text, list(results)),
                }
            }
            Type::Tuple(items) => format!("({})", list(items)),
        }
    }
}

fn push_method(methods: &mut Vec<InterfaceMethod>, method: InterfaceMethod) {
    if !methods.iter().any(|m| m.name == method.name) {
        methods.push(method);
    }
}

/// The implicit name of an embedded field: the type name without any
/// pointer or package qualifier.
fn embedded_field_name(expr: &Expression<'_>) -> Option<InternedString> {
    match expr.unparen() {
        Expression::Identifier(id) => Some(id.name),
        Expression::Selector(selector) => Some(selector.name.name),
        Expression::Star(star) => embedded_field_name(star.expression),
        _ => None,
    }
}

fn is_integer(kind: BasicKind) -> bool {
    matches!(
        kind,
        BasicKind::Int
            | BasicKind::Int8
            | BasicKind::Int16
            | BasicKind::Int32
            | BasicKind::Int64
            | BasicKind::Uint
            | BasicKind::Uint8
            | BasicKind::Uint16
            | BasicKind::Uint32
            | BasicKind::Uint64
            | BasicKind::Uintptr
    )
}

/// Untyped operands of mixed kinds take the later kind in this order.
fn untyped_rank(kind: BasicKind) -> u8 {
    match kind {
        BasicKind::UntypedInt => 1,
        BasicKind::UntypedRune => 2,
        BasicKind::UntypedFloat => 3,
        BasicKind::UntypedComplex => 4,
        _ => 0,
    }
}
