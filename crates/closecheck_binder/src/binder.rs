//! The binder implementation.
//!
//! Walks the AST of one package at a time and resolves every identifier to
//! the symbol it denotes. Handles:
//! - The universe scope (predeclared types, constants, builtins, `nil`)
//! - Package-level hoisting across all files of a package
//! - File scopes holding imports, including dot imports
//! - Function, block and clause scopes
//! - Go's `:=` rule: only names new to the current scope are declared
//!
//! Selector names, struct field names and composite literal keys are left
//! unresolved; they depend on types and belong to the checker.

use crate::scope::Scope;
use crate::symbol::{Package, PackageId, Symbol, SymbolDecl, SymbolTable};
use closecheck_ast::node::*;
use closecheck_ast::syntax_kind::SyntaxKind;
use closecheck_ast::types::*;
use closecheck_core::intern::{InternedString, StringInterner};
use rustc_hash::FxHashMap;

/// Predeclared type names. `byte`, `rune` and `any` are aliases.
const UNIVERSE_TYPES: &[&str] = &[
    "bool", "byte", "comparable", "complex64", "complex128", "error", "float32", "float64", "int",
    "int8", "int16", "int32", "int64", "rune", "string", "uint", "uint8", "uint16", "uint32",
    "uint64", "uintptr", "any",
];

const UNIVERSE_CONSTANTS: &[&str] = &["true", "false", "iota"];

const UNIVERSE_BUILTINS: &[&str] = &[
    "append", "cap", "clear", "close", "complex", "copy", "delete", "imag", "len", "make", "max",
    "min", "new", "panic", "print", "println", "real", "recover",
];

/// The binder creates symbols and resolves identifiers.
pub struct Binder<'a> {
    interner: StringInterner,
    /// All symbols created during binding, indexed by `SymbolId`.
    symbols: Vec<Symbol<'a>>,
    universe: SymbolTable,
    packages: Vec<Package<'a>>,
    package_by_path: FxHashMap<String, PackageId>,
    /// Local scopes, innermost last. The bottom entry is the file scope.
    scopes: Vec<Scope>,
    current_package: Option<PackageId>,
    /// Identifier node → symbol, for both definitions and uses.
    resolved: FxHashMap<NodeId, SymbolId>,
    blank: InternedString,
}

impl<'a> Binder<'a> {
    pub fn new(interner: &StringInterner) -> Self {
        let mut binder = Self {
            interner: interner.clone(),
            symbols: Vec::new(),
            universe: SymbolTable::new(),
            packages: Vec::new(),
            package_by_path: FxHashMap::default(),
            scopes: Vec::new(),
            current_package: None,
            resolved: FxHashMap::default(),
            blank: interner.intern_static("_"),
        };
        binder.declare_universe();
        binder
    }

    fn declare_universe(&mut self) {
        for &name in UNIVERSE_TYPES {
            let mut flags = SymbolFlags::TYPE_NAME | SymbolFlags::PREDECLARED;
            if matches!(name, "byte" | "rune" | "any") {
                flags |= SymbolFlags::ALIAS;
            }
            self.declare_predeclared(name, flags);
        }
        for &name in UNIVERSE_CONSTANTS {
            self.declare_predeclared(name, SymbolFlags::CONSTANT | SymbolFlags::PREDECLARED);
        }
        for &name in UNIVERSE_BUILTINS {
            self.declare_predeclared(name, SymbolFlags::BUILTIN | SymbolFlags::PREDECLARED);
        }
        self.declare_predeclared("nil", SymbolFlags::NIL | SymbolFlags::PREDECLARED);
    }

    fn declare_predeclared(&mut self, name: &'static str, flags: SymbolFlags) {
        let interned = self.interner.intern_static(name);
        let id = self.create_symbol(interned, flags, NodeId::INVALID, SymbolDecl::Universe);
        self.universe.set(interned, id);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Get all symbols created by this binder.
    pub fn symbols(&self) -> &[Symbol<'a>] {
        &self.symbols
    }

    /// Get a symbol by ID.
    pub fn get_symbol(&self, id: SymbolId) -> Option<&Symbol<'a>> {
        self.symbols.get(id.index())
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// The symbol an identifier node defines or refers to.
    pub fn symbol_of(&self, node: NodeId) -> Option<SymbolId> {
        self.resolved.get(&node).copied()
    }

    pub fn packages(&self) -> &[Package<'a>] {
        &self.packages
    }

    pub fn package(&self, id: PackageId) -> Option<&Package<'a>> {
        self.packages.get(id.index())
    }

    pub fn package_by_path(&self, path: &str) -> Option<PackageId> {
        self.package_by_path.get(path).copied()
    }

    /// Look up a package-level name of a bound package.
    pub fn lookup_in_package(&self, package: PackageId, name: &str) -> Option<SymbolId> {
        let name = self.interner.get(name)?;
        self.package(package)?.scope.get(&name)
    }

    pub fn lookup_universe(&self, name: &str) -> Option<SymbolId> {
        let name = self.interner.get(name)?;
        self.universe.get(&name)
    }

    // ========================================================================
    // Package binding
    // ========================================================================

    /// Bind all files of one package. Packages must be bound after the
    /// packages they import; an import of an unbound path still yields a
    /// package name, just without members.
    pub fn bind_package(&mut self, path: &str, files: &[&'a SourceFile<'a>]) -> PackageId {
        let id = PackageId(self.packages.len() as u32);
        let name = files
            .first()
            .map(|f| self.interner.resolve(f.package_name.name).to_string())
            .unwrap_or_default();
        self.packages.push(Package {
            id,
            path: path.to_string(),
            name,
            scope: SymbolTable::new(),
            files: files.to_vec(),
            methods: Vec::new(),
        });
        self.package_by_path.insert(path.to_string(), id);
        self.current_package = Some(id);

        for &file in files {
            self.hoist_declarations(file);
        }
        for &file in files {
            self.bind_source_file(file);
        }
        self.current_package = None;
        id
    }

    // ========================================================================
    // Hoisting
    // ========================================================================

    /// Declare every package-level name before any body is bound, so that
    /// declaration order across files does not matter.
    fn hoist_declarations(&mut self, file: &'a SourceFile<'a>) {
        for decl in file.declarations.iter() {
            match decl {
                Declaration::Gen(gen) => {
                    let is_const = gen.keyword == SyntaxKind::ConstKeyword;
                    for spec in gen.specs.iter() {
                        self.hoist_spec(spec, is_const);
                    }
                }
                Declaration::Function(func) => self.hoist_function(func),
            }
        }
    }

    fn hoist_spec(&mut self, spec: &'a Spec<'a>, is_const: bool) {
        match spec {
            Spec::Value(value) => {
                let kind = if is_const {
                    SymbolFlags::CONSTANT
                } else {
                    SymbolFlags::VARIABLE
                };
                for (index, name) in value.names.iter().enumerate() {
                    let decl = SymbolDecl::Value { spec: value, index };
                    self.declare_package_level(name, kind | SymbolFlags::PACKAGE_LEVEL, decl);
                }
            }
            Spec::Type(ty) => {
                let mut flags = SymbolFlags::TYPE_NAME | SymbolFlags::PACKAGE_LEVEL;
                if ty.is_alias {
                    flags |= SymbolFlags::ALIAS;
                }
                self.declare_package_level(&ty.name, flags, SymbolDecl::Type(ty));
            }
        }
    }

    fn hoist_function(&mut self, func: &'a FunctionDeclaration<'a>) {
        if func.receiver.is_some() {
            let id = self.create_symbol(
                func.name.name,
                SymbolFlags::FUNCTION | SymbolFlags::METHOD,
                func.name.data.id,
                SymbolDecl::Function(func),
            );
            self.resolved.insert(func.name.data.id, id);
            if let Some(package) = self.current_package {
                self.packages[package.index()].methods.push(id);
            }
            return;
        }
        // `init` functions cannot be referred to.
        if self.interner.resolve(func.name.name) == "init" {
            let id = self.create_symbol(
                func.name.name,
                SymbolFlags::FUNCTION | SymbolFlags::PACKAGE_LEVEL,
                func.name.data.id,
                SymbolDecl::Function(func),
            );
            self.resolved.insert(func.name.data.id, id);
            return;
        }
        self.declare_package_level(
            &func.name,
            SymbolFlags::FUNCTION | SymbolFlags::PACKAGE_LEVEL,
            SymbolDecl::Function(func),
        );
    }

    fn declare_package_level(&mut self, name: &Identifier, flags: SymbolFlags, decl: SymbolDecl<'a>) {
        if name.name == self.blank {
            return;
        }
        let Some(package) = self.current_package else {
            return;
        };
        if let Some(existing) = self.packages[package.index()].scope.get(&name.name) {
            // First declaration wins; the duplicate still resolves to it.
            self.resolved.insert(name.data.id, existing);
            return;
        }
        let id = self.create_symbol(name.name, flags, name.data.id, decl);
        self.resolved.insert(name.data.id, id);
        self.packages[package.index()].scope.set(name.name, id);
    }

    // ========================================================================
    // Source file binding
    // ========================================================================

    fn bind_source_file(&mut self, file: &'a SourceFile<'a>) {
        self.scopes.push(Scope::new());
        for import in file.imports.iter() {
            self.bind_import(import);
        }
        for decl in file.declarations.iter() {
            match decl {
                Declaration::Gen(gen) => self.bind_gen_declaration(gen, true),
                Declaration::Function(func) => self.bind_function_declaration(func),
            }
        }
        self.scopes.clear();
    }

    fn bind_import(&mut self, import: &'a ImportSpec) {
        let package = self.package_by_path(self.interner.resolve(import.path));
        let local_name = match import.name {
            Some(alias) => {
                let text = self.interner.resolve(alias.name);
                if text == "_" {
                    return;
                }
                if text == "." {
                    self.bind_dot_import(package);
                    return;
                }
                alias.name
            }
            None => match package.and_then(|p| self.package(p)) {
                Some(p) => self.interner.intern(&p.name),
                None => {
                    let path = self.interner.resolve(import.path);
                    let last = path.rsplit('/').next().unwrap_or(path).to_string();
                    self.interner.intern(&last)
                }
            },
        };
        let declaration = import.name.map(|n| n.data.id).unwrap_or(NodeId::INVALID);
        let id = self.create_symbol(
            local_name,
            SymbolFlags::PACKAGE_NAME,
            declaration,
            SymbolDecl::Import {
                path: import.path,
                package,
            },
        );
        if declaration.is_valid() {
            self.resolved.insert(declaration, id);
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.locals.set(local_name, id);
        }
    }

    /// `import . "path"` makes the package's exported names file-local.
    fn bind_dot_import(&mut self, package: Option<PackageId>) {
        let Some(package) = package.and_then(|p| self.packages.get(p.index())) else {
            return;
        };
        let exported: Vec<(InternedString, SymbolId)> = package
            .scope
            .iter()
            .filter(|(_, id)| self.symbols[id.index()].is_exported())
            .map(|(name, id)| (*name, *id))
            .collect();
        if let Some(scope) = self.scopes.last_mut() {
            for (name, id) in exported {
                scope.locals.set(name, id);
            }
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn bind_gen_declaration(&mut self, gen: &'a GenDeclaration<'a>, package_level: bool) {
        let is_const = gen.keyword == SyntaxKind::ConstKeyword;
        for spec in gen.specs.iter() {
            match spec {
                Spec::Value(value) => {
                    if let Some(ty) = value.type_expr {
                        self.bind_expression(ty);
                    }
                    // Repeated const expressions were bound with their spec.
                    if !value.data.flags.contains(NodeFlags::SYNTHESIZED) {
                        for v in value.values.iter() {
                            self.bind_expression(v);
                        }
                    }
                    if package_level {
                        continue;
                    }
                    let flags = if is_const {
                        SymbolFlags::CONSTANT
                    } else {
                        SymbolFlags::VARIABLE
                    };
                    for (index, name) in value.names.iter().enumerate() {
                        self.declare_local(name, flags, SymbolDecl::Value { spec: value, index });
                    }
                }
                Spec::Type(ty) => {
                    if !package_level {
                        let mut flags = SymbolFlags::TYPE_NAME;
                        if ty.is_alias {
                            flags |= SymbolFlags::ALIAS;
                        }
                        // The type name is in scope within its own definition.
                        self.declare_local(&ty.name, flags, SymbolDecl::Type(ty));
                    }
                    self.bind_expression(ty.type_expr);
                }
            }
        }
    }

    fn bind_function_declaration(&mut self, func: &'a FunctionDeclaration<'a>) {
        self.scopes.push(Scope::new());
        if let Some(receiver) = func.receiver {
            self.bind_fields(receiver, SymbolFlags::RECEIVER);
        }
        self.bind_signature(func.signature);
        if let Some(body) = func.body {
            self.bind_statements(body.statements);
        }
        self.scopes.pop();
    }

    fn bind_signature(&mut self, signature: &'a FunctionTypeNode<'a>) {
        self.bind_fields(signature.parameters, SymbolFlags::PARAMETER);
        if let Some(results) = signature.results {
            self.bind_fields(results, SymbolFlags::RESULT);
        }
    }

    /// Bind the types of a parameter-like list, then declare its names.
    fn bind_fields(&mut self, list: &'a FieldList<'a>, flags: SymbolFlags) {
        for field in list.fields.iter() {
            self.bind_expression(field.type_expr);
        }
        for field in list.fields.iter() {
            for name in field.names.iter() {
                self.declare_local(name, flags | SymbolFlags::VARIABLE, SymbolDecl::Field(field.type_expr));
            }
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn bind_statements(&mut self, statements: &'a [Statement<'a>]) {
        for statement in statements.iter() {
            self.bind_statement(statement);
        }
    }

    fn bind_block(&mut self, statements: &'a [Statement<'a>]) {
        self.scopes.push(Scope::new());
        self.bind_statements(statements);
        self.scopes.pop();
    }

    fn bind_statement(&mut self, stmt: &'a Statement<'a>) {
        match stmt {
            Statement::Bad(_) | Statement::Empty(_) | Statement::Branch(_) => {}
            Statement::Declaration(gen) => self.bind_gen_declaration(gen, false),
            Statement::Labeled(n) => self.bind_statement(n.statement),
            Statement::Expression(n) => self.bind_expression(n.expression),
            Statement::Send(n) => {
                self.bind_expression(n.channel);
                self.bind_expression(n.value);
            }
            Statement::IncDec(n) => self.bind_expression(n.expression),
            Statement::Assign(n) => self.bind_assign_statement(n),
            Statement::Go(n) => self.bind_expression(n.call),
            Statement::Defer(n) => self.bind_expression(n.call),
            Statement::Return(n) => {
                for result in n.results.iter() {
                    self.bind_expression(result);
                }
            }
            Statement::Block(n) => self.bind_block(n.statements),
            Statement::If(n) => self.bind_if_statement(n),
            Statement::Switch(n) => self.bind_switch_statement(n),
            Statement::TypeSwitch(n) => self.bind_type_switch_statement(n),
            Statement::Select(n) => {
                for clause in n.clauses.iter() {
                    self.scopes.push(Scope::new());
                    if let Some(comm) = clause.comm {
                        self.bind_statement(comm);
                    }
                    self.bind_statements(clause.body);
                    self.scopes.pop();
                }
            }
            Statement::For(n) => self.bind_for_statement(n),
            Statement::Range(n) => self.bind_range_statement(n),
        }
    }

    fn bind_assign_statement(&mut self, node: &'a AssignStatement<'a>) {
        for rhs in node.rhs.iter() {
            self.bind_expression(rhs);
        }
        if !node.is_define() {
            for lhs in node.lhs.iter() {
                self.bind_expression(lhs);
            }
            return;
        }
        for (index, lhs) in node.lhs.iter().enumerate() {
            if let Expression::Identifier(name) = lhs {
                self.declare_or_reuse(name, SymbolDecl::Define { statement: node, index });
            }
        }
    }

    fn bind_if_statement(&mut self, node: &'a IfStatement<'a>) {
        self.scopes.push(Scope::new());
        if let Some(init) = node.init {
            self.bind_statement(init);
        }
        self.bind_expression(node.condition);
        self.bind_block(node.then_block.statements);
        if let Some(else_statement) = node.else_statement {
            self.bind_statement(else_statement);
        }
        self.scopes.pop();
    }

    fn bind_switch_statement(&mut self, node: &'a SwitchStatement<'a>) {
        self.scopes.push(Scope::new());
        if let Some(init) = node.init {
            self.bind_statement(init);
        }
        if let Some(tag) = node.tag {
            self.bind_expression(tag);
        }
        for clause in node.clauses.iter() {
            self.scopes.push(Scope::new());
            for e in clause.expressions.unwrap_or(&[]).iter() {
                self.bind_expression(e);
            }
            self.bind_statements(clause.body);
            self.scopes.pop();
        }
        self.scopes.pop();
    }

    fn bind_type_switch_statement(&mut self, node: &'a TypeSwitchStatement<'a>) {
        self.scopes.push(Scope::new());
        if let Some(init) = node.init {
            self.bind_statement(init);
        }
        self.bind_expression(node.subject);
        for clause in node.clauses.iter() {
            self.scopes.push(Scope::new());
            for e in clause.expressions.unwrap_or(&[]).iter() {
                self.bind_expression(e);
            }
            // Each clause gets its own variable; the binding identifier
            // itself denotes none of them.
            if let Some(binding) = node.binding {
                if binding.name != self.blank {
                    let id = self.create_symbol(
                        binding.name,
                        SymbolFlags::VARIABLE,
                        binding.data.id,
                        SymbolDecl::TypeSwitch { statement: node, clause },
                    );
                    if let Some(scope) = self.scopes.last_mut() {
                        scope.locals.set(binding.name, id);
                    }
                }
            }
            self.bind_statements(clause.body);
            self.scopes.pop();
        }
        self.scopes.pop();
    }

    fn bind_for_statement(&mut self, node: &'a ForStatement<'a>) {
        self.scopes.push(Scope::new());
        if let Some(init) = node.init {
            self.bind_statement(init);
        }
        if let Some(condition) = node.condition {
            self.bind_expression(condition);
        }
        if let Some(post) = node.post {
            self.bind_statement(post);
        }
        self.bind_block(node.body.statements);
        self.scopes.pop();
    }

    fn bind_range_statement(&mut self, node: &'a RangeStatement<'a>) {
        self.scopes.push(Scope::new());
        self.bind_expression(node.range_expression);
        if node.is_define {
            if let Some(Expression::Identifier(key)) = node.key {
                self.declare_local(key, SymbolFlags::VARIABLE, SymbolDecl::RangeKey(node));
            }
            if let Some(Expression::Identifier(value)) = node.value {
                self.declare_local(value, SymbolFlags::VARIABLE, SymbolDecl::RangeValue(node));
            }
        } else {
            for e in [node.key, node.value].into_iter().flatten() {
                self.bind_expression(e);
            }
        }
        self.bind_block(node.body.statements);
        self.scopes.pop();
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn bind_expression(&mut self, expr: &'a Expression<'a>) {
        match expr {
            Expression::Bad(_) | Expression::BasicLiteral(_) => {}
            Expression::Identifier(id) => self.resolve_identifier(id),
            Expression::CompositeLiteral(n) => {
                if let Some(ty) = n.type_expr {
                    self.bind_expression(ty);
                }
                for element in n.elements.iter() {
                    match element {
                        // A bare key is a field name or a map key; only the
                        // checker can tell which.
                        Expression::KeyValue(kv) => {
                            if kv.key.as_identifier().is_none() {
                                self.bind_expression(kv.key);
                            }
                            self.bind_expression(kv.value);
                        }
                        other => self.bind_expression(other),
                    }
                }
            }
            Expression::FunctionLiteral(n) => {
                self.scopes.push(Scope::new());
                self.bind_signature(n.signature);
                self.bind_statements(n.body.statements);
                self.scopes.pop();
            }
            Expression::Parenthesized(n) => self.bind_expression(n.expression),
            Expression::Selector(n) => self.bind_expression(n.expression),
            Expression::Index(n) => {
                self.bind_expression(n.expression);
                self.bind_expression(n.index);
            }
            Expression::Slice(n) => {
                self.bind_expression(n.expression);
                for e in [n.low, n.high, n.max].into_iter().flatten() {
                    self.bind_expression(e);
                }
            }
            Expression::TypeAssert(n) => {
                self.bind_expression(n.expression);
                if let Some(ty) = n.type_expr {
                    self.bind_expression(ty);
                }
            }
            Expression::Call(n) => {
                self.bind_expression(n.function);
                for argument in n.arguments.iter() {
                    self.bind_expression(argument);
                }
            }
            Expression::Star(n) => self.bind_expression(n.expression),
            Expression::Unary(n) => self.bind_expression(n.operand),
            Expression::Binary(n) => {
                self.bind_expression(n.left);
                self.bind_expression(n.right);
            }
            Expression::KeyValue(n) => {
                self.bind_expression(n.key);
                self.bind_expression(n.value);
            }
            Expression::Ellipsis(n) => {
                if let Some(element) = n.element {
                    self.bind_expression(element);
                }
            }
            Expression::ArrayType(n) => {
                if let Some(length) = n.length {
                    self.bind_expression(length);
                }
                self.bind_expression(n.element);
            }
            Expression::StructType(n) => self.bind_field_types(n.fields),
            Expression::FunctionType(n) => {
                self.bind_field_types(n.parameters);
                if let Some(results) = n.results {
                    self.bind_field_types(results);
                }
            }
            Expression::InterfaceType(n) => self.bind_field_types(n.methods),
            Expression::MapType(n) => {
                self.bind_expression(n.key);
                self.bind_expression(n.value);
            }
            Expression::ChanType(n) => self.bind_expression(n.element),
        }
    }

    /// Resolve the types in a field list without declaring its names.
    fn bind_field_types(&mut self, list: &'a FieldList<'a>) {
        for field in list.fields.iter() {
            self.bind_expression(field.type_expr);
        }
    }

    // ========================================================================
    // Symbol resolution
    // ========================================================================

    fn resolve_identifier(&mut self, id: &Identifier) {
        if let Some(symbol) = self.resolve_name(&id.name) {
            self.resolved.insert(id.data.id, symbol);
        }
    }

    /// Resolve a name through local scopes, the package scope and the
    /// universe, innermost first.
    pub fn resolve_name(&self, name: &InternedString) -> Option<SymbolId> {
        if *name == self.blank {
            return None;
        }
        for scope in self.scopes.iter().rev() {
            if let Some(id) = scope.lookup(name) {
                return Some(id);
            }
        }
        if let Some(package) = self.current_package {
            if let Some(id) = self.packages[package.index()].scope.get(name) {
                return Some(id);
            }
        }
        self.universe.get(name)
    }

    // ========================================================================
    // Symbol declaration
    // ========================================================================

    fn create_symbol(
        &mut self,
        name: InternedString,
        flags: SymbolFlags,
        declaration: NodeId,
        decl: SymbolDecl<'a>,
    ) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            id,
            name,
            name_text: self.interner.resolve(name).to_string(),
            flags,
            declaration,
            package: self.current_package,
            decl,
        });
        id
    }

    /// Declare a name in the innermost scope. Blank names get no symbol.
    fn declare_local(&mut self, name: &Identifier, flags: SymbolFlags, decl: SymbolDecl<'a>) -> Option<SymbolId> {
        if name.name == self.blank {
            return None;
        }
        let id = self.create_symbol(name.name, flags, name.data.id, decl);
        self.resolved.insert(name.data.id, id);
        if let Some(scope) = self.scopes.last_mut() {
            scope.locals.set(name.name, id);
        }
        Some(id)
    }

    /// `:=` declares a name only if the innermost scope does not already
    /// hold it; otherwise the name is assigned to.
    fn declare_or_reuse(&mut self, name: &Identifier, decl: SymbolDecl<'a>) {
        if name.name == self.blank {
            return;
        }
        let existing = self.scopes.last().and_then(|scope| scope.lookup(&name.name));
        match existing {
            Some(id) => {
                self.resolved.insert(name.data.id, id);
            }
            None => {
                self.declare_local(name, SymbolFlags::VARIABLE, decl);
            }
        }
    }
}
