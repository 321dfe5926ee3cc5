//! Scope builder and annotation pass.
//!
//! Two passes per scope level: declare names first so source order does not
//! matter, then resolve type names and bodies. Declaration headers (types of
//! state variables, parameters, struct members) are resolved before any
//! function body so that member lookup always sees annotated types.

use std::collections::HashSet;

use sigil_ast::{Arena, BinaryOp, ElementaryType, LiteralKind, NodeId, NodeKind, Span, Type, UnaryOp};

use crate::errors::{suggest, ResolveError, ResolveErrorKind};
use crate::scope::{ScopeId, ScopeKind, ScopeTree};

/// How a unit's imports are resolved against the rest of the compilation.
pub trait ImportContext {
    /// Map an import path string to a known source unit name.
    fn resolve_import(&self, path: &str) -> Option<String>;
    /// Top-level names exported by a unit, used so that references to
    /// imported symbols do not count as undefined.
    fn exported_names(&self, unit: &str) -> Vec<String>;
}

/// Import context for a standalone unit: nothing resolves.
pub struct NoImports;

impl ImportContext for NoImports {
    fn resolve_import(&self, _path: &str) -> Option<String> {
        None
    }
    fn exported_names(&self, _unit: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Result of resolving one source unit.
#[derive(Debug)]
pub struct ResolveOutcome {
    pub scope_tree: ScopeTree,
    pub errors: Vec<ResolveError>,
}

/// Resolve all names in a source unit, writing annotations into the arena.
pub fn resolve(arena: &mut Arena, root: NodeId, imports: &dyn ImportContext) -> ResolveOutcome {
    let mut resolver = Resolver::new(arena);
    resolver.resolve_source_unit(root, imports);
    ResolveOutcome {
        scope_tree: resolver.scope_tree,
        errors: resolver.errors,
    }
}

struct Resolver<'a> {
    arena: &'a mut Arena,
    scope_tree: ScopeTree,
    current_scope: ScopeId,
    errors: Vec<ResolveError>,
    /// Names made visible by imports; they resolve without a target.
    imported_names: HashSet<String>,
    /// Local variables of the function currently being resolved.
    locals: Vec<NodeId>,
    used: HashSet<NodeId>,
}

impl<'a> Resolver<'a> {
    fn new(arena: &'a mut Arena) -> Self {
        let scope_tree = ScopeTree::new();
        let root = scope_tree.root();
        Self {
            arena,
            scope_tree,
            current_scope: root,
            errors: Vec::new(),
            imported_names: HashSet::new(),
            locals: Vec::new(),
            used: HashSet::new(),
        }
    }

    // ---- Scope management ----

    fn enter_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let id = self.scope_tree.add_scope(self.current_scope, kind);
        self.current_scope = id;
        id
    }

    fn exit_scope(&mut self) {
        let parent = self
            .scope_tree
            .scope(self.current_scope)
            .parent
            .expect("cannot exit root scope");
        self.current_scope = parent;
    }

    // ---- Declarations ----

    /// Declare `node` under its name, reporting duplicate definitions.
    fn declare(&mut self, node: NodeId) {
        let Some(ident) = self.arena.node(node).kind.name().cloned() else {
            return;
        };
        let overloadable = matches!(
            self.arena.node(node).kind,
            NodeKind::FunctionDefinition { .. }
        );
        if let Err(existing) =
            self.scope_tree
                .declare(self.current_scope, &ident.name, node, overloadable)
        {
            let previous_span = self
                .arena
                .node(existing)
                .name_location()
                .unwrap_or_else(|| self.arena.node(existing).span);
            self.errors.push(ResolveError::new(
                ResolveErrorKind::DuplicateDefinition {
                    name: ident.name,
                    previous_span,
                },
                ident.span,
            ));
        }
    }

    /// Declare without duplicate reporting; inherited members lose to own.
    fn declare_quiet(&mut self, node: NodeId) {
        if let Some(ident) = self.arena.node(node).kind.name().cloned() {
            let _ = self
                .scope_tree
                .declare(self.current_scope, &ident.name, node, true);
        }
    }

    /// The type an expression referencing this declaration has.
    fn type_of_declaration(&self, decl: NodeId) -> Option<Type> {
        let node = self.arena.node(decl);
        let name = node.kind.name().map(|i| i.name.clone()).unwrap_or_default();
        match &node.kind {
            NodeKind::ContractDefinition { .. } => Some(Type::TypeType(Box::new(
                Type::Contract { declaration: decl, name },
            ))),
            NodeKind::StructDefinition { .. } => Some(Type::TypeType(Box::new(Type::Struct {
                declaration: decl,
                name,
            }))),
            NodeKind::EnumDefinition { .. } => Some(Type::TypeType(Box::new(Type::Enum {
                declaration: decl,
                name,
            }))),
            NodeKind::FunctionDefinition { .. } => Some(Type::Function {
                declaration: decl,
                name,
            }),
            NodeKind::VariableDeclaration { .. }
            | NodeKind::ParameterDeclaration { .. }
            | NodeKind::StructMember { .. }
            | NodeKind::EnumValue { .. } => node.annotation.ty.clone(),
            _ => None,
        }
    }

    /// The type a type name position denotes for this declaration.
    fn named_type(&self, decl: NodeId) -> Option<Type> {
        let node = self.arena.node(decl);
        let name = node.kind.name().map(|i| i.name.clone()).unwrap_or_default();
        match &node.kind {
            NodeKind::ContractDefinition { .. } => Some(Type::Contract { declaration: decl, name }),
            NodeKind::StructDefinition { .. } => Some(Type::Struct { declaration: decl, name }),
            NodeKind::EnumDefinition { .. } => Some(Type::Enum { declaration: decl, name }),
            _ => None,
        }
    }

    // ---- Source unit ----

    fn resolve_source_unit(&mut self, root: NodeId, imports: &dyn ImportContext) {
        let items = self.arena.node(root).kind.children();

        // Pass 1: imports and top-level names.
        for &item in &items {
            match self.arena.node(item).kind.clone() {
                NodeKind::ImportDirective { path } => {
                    match imports.resolve_import(&path) {
                        Some(unit) => {
                            for name in imports.exported_names(&unit) {
                                self.imported_names.insert(name);
                            }
                            self.arena.annotation_mut(item).absolute_path = Some(unit);
                        }
                        None => {
                            let span = self.arena.node(item).span;
                            self.errors.push(ResolveError::new(
                                ResolveErrorKind::ImportNotFound { path },
                                span,
                            ));
                        }
                    }
                }
                kind if kind.is_declaration() => self.declare(item),
                _ => {}
            }
        }

        // Pass 2: headers (types of variables, parameters, members).
        for &item in &items {
            self.resolve_header(item);
        }

        // Pass 3: bodies and initializers.
        for &item in &items {
            self.resolve_body(item);
        }
    }

    /// Resolve the type-level parts of a declaration.
    fn resolve_header(&mut self, item: NodeId) {
        match self.arena.node(item).kind.clone() {
            NodeKind::VariableDeclaration { type_name, .. } => {
                self.resolve_type_name(type_name);
                let ty = self.arena.annotation(type_name).ty.clone();
                self.arena.annotation_mut(item).ty = ty;
            }
            NodeKind::FunctionDefinition {
                name,
                params,
                returns,
                ..
            } => {
                for &param in &params {
                    if let NodeKind::ParameterDeclaration { type_name, .. } =
                        self.arena.node(param).kind.clone()
                    {
                        self.resolve_type_name(type_name);
                        let ty = self.arena.annotation(type_name).ty.clone();
                        self.arena.annotation_mut(param).ty = ty;
                    }
                }
                for &ret in &returns {
                    self.resolve_type_name(ret);
                }
                self.arena.annotation_mut(item).ty = Some(Type::Function {
                    declaration: item,
                    name: name.name,
                });
            }
            NodeKind::StructDefinition { name, members, .. } => {
                self.arena.annotation_mut(item).ty = Some(Type::TypeType(Box::new(Type::Struct {
                    declaration: item,
                    name: name.name,
                })));
                for &member in &members {
                    if let NodeKind::StructMember { type_name, .. } =
                        self.arena.node(member).kind.clone()
                    {
                        self.resolve_type_name(type_name);
                        let ty = self.arena.annotation(type_name).ty.clone();
                        self.arena.annotation_mut(member).ty = ty;
                    }
                }
            }
            NodeKind::EnumDefinition { name, values, .. } => {
                self.arena.annotation_mut(item).ty = Some(Type::TypeType(Box::new(Type::Enum {
                    declaration: item,
                    name: name.name.clone(),
                })));
                for &value in &values {
                    self.arena.annotation_mut(value).ty = Some(Type::Enum {
                        declaration: item,
                        name: name.name.clone(),
                    });
                }
            }
            NodeKind::ContractDefinition { name, members, bases, .. } => {
                self.arena.annotation_mut(item).ty = Some(Type::TypeType(Box::new(
                    Type::Contract {
                        declaration: item,
                        name: name.name,
                    },
                )));
                for &base in &bases {
                    self.resolve_type_name(base);
                }
                // Member headers resolve inside the contract scope so that
                // sibling structs and enums are nameable.
                self.enter_scope(ScopeKind::Contract);
                for &member in &members {
                    self.declare(member);
                }
                for &member in &members {
                    self.resolve_header(member);
                }
                self.exit_scope();
            }
            _ => {}
        }
    }

    /// Resolve initializers and function bodies.
    fn resolve_body(&mut self, item: NodeId) {
        match self.arena.node(item).kind.clone() {
            NodeKind::VariableDeclaration { value, .. } => {
                if let Some(value) = value {
                    self.resolve_expression(value);
                }
            }
            NodeKind::FunctionDefinition { params, body, .. } => {
                self.enter_scope(ScopeKind::Function);
                for &param in &params {
                    self.declare(param);
                }
                let outer_locals = std::mem::take(&mut self.locals);
                if let Some(body) = body {
                    self.resolve_statement(body);
                }
                self.flush_unused_warnings();
                self.locals = outer_locals;
                self.exit_scope();
            }
            NodeKind::ContractDefinition { members, bases, .. } => {
                self.enter_scope(ScopeKind::Contract);
                // Own members first; inherited members never shadow them.
                for &member in &members {
                    self.declare_quiet(member);
                }
                for &base in &bases {
                    let Some(base_decl) = self.arena.annotation(base).referenced_declaration
                    else {
                        continue;
                    };
                    if let NodeKind::ContractDefinition {
                        members: base_members,
                        ..
                    } = self.arena.node(base_decl).kind.clone()
                    {
                        for &member in &base_members {
                            self.declare_quiet(member);
                        }
                    }
                }
                for &member in &members {
                    self.resolve_body(member);
                }
                self.exit_scope();
            }
            _ => {}
        }
    }

    fn flush_unused_warnings(&mut self) {
        let locals = std::mem::take(&mut self.locals);
        for local in locals {
            if !self.used.contains(&local) {
                if let Some(ident) = self.arena.node(local).kind.name() {
                    self.errors.push(ResolveError::new(
                        ResolveErrorKind::UnusedVariable {
                            name: ident.name.clone(),
                        },
                        ident.span,
                    ));
                }
            }
        }
    }

    // ---- Type names ----

    /// Annotate an ElementaryTypeName or IdentifierPath in type position.
    fn resolve_type_name(&mut self, node: NodeId) {
        match self.arena.node(node).kind.clone() {
            NodeKind::ElementaryTypeName { ty } => {
                self.arena.annotation_mut(node).ty = Some(Type::Elementary(ty));
            }
            NodeKind::IdentifierPath { segments } => {
                if segments.is_empty() {
                    return;
                }
                let Some(mut decl) = self.lookup_unique(&segments[0].name, segments[0].span)
                else {
                    return;
                };
                for segment in &segments[1..] {
                    match self.find_type_member(decl, &segment.name) {
                        Some(next) => decl = next,
                        None => {
                            let type_name = self
                                .arena
                                .node(decl)
                                .kind
                                .name()
                                .map(|i| i.name.clone())
                                .unwrap_or_default();
                            self.errors.push(ResolveError::new(
                                ResolveErrorKind::UnknownMember {
                                    member: segment.name.clone(),
                                    type_name,
                                },
                                segment.span,
                            ));
                            return;
                        }
                    }
                }
                self.used.insert(decl);
                let ty = self.named_type(decl);
                let annotation = self.arena.annotation_mut(node);
                annotation.referenced_declaration = Some(decl);
                annotation.ty = ty;
            }
            _ => {}
        }
    }

    /// A type-level member of a contract: nested struct or enum.
    fn find_type_member(&self, decl: NodeId, member: &str) -> Option<NodeId> {
        if let NodeKind::ContractDefinition { members, .. } = &self.arena.node(decl).kind {
            for &m in members {
                let node = self.arena.node(m);
                if matches!(
                    node.kind,
                    NodeKind::StructDefinition { .. } | NodeKind::EnumDefinition { .. }
                ) && node.kind.name().map(|i| i.name.as_str()) == Some(member)
                {
                    return Some(m);
                }
            }
        }
        None
    }

    // ---- Lookup ----

    /// Look up a name expecting a single declaration; errors when absent.
    fn lookup_unique(&mut self, name: &str, span: Span) -> Option<NodeId> {
        let found = self.scope_tree.lookup(self.current_scope, name);
        match found.first() {
            Some(&id) => Some(id),
            None => {
                self.report_undefined(name, span);
                None
            }
        }
    }

    fn report_undefined(&mut self, name: &str, span: Span) {
        if self.imported_names.contains(name) {
            return;
        }
        let candidates = self.scope_tree.names_in_scope(self.current_scope);
        let suggestion = suggest(name, &candidates);
        self.errors.push(ResolveError::new(
            ResolveErrorKind::UndefinedName {
                name: name.to_string(),
                suggestion,
            },
            span,
        ));
    }

    // ---- Statements ----

    fn resolve_statement(&mut self, node: NodeId) {
        match self.arena.node(node).kind.clone() {
            NodeKind::Block { statements } => {
                self.enter_scope(ScopeKind::Block);
                for stmt in statements {
                    self.resolve_statement(stmt);
                }
                self.exit_scope();
            }
            NodeKind::VariableDeclaration {
                type_name, value, ..
            } => {
                self.resolve_type_name(type_name);
                let ty = self.arena.annotation(type_name).ty.clone();
                self.arena.annotation_mut(node).ty = ty;
                if let Some(value) = value {
                    self.resolve_expression(value);
                }
                self.declare(node);
                self.locals.push(node);
            }
            NodeKind::IfStatement {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expression(condition);
                self.resolve_statement(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_statement(else_branch);
                }
            }
            NodeKind::WhileStatement { condition, body } => {
                self.resolve_expression(condition);
                self.resolve_statement(body);
            }
            NodeKind::ReturnStatement { value } => {
                if let Some(value) = value {
                    self.resolve_expression(value);
                }
            }
            NodeKind::ExpressionStatement { expression } => {
                self.resolve_expression(expression);
            }
            _ => {}
        }
    }

    // ---- Expressions ----

    fn resolve_expression(&mut self, node: NodeId) {
        match self.arena.node(node).kind.clone() {
            NodeKind::Identifier { name } => {
                if name.is_empty() {
                    return; // parser error placeholder
                }
                let span = self.arena.node(node).span;
                let found = self.scope_tree.lookup(self.current_scope, &name).to_vec();
                match found.len() {
                    0 => self.report_undefined(&name, span),
                    1 => {
                        let decl = found[0];
                        self.used.insert(decl);
                        let ty = self.type_of_declaration(decl);
                        let annotation = self.arena.annotation_mut(node);
                        annotation.referenced_declaration = Some(decl);
                        annotation.ty = ty;
                    }
                    _ => {
                        for &decl in &found {
                            self.used.insert(decl);
                        }
                        self.arena.annotation_mut(node).candidate_declarations = found;
                    }
                }
            }
            NodeKind::Literal { kind, .. } => {
                let ty = match kind {
                    LiteralKind::Number => Type::Elementary(ElementaryType::Uint),
                    LiteralKind::String => Type::Elementary(ElementaryType::String),
                    LiteralKind::Bool => Type::Elementary(ElementaryType::Bool),
                };
                self.arena.annotation_mut(node).ty = Some(ty);
            }
            NodeKind::MemberAccess { expression, member } => {
                self.resolve_expression(expression);
                let expr_ty = self.arena.annotation(expression).ty.clone();
                self.resolve_member(node, expr_ty, &member.name, member.span);
            }
            NodeKind::FunctionCall { callee, arguments } => {
                self.resolve_expression(callee);
                for arg in arguments {
                    self.resolve_expression(arg);
                }
                let ty = self.call_result_type(callee);
                self.arena.annotation_mut(node).ty = ty;
            }
            NodeKind::Assignment { lhs, rhs } => {
                self.resolve_expression(lhs);
                self.resolve_expression(rhs);
                let ty = self.arena.annotation(lhs).ty.clone();
                self.arena.annotation_mut(node).ty = ty;
            }
            NodeKind::BinaryOperation { op, lhs, rhs } => {
                self.resolve_expression(lhs);
                self.resolve_expression(rhs);
                let ty = match op {
                    BinaryOp::Eq
                    | BinaryOp::NotEq
                    | BinaryOp::Lt
                    | BinaryOp::LtEq
                    | BinaryOp::Gt
                    | BinaryOp::GtEq
                    | BinaryOp::And
                    | BinaryOp::Or => Some(Type::Elementary(ElementaryType::Bool)),
                    _ => self
                        .arena
                        .annotation(lhs)
                        .ty
                        .clone()
                        .or_else(|| self.arena.annotation(rhs).ty.clone()),
                };
                self.arena.annotation_mut(node).ty = ty;
            }
            NodeKind::UnaryOperation { op, operand } => {
                self.resolve_expression(operand);
                let ty = match op {
                    UnaryOp::Not => Some(Type::Elementary(ElementaryType::Bool)),
                    UnaryOp::Neg => self.arena.annotation(operand).ty.clone(),
                };
                self.arena.annotation_mut(node).ty = ty;
            }
            NodeKind::IndexAccess { base, index } => {
                self.resolve_expression(base);
                self.resolve_expression(index);
            }
            _ => {}
        }
    }

    /// Return type of calling `callee`, when it names a single function
    /// with a single declared return.
    fn call_result_type(&self, callee: NodeId) -> Option<Type> {
        let Some(Type::Function { declaration, .. }) = self.arena.annotation(callee).ty.clone()
        else {
            return None;
        };
        if let NodeKind::FunctionDefinition { returns, .. } = &self.arena.node(declaration).kind {
            if returns.len() == 1 {
                return self.arena.annotation(returns[0]).ty.clone();
            }
        }
        None
    }

    /// Resolve `expression.member` given the expression's type.
    fn resolve_member(
        &mut self,
        node: NodeId,
        expr_ty: Option<Type>,
        member: &str,
        member_span: Span,
    ) {
        let Some(expr_ty) = expr_ty else {
            return; // shallow typing: unknown base stays unannotated
        };
        match expr_ty {
            Type::TypeType(inner) => match *inner {
                Type::Enum { declaration, name } => {
                    if let NodeKind::EnumDefinition { values, .. } =
                        self.arena.node(declaration).kind.clone()
                    {
                        for &value in &values {
                            if self.arena.node(value).kind.name().map(|i| i.name.as_str())
                                == Some(member)
                            {
                                self.used.insert(value);
                                let ty = self.arena.annotation(value).ty.clone();
                                let annotation = self.arena.annotation_mut(node);
                                annotation.referenced_declaration = Some(value);
                                annotation.ty = ty;
                                return;
                            }
                        }
                    }
                    self.errors.push(ResolveError::new(
                        ResolveErrorKind::UnknownMember {
                            member: member.to_string(),
                            type_name: format!("enum {}", name),
                        },
                        member_span,
                    ));
                }
                Type::Contract { declaration, name } => {
                    self.resolve_contract_member(node, declaration, &name, member, member_span);
                }
                other => {
                    self.errors.push(ResolveError::new(
                        ResolveErrorKind::UnknownMember {
                            member: member.to_string(),
                            type_name: other.display(),
                        },
                        member_span,
                    ));
                }
            },
            Type::Struct { declaration, name } => {
                if let NodeKind::StructDefinition { members, .. } =
                    self.arena.node(declaration).kind.clone()
                {
                    for &m in &members {
                        if self.arena.node(m).kind.name().map(|i| i.name.as_str()) == Some(member)
                        {
                            self.used.insert(m);
                            let ty = self.arena.annotation(m).ty.clone();
                            let annotation = self.arena.annotation_mut(node);
                            annotation.referenced_declaration = Some(m);
                            annotation.ty = ty;
                            return;
                        }
                    }
                }
                self.errors.push(ResolveError::new(
                    ResolveErrorKind::UnknownMember {
                        member: member.to_string(),
                        type_name: format!("struct {}", name),
                    },
                    member_span,
                ));
            }
            Type::Contract { declaration, name } => {
                self.resolve_contract_member(node, declaration, &name, member, member_span);
            }
            // Elementary values, enum values and functions have no members
            // this resolver knows about; stay silent rather than guess.
            _ => {}
        }
    }

    fn resolve_contract_member(
        &mut self,
        node: NodeId,
        contract: NodeId,
        contract_name: &str,
        member: &str,
        member_span: Span,
    ) {
        if let NodeKind::ContractDefinition { members, .. } =
            self.arena.node(contract).kind.clone()
        {
            let matches: Vec<NodeId> = members
                .iter()
                .copied()
                .filter(|&m| {
                    self.arena.node(m).kind.name().map(|i| i.name.as_str()) == Some(member)
                })
                .collect();
            match matches.len() {
                0 => {}
                1 => {
                    let decl = matches[0];
                    self.used.insert(decl);
                    let ty = self.type_of_declaration(decl);
                    let annotation = self.arena.annotation_mut(node);
                    annotation.referenced_declaration = Some(decl);
                    annotation.ty = ty;
                    return;
                }
                _ => {
                    for &decl in &matches {
                        self.used.insert(decl);
                    }
                    self.arena.annotation_mut(node).candidate_declarations = matches;
                    return;
                }
            }
        }
        self.errors.push(ResolveError::new(
            ResolveErrorKind::UnknownMember {
                member: member.to_string(),
                type_name: format!("contract {}", contract_name),
            },
            member_span,
        ));
    }
}
