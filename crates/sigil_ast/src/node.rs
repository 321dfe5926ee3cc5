//! The tagged sum of AST node variants.
//!
//! One exhaustive enum instead of a class hierarchy: every semantic query
//! dispatches with a single `match`, and a newly added variant is a
//! compile-time error in every query that forgets to handle it.

use crate::common::{Ident, NodeId};
use crate::types::ElementaryType;

/// Binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

/// Unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// Literal kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    String,
    Bool,
}

/// Every AST node variant.
///
/// Child nodes are referenced by [`NodeId`]; fields are listed in source
/// order so [`NodeKind::children`] can recover the traversal order.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Root of a parsed file.
    SourceUnit { items: Vec<NodeId> },
    /// `pragma sigil <ident>;`
    PragmaDirective { tokens: Vec<String> },
    /// `import "<path>";` The resolved absolute path lands in the annotation.
    ImportDirective { path: String },

    // === Declarations ===
    ContractDefinition {
        name: Ident,
        bases: Vec<NodeId>,
        members: Vec<NodeId>,
        doc: Option<String>,
    },
    FunctionDefinition {
        name: Ident,
        params: Vec<NodeId>,
        returns: Vec<NodeId>,
        body: Option<NodeId>,
        doc: Option<String>,
    },
    ParameterDeclaration {
        name: Ident,
        type_name: NodeId,
    },
    /// State variable, file-level constant, or local declaration statement.
    VariableDeclaration {
        name: Ident,
        type_name: NodeId,
        value: Option<NodeId>,
        doc: Option<String>,
    },
    StructDefinition {
        name: Ident,
        members: Vec<NodeId>,
        doc: Option<String>,
    },
    StructMember {
        name: Ident,
        type_name: NodeId,
    },
    EnumDefinition {
        name: Ident,
        values: Vec<NodeId>,
        doc: Option<String>,
    },
    EnumValue { name: Ident },

    // === Type names ===
    ElementaryTypeName { ty: ElementaryType },
    /// Dotted path naming a user-defined type or inherited base.
    IdentifierPath { segments: Vec<Ident> },

    // === Statements ===
    Block { statements: Vec<NodeId> },
    IfStatement {
        condition: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    WhileStatement { condition: NodeId, body: NodeId },
    ReturnStatement { value: Option<NodeId> },
    ExpressionStatement { expression: NodeId },

    // === Expressions ===
    Assignment { lhs: NodeId, rhs: NodeId },
    BinaryOperation {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    UnaryOperation { op: UnaryOp, operand: NodeId },
    FunctionCall { callee: NodeId, arguments: Vec<NodeId> },
    MemberAccess { expression: NodeId, member: Ident },
    IndexAccess { base: NodeId, index: NodeId },
    Identifier { name: String },
    Literal { kind: LiteralKind, value: String },
}

impl NodeKind {
    /// Child node ids, in source order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::SourceUnit { items } => items.clone(),
            NodeKind::PragmaDirective { .. } => vec![],
            NodeKind::ImportDirective { .. } => vec![],
            NodeKind::ContractDefinition { bases, members, .. } => {
                bases.iter().chain(members.iter()).copied().collect()
            }
            NodeKind::FunctionDefinition {
                params,
                returns,
                body,
                ..
            } => params
                .iter()
                .chain(returns.iter())
                .copied()
                .chain(*body)
                .collect(),
            NodeKind::ParameterDeclaration { type_name, .. } => vec![*type_name],
            NodeKind::VariableDeclaration {
                type_name, value, ..
            } => std::iter::once(*type_name).chain(*value).collect(),
            NodeKind::StructDefinition { members, .. } => members.clone(),
            NodeKind::StructMember { type_name, .. } => vec![*type_name],
            NodeKind::EnumDefinition { values, .. } => values.clone(),
            NodeKind::EnumValue { .. } => vec![],
            NodeKind::ElementaryTypeName { .. } => vec![],
            NodeKind::IdentifierPath { .. } => vec![],
            NodeKind::Block { statements } => statements.clone(),
            NodeKind::IfStatement {
                condition,
                then_branch,
                else_branch,
            } => std::iter::once(*condition)
                .chain(std::iter::once(*then_branch))
                .chain(*else_branch)
                .collect(),
            NodeKind::WhileStatement { condition, body } => vec![*condition, *body],
            NodeKind::ReturnStatement { value } => value.iter().copied().collect(),
            NodeKind::ExpressionStatement { expression } => vec![*expression],
            NodeKind::Assignment { lhs, rhs } => vec![*lhs, *rhs],
            NodeKind::BinaryOperation { lhs, rhs, .. } => vec![*lhs, *rhs],
            NodeKind::UnaryOperation { operand, .. } => vec![*operand],
            NodeKind::FunctionCall { callee, arguments } => {
                std::iter::once(*callee).chain(arguments.iter().copied()).collect()
            }
            NodeKind::MemberAccess { expression, .. } => vec![*expression],
            NodeKind::IndexAccess { base, index } => vec![*base, *index],
            NodeKind::Identifier { .. } => vec![],
            NodeKind::Literal { .. } => vec![],
        }
    }

    /// True for variants that introduce a name.
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            NodeKind::ContractDefinition { .. }
                | NodeKind::FunctionDefinition { .. }
                | NodeKind::ParameterDeclaration { .. }
                | NodeKind::VariableDeclaration { .. }
                | NodeKind::StructDefinition { .. }
                | NodeKind::StructMember { .. }
                | NodeKind::EnumDefinition { .. }
                | NodeKind::EnumValue { .. }
                | NodeKind::ImportDirective { .. }
        )
    }

    /// The declared name, for declaration variants that carry one.
    pub fn name(&self) -> Option<&Ident> {
        match self {
            NodeKind::ContractDefinition { name, .. }
            | NodeKind::FunctionDefinition { name, .. }
            | NodeKind::ParameterDeclaration { name, .. }
            | NodeKind::VariableDeclaration { name, .. }
            | NodeKind::StructDefinition { name, .. }
            | NodeKind::StructMember { name, .. }
            | NodeKind::EnumDefinition { name, .. }
            | NodeKind::EnumValue { name } => Some(name),
            _ => None,
        }
    }

    /// Attached `///` documentation, for variants that accept it.
    pub fn doc(&self) -> Option<&str> {
        match self {
            NodeKind::ContractDefinition { doc, .. }
            | NodeKind::FunctionDefinition { doc, .. }
            | NodeKind::VariableDeclaration { doc, .. }
            | NodeKind::StructDefinition { doc, .. }
            | NodeKind::EnumDefinition { doc, .. } => doc.as_deref(),
            _ => None,
        }
    }

    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::SourceUnit { .. } => "SourceUnit",
            NodeKind::PragmaDirective { .. } => "PragmaDirective",
            NodeKind::ImportDirective { .. } => "ImportDirective",
            NodeKind::ContractDefinition { .. } => "ContractDefinition",
            NodeKind::FunctionDefinition { .. } => "FunctionDefinition",
            NodeKind::ParameterDeclaration { .. } => "ParameterDeclaration",
            NodeKind::VariableDeclaration { .. } => "VariableDeclaration",
            NodeKind::StructDefinition { .. } => "StructDefinition",
            NodeKind::StructMember { .. } => "StructMember",
            NodeKind::EnumDefinition { .. } => "EnumDefinition",
            NodeKind::EnumValue { .. } => "EnumValue",
            NodeKind::ElementaryTypeName { .. } => "ElementaryTypeName",
            NodeKind::IdentifierPath { .. } => "IdentifierPath",
            NodeKind::Block { .. } => "Block",
            NodeKind::IfStatement { .. } => "IfStatement",
            NodeKind::WhileStatement { .. } => "WhileStatement",
            NodeKind::ReturnStatement { .. } => "ReturnStatement",
            NodeKind::ExpressionStatement { .. } => "ExpressionStatement",
            NodeKind::Assignment { .. } => "Assignment",
            NodeKind::BinaryOperation { .. } => "BinaryOperation",
            NodeKind::UnaryOperation { .. } => "UnaryOperation",
            NodeKind::FunctionCall { .. } => "FunctionCall",
            NodeKind::MemberAccess { .. } => "MemberAccess",
            NodeKind::IndexAccess { .. } => "IndexAccess",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::Literal { .. } => "Literal",
        }
    }
}
