//! Sigil AST.
//!
//! All nodes of one source unit live in a single [`Arena`]; cross-node
//! references (an identifier pointing at the declaration it resolves to) are
//! stable [`NodeId`] indices into that arena, filled in by `sigil_resolve`.
//! The arena is dropped wholesale on recompile, which is what keeps the
//! reference indices trivially valid for the lifetime of one analysis.

pub mod arena;
pub mod common;
pub mod node;
pub mod types;

pub use arena::{Annotation, Arena, Node};
pub use common::{Ident, NodeId, Span};
pub use node::{BinaryOp, LiteralKind, NodeKind, UnaryOp};
pub use types::{ElementaryType, Type};
