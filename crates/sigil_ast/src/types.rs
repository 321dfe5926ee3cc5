//! The resolved type model.
//!
//! Deliberately small: just enough structure for member lookup and for the
//! hover rendering. User-defined types point back at their declaring node.

use crate::common::NodeId;
use std::fmt;

/// Built-in value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementaryType {
    Uint,
    Int,
    Bool,
    Address,
    String,
    Bytes,
}

impl ElementaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementaryType::Uint => "uint",
            ElementaryType::Int => "int",
            ElementaryType::Bool => "bool",
            ElementaryType::Address => "address",
            ElementaryType::String => "string",
            ElementaryType::Bytes => "bytes",
        }
    }
}

/// A resolved type.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Elementary(ElementaryType),
    Struct { declaration: NodeId, name: String },
    Enum { declaration: NodeId, name: String },
    Contract { declaration: NodeId, name: String },
    Function { declaration: NodeId, name: String },
    /// The type of a type name used as a value, e.g. `Color` in `Color.Red`.
    TypeType(Box<Type>),
}

impl Type {
    /// Human-readable rendering used by hover tooltips.
    pub fn display(&self) -> String {
        self.to_string()
    }

    /// The declaring node for user-defined types.
    pub fn declaration(&self) -> Option<NodeId> {
        match self {
            Type::Struct { declaration, .. }
            | Type::Enum { declaration, .. }
            | Type::Contract { declaration, .. }
            | Type::Function { declaration, .. } => Some(*declaration),
            Type::TypeType(inner) => inner.declaration(),
            Type::Elementary(_) => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Elementary(e) => write!(f, "{}", e.as_str()),
            Type::Struct { name, .. } => write!(f, "struct {}", name),
            Type::Enum { name, .. } => write!(f, "enum {}", name),
            Type::Contract { name, .. } => write!(f, "contract {}", name),
            Type::Function { name, .. } => write!(f, "function {}", name),
            Type::TypeType(inner) => write!(f, "type({})", inner),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elementary_display() {
        assert_eq!(Type::Elementary(ElementaryType::Uint).display(), "uint");
        assert_eq!(Type::Elementary(ElementaryType::Address).display(), "address");
    }

    #[test]
    fn test_user_defined_display() {
        let t = Type::Struct {
            declaration: 3,
            name: "Point".into(),
        };
        assert_eq!(t.display(), "struct Point");
        assert_eq!(t.declaration(), Some(3));
    }

    #[test]
    fn test_type_type_display() {
        let t = Type::TypeType(Box::new(Type::Enum {
            declaration: 7,
            name: "Color".into(),
        }));
        assert_eq!(t.display(), "type(enum Color)");
        assert_eq!(t.declaration(), Some(7));
    }
}
