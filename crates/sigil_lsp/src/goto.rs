//! Go-to-definition (and implementation, which shares the handler).

use sigil_ast::{Arena, NodeId, NodeKind};
use tracing::debug;

use crate::compiler::{CompilerStack, SourceLocation};

/// Where a declaration's definition is: the name token when it has one,
/// else the whole declaration.
pub fn declaration_position(
    arena: &Arena,
    unit: &str,
    declaration: NodeId,
) -> Option<SourceLocation> {
    let node = arena.node(declaration);
    if let Some(name_location) = node.name_location() {
        if !name_location.is_empty() {
            return Some(SourceLocation::new(name_location, unit));
        }
    }
    if !node.span.is_empty() {
        return Some(SourceLocation::new(node.span, unit));
    }
    None
}

/// Definition targets for the node under the cursor.
pub fn definition_locations(
    stack: &CompilerStack,
    unit: &str,
    node: NodeId,
) -> Vec<SourceLocation> {
    let Some((arena, _root)) = stack.ast(unit) else {
        return Vec::new();
    };
    let n = arena.node(node);
    let annotation = arena.annotation(node);

    match &n.kind {
        NodeKind::Identifier { .. } => annotation
            .referenced_declaration
            .iter()
            .chain(annotation.candidate_declarations.iter())
            .filter_map(|&decl| declaration_position(arena, unit, decl))
            .collect(),
        NodeKind::IdentifierPath { .. } | NodeKind::MemberAccess { .. } => annotation
            .referenced_declaration
            .and_then(|decl| declaration_position(arena, unit, decl))
            .into_iter()
            .collect(),
        NodeKind::ImportDirective { .. } => {
            // Jump to the start of the imported file.
            match &annotation.absolute_path {
                Some(path) if stack.has_unit(path) => vec![SourceLocation {
                    start: 0,
                    end: 0,
                    source_name: Some(path.clone()),
                }],
                _ => Vec::new(),
            }
        }
        kind if kind.is_declaration() => declaration_position(arena, unit, node)
            .into_iter()
            .collect(),
        other => {
            debug!(node = other.label(), "no definition for node variant");
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
