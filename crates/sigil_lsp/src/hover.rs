//! Hover tooltips.

use sigil_ast::{Arena, NodeId};

/// Markdown for the symbol at the cursor.
///
/// Documented declarations return their doc text verbatim; otherwise a node
/// with a resolved type renders as a markdown heading. Anything else is
/// `None`, which the dispatcher serializes as a null response.
pub fn hover_markdown(arena: &Arena, node: NodeId) -> Option<String> {
    if let Some(doc) = arena.node(node).kind.doc() {
        if !doc.is_empty() {
            return Some(doc.to_string());
        }
    }

    if let Some(ty) = &arena.annotation(node).ty {
        return Some(format!("## {}\n", ty.display()));
    }

    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
