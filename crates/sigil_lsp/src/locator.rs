//! Find the AST node under a byte offset.

use sigil_ast::{Arena, NodeId};

/// The deepest node whose span contains `offset`, or `None`.
///
/// Descends only into children that contain the offset; when spans coincide
/// the node visited last wins, which prefers the deepest and, among
/// siblings, the latest parsed.
pub fn locate_node(arena: &Arena, root: NodeId, offset: u32) -> Option<NodeId> {
    let mut best = None;
    visit(arena, root, offset, &mut best);
    best
}

fn visit(arena: &Arena, id: NodeId, offset: u32, best: &mut Option<NodeId>) {
    let node = arena.node(id);
    if !node.span.contains_offset(offset) {
        return;
    }
    *best = Some(id);
    for child in node.kind.children() {
        visit(arena, child, offset, best);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_ast::NodeKind;
    use sigil_parser::parse;

    fn locate_in(source: &str, offset: u32) -> Option<&'static str> {
        let result = parse(source);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        locate_node(&result.arena, result.root, offset)
            .map(|id| result.arena.node(id).kind.label())
    }

    #[test]
    fn test_locates_identifier_at_use() {
        // offset of `f` inside g's body.
        let source = "function f() {} function g() { f(); }";
        let offset = source.rfind("f()").unwrap() as u32;
        assert_eq!(locate_in(source, offset), Some("Identifier"));
    }

    #[test]
    fn test_locates_type_name() {
        let source = "contract C { uint x; }";
        let offset = source.find("uint").unwrap() as u32;
        assert_eq!(locate_in(source, offset), Some("ElementaryTypeName"));
    }

    #[test]
    fn test_locates_declaration_on_name() {
        let source = "contract C { uint x; }";
        let offset = source.find('x').unwrap() as u32;
        // The name token is not a child node; the innermost covering node
        // is the declaration itself.
        assert_eq!(locate_in(source, offset), Some("VariableDeclaration"));
    }

    #[test]
    fn test_offset_outside_everything() {
        let source = "contract C {}";
        assert_eq!(locate_in(source, 9999), None);
    }

    #[test]
    fn test_deepest_wins() {
        let source = "function f() { return 1 + 2; }";
        let offset = source.find('1').unwrap() as u32;
        assert_eq!(locate_in(source, offset), Some("Literal"));
    }

    #[test]
    fn test_member_access_member_token() {
        let source = "struct P { uint x; }\nfunction f() { P p; p.x = 1; }";
        let offset = (source.rfind(".x").unwrap() + 1) as u32;
        let result = parse(source);
        let located = locate_node(&result.arena, result.root, offset).unwrap();
        assert!(matches!(
            result.arena.node(located).kind,
            NodeKind::MemberAccess { .. }
        ));
    }
}
