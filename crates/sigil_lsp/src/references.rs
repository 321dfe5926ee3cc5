//! Reference collection: all semantically equivalent occurrences of a
//! declaration within one source unit.
//!
//! Occurrence detection is annotation-driven; the identifier name passed in
//! is only used to pick among overloaded candidates. Output is in source
//! order with identical ranges suppressed.

use sigil_ast::{Arena, NodeId, NodeKind, Span};

/// LSP document highlight kinds. `Unspecified` is serialized by omission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightKind {
    Text = 1,
    Read = 2,
    Write = 3,
    Unspecified = 0,
}

/// A highlighted occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHighlight {
    pub span: Span,
    pub kind: HighlightKind,
}

/// Collect the declaration's name site plus every reference to it.
pub fn collect(
    arena: &Arena,
    root: NodeId,
    declaration: NodeId,
    identifier_name: &str,
) -> Vec<DocumentHighlight> {
    let mut output = Vec::new();

    if let Some(name_location) = arena.node(declaration).name_location() {
        output.push(DocumentHighlight {
            span: name_location,
            kind: HighlightKind::Text,
        });
    }

    let mut collector = Collector {
        arena,
        declaration,
        identifier_name,
        output: &mut output,
    };
    collector.visit(root, false);

    output.sort_by_key(|h| (h.span.start, h.span.end));
    output.dedup_by(|a, b| a.span == b.span);
    output
}

struct Collector<'a> {
    arena: &'a Arena,
    declaration: NodeId,
    identifier_name: &'a str,
    output: &'a mut Vec<DocumentHighlight>,
}

impl<'a> Collector<'a> {
    fn emit(&mut self, span: Span, write: bool) {
        self.output.push(DocumentHighlight {
            span,
            kind: if write {
                HighlightKind::Write
            } else {
                HighlightKind::Read
            },
        });
    }

    fn refers_to_target(&self, node: NodeId, name: &str) -> bool {
        let annotation = self.arena.annotation(node);
        if annotation.referenced_declaration == Some(self.declaration) {
            return true;
        }
        // Overloads: the candidate set plus the name tiebreak.
        annotation.candidate_declarations.contains(&self.declaration)
            && name == self.identifier_name
    }

    /// Pre-order walk. `write` is true inside an assignment target.
    fn visit(&mut self, id: NodeId, write: bool) {
        let node = self.arena.node(id);
        match &node.kind {
            NodeKind::Identifier { name } => {
                if self.refers_to_target(id, name) {
                    self.emit(node.span, write);
                }
            }
            NodeKind::IdentifierPath { segments } => {
                if self.arena.annotation(id).referenced_declaration == Some(self.declaration) {
                    // The textual tail is what names the final target.
                    if let Some(tail) = segments.last() {
                        self.emit(tail.span, write);
                    }
                }
            }
            NodeKind::MemberAccess { expression, member } => {
                if self.refers_to_target(id, &member.name) {
                    self.emit(member.span, write);
                }
                self.visit(*expression, false);
                return;
            }
            NodeKind::Assignment { lhs, rhs } => {
                self.visit(*lhs, true);
                self.visit(*rhs, false);
                return;
            }
            _ => {}
        }
        for child in node.kind.children() {
            self.visit(child, write);
        }
    }
}

/// The `(declaration, name)` pairs a cursor node expands to.
///
/// This is the shared front half of the references and highlight queries:
/// each variant contributes the declarations it can see.
pub fn query_targets(arena: &Arena, node: NodeId) -> Vec<(NodeId, String)> {
    let n = arena.node(node);
    let annotation = arena.annotation(node);
    match &n.kind {
        NodeKind::Identifier { .. } => {
            let mut targets = Vec::new();
            for decl in annotation
                .referenced_declaration
                .iter()
                .chain(annotation.candidate_declarations.iter())
            {
                let name = arena
                    .node(*decl)
                    .name()
                    .map(|i| i.name.clone())
                    .unwrap_or_default();
                targets.push((*decl, name));
            }
            targets
        }
        NodeKind::IdentifierPath { segments } => annotation
            .referenced_declaration
            .map(|decl| {
                let tail = segments.last().map(|s| s.name.clone()).unwrap_or_default();
                vec![(decl, tail)]
            })
            .unwrap_or_default(),
        NodeKind::MemberAccess { member, .. } => annotation
            .referenced_declaration
            .map(|decl| vec![(decl, member.name.clone())])
            .unwrap_or_default(),
        kind if kind.is_declaration() => {
            let name = kind.name().map(|i| i.name.clone()).unwrap_or_default();
            vec![(node, name)]
        }
        _ => Vec::new(),
    }
}

/// All occurrences for the node under the cursor, kinds preserved.
pub fn semantic_highlight(arena: &Arena, root: NodeId, node: NodeId) -> Vec<DocumentHighlight> {
    let mut output = Vec::new();
    for (declaration, name) in query_targets(arena, node) {
        output.extend(collect(arena, root, declaration, &name));
    }
    output.sort_by_key(|h| (h.span.start, h.span.end));
    output.dedup_by(|a, b| a.span == b.span);
    output
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::locate_node;
    use sigil_ast::Arena;
    use sigil_parser::parse;
    use sigil_resolve::resolver::{resolve, NoImports};

    fn analyze(source: &str) -> (Arena, NodeId) {
        let result = parse(source);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let mut arena = result.arena;
        resolve(&mut arena, result.root, &NoImports);
        (arena, result.root)
    }

    fn span_text<'s>(source: &'s str, span: Span) -> &'s str {
        &source[span.start as usize..span.end as usize]
    }

    #[test]
    fn test_collect_includes_declaration_site() {
        let source = "function f() {} function g() { f(); }";
        let (arena, root) = analyze(source);
        let f_decl = arena
            .nodes()
            .find(|n| {
                matches!(&n.kind, NodeKind::FunctionDefinition { name, .. } if name.name == "f")
            })
            .unwrap()
            .id;

        let highlights = collect(&arena, root, f_decl, "f");
        assert_eq!(highlights.len(), 2);
        // Source order: declaration name first, then the call site.
        assert_eq!(highlights[0].kind, HighlightKind::Text);
        assert_eq!(highlights[1].kind, HighlightKind::Read);
        assert_eq!(span_text(source, highlights[0].span), "f");
        assert_eq!(span_text(source, highlights[1].span), "f");
        assert!(highlights[0].span.start < highlights[1].span.start);
    }

    #[test]
    fn test_assignment_lhs_is_write() {
        let source = "contract C { uint x; function f() { x = x + 1; } }";
        let (arena, root) = analyze(source);
        let x_decl = arena
            .nodes()
            .find(|n| {
                matches!(&n.kind, NodeKind::VariableDeclaration { name, .. } if name.name == "x")
            })
            .unwrap()
            .id;

        let highlights = collect(&arena, root, x_decl, "x");
        assert_eq!(highlights.len(), 3);
        assert_eq!(highlights[0].kind, HighlightKind::Text); // declaration
        assert_eq!(highlights[1].kind, HighlightKind::Write); // x =
        assert_eq!(highlights[2].kind, HighlightKind::Read); // x + 1
    }

    #[test]
    fn test_member_access_occurrence() {
        let source = "struct P { uint x; }\nfunction f() { P p; p.x = 1; }";
        let (arena, root) = analyze(source);
        let member = arena
            .nodes()
            .find(|n| matches!(&n.kind, NodeKind::StructMember { .. }))
            .unwrap()
            .id;

        let highlights = collect(&arena, root, member, "x");
        assert_eq!(highlights.len(), 2);
        assert_eq!(highlights[1].kind, HighlightKind::Write);
        assert_eq!(span_text(source, highlights[1].span), "x");
    }

    #[test]
    fn test_duplicates_suppressed() {
        let source = "function f() {} function g() { f(); }";
        let (arena, root) = analyze(source);
        let call_site = source.rfind("f()").unwrap() as u32;
        let node = locate_node(&arena, root, call_site).unwrap();

        // An identifier with one referenced declaration yields one target;
        // highlight output must not repeat ranges.
        let highlights = semantic_highlight(&arena, root, node);
        assert_eq!(highlights.len(), 2);
        let mut spans: Vec<_> = highlights.iter().map(|h| h.span).collect();
        spans.dedup();
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn test_query_targets_on_declaration() {
        let source = "contract C { uint x; }";
        let (arena, _) = analyze(source);
        let decl = arena
            .nodes()
            .find(|n| matches!(&n.kind, NodeKind::VariableDeclaration { .. }))
            .unwrap()
            .id;
        let targets = query_targets(&arena, decl);
        assert_eq!(targets, vec![(decl, "x".to_string())]);
    }

    #[test]
    fn test_query_targets_overloaded_identifier() {
        let source =
            "contract C { function f(uint a) {} function f(bool b) {} function g() { f; } }";
        let (arena, root) = analyze(source);
        let use_site = source.rfind("f;").unwrap() as u32;
        let node = locate_node(&arena, root, use_site).unwrap();
        let targets = query_targets(&arena, node);
        assert_eq!(targets.len(), 2);
        assert!(targets.iter().all(|(_, name)| name == "f"));
    }

    #[test]
    fn test_non_semantic_node_has_no_targets() {
        let source = "function f() { return 1; }";
        let (arena, root) = analyze(source);
        let literal = source.find('1').unwrap() as u32;
        let node = locate_node(&arena, root, literal).unwrap();
        assert!(query_targets(&arena, node).is_empty());
    }
}
