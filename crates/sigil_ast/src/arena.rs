//! Arena storage for AST nodes and their semantic annotations.

use crate::common::{Ident, NodeId, Span};
use crate::node::NodeKind;
use crate::types::Type;

/// Semantic annotation attached to a node by the resolver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotation {
    /// The declaration this node refers to, once resolved.
    pub referenced_declaration: Option<NodeId>,
    /// All plausible declarations when the name is overloaded.
    pub candidate_declarations: Vec<NodeId>,
    /// Resolved type of the expression or type name.
    pub ty: Option<Type>,
    /// For import directives: the source unit name of the imported file.
    pub absolute_path: Option<String>,
}

/// A single AST node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub span: Span,
    pub kind: NodeKind,
    pub annotation: Annotation,
}

impl Node {
    /// Location of the whole node.
    pub fn location(&self) -> Span {
        self.span
    }

    /// Location of just the declared name token, for declarations.
    pub fn name_location(&self) -> Option<Span> {
        self.kind.name().map(|ident| ident.span)
    }

    pub fn name(&self) -> Option<&Ident> {
        self.kind.name()
    }
}

/// All nodes of one source unit.
///
/// Children are allocated before their parent, so child ids are always
/// smaller than the parent id and iteration in id order is a post-order
/// walk of the tree.
#[derive(Debug, Default)]
pub struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn alloc(&mut self, span: Span, kind: NodeKind) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node {
            id,
            span,
            kind,
            annotation: Annotation::default(),
        });
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id as usize]
    }

    pub fn annotation(&self, id: NodeId) -> &Annotation {
        &self.nodes[id as usize].annotation
    }

    pub fn annotation_mut(&mut self, id: NodeId) -> &mut Annotation {
        &mut self.nodes[id as usize].annotation
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order walk from `root`, calling `f` on every node.
    pub fn walk(&self, root: NodeId, f: &mut impl FnMut(&Node)) {
        let node = self.node(root);
        f(node);
        for child in node.kind.children() {
            self.walk(child, f);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
