//! Scope tree: a hierarchy of scopes mapping names to declaring nodes.
//!
//! Unlike a plain name map, an entry holds every declaration sharing the
//! name, because Sigil functions may be overloaded. Non-overloadable kinds
//! reject a second declaration.

use std::collections::HashMap;

use sigil_ast::NodeId;

/// Unique identifier for a scope.
pub type ScopeId = u32;

/// A tree of nested scopes.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    pub fn new() -> Self {
        let root = Scope {
            id: 0,
            parent: None,
            kind: ScopeKind::SourceUnit,
            declarations: HashMap::new(),
        };
        Self { scopes: vec![root] }
    }

    pub fn root(&self) -> ScopeId {
        0
    }

    /// Create a new child scope and return its id.
    pub fn add_scope(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        let id = self.scopes.len() as ScopeId;
        self.scopes.push(Scope {
            id,
            parent: Some(parent),
            kind,
            declarations: HashMap::new(),
        });
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id as usize]
    }

    /// Insert a declaration. Overloadable names accumulate; otherwise a
    /// second declaration is rejected with the already-present node.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: &str,
        node: NodeId,
        overloadable: bool,
    ) -> Result<(), NodeId> {
        let entry = self.scopes[scope as usize]
            .declarations
            .entry(name.to_string())
            .or_default();
        if !entry.is_empty() && !overloadable {
            return Err(entry[0]);
        }
        entry.push(node);
        Ok(())
    }

    /// Look up a name from `scope` outward. Returns every declaration in the
    /// innermost scope that knows the name.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> &[NodeId] {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = &self.scopes[id as usize];
            if let Some(nodes) = s.declarations.get(name) {
                return nodes;
            }
            current = s.parent;
        }
        &[]
    }

    /// All names visible from a scope (for "did you mean" suggestions).
    pub fn names_in_scope(&self, scope: ScopeId) -> Vec<&str> {
        let mut names = vec![];
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = &self.scopes[id as usize];
            for name in s.declarations.keys() {
                names.push(name.as_str());
            }
            current = s.parent;
        }
        names
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }
}

/// A single scope.
#[derive(Debug)]
pub struct Scope {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    pub declarations: HashMap<String, Vec<NodeId>>,
}

/// What kind of scope this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// File-level scope.
    SourceUnit,
    /// Contract body, chained to the file scope.
    Contract,
    /// Function body including parameters.
    Function,
    /// Nested `{ ... }` block.
    Block,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
