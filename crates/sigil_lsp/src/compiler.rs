//! The compiler façade the server drives.
//!
//! A [`CompilerStack`] is built from a snapshot of the VFS and analyzed
//! once; every recompile constructs a fresh stack and drops the old one,
//! invalidating all node ids handed out before. `analyze` runs lex, parse
//! and resolve for every unit: the `AnalysisPerformed` state. There is no
//! code generation here.

use std::collections::HashMap;

use sigil_ast::{Arena, NodeId, Span};
use sigil_parser::parse;
use sigil_resolve::resolver::{resolve, ImportContext};
use sigil_resolve::{ResolveError, ResolveErrorKind};
use tracing::debug;

use crate::charstream::CharStream;

/// Map a client URI to a canonical source unit name.
///
/// The rule is the façade's: strip a `file://` scheme, keep everything else
/// verbatim, so unit names stay in bijection with URIs.
pub fn uri_to_source_unit_name(uri: &str) -> String {
    uri.strip_prefix("file://").unwrap_or(uri).to_string()
}

/// How far analysis has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum CompilerState {
    #[default]
    Empty,
    Parsed,
    AnalysisPerformed,
}

/// A byte-offset interval in a named source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub start: u32,
    pub end: u32,
    pub source_name: Option<String>,
}

impl SourceLocation {
    pub fn new(span: Span, source_name: impl Into<String>) -> Self {
        Self {
            start: span.start,
            end: span.end,
            source_name: Some(source_name.into()),
        }
    }
}

/// Classification of a compiler message, mirroring the front-end stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parser,
    Declaration,
    Type,
    Warning,
}

impl ErrorKind {
    /// LSP severity: 1 = Error, 2 = Warning.
    pub fn severity(&self) -> u32 {
        match self {
            ErrorKind::Parser | ErrorKind::Declaration | ErrorKind::Type => 1,
            ErrorKind::Warning => 2,
        }
    }
}

/// A secondary source reference attached to an error.
#[derive(Debug, Clone)]
pub struct SecondaryLocation {
    pub message: String,
    pub location: SourceLocation,
}

/// One compiler error or warning.
#[derive(Debug, Clone)]
pub struct CompilerError {
    pub kind: ErrorKind,
    pub message: String,
    pub location: SourceLocation,
    pub code: Option<u32>,
    pub secondary: Vec<SecondaryLocation>,
}

/// One analyzed source unit.
#[derive(Debug)]
pub struct AnalyzedUnit {
    pub arena: Arena,
    pub root: NodeId,
    pub stream: CharStream,
}

/// The compiler façade: all units of one compilation, plus diagnostics.
#[derive(Debug, Default)]
pub struct CompilerStack {
    units: HashMap<String, AnalyzedUnit>,
    errors: Vec<CompilerError>,
    state: CompilerState,
}

/// Import resolution backed by the parsed unit set.
struct UnitImports {
    exports: HashMap<String, Vec<String>>,
}

impl ImportContext for UnitImports {
    fn resolve_import(&self, path: &str) -> Option<String> {
        let unit = uri_to_source_unit_name(path);
        if self.exports.contains_key(&unit) {
            return Some(unit);
        }
        // Also accept the raw path as written.
        self.exports.contains_key(path).then(|| path.to_string())
    }

    fn exported_names(&self, unit: &str) -> Vec<String> {
        self.exports.get(unit).cloned().unwrap_or_default()
    }
}

impl CompilerStack {
    /// Snapshot the given sources; nothing is analyzed yet.
    pub fn new(sources: impl IntoIterator<Item = (String, String)>) -> Self {
        let units = sources
            .into_iter()
            .map(|(name, text)| {
                (
                    name,
                    AnalyzedUnit {
                        arena: Arena::new(),
                        root: 0,
                        stream: CharStream::new(text),
                    },
                )
            })
            .collect();
        Self {
            units,
            errors: Vec::new(),
            state: CompilerState::Empty,
        }
    }

    /// Drive analysis to `AnalysisPerformed`: parse every unit, then resolve
    /// every unit against the full unit set.
    pub fn analyze(&mut self) {
        let mut exports: HashMap<String, Vec<String>> = HashMap::new();

        for (name, unit) in &mut self.units {
            let result = parse(unit.stream.text());
            for err in &result.errors {
                self.errors.push(CompilerError {
                    kind: ErrorKind::Parser,
                    message: err.message.clone(),
                    location: SourceLocation::new(err.span, name.clone()),
                    code: Some(1001),
                    secondary: Vec::new(),
                });
            }
            let top_level: Vec<String> = result
                .arena
                .node(result.root)
                .kind
                .children()
                .iter()
                .filter_map(|&item| result.arena.node(item).kind.name())
                .map(|ident| ident.name.clone())
                .collect();
            exports.insert(name.clone(), top_level);
            unit.arena = result.arena;
            unit.root = result.root;
        }
        self.state = CompilerState::Parsed;

        let imports = UnitImports { exports };
        for (name, unit) in &mut self.units {
            let outcome = resolve(&mut unit.arena, unit.root, &imports);
            for err in outcome.errors {
                self.errors.push(to_compiler_error(err, name));
            }
        }
        self.state = CompilerState::AnalysisPerformed;
        debug!(
            units = self.units.len(),
            errors = self.errors.len(),
            "analysis performed"
        );
    }

    pub fn state(&self) -> CompilerState {
        self.state
    }

    pub fn has_unit(&self, source_unit_name: &str) -> bool {
        self.units.contains_key(source_unit_name)
    }

    /// The analyzed AST of a unit: its arena and root node.
    pub fn ast(&self, source_unit_name: &str) -> Option<(&Arena, NodeId)> {
        let unit = self.units.get(source_unit_name)?;
        Some((&unit.arena, unit.root))
    }

    pub fn char_stream(&self, source_unit_name: &str) -> Option<&CharStream> {
        self.units.get(source_unit_name).map(|u| &u.stream)
    }

    pub fn errors(&self) -> &[CompilerError] {
        &self.errors
    }
}

fn to_compiler_error(err: ResolveError, unit: &str) -> CompilerError {
    let (kind, code) = match &err.kind {
        ResolveErrorKind::UndefinedName { .. } => (ErrorKind::Declaration, 2001),
        ResolveErrorKind::DuplicateDefinition { .. } => (ErrorKind::Declaration, 2002),
        ResolveErrorKind::UnknownMember { .. } => (ErrorKind::Type, 2003),
        ResolveErrorKind::ImportNotFound { .. } => (ErrorKind::Declaration, 2004),
        ResolveErrorKind::UnusedVariable { .. } => (ErrorKind::Warning, 3001),
    };
    let secondary = match &err.kind {
        ResolveErrorKind::DuplicateDefinition { previous_span, .. } => vec![SecondaryLocation {
            message: "previous definition is here".into(),
            location: SourceLocation::new(*previous_span, unit),
        }],
        _ => Vec::new(),
    };
    CompilerError {
        kind,
        message: err.to_string(),
        location: SourceLocation::new(err.span, unit),
        code: Some(code),
        secondary,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn stack_of(sources: &[(&str, &str)]) -> CompilerStack {
        let mut stack = CompilerStack::new(
            sources
                .iter()
                .map(|(n, t)| (n.to_string(), t.to_string())),
        );
        stack.analyze();
        stack
    }

    #[test]
    fn test_uri_normalization() {
        assert_eq!(uri_to_source_unit_name("file:///a.sgl"), "/a.sgl");
        assert_eq!(uri_to_source_unit_name("/plain/path.sgl"), "/plain/path.sgl");
    }

    #[test]
    fn test_state_progression() {
        let mut stack = CompilerStack::new(vec![("/a.sgl".to_string(), "contract C {}".to_string())]);
        assert_eq!(stack.state(), CompilerState::Empty);
        stack.analyze();
        assert_eq!(stack.state(), CompilerState::AnalysisPerformed);
    }

    #[test]
    fn test_clean_unit_has_no_errors() {
        let stack = stack_of(&[("/a.sgl", "contract C { uint x; }")]);
        assert!(stack.errors().is_empty(), "{:?}", stack.errors());
        assert!(stack.has_unit("/a.sgl"));
        assert!(stack.ast("/a.sgl").is_some());
        assert!(stack.char_stream("/a.sgl").is_some());
    }

    #[test]
    fn test_parse_error_reported_with_location() {
        let stack = stack_of(&[("/a.sgl", "contract C { uint ; }")]);
        let parser_errors: Vec<_> = stack
            .errors()
            .iter()
            .filter(|e| e.kind == ErrorKind::Parser)
            .collect();
        assert!(!parser_errors.is_empty());
        assert_eq!(parser_errors[0].location.source_name.as_deref(), Some("/a.sgl"));
        assert_eq!(parser_errors[0].kind.severity(), 1);
    }

    #[test]
    fn test_duplicate_definition_has_secondary() {
        let stack = stack_of(&[("/a.sgl", "contract C { uint x; uint x; }")]);
        let dup = stack
            .errors()
            .iter()
            .find(|e| e.code == Some(2002))
            .expect("duplicate definition error");
        assert_eq!(dup.secondary.len(), 1);
        assert_eq!(dup.secondary[0].message, "previous definition is here");
    }

    #[test]
    fn test_unused_variable_is_warning() {
        let stack = stack_of(&[("/a.sgl", "function f() { uint dead = 1; }")]);
        let warn = stack
            .errors()
            .iter()
            .find(|e| e.kind == ErrorKind::Warning)
            .expect("unused warning");
        assert_eq!(warn.kind.severity(), 2);
    }

    #[test]
    fn test_cross_unit_import_resolves() {
        let stack = stack_of(&[
            ("/lib.sgl", "function helper() {}"),
            ("/main.sgl", "import \"/lib.sgl\";\nfunction f() { helper(); }"),
        ]);
        assert!(stack.errors().is_empty(), "{:?}", stack.errors());
        let (arena, root) = stack.ast("/main.sgl").unwrap();
        let import = arena
            .node(root)
            .kind
            .children()
            .into_iter()
            .find(|&id| {
                matches!(
                    arena.node(id).kind,
                    sigil_ast::NodeKind::ImportDirective { .. }
                )
            })
            .unwrap();
        assert_eq!(
            arena.annotation(import).absolute_path.as_deref(),
            Some("/lib.sgl")
        );
    }

    #[test]
    fn test_missing_import_is_error() {
        let stack = stack_of(&[("/main.sgl", "import \"/nope.sgl\";")]);
        assert!(stack.errors().iter().any(|e| e.code == Some(2004)));
    }

    #[test]
    fn test_recompile_is_a_fresh_stack() {
        let first = stack_of(&[("/a.sgl", "contract C {}")]);
        let second = stack_of(&[("/a.sgl", "contract D {}")]);
        // Ids from the first stack mean nothing in the second; all lookups
        // go through the new arena.
        let (arena, root) = second.ast("/a.sgl").unwrap();
        let contract = arena.node(root).kind.children()[0];
        assert_eq!(arena.node(contract).name().unwrap().name, "D");
        drop(first);
    }
}
