//! Type name parsing.

use crate::parser::Parser;
use sigil_ast::{ElementaryType, Ident, NodeId, NodeKind, Span};
use sigil_lexer::TokenKind;

impl Parser {
    /// True when the current token can start a type name.
    pub(crate) fn at_type_start(&self) -> bool {
        self.current().kind.is_elementary_type() || self.at_ident()
    }

    /// Parse `uint` / `bool` / ... or a (possibly dotted) user-defined type.
    pub(crate) fn parse_type_name(&mut self) -> NodeId {
        if let Some(ty) = elementary(&self.current().kind) {
            let s = self.current_span();
            self.advance();
            return self.arena.alloc(s, NodeKind::ElementaryTypeName { ty });
        }

        if self.at_ident() {
            return self.parse_identifier_path();
        }

        self.error_here(format!(
            "expected type name, found {}",
            self.current().kind
        ));
        let s = self.current_span();
        self.arena.alloc(
            Span::new(s.start, s.start),
            NodeKind::IdentifierPath { segments: vec![] },
        )
    }

    /// Parse `a` or `a.b.c` into an IdentifierPath node.
    pub(crate) fn parse_identifier_path(&mut self) -> NodeId {
        let first = self.expect_ident("path segment");
        let mut segments: Vec<Ident> = vec![first];
        while self.at(TokenKind::Dot) && matches!(self.peek().kind, TokenKind::Identifier(_)) {
            self.advance(); // .
            if let Some(segment) = self.eat_ident() {
                segments.push(segment);
            }
        }
        let full = segments
            .first()
            .map(|s| s.span)
            .unwrap_or_else(|| self.current_span())
            .merge(segments.last().map(|s| s.span).unwrap_or_else(|| self.current_span()));
        self.arena.alloc(full, NodeKind::IdentifierPath { segments })
    }
}

fn elementary(kind: &TokenKind) -> Option<ElementaryType> {
    let ty = match kind {
        TokenKind::Uint => ElementaryType::Uint,
        TokenKind::Int => ElementaryType::Int,
        TokenKind::Bool => ElementaryType::Bool,
        TokenKind::Address => ElementaryType::Address,
        TokenKind::StringType => ElementaryType::String,
        TokenKind::Bytes => ElementaryType::Bytes,
        _ => return None,
    };
    Some(ty)
}
