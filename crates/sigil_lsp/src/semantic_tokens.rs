//! Semantic token encoding for `textDocument/semanticTokens/full`.
//!
//! Walks the AST collecting `(span, token type)` pairs, then emits the LSP
//! 5-tuple delta encoding: deltaLine, deltaStartChar, length, tokenType,
//! tokenModifiers.

use serde_json::{json, Value};
use sigil_ast::{Arena, LiteralKind, NodeId, NodeKind, Span};

use crate::charstream::CharStream;

/// Legend advertised in the server capabilities; token type values below
/// index into this array.
pub const TOKEN_TYPES: [&str; 5] = ["number", "string", "variable", "parameter", "macro"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenType {
    Number = 0,
    String = 1,
    Variable = 2,
    Parameter = 3,
    Macro = 4,
}

/// Encode the full token stream of one source unit.
pub fn build(arena: &Arena, root: NodeId, stream: &CharStream) -> Value {
    let mut tokens: Vec<(Span, TokenType)> = Vec::new();
    arena.walk(root, &mut |node| collect(node, &mut tokens));
    tokens.sort_by_key(|(span, _)| (span.start, span.end));

    let mut data: Vec<u32> = Vec::with_capacity(tokens.len() * 5);
    let mut last_line = 0u32;
    let mut last_start = 0u32;
    for (span, token_type) in tokens {
        let (line, start_char) = stream.line_column_of(span.start as usize);
        data.push(line - last_line);
        if line == last_line {
            data.push(start_char - last_start);
        } else {
            data.push(start_char);
        }
        data.push(span.len());
        data.push(token_type as u32);
        data.push(0); // no modifiers
        last_line = line;
        last_start = start_char;
    }

    json!({ "data": data })
}

fn collect(node: &sigil_ast::Node, tokens: &mut Vec<(Span, TokenType)>) {
    match &node.kind {
        NodeKind::Literal { kind, .. } => {
            let token_type = match kind {
                LiteralKind::String => TokenType::String,
                _ => TokenType::Number,
            };
            tokens.push((node.span, token_type));
        }
        NodeKind::Identifier { .. } | NodeKind::IdentifierPath { .. } => {
            tokens.push((node.span, TokenType::Variable));
        }
        NodeKind::PragmaDirective { .. } => {
            tokens.push((node.span, TokenType::Macro));
        }
        NodeKind::ParameterDeclaration { name, .. } => {
            tokens.push((name.span, TokenType::Parameter));
        }
        NodeKind::VariableDeclaration { name, .. } => {
            tokens.push((name.span, TokenType::Variable));
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
