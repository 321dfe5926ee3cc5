//! Lexer unit tests.

use crate::lexer::Lexer;
use crate::token::{Span, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    Lexer::new(source)
        .tokenize()
        .tokens
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn test_empty_source() {
    let result = Lexer::new("").tokenize();
    assert_eq!(result.tokens.len(), 1);
    assert_eq!(result.tokens[0].kind, TokenKind::Eof);
    assert!(result.errors.is_empty());
}

#[test]
fn test_keywords() {
    let ks = kinds("contract function struct enum returns is");
    assert_eq!(
        ks,
        vec![
            TokenKind::Contract,
            TokenKind::Function,
            TokenKind::Struct,
            TokenKind::Enum,
            TokenKind::Returns,
            TokenKind::Is,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_elementary_types_are_keywords() {
    let ks = kinds("uint int bool address string bytes");
    assert!(ks[..6].iter().all(|k| k.is_elementary_type()));
}

#[test]
fn test_identifier_vs_keyword() {
    let ks = kinds("contracts uint256 foo");
    assert_eq!(ks[0], TokenKind::Identifier("contracts".into()));
    assert_eq!(ks[1], TokenKind::Identifier("uint256".into()));
    assert_eq!(ks[2], TokenKind::Identifier("foo".into()));
}

#[test]
fn test_spans_are_byte_offsets() {
    let result = Lexer::new("uint x;").tokenize();
    assert_eq!(result.tokens[0].span, Span::new(0, 4));
    assert_eq!(result.tokens[1].span, Span::new(5, 6));
    assert_eq!(result.tokens[2].span, Span::new(6, 7));
}

#[test]
fn test_numbers() {
    let ks = kinds("42 0xFF00");
    assert_eq!(ks[0], TokenKind::NumberLiteral("42".into()));
    assert_eq!(ks[1], TokenKind::NumberLiteral("0xFF00".into()));
}

#[test]
fn test_string_literal() {
    let ks = kinds(r#"import "lib.sgl";"#);
    assert_eq!(ks[0], TokenKind::Import);
    assert_eq!(ks[1], TokenKind::StringLiteral("lib.sgl".into()));
    assert_eq!(ks[2], TokenKind::Semicolon);
}

#[test]
fn test_string_escapes() {
    let ks = kinds(r#""a\nb\"c""#);
    assert_eq!(ks[0], TokenKind::StringLiteral("a\nb\"c".into()));
}

#[test]
fn test_unterminated_string_reports_error() {
    let result = Lexer::new("\"oops").tokenize();
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].message.contains("unterminated"));
}

#[test]
fn test_two_char_operators() {
    let ks = kinds("== != <= >= && ||");
    assert_eq!(
        ks,
        vec![
            TokenKind::Eq,
            TokenKind::NotEq,
            TokenKind::LtEq,
            TokenKind::GtEq,
            TokenKind::AndAnd,
            TokenKind::OrOr,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_assign_vs_eq() {
    let ks = kinds("x = y == z");
    assert_eq!(ks[1], TokenKind::Assign);
    assert_eq!(ks[3], TokenKind::Eq);
}

#[test]
fn test_line_comment_skipped() {
    let ks = kinds("uint // comment\nx");
    assert_eq!(ks.len(), 3);
    assert_eq!(ks[0], TokenKind::Uint);
    assert_eq!(ks[1], TokenKind::Identifier("x".into()));
}

#[test]
fn test_block_comment_skipped() {
    let ks = kinds("uint /* a\nb */ x");
    assert_eq!(ks.len(), 3);
}

#[test]
fn test_unterminated_block_comment() {
    let result = Lexer::new("/* oops").tokenize();
    assert_eq!(result.errors.len(), 1);
}

#[test]
fn test_doc_comment_run() {
    let source = "/// Counts things.\n/// Carefully.\ncontract C {}";
    let result = Lexer::new(source).tokenize();
    assert_eq!(result.docs.len(), 1);
    assert_eq!(result.docs[0].text, "Counts things.\nCarefully.");
    assert_eq!(result.tokens[0].kind, TokenKind::Contract);
}

#[test]
fn test_doc_runs_split_by_token() {
    let source = "/// one\ncontract A {}\n/// two\ncontract B {}";
    let result = Lexer::new(source).tokenize();
    assert_eq!(result.docs.len(), 2);
    assert_eq!(result.docs[0].text, "one");
    assert_eq!(result.docs[1].text, "two");
}

#[test]
fn test_plain_comment_is_not_doc() {
    let result = Lexer::new("// nope\ncontract C {}").tokenize();
    assert!(result.docs.is_empty());
}

#[test]
fn test_unexpected_character() {
    let result = Lexer::new("uint @ x").tokenize();
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].message.contains('@'));
    // Scanning continues past the bad character.
    let ids: Vec<_> = result
        .tokens
        .iter()
        .filter(|t| matches!(t.kind, TokenKind::Identifier(_)))
        .collect();
    assert_eq!(ids.len(), 1);
}

#[test]
fn test_contract_snippet() {
    let ks = kinds("contract C { uint x; }");
    assert_eq!(
        ks,
        vec![
            TokenKind::Contract,
            TokenKind::Identifier("C".into()),
            TokenKind::LBrace,
            TokenKind::Uint,
            TokenKind::Identifier("x".into()),
            TokenKind::Semicolon,
            TokenKind::RBrace,
            TokenKind::Eof,
        ]
    );
}
