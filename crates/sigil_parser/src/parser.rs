//! Parser infrastructure: token navigation, error handling, synchronization.

use sigil_ast::{Arena, Ident, NodeId, Span};
use sigil_lexer::{DocComment, LexResult, Lexer, Token, TokenKind};

/// Convert a lexer span to an AST span.
pub(crate) fn span(lex: sigil_lexer::Span) -> Span {
    Span::new(lex.start, lex.end)
}

/// Parse error.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}..{}] {}",
            self.span.start, self.span.end, self.message
        )
    }
}

/// Result of parsing one source unit.
#[derive(Debug)]
pub struct ParseResult {
    pub arena: Arena,
    pub root: NodeId,
    pub errors: Vec<ParseError>,
}

/// Lex and parse a source unit in one step.
pub fn parse(source: &str) -> ParseResult {
    let LexResult {
        tokens,
        docs,
        errors,
    } = Lexer::new(source).tokenize();
    let lex_errors = errors
        .into_iter()
        .map(|e| ParseError::new(e.message, span(e.span)))
        .collect();
    Parser::new(tokens, docs, lex_errors).parse()
}

/// The parser.
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) docs: Vec<DocComment>,
    pub(crate) errors: Vec<ParseError>,
    pub(crate) arena: Arena,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, docs: Vec<DocComment>, lex_errors: Vec<ParseError>) -> Self {
        Self {
            tokens,
            pos: 0,
            docs,
            errors: lex_errors,
            arena: Arena::new(),
        }
    }

    pub fn parse(mut self) -> ParseResult {
        let root = self.parse_source_unit();
        ParseResult {
            arena: self.arena,
            root,
            errors: self.errors,
        }
    }

    // ---- Token navigation ----

    pub(crate) fn current(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .unwrap_or_else(|| self.tokens.last().unwrap())
    }

    pub(crate) fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos + 1)
            .unwrap_or_else(|| self.tokens.last().unwrap())
    }

    pub(crate) fn peek_nth(&self, n: usize) -> &Token {
        self.tokens
            .get(self.pos + n)
            .unwrap_or_else(|| self.tokens.last().unwrap())
    }

    pub(crate) fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if !matches!(tok.kind, TokenKind::Eof) {
            self.pos += 1;
        }
        tok
    }

    pub(crate) fn current_span(&self) -> Span {
        span(self.current().span)
    }

    pub(crate) fn prev_span(&self) -> Span {
        if self.pos > 0 {
            span(self.tokens[self.pos - 1].span)
        } else {
            Span::new(0, 0)
        }
    }

    // ---- Matching helpers ----

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    pub(crate) fn at_ident(&self) -> bool {
        matches!(self.current().kind, TokenKind::Identifier(_))
    }

    pub(crate) fn at_eof(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_ident(&mut self) -> Option<Ident> {
        if let TokenKind::Identifier(name) = &self.current().kind {
            let name = name.clone();
            let s = self.current_span();
            self.advance();
            Some(Ident::new(name, s))
        } else {
            None
        }
    }

    /// Consume `kind` or record an error at the current token.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind.clone()) {
            true
        } else {
            self.error_here(format!("expected {}, found {}", kind, self.current().kind));
            false
        }
    }

    pub(crate) fn expect_ident(&mut self, what: &str) -> Ident {
        match self.eat_ident() {
            Some(ident) => ident,
            None => {
                self.error_here(format!(
                    "expected {} name, found {}",
                    what,
                    self.current().kind
                ));
                Ident::new("", self.current_span())
            }
        }
    }

    pub(crate) fn error_here(&mut self, message: impl Into<String>) {
        let s = self.current_span();
        self.errors.push(ParseError::new(message, s));
    }

    // ---- Doc comments ----

    /// Take the doc run sitting immediately before the token at `token_index`.
    ///
    /// A run qualifies when no token lies between it and the declaration
    /// keyword. Consumed runs are removed so they attach only once.
    pub(crate) fn take_doc_before(&mut self, token_index: usize) -> Option<String> {
        let decl_start = self.tokens.get(token_index)?.span.start;
        let prev_end = if token_index == 0 {
            0
        } else {
            self.tokens[token_index - 1].span.end
        };
        let found = self
            .docs
            .iter()
            .position(|d| d.span.end <= decl_start && d.span.start >= prev_end)?;
        Some(self.docs.remove(found).text)
    }

    // ---- Synchronization ----

    /// Skip tokens until the next top-level item start or end of file.
    pub(crate) fn sync_to_item(&mut self) {
        while !self.at_eof() {
            if matches!(
                self.current().kind,
                TokenKind::Pragma
                    | TokenKind::Import
                    | TokenKind::Contract
                    | TokenKind::Function
                    | TokenKind::Struct
                    | TokenKind::Enum
            ) {
                return;
            }
            self.advance();
        }
    }

    /// Skip past the next `;` or stop before `}` / end of file.
    pub(crate) fn sync_to_statement(&mut self) {
        while !self.at_eof() {
            if self.eat(TokenKind::Semicolon) {
                return;
            }
            if self.at(TokenKind::RBrace) {
                return;
            }
            self.advance();
        }
    }
}
