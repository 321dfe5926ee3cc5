//! Core lexer implementation.
//!
//! Scans Sigil source text byte by byte, producing a stream of tokens.
//! Handles identifiers, keywords, decimal and hex numbers, strings,
//! operators, line/block comments, and `///` doc comment runs.

use crate::token::*;

/// A lexical error with its source span.
#[derive(Debug, Clone)]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

impl LexError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}..{}] {}",
            self.span.start, self.span.end, self.message
        )
    }
}

/// Result of tokenizing a source unit.
#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub docs: Vec<DocComment>,
    pub errors: Vec<LexError>,
}

/// The Sigil lexer.
pub struct Lexer<'src> {
    source: &'src [u8],
    pos: usize,
    errors: Vec<LexError>,
    docs: Vec<DocComment>,
    /// Doc lines being accumulated into the current run.
    doc_run: Vec<String>,
    doc_run_start: usize,
    doc_run_end: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source: source.as_bytes(),
            pos: 0,
            errors: Vec::new(),
            docs: Vec::new(),
            doc_run: Vec::new(),
            doc_run_start: 0,
            doc_run_end: 0,
        }
    }

    /// Tokenize the entire source, returning tokens, doc comments and errors.
    pub fn tokenize(mut self) -> LexResult {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia();

            self.flush_doc_run();

            if self.is_at_end() {
                tokens.push(Token::new(
                    TokenKind::Eof,
                    Span::new(self.pos as u32, self.pos as u32),
                ));
                break;
            }

            tokens.push(self.lex_token());
        }

        LexResult {
            tokens,
            docs: self.docs,
            errors: self.errors,
        }
    }

    // ---- Scanning primitives ----

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn current(&self) -> u8 {
        self.source.get(self.pos).copied().unwrap_or(0)
    }

    fn peek(&self) -> u8 {
        self.source.get(self.pos + 1).copied().unwrap_or(0)
    }

    fn peek2(&self) -> u8 {
        self.source.get(self.pos + 2).copied().unwrap_or(0)
    }

    fn advance(&mut self) -> u8 {
        let b = self.current();
        self.pos += 1;
        b
    }

    fn text(&self, start: usize, end: usize) -> &str {
        // The lexer only slices at ASCII boundaries it scanned past itself.
        std::str::from_utf8(&self.source[start..end]).unwrap_or("")
    }

    // ---- Trivia ----

    /// Skip whitespace and comments, accumulating `///` runs.
    fn skip_trivia(&mut self) {
        loop {
            match self.current() {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    self.pos += 1;
                }
                b'/' if self.peek() == b'/' && self.peek2() == b'/' => {
                    self.lex_doc_line();
                }
                b'/' if self.peek() == b'/' => {
                    self.flush_doc_run();
                    while !self.is_at_end() && self.current() != b'\n' {
                        self.pos += 1;
                    }
                }
                b'/' if self.peek() == b'*' => {
                    self.flush_doc_run();
                    let start = self.pos;
                    self.pos += 2;
                    loop {
                        if self.is_at_end() {
                            self.errors.push(LexError::new(
                                "unterminated block comment",
                                Span::new(start as u32, self.pos as u32),
                            ));
                            break;
                        }
                        if self.current() == b'*' && self.peek() == b'/' {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_doc_line(&mut self) {
        let start = self.pos;
        self.pos += 3;
        // One optional leading space is stripped, the rest is verbatim.
        if self.current() == b' ' {
            self.pos += 1;
        }
        let text_start = self.pos;
        while !self.is_at_end() && self.current() != b'\n' {
            self.pos += 1;
        }
        let line = self.text(text_start, self.pos).to_string();
        if self.doc_run.is_empty() {
            self.doc_run_start = start;
        }
        self.doc_run_end = self.pos;
        self.doc_run.push(line);
    }

    /// Close the current doc run, if any, and store it.
    fn flush_doc_run(&mut self) {
        if self.doc_run.is_empty() {
            return;
        }
        let text = self.doc_run.join("\n");
        self.docs.push(DocComment {
            text,
            span: Span::new(self.doc_run_start as u32, self.doc_run_end as u32),
        });
        self.doc_run.clear();
    }

    // ---- Tokens ----

    fn lex_token(&mut self) -> Token {
        let start = self.pos;
        let b = self.current();

        if b.is_ascii_alphabetic() || b == b'_' {
            return self.lex_word();
        }
        if b.is_ascii_digit() {
            return self.lex_number();
        }
        if b == b'"' {
            return self.lex_string();
        }

        self.advance();
        let kind = match b {
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,
            b'.' => TokenKind::Dot,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b'=' => {
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::Eq
                } else {
                    TokenKind::Assign
                }
            }
            b'!' => {
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::NotEq
                } else {
                    TokenKind::Not
                }
            }
            b'<' => {
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::LtEq
                } else {
                    TokenKind::Lt
                }
            }
            b'>' => {
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            b'&' => {
                if self.current() == b'&' {
                    self.advance();
                    TokenKind::AndAnd
                } else {
                    self.errors.push(LexError::new(
                        "unexpected character `&`",
                        Span::new(start as u32, self.pos as u32),
                    ));
                    return self.lex_token_or_eof(start);
                }
            }
            b'|' => {
                if self.current() == b'|' {
                    self.advance();
                    TokenKind::OrOr
                } else {
                    self.errors.push(LexError::new(
                        "unexpected character `|`",
                        Span::new(start as u32, self.pos as u32),
                    ));
                    return self.lex_token_or_eof(start);
                }
            }
            _ => {
                self.errors.push(LexError::new(
                    format!("unexpected character `{}`", b as char),
                    Span::new(start as u32, self.pos as u32),
                ));
                return self.lex_token_or_eof(start);
            }
        };

        Token::new(kind, Span::new(start as u32, self.pos as u32))
    }

    /// After an error, resume with the next token (or Eof).
    fn lex_token_or_eof(&mut self, error_start: usize) -> Token {
        self.skip_trivia();
        if self.is_at_end() {
            return Token::new(
                TokenKind::Eof,
                Span::new(error_start as u32, self.pos as u32),
            );
        }
        self.lex_token()
    }

    fn lex_word(&mut self) -> Token {
        let start = self.pos;
        while self.current().is_ascii_alphanumeric() || self.current() == b'_' {
            self.pos += 1;
        }
        let word = self.text(start, self.pos).to_string();
        let span = Span::new(start as u32, self.pos as u32);
        match TokenKind::keyword(&word) {
            Some(kind) => Token::new(kind, span),
            None => Token::new(TokenKind::Identifier(word), span),
        }
    }

    fn lex_number(&mut self) -> Token {
        let start = self.pos;
        if self.current() == b'0' && (self.peek() == b'x' || self.peek() == b'X') {
            self.pos += 2;
            while self.current().is_ascii_hexdigit() {
                self.pos += 1;
            }
        } else {
            while self.current().is_ascii_digit() {
                self.pos += 1;
            }
        }
        let text = self.text(start, self.pos).to_string();
        Token::new(
            TokenKind::NumberLiteral(text),
            Span::new(start as u32, self.pos as u32),
        )
    }

    fn lex_string(&mut self) -> Token {
        let start = self.pos;
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            if self.is_at_end() || self.current() == b'\n' {
                self.errors.push(LexError::new(
                    "unterminated string literal",
                    Span::new(start as u32, self.pos as u32),
                ));
                break;
            }
            let b = self.advance();
            if b == b'"' {
                break;
            }
            if b == b'\\' && !self.is_at_end() {
                let esc = self.advance();
                match esc {
                    b'n' => value.push('\n'),
                    b't' => value.push('\t'),
                    b'\\' => value.push('\\'),
                    b'"' => value.push('"'),
                    other => {
                        value.push('\\');
                        value.push(other as char);
                    }
                }
            } else {
                value.push(b as char);
            }
        }
        Token::new(
            TokenKind::StringLiteral(value),
            Span::new(start as u32, self.pos as u32),
        )
    }
}
