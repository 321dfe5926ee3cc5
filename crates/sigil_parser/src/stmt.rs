//! Statement parsing.

use crate::parser::Parser;
use sigil_ast::{NodeId, NodeKind, Span};
use sigil_lexer::TokenKind;

impl Parser {
    /// Parse `{ ... }`.
    pub(crate) fn parse_block(&mut self) -> NodeId {
        let start = self.current_span();
        self.expect(TokenKind::LBrace);
        let mut statements = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            let before = self.pos;
            statements.push(self.parse_statement());
            if self.pos == before {
                self.advance();
            }
        }
        self.expect(TokenKind::RBrace);
        let full = Span::new(start.start, self.prev_span().end);
        self.arena.alloc(full, NodeKind::Block { statements })
    }

    pub(crate) fn parse_statement(&mut self) -> NodeId {
        match self.current().kind {
            TokenKind::LBrace => self.parse_block(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Return => self.parse_return(),
            _ if self.at_declaration_statement() => self.parse_variable_declaration(),
            _ => self.parse_expression_statement(),
        }
    }

    /// Does a variable declaration start here?
    ///
    /// `uint x ...` always does. An identifier does only when the (dotted)
    /// path it starts is followed by another identifier, which rules out
    /// expression statements like `x = 1;` or `a.b = c;`.
    fn at_declaration_statement(&self) -> bool {
        if self.current().kind.is_elementary_type() {
            return true;
        }
        if !self.at_ident() {
            return false;
        }
        let mut n = 1;
        while matches!(self.peek_nth(n).kind, TokenKind::Dot)
            && matches!(self.peek_nth(n + 1).kind, TokenKind::Identifier(_))
        {
            n += 2;
        }
        matches!(self.peek_nth(n).kind, TokenKind::Identifier(_))
    }

    fn parse_if(&mut self) -> NodeId {
        let start = self.current_span();
        self.advance(); // if
        self.expect(TokenKind::LParen);
        let condition = self.parse_expression();
        self.expect(TokenKind::RParen);
        let then_branch = self.parse_statement();
        let else_branch = if self.eat(TokenKind::Else) {
            Some(self.parse_statement())
        } else {
            None
        };
        let full = Span::new(start.start, self.prev_span().end);
        self.arena.alloc(
            full,
            NodeKind::IfStatement {
                condition,
                then_branch,
                else_branch,
            },
        )
    }

    fn parse_while(&mut self) -> NodeId {
        let start = self.current_span();
        self.advance(); // while
        self.expect(TokenKind::LParen);
        let condition = self.parse_expression();
        self.expect(TokenKind::RParen);
        let body = self.parse_statement();
        let full = Span::new(start.start, self.prev_span().end);
        self.arena
            .alloc(full, NodeKind::WhileStatement { condition, body })
    }

    fn parse_return(&mut self) -> NodeId {
        let start = self.current_span();
        self.advance(); // return
        let value = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression())
        };
        self.expect(TokenKind::Semicolon);
        let full = Span::new(start.start, self.prev_span().end);
        self.arena.alloc(full, NodeKind::ReturnStatement { value })
    }

    fn parse_expression_statement(&mut self) -> NodeId {
        let start = self.current_span();
        let expression = self.parse_expression();
        if !self.expect(TokenKind::Semicolon) {
            self.sync_to_statement();
        }
        let full = Span::new(start.start, self.prev_span().end);
        self.arena
            .alloc(full, NodeKind::ExpressionStatement { expression })
    }
}
