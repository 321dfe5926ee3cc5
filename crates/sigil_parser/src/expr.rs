//! Expression parsing, precedence climbing.

use crate::parser::Parser;
use sigil_ast::{BinaryOp, LiteralKind, NodeId, NodeKind, Span, UnaryOp};
use sigil_lexer::TokenKind;

impl Parser {
    pub(crate) fn parse_expression(&mut self) -> NodeId {
        self.parse_assignment()
    }

    /// `lhs = rhs`, right-associative, lowest precedence.
    fn parse_assignment(&mut self) -> NodeId {
        let lhs = self.parse_binary(0);
        if self.at(TokenKind::Assign) {
            self.advance();
            let rhs = self.parse_assignment();
            let full = self.arena.node(lhs).span.merge(self.arena.node(rhs).span);
            return self.arena.alloc(full, NodeKind::Assignment { lhs, rhs });
        }
        lhs
    }

    /// Binary operators by precedence tier.
    fn parse_binary(&mut self, min_tier: u8) -> NodeId {
        let mut lhs = self.parse_unary();
        loop {
            let Some((op, tier)) = binary_op(&self.current().kind) else {
                break;
            };
            if tier < min_tier {
                break;
            }
            self.advance();
            let rhs = self.parse_binary(tier + 1);
            let full = self.arena.node(lhs).span.merge(self.arena.node(rhs).span);
            lhs = self.arena.alloc(full, NodeKind::BinaryOperation { op, lhs, rhs });
        }
        lhs
    }

    fn parse_unary(&mut self) -> NodeId {
        let op = match self.current().kind {
            TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            _ => None,
        };
        if let Some(op) = op {
            let start = self.current_span();
            self.advance();
            let operand = self.parse_unary();
            let full = Span::new(start.start, self.arena.node(operand).span.end);
            return self.arena.alloc(full, NodeKind::UnaryOperation { op, operand });
        }
        self.parse_postfix()
    }

    /// Calls, member access and indexing bind tightest.
    fn parse_postfix(&mut self) -> NodeId {
        let mut expr = self.parse_primary();
        loop {
            match self.current().kind {
                TokenKind::LParen => {
                    self.advance();
                    let mut arguments = Vec::new();
                    if !self.at(TokenKind::RParen) {
                        loop {
                            arguments.push(self.parse_expression());
                            if !self.eat(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen);
                    let full =
                        Span::new(self.arena.node(expr).span.start, self.prev_span().end);
                    expr = self
                        .arena
                        .alloc(full, NodeKind::FunctionCall { callee: expr, arguments });
                }
                TokenKind::Dot => {
                    self.advance();
                    let member = self.expect_ident("member");
                    let full = Span::new(self.arena.node(expr).span.start, member.span.end);
                    expr = self.arena.alloc(
                        full,
                        NodeKind::MemberAccess {
                            expression: expr,
                            member,
                        },
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression();
                    self.expect(TokenKind::RBracket);
                    let full =
                        Span::new(self.arena.node(expr).span.start, self.prev_span().end);
                    expr = self
                        .arena
                        .alloc(full, NodeKind::IndexAccess { base: expr, index });
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_primary(&mut self) -> NodeId {
        let s = self.current_span();
        match self.current().kind.clone() {
            TokenKind::NumberLiteral(value) => {
                self.advance();
                self.arena.alloc(
                    s,
                    NodeKind::Literal {
                        kind: LiteralKind::Number,
                        value,
                    },
                )
            }
            TokenKind::StringLiteral(value) => {
                self.advance();
                self.arena.alloc(
                    s,
                    NodeKind::Literal {
                        kind: LiteralKind::String,
                        value,
                    },
                )
            }
            TokenKind::True | TokenKind::False => {
                let value = if self.at(TokenKind::True) { "true" } else { "false" };
                self.advance();
                self.arena.alloc(
                    s,
                    NodeKind::Literal {
                        kind: LiteralKind::Bool,
                        value: value.into(),
                    },
                )
            }
            TokenKind::Identifier(name) => {
                self.advance();
                self.arena.alloc(s, NodeKind::Identifier { name })
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression();
                self.expect(TokenKind::RParen);
                inner
            }
            other => {
                self.error_here(format!("expected expression, found {}", other));
                // Placeholder keeps the tree well-formed after an error.
                self.arena.alloc(
                    Span::new(s.start, s.start),
                    NodeKind::Identifier { name: String::new() },
                )
            }
        }
    }
}

/// Operator and precedence tier; higher binds tighter.
fn binary_op(kind: &TokenKind) -> Option<(BinaryOp, u8)> {
    let entry = match kind {
        TokenKind::OrOr => (BinaryOp::Or, 0),
        TokenKind::AndAnd => (BinaryOp::And, 1),
        TokenKind::Eq => (BinaryOp::Eq, 2),
        TokenKind::NotEq => (BinaryOp::NotEq, 2),
        TokenKind::Lt => (BinaryOp::Lt, 3),
        TokenKind::LtEq => (BinaryOp::LtEq, 3),
        TokenKind::Gt => (BinaryOp::Gt, 3),
        TokenKind::GtEq => (BinaryOp::GtEq, 3),
        TokenKind::Plus => (BinaryOp::Add, 4),
        TokenKind::Minus => (BinaryOp::Sub, 4),
        TokenKind::Star => (BinaryOp::Mul, 5),
        TokenKind::Slash => (BinaryOp::Div, 5),
        TokenKind::Percent => (BinaryOp::Rem, 5),
        _ => return None,
    };
    Some(entry)
}
