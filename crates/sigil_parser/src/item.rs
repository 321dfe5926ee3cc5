//! Top-level items and contract members.

use crate::parser::Parser;
use sigil_ast::{NodeId, NodeKind, Span};
use sigil_lexer::TokenKind;

impl Parser {
    /// Parse a whole source unit.
    pub(crate) fn parse_source_unit(&mut self) -> NodeId {
        let start = self.current_span();
        let mut items = Vec::new();

        while !self.at_eof() {
            let before = self.pos;
            if let Some(item) = self.parse_item() {
                items.push(item);
            }
            if self.pos == before {
                // No progress; drop the offending token.
                self.advance();
                self.sync_to_item();
            }
        }

        let full = Span::new(start.start, self.prev_span().end.max(start.start));
        self.arena.alloc(full, NodeKind::SourceUnit { items })
    }

    fn parse_item(&mut self) -> Option<NodeId> {
        match self.current().kind {
            TokenKind::Pragma => Some(self.parse_pragma()),
            TokenKind::Import => Some(self.parse_import()),
            TokenKind::Contract => Some(self.parse_contract()),
            TokenKind::Function => Some(self.parse_function()),
            TokenKind::Struct => Some(self.parse_struct()),
            TokenKind::Enum => Some(self.parse_enum()),
            _ if self.at_type_start() => Some(self.parse_variable_declaration()),
            _ => {
                self.error_here(format!(
                    "expected item, found {}",
                    self.current().kind
                ));
                None
            }
        }
    }

    /// `pragma sigil <ident>;`
    fn parse_pragma(&mut self) -> NodeId {
        let start = self.current_span();
        self.advance(); // pragma
        let mut tokens = Vec::new();
        while !self.at(TokenKind::Semicolon) && !self.at_eof() {
            let tok = self.advance();
            tokens.push(match tok.kind {
                TokenKind::Identifier(name) => name,
                other => other.to_string(),
            });
        }
        self.expect(TokenKind::Semicolon);
        let full = Span::new(start.start, self.prev_span().end);
        self.arena.alloc(full, NodeKind::PragmaDirective { tokens })
    }

    /// `import "<path>";`
    fn parse_import(&mut self) -> NodeId {
        let start = self.current_span();
        self.advance(); // import
        let path = if let TokenKind::StringLiteral(p) = &self.current().kind {
            let p = p.clone();
            self.advance();
            p
        } else {
            self.error_here("expected import path string");
            String::new()
        };
        self.expect(TokenKind::Semicolon);
        let full = Span::new(start.start, self.prev_span().end);
        self.arena.alloc(full, NodeKind::ImportDirective { path })
    }

    /// `contract Name is Base, Other { ... }`
    fn parse_contract(&mut self) -> NodeId {
        let doc = self.take_doc_before(self.pos);
        let start = self.current_span();
        self.advance(); // contract
        let name = self.expect_ident("contract");

        let mut bases = Vec::new();
        if self.eat(TokenKind::Is) {
            loop {
                bases.push(self.parse_identifier_path());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        let mut members = Vec::new();
        self.expect(TokenKind::LBrace);
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            let before = self.pos;
            match self.current().kind {
                TokenKind::Function => members.push(self.parse_function()),
                TokenKind::Struct => members.push(self.parse_struct()),
                TokenKind::Enum => members.push(self.parse_enum()),
                _ if self.at_type_start() => {
                    members.push(self.parse_variable_declaration())
                }
                _ => {
                    self.error_here(format!(
                        "expected contract member, found {}",
                        self.current().kind
                    ));
                    self.sync_to_statement();
                }
            }
            if self.pos == before {
                self.advance();
            }
        }
        self.expect(TokenKind::RBrace);

        let full = Span::new(start.start, self.prev_span().end);
        self.arena.alloc(
            full,
            NodeKind::ContractDefinition {
                name,
                bases,
                members,
                doc,
            },
        )
    }

    /// `function name(T a, U b) returns (V) { ... }` or `... ;`
    pub(crate) fn parse_function(&mut self) -> NodeId {
        let doc = self.take_doc_before(self.pos);
        let start = self.current_span();
        self.advance(); // function
        let name = self.expect_ident("function");

        let mut params = Vec::new();
        self.expect(TokenKind::LParen);
        if !self.at(TokenKind::RParen) {
            loop {
                params.push(self.parse_parameter());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen);

        let mut returns = Vec::new();
        if self.eat(TokenKind::Returns) {
            self.expect(TokenKind::LParen);
            if !self.at(TokenKind::RParen) {
                loop {
                    returns.push(self.parse_type_name());
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen);
        }

        let body = if self.eat(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_block())
        };

        let full = Span::new(start.start, self.prev_span().end);
        self.arena.alloc(
            full,
            NodeKind::FunctionDefinition {
                name,
                params,
                returns,
                body,
                doc,
            },
        )
    }

    fn parse_parameter(&mut self) -> NodeId {
        let start = self.current_span();
        let type_name = self.parse_type_name();
        let name = self.expect_ident("parameter");
        let full = Span::new(start.start, self.prev_span().end);
        self.arena
            .alloc(full, NodeKind::ParameterDeclaration { name, type_name })
    }

    /// `struct Name { T field; ... }`
    fn parse_struct(&mut self) -> NodeId {
        let doc = self.take_doc_before(self.pos);
        let start = self.current_span();
        self.advance(); // struct
        let name = self.expect_ident("struct");
        self.expect(TokenKind::LBrace);

        let mut members = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            let member_start = self.current_span();
            let type_name = self.parse_type_name();
            let member_name = self.expect_ident("field");
            self.expect(TokenKind::Semicolon);
            let full = Span::new(member_start.start, self.prev_span().end);
            members.push(self.arena.alloc(
                full,
                NodeKind::StructMember {
                    name: member_name,
                    type_name,
                },
            ));
        }
        self.expect(TokenKind::RBrace);

        let full = Span::new(start.start, self.prev_span().end);
        self.arena.alloc(
            full,
            NodeKind::StructDefinition { name, members, doc },
        )
    }

    /// `enum Name { A, B, C }`
    fn parse_enum(&mut self) -> NodeId {
        let doc = self.take_doc_before(self.pos);
        let start = self.current_span();
        self.advance(); // enum
        let name = self.expect_ident("enum");
        self.expect(TokenKind::LBrace);

        let mut values = Vec::new();
        if !self.at(TokenKind::RBrace) {
            loop {
                let value_name = self.expect_ident("enum value");
                let value_span = value_name.span;
                values.push(
                    self.arena
                        .alloc(value_span, NodeKind::EnumValue { name: value_name }),
                );
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBrace);

        let full = Span::new(start.start, self.prev_span().end);
        self.arena
            .alloc(full, NodeKind::EnumDefinition { name, values, doc })
    }

    /// `T name;` or `T name = expr;` (state variable or file-level constant).
    pub(crate) fn parse_variable_declaration(&mut self) -> NodeId {
        let doc = self.take_doc_before(self.pos);
        let start = self.current_span();
        let type_name = self.parse_type_name();
        let name = self.expect_ident("variable");
        let value = if self.eat(TokenKind::Assign) {
            Some(self.parse_expression())
        } else {
            None
        };
        self.expect(TokenKind::Semicolon);
        let full = Span::new(start.start, self.prev_span().end);
        self.arena.alloc(
            full,
            NodeKind::VariableDeclaration {
                name,
                type_name,
                value,
                doc,
            },
        )
    }
}
