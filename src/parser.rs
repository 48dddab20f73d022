use std::rc::Rc;

use tracing::trace;

use crate::ast::{BinaryOp, Block, Expr, Program, Stmt, UnaryOp};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::lexer::{Keyword, Lexer, Token, TokenKind};

type Result<T> = std::result::Result<T, Diagnostic>;

pub fn parse_program(source: &str) -> Result<Program> {
    let tokens = Lexer::new(source).tokenize();
    Parser::new(tokens).parse_program()
}

/// Binding strength for expression operators, weakest first. Derived `Ord`
/// follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

fn infix_operator(kind: &TokenKind) -> Option<(BinaryOp, Precedence)> {
    let pair = match kind {
        TokenKind::EqualEqual => (BinaryOp::Equal, Precedence::Equals),
        TokenKind::BangEqual => (BinaryOp::NotEqual, Precedence::Equals),
        TokenKind::Less => (BinaryOp::Less, Precedence::LessGreater),
        TokenKind::Greater => (BinaryOp::Greater, Precedence::LessGreater),
        TokenKind::Plus => (BinaryOp::Add, Precedence::Sum),
        TokenKind::Minus => (BinaryOp::Sub, Precedence::Sum),
        TokenKind::Star => (BinaryOp::Mul, Precedence::Product),
        TokenKind::Slash => (BinaryOp::Div, Precedence::Product),
        _ => return None,
    };
    Some(pair)
}

struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    fn parse_program(&mut self) -> Result<Program> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::Eof) {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> Result<Stmt> {
        if let Some(token) = self.peek() {
            trace!(kind = ?token.kind, start = token.span.start, "statement");
            match &token.kind {
                TokenKind::Keyword(Keyword::Let) => return self.parse_let(),
                TokenKind::Keyword(Keyword::Return) => return self.parse_return(),
                _ => {}
            }
        }
        self.parse_expression_statement()
    }

    // The statement and prefix dispatchers only call the keyword-led parsers
    // after peeking the keyword, so each one starts with a plain advance.
    fn parse_let(&mut self) -> Result<Stmt> {
        self.advance();
        let name = self.consume_identifier("expected binding name after `let`")?;
        self.consume(TokenKind::Assign, "expected `=` after binding name")?;
        let value = self.parse_expression(Precedence::Lowest)?;
        self.consume_optional_semicolon();
        Ok(Stmt::Let {
            name: name.lexeme,
            value,
        })
    }

    fn parse_return(&mut self) -> Result<Stmt> {
        self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.consume_optional_semicolon();
        Ok(Stmt::Return(value))
    }

    fn parse_expression_statement(&mut self) -> Result<Stmt> {
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.consume_optional_semicolon();
        Ok(Stmt::Expr(expression))
    }

    /// Pratt-style expression parsing: parse a prefix form, then fold in
    /// infix operators while the next token binds tighter than `min`.
    fn parse_expression(&mut self, min: Precedence) -> Result<Expr> {
        trace!(?min, "expression");
        let mut left = self.parse_prefix()?;
        loop {
            match self.peek().map(|token| token.kind.clone()) {
                Some(TokenKind::LParen) if min < Precedence::Call => {
                    left = self.parse_call(left)?;
                }
                Some(kind) => match infix_operator(&kind) {
                    Some((op, precedence)) if min < precedence => {
                        self.advance();
                        let right = self.parse_expression(precedence)?;
                        left = Expr::Infix {
                            op,
                            left: Box::new(left),
                            right: Box::new(right),
                        };
                    }
                    _ => break,
                },
                None => break,
            }
        }
        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr> {
        let token = match self.peek() {
            Some(token) => token.clone(),
            None => return Err(self.error_eof("expected expression")),
        };
        match token.kind {
            TokenKind::Int => {
                self.advance();
                let value = token.lexeme.parse::<i64>().map_err(|_| {
                    Diagnostic::new(
                        DiagnosticKind::Parser,
                        format!("invalid integer literal `{}`", token.lexeme),
                    )
                    .with_span(token.span)
                })?;
                Ok(Expr::IntegerLiteral(value))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::Identifier(token.lexeme))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Ok(Expr::Boolean(true))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Ok(Expr::Boolean(false))
            }
            TokenKind::Bang => {
                self.advance();
                let right = self.parse_expression(Precedence::Prefix)?;
                Ok(Expr::Prefix {
                    op: UnaryOp::Not,
                    right: Box::new(right),
                })
            }
            TokenKind::Minus => {
                self.advance();
                let right = self.parse_expression(Precedence::Prefix)?;
                Ok(Expr::Prefix {
                    op: UnaryOp::Negate,
                    right: Box::new(right),
                })
            }
            TokenKind::LParen => {
                self.advance();
                let expression = self.parse_expression(Precedence::Lowest)?;
                self.consume(TokenKind::RParen, "expected `)` after grouped expression")?;
                Ok(expression)
            }
            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Keyword(Keyword::Fn) => self.parse_function(),
            TokenKind::Unknown => Err(Diagnostic::new(
                DiagnosticKind::Lexer,
                format!("unrecognized character `{}`", token.lexeme),
            )
            .with_span(token.span)),
            _ => Err(self.error(&token, "expected expression")),
        }
    }

    fn parse_if(&mut self) -> Result<Expr> {
        self.advance();
        self.consume(TokenKind::LParen, "expected `(` after `if`")?;
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.consume(TokenKind::RParen, "expected `)` after condition")?;
        let consequence = self.parse_block()?;
        let alternative = if self.matches_keyword(Keyword::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Expr::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_function(&mut self) -> Result<Expr> {
        self.advance();
        self.consume(TokenKind::LParen, "expected `(` after `fn`")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let param = self.consume_identifier("expected parameter name")?;
                params.push(param.lexeme);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RParen, "expected `)` after parameters")?;
        let body = self.parse_block()?;
        Ok(Expr::Function {
            params,
            body: Rc::new(body),
        })
    }

    fn parse_call(&mut self, function: Expr) -> Result<Expr> {
        self.consume(TokenKind::LParen, "expected `(` to start arguments")?;
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expression(Precedence::Lowest)?);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RParen, "expected `)` after arguments")?;
        Ok(Expr::Call {
            function: Box::new(function),
            args,
        })
    }

    fn parse_block(&mut self) -> Result<Block> {
        self.consume(TokenKind::LBrace, "expected `{` to open block")?;
        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            statements.push(self.parse_statement()?);
        }
        self.consume(TokenKind::RBrace, "expected `}` to close block")?;
        Ok(Block { statements })
    }

    fn consume_optional_semicolon(&mut self) {
        let _ = self.matches(TokenKind::Semicolon);
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn matches_keyword(&mut self, keyword: Keyword) -> bool {
        if let Some(Token {
            kind: TokenKind::Keyword(k),
            ..
        }) = self.peek()
        {
            if *k == keyword {
                self.advance();
                return true;
            }
        }
        false
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self
                .peek()
                .map(|tok| self.error(tok, message))
                .unwrap_or_else(|| self.error_eof(message)))
        }
    }

    fn consume_identifier(&mut self, message: &str) -> Result<Token> {
        if self.check(TokenKind::Identifier) {
            Ok(self.advance())
        } else {
            Err(self
                .peek()
                .map(|tok| self.error(tok, message))
                .unwrap_or_else(|| self.error_eof(message)))
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        if let Some(token) = self.peek() {
            token.kind == kind
        } else {
            false
        }
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        let token = self.previous().clone();
        trace!(kind = ?token.kind, start = token.span.start, "advance");
        token
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().map(|t| &t.kind), Some(TokenKind::Eof) | None)
    }

    fn error(&self, token: &Token, message: &str) -> Diagnostic {
        Diagnostic::new(DiagnosticKind::Parser, message.to_string()).with_span(token.span)
    }

    fn error_eof(&self, message: &str) -> Diagnostic {
        Diagnostic::new(DiagnosticKind::Parser, message.to_string())
    }
}
