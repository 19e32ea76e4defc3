use thiserror::Error;

use crate::ast::{Expr, FunctionDef, Program, Prototype, TopLevel};
use crate::lexer::{Token, TokenKind, tokenize};

/// A syntax error with the 1-based position of the offending token.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }

    fn at(message: impl Into<String>, token: &Token) -> Self {
        Self::new(message, token.line, token.column)
    }
}

/// Parse source text into a [`Program`].
///
/// Syntax only: call arity and parameter uniqueness are left to codegen.
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    let tokens = tokenize(source)?;
    Parser::new(tokens).parse_program()
}

/// Binding power of a binary operator; `None` for anything that is not one.
fn precedence(op: char) -> Option<u8> {
    match op {
        '<' => Some(10),
        '+' | '-' => Some(20),
        '*' => Some(40),
        _ => None,
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    /// `tokens` should end with an `Eof` token, as produced by [`tokenize`].
    /// One is appended when missing.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(token) if token.kind == TokenKind::Eof) {
            let (line, column) = tokens.last().map_or((1, 1), |t| (t.line, t.column));
            tokens.push(Token {
                kind: TokenKind::Eof,
                line,
                column,
            });
        }
        Self { tokens, current: 0 }
    }

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();

        self.skip_separators();
        while !self.is_at_end() {
            statements.push(self.top_level()?);
            self.skip_separators();
        }

        Ok(Program { statements })
    }

    fn top_level(&mut self) -> Result<TopLevel, ParseError> {
        match self.peek().kind {
            TokenKind::Extern => {
                self.advance();
                Ok(TopLevel::Extern(self.prototype()?))
            }
            TokenKind::Def => {
                self.advance();
                let proto = self.prototype()?;
                let body = self.function_body()?;
                Ok(TopLevel::Function(FunctionDef { proto, body }))
            }
            _ => Ok(TopLevel::Expr(self.expression()?)),
        }
    }

    /// `ident '(' (ident (','? ident)*)? ')'`
    fn prototype(&mut self) -> Result<Prototype, ParseError> {
        let name = self.consume_identifier("expected function name in prototype")?;
        self.consume(TokenKind::LeftParen, "expected '(' after function name")?;

        let mut params = Vec::new();
        while !self.check(&TokenKind::RightParen) {
            if !params.is_empty() && self.check(&TokenKind::Comma) {
                self.advance();
            }
            params.push(self.consume_identifier("expected parameter name")?);
        }
        self.consume(TokenKind::RightParen, "expected ')' after parameters")?;

        Ok(Prototype { name, params })
    }

    fn function_body(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::LeftBrace) {
            self.advance();
            let body = self.expression()?;
            self.consume(TokenKind::RightBrace, "expected '}' after function body")?;
            Ok(body)
        } else {
            self.expression()
        }
    }

    pub(crate) fn expression(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.primary()?;
        self.binary_rhs(0, lhs)
    }

    /// Precedence climbing: fold operators binding tighter than `min_prec`.
    fn binary_rhs(&mut self, min_prec: u8, mut lhs: Expr) -> Result<Expr, ParseError> {
        loop {
            let (op, prec) = match self.peek_operator() {
                Some((op, prec)) if prec >= min_prec => (op, prec),
                _ => return Ok(lhs),
            };
            self.advance();

            let mut rhs = self.primary()?;
            if let Some((_, next_prec)) = self.peek_operator() {
                if next_prec > prec {
                    rhs = self.binary_rhs(prec + 1, rhs)?;
                }
            }

            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance().clone();
        match token.kind {
            TokenKind::Number(value) => Ok(Expr::Number(value)),
            TokenKind::Ident(name) => {
                if !self.check(&TokenKind::LeftParen) {
                    return Ok(Expr::Variable(name));
                }
                self.advance();
                let args = self.call_arguments()?;
                Ok(Expr::Call { callee: name, args })
            }
            TokenKind::LeftParen => {
                let expr = self.expression()?;
                self.consume(TokenKind::RightParen, "expected ')' after expression")?;
                Ok(expr)
            }
            other => Err(ParseError::new(
                format!("expected expression, found {}", other.describe()),
                token.line,
                token.column,
            )),
        }
    }

    fn call_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if self.check(&TokenKind::RightParen) {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            if self.check(&TokenKind::Comma) {
                self.advance();
                continue;
            }
            self.consume(TokenKind::RightParen, "expected ')' or ',' in argument list")?;
            return Ok(args);
        }
    }

    // ---- Token helpers ----

    fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn peek_operator(&self) -> Option<(char, u8)> {
        match self.peek().kind {
            TokenKind::Op(op) => precedence(op).map(|prec| (op, prec)),
            _ => None,
        }
    }

    fn advance(&mut self) -> &Token {
        let index = self.current.min(self.tokens.len() - 1);
        if !self.is_at_end() {
            self.current += 1;
        }
        &self.tokens[index]
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<(), ParseError> {
        if self.check(&kind) {
            self.advance();
            return Ok(());
        }
        Err(self.unexpected(message))
    }

    fn consume_identifier(&mut self, message: &str) -> Result<String, ParseError> {
        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            return Ok(name);
        }
        Err(self.unexpected(message))
    }

    fn unexpected(&self, message: &str) -> ParseError {
        let token = self.peek();
        ParseError::at(
            format!("{message}, found {}", token.kind.describe()),
            token,
        )
    }

    fn skip_separators(&mut self) {
        while self.check(&TokenKind::Semicolon) {
            self.advance();
        }
    }
}
