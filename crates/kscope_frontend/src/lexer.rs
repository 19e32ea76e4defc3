//! Lexical analysis: turns source text into a flat vector of tokens.
//!
//! The lexer knows nothing about the grammar beyond keywords, identifiers,
//! numbers and single-character punctuation. `#` starts a comment that runs
//! to the end of the line.

use crate::parse::ParseError;

/// Kinds of tokens recognised by the frontend.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Def,
    Extern,
    Ident(String),
    Number(f64),
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Semicolon,
    /// Any single-character operator (`+ - * <`).
    Op(char),
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl TokenKind {
    /// Human-friendly description used in parse errors.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Def => "'def'".to_string(),
            TokenKind::Extern => "'extern'".to_string(),
            TokenKind::Ident(name) => format!("identifier '{name}'"),
            TokenKind::Number(value) => format!("number {value}"),
            TokenKind::LeftParen => "'('".to_string(),
            TokenKind::RightParen => "')'".to_string(),
            TokenKind::LeftBrace => "'{'".to_string(),
            TokenKind::RightBrace => "'}'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Semicolon => "';'".to_string(),
            TokenKind::Op(op) => format!("'{op}'"),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

/// Lex the input into tokens terminated by an `Eof` marker.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    let mut line = 1;
    let mut column = 1;

    while let Some(&c) = chars.peek() {
        let (tok_line, tok_column) = (line, column);

        if c == '\n' {
            chars.next();
            line += 1;
            column = 1;
            continue;
        }
        if c.is_whitespace() {
            chars.next();
            column += 1;
            continue;
        }
        if c == '#' {
            while let Some(&c) = chars.peek() {
                if c == '\n' {
                    break;
                }
                chars.next();
                column += 1;
            }
            continue;
        }

        let kind = if c.is_ascii_alphabetic() {
            let mut ident = String::new();
            while let Some(&c) = chars.peek() {
                if !(c.is_ascii_alphanumeric() || c == '_') {
                    break;
                }
                ident.push(c);
                chars.next();
                column += 1;
            }
            match ident.as_str() {
                "def" => TokenKind::Def,
                "extern" => TokenKind::Extern,
                _ => TokenKind::Ident(ident),
            }
        } else if c.is_ascii_digit() || c == '.' {
            let mut text = String::new();
            while let Some(&c) = chars.peek() {
                if !(c.is_ascii_digit() || c == '.') {
                    break;
                }
                text.push(c);
                chars.next();
                column += 1;
            }
            let value = text.parse::<f64>().map_err(|_| {
                ParseError::new(format!("invalid number '{text}'"), tok_line, tok_column)
            })?;
            TokenKind::Number(value)
        } else {
            let kind = match c {
                '(' => TokenKind::LeftParen,
                ')' => TokenKind::RightParen,
                '{' => TokenKind::LeftBrace,
                '}' => TokenKind::RightBrace,
                ',' => TokenKind::Comma,
                ';' => TokenKind::Semicolon,
                '+' | '-' | '*' | '<' => TokenKind::Op(c),
                other => {
                    return Err(ParseError::new(
                        format!("unexpected character '{other}'"),
                        tok_line,
                        tok_column,
                    ));
                }
            };
            chars.next();
            column += 1;
            kind
        };

        tokens.push(Token {
            kind,
            line: tok_line,
            column: tok_column,
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        line,
        column,
    });
    Ok(tokens)
}
