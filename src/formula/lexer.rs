//! Tokenizer for formula text.

use std::iter::Peekable;
use std::str::{CharIndices, FromStr};

use rust_decimal::Decimal;

use super::parser::ParseError;

/// The kind of a lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Number(Decimal),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
}

impl TokenKind {
    pub(crate) fn describe(&self) -> String {
        match self {
            TokenKind::Number(value) => value.to_string(),
            TokenKind::Identifier(name) => name.clone(),
            TokenKind::Plus => "+".to_string(),
            TokenKind::Minus => "-".to_string(),
            TokenKind::Star => "*".to_string(),
            TokenKind::Slash => "/".to_string(),
            TokenKind::LeftParen => "(".to_string(),
            TokenKind::RightParen => ")".to_string(),
        }
    }
}

/// A token together with its byte offset in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

/// Returns true for characters that may start an identifier.
pub(crate) fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Returns true for characters that may continue an identifier.
pub(crate) fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

/// Splits formula text into tokens.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer {
        input,
        chars: input.char_indices().peekable(),
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

impl<'a> Lexer<'a> {
    fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        self.skip_whitespace();

        let Some(&(position, c)) = self.chars.peek() else {
            return Ok(None);
        };

        let kind = match c {
            '+' => self.single(TokenKind::Plus),
            '-' => self.single(TokenKind::Minus),
            '*' => self.single(TokenKind::Star),
            '/' => self.single(TokenKind::Slash),
            '(' => self.single(TokenKind::LeftParen),
            ')' => self.single(TokenKind::RightParen),
            '0'..='9' | '.' => self.number(position)?,
            c if is_identifier_start(c) => self.identifier(position),
            character => {
                return Err(ParseError::UnexpectedChar {
                    character,
                    position,
                });
            }
        };

        Ok(Some(Token { kind, position }))
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.chars.next();
        kind
    }

    fn number(&mut self, start: usize) -> Result<TokenKind, ParseError> {
        let mut end = start;
        let mut seen_dot = false;
        let mut seen_digit = false;

        while let Some(&(index, c)) = self.chars.peek() {
            match c {
                '0'..='9' => seen_digit = true,
                '.' if !seen_dot => seen_dot = true,
                // "1.2.3" or "2x" cannot be a literal
                '.' => return Err(self.invalid_number(start)),
                c if is_identifier_char(c) => return Err(self.invalid_number(start)),
                _ => break,
            }
            end = index + c.len_utf8();
            self.chars.next();
        }

        let text = &self.input[start..end];
        if !seen_digit || text.ends_with('.') {
            return Err(ParseError::InvalidNumber {
                text: text.to_string(),
                position: start,
            });
        }

        Decimal::from_str(text)
            .map(TokenKind::Number)
            .map_err(|_| ParseError::InvalidNumber {
                text: text.to_string(),
                position: start,
            })
    }

    fn invalid_number(&mut self, start: usize) -> ParseError {
        let mut end = start;
        while let Some(&(index, c)) = self.chars.peek() {
            if is_identifier_char(c) || c == '.' {
                end = index + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        ParseError::InvalidNumber {
            text: self.input[start..end].to_string(),
            position: start,
        }
    }

    fn identifier(&mut self, start: usize) -> TokenKind {
        let mut end = start;
        while let Some(&(index, c)) = self.chars.peek() {
            if is_identifier_char(c) {
                end = index + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        TokenKind::Identifier(self.input[start..end].to_string())
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }
    }
}
