//! Recursive-descent parser for payroll formulas.
//!
//! Grammar:
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := unary (('*' | '/') unary)*
//! unary      := '-' unary | '+' unary | primary
//! primary    := NUMBER | IDENTIFIER | '(' expression ')'
//! ```
//!
//! Both the descent (parentheses and unary signs) and the height of the
//! resulting tree are capped at [`MAX_DEPTH`], so evaluating, printing or
//! dropping a parsed formula never recurses further than that.

use thiserror::Error;

use super::ast::{BinaryOperator, Expr};
use super::lexer::{Token, TokenKind, tokenize};

/// Maximum nesting depth of a formula.
pub const MAX_DEPTH: usize = 128;

/// Errors produced while tokenizing or parsing a formula.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A character outside the formula grammar.
    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedChar {
        /// The offending character.
        character: char,
        /// Byte offset in the formula text.
        position: usize,
    },
    /// A numeric literal that is not a valid decimal.
    #[error("Invalid number '{text}' at position {position}")]
    InvalidNumber {
        /// The literal text.
        text: String,
        /// Byte offset in the formula text.
        position: usize,
    },
    /// A token that is not allowed where it appears.
    #[error("Unexpected token '{token}' at position {position}")]
    UnexpectedToken {
        /// The token text.
        token: String,
        /// Byte offset in the formula text.
        position: usize,
    },
    /// The formula ended while an operand or `)` was still expected.
    #[error("Unexpected end of formula")]
    UnexpectedEnd,
    /// An opening parenthesis was never closed.
    #[error("Unclosed parenthesis at position {position}")]
    UnclosedParen {
        /// Byte offset of the `(`.
        position: usize,
    },
    /// The formula contained no tokens.
    #[error("Empty formula")]
    Empty,
    /// The formula nests deeper than [`MAX_DEPTH`].
    #[error("Formula nested too deeply at position {position}")]
    TooDeep {
        /// Byte offset where the limit was exceeded.
        position: usize,
    },
}

/// Parses formula text into an [`Expr`].
///
/// # Example
///
/// ```
/// use payroll_formula::formula::parse;
///
/// let expr = parse("(BasicSalary * 0.4) + -Deduction").unwrap();
/// assert_eq!(expr.to_string(), "((BasicSalary * 0.4) + -Deduction)");
///
/// assert!(parse("(BasicSalary * 0.4").is_err());
/// ```
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    FormulaParser::parse(input)
}

/// Formula parser over a token stream.
pub struct FormulaParser {
    tokens: Vec<Token>,
    pos: usize,
    nesting: usize,
}

/// A parsed subtree and its height.
type Parsed = (Expr, usize);

impl FormulaParser {
    /// Tokenizes and parses a complete formula.
    pub fn parse(input: &str) -> Result<Expr, ParseError> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(ParseError::Empty);
        }

        let mut parser = Self {
            tokens,
            pos: 0,
            nesting: 0,
        };
        let (expr, _) = parser.parse_expression()?;

        // Anything left over (e.g. a stray ')') is an error
        if let Some(token) = parser.peek() {
            return Err(unexpected(token));
        }

        Ok(expr)
    }

    fn parse_expression(&mut self) -> Result<Parsed, ParseError> {
        let mut left = self.parse_term()?;

        while let Some((operator, position)) = self.peek_operator(&[
            (TokenKind::Plus, BinaryOperator::Add),
            (TokenKind::Minus, BinaryOperator::Subtract),
        ]) {
            self.advance();
            let right = self.parse_term()?;
            left = binary(operator, left, right, position)?;
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Parsed, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some((operator, position)) = self.peek_operator(&[
            (TokenKind::Star, BinaryOperator::Multiply),
            (TokenKind::Slash, BinaryOperator::Divide),
        ]) {
            self.advance();
            let right = self.parse_unary()?;
            left = binary(operator, left, right, position)?;
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Parsed, ParseError> {
        let (kind, position) = match self.peek() {
            Some(token) => (token.kind.clone(), token.position),
            None => return Err(ParseError::UnexpectedEnd),
        };

        match kind {
            TokenKind::Minus => {
                self.enter(position)?;
                self.advance();
                let (inner, height) = self.parse_unary()?;
                self.leave();
                let height = height + 1;
                if height > MAX_DEPTH {
                    return Err(ParseError::TooDeep { position });
                }
                Ok((Expr::Negate(Box::new(inner)), height))
            }
            TokenKind::Plus => {
                self.enter(position)?;
                self.advance();
                let parsed = self.parse_unary()?;
                self.leave();
                Ok(parsed)
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Parsed, ParseError> {
        let token = self.peek().cloned().ok_or(ParseError::UnexpectedEnd)?;

        match &token.kind {
            TokenKind::Number(value) => {
                self.advance();
                Ok((Expr::Literal(*value), 1))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok((Expr::Variable(name.clone()), 1))
            }
            TokenKind::LeftParen => {
                self.enter(token.position)?;
                self.advance();
                let inner = self.parse_expression()?;
                self.leave();
                match self.peek() {
                    Some(Token {
                        kind: TokenKind::RightParen,
                        ..
                    }) => {
                        self.advance();
                        Ok(inner)
                    }
                    Some(other) => Err(unexpected(other)),
                    None => Err(ParseError::UnclosedParen {
                        position: token.position,
                    }),
                }
            }
            _ => Err(unexpected(&token)),
        }
    }

    fn enter(&mut self, position: usize) -> Result<(), ParseError> {
        self.nesting += 1;
        if self.nesting > MAX_DEPTH {
            return Err(ParseError::TooDeep { position });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    fn peek_operator(
        &self,
        candidates: &[(TokenKind, BinaryOperator)],
    ) -> Option<(BinaryOperator, usize)> {
        let token = self.peek()?;
        candidates
            .iter()
            .find(|(kind, _)| *kind == token.kind)
            .map(|(_, operator)| (*operator, token.position))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }
}

fn binary(
    operator: BinaryOperator,
    (left, left_height): Parsed,
    (right, right_height): Parsed,
    position: usize,
) -> Result<Parsed, ParseError> {
    let height = left_height.max(right_height) + 1;
    if height > MAX_DEPTH {
        return Err(ParseError::TooDeep { position });
    }
    Ok((
        Expr::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        },
        height,
    ))
}

fn unexpected(token: &Token) -> ParseError {
    ParseError::UnexpectedToken {
        token: token.kind.describe(),
        position: token.position,
    }
}
