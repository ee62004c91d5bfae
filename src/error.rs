//! Error types for the payroll formula engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! The zero-fallback operations never surface these; they are returned by the
//! strict entry points (`try_evaluate`, `check_formula`) and by configuration
//! loading.

use thiserror::Error;

use crate::formula::ParseError;

/// The main error type for the payroll formula engine.
///
/// # Example
///
/// ```
/// use payroll_formula::error::FormulaError;
///
/// let error = FormulaError::UnknownVariable {
///     name: "Commission".to_string(),
/// };
/// assert_eq!(error.to_string(), "Unknown variable: Commission");
/// ```
#[derive(Debug, Error)]
pub enum FormulaError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The formula text was empty or only whitespace.
    #[error("Formula is empty")]
    EmptyFormula,

    /// The formula contains a character outside the arithmetic grammar.
    #[error("Invalid character '{character}' at position {position}")]
    InvalidCharacter {
        /// The offending character.
        character: char,
        /// Byte offset of the character in the formula text.
        position: usize,
    },

    /// The formula references a variable that is not declared.
    #[error("Unknown variable: {name}")]
    UnknownVariable {
        /// The variable name.
        name: String,
    },

    /// The formula could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// A division had a zero divisor.
    #[error("Division by zero")]
    DivisionByZero,

    /// An intermediate value exceeded the decimal range.
    #[error("Arithmetic overflow")]
    Overflow,

    /// A configured formula failed authoring-time validation.
    #[error("Invalid formula '{name}': {message}")]
    InvalidFormula {
        /// The name of the formula.
        name: String,
        /// A description of why the formula is invalid.
        message: String,
    },
}

/// A type alias for Results that return FormulaError.
pub type FormulaResult<T> = Result<T, FormulaError>;
