//! The payroll formula engine.
//!
//! This module parses arithmetic formulas over named decimal variables,
//! evaluates them, validates them against a declared variable list, and runs
//! prioritized formula sets where each result feeds later formulas.

mod ast;
mod batch;
mod evaluator;
mod helpers;
mod lexer;
mod parser;
mod validator;
mod variables;

pub use ast::{BinaryOperator, Expr};
pub use batch::{evaluate_all, evaluate_all_with_audit};
pub use evaluator::{
    FallbackReason, FormulaEvaluation, VariableMap, evaluate_expr, evaluate_formula,
    evaluate_with_diagnostics, try_evaluate,
};
pub use helpers::{
    NORMAL_HOURS_PER_DAY, STANDARD_DAYS_PER_MONTH, calculate_overtime_amount,
    get_available_variables,
};
pub use parser::{FormulaParser, MAX_DEPTH, ParseError, parse};
pub use validator::{check_formula, validate_formula};
pub use variables::extract_variables;
