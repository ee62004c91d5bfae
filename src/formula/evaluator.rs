//! Formula evaluation.
//!
//! Evaluation walks the parsed [`Expr`] using checked decimal arithmetic.
//! The public [`evaluate_formula`] entry point never fails: empty formulas,
//! malformed formulas, division by zero and overflow all produce zero, and
//! a variable with no value resolves to zero. Each of these degraded
//! outcomes is logged so it can be traced in production.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::{FormulaError, FormulaResult};

use super::ast::{BinaryOperator, Expr};
use super::parser::{ParseError, parse};

/// Variable name to value mapping used during evaluation.
pub type VariableMap = HashMap<String, Decimal>;

/// Why an evaluation fell back to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The formula was absent or blank.
    EmptyFormula,
    /// The formula could not be parsed.
    Malformed(ParseError),
    /// A division had a zero divisor.
    DivisionByZero,
    /// An intermediate value exceeded the decimal range.
    Overflow,
}

impl FallbackReason {
    /// Returns a stable code suitable for audit warnings.
    pub fn code(&self) -> &'static str {
        match self {
            FallbackReason::EmptyFormula => "EMPTY_FORMULA",
            FallbackReason::Malformed(_) => "MALFORMED_FORMULA",
            FallbackReason::DivisionByZero => "DIVISION_BY_ZERO",
            FallbackReason::Overflow => "ARITHMETIC_OVERFLOW",
        }
    }

    /// Returns a human-readable description.
    pub fn describe(&self) -> String {
        match self {
            FallbackReason::EmptyFormula => "formula is empty".to_string(),
            FallbackReason::Malformed(err) => format!("formula is malformed: {}", err),
            FallbackReason::DivisionByZero => "division by zero".to_string(),
            FallbackReason::Overflow => "arithmetic overflow".to_string(),
        }
    }
}

/// The outcome of evaluating a formula, including any degradation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaEvaluation {
    /// The computed value (zero when `fallback` is set).
    pub value: Decimal,
    /// Referenced variables that had no value and were treated as zero.
    pub unresolved: Vec<String>,
    /// Set when the whole formula fell back to zero.
    pub fallback: Option<FallbackReason>,
}

impl FormulaEvaluation {
    fn fallback(reason: FallbackReason, unresolved: Vec<String>) -> Self {
        Self {
            value: Decimal::ZERO,
            unresolved,
            fallback: Some(reason),
        }
    }

    /// Returns true if the value was computed without any fallback.
    pub fn is_clean(&self) -> bool {
        self.fallback.is_none() && self.unresolved.is_empty()
    }
}

/// Evaluates a formula against a set of variables, returning zero on failure.
///
/// `formula` may be `None`; absent and blank formulas evaluate to zero.
///
/// # Examples
///
/// ```
/// use payroll_formula::formula::{VariableMap, evaluate_formula};
/// use rust_decimal::Decimal;
///
/// let mut variables = VariableMap::new();
/// variables.insert("a".to_string(), Decimal::from(10000));
/// variables.insert("b".to_string(), Decimal::from(20));
///
/// let result = evaluate_formula("(a*0.4)+(a*b/160)", &variables);
/// assert_eq!(result, Decimal::from(5250));
///
/// assert_eq!(evaluate_formula("a / 0", &variables), Decimal::ZERO);
/// assert_eq!(evaluate_formula(None, &variables), Decimal::ZERO);
/// ```
pub fn evaluate_formula<'a>(formula: impl Into<Option<&'a str>>, variables: &VariableMap) -> Decimal {
    evaluate_with_diagnostics(formula, variables).value
}

/// Evaluates a formula, reporting unresolved variables and fallbacks.
///
/// The returned value always matches [`evaluate_formula`].
pub fn evaluate_with_diagnostics<'a>(
    formula: impl Into<Option<&'a str>>,
    variables: &VariableMap,
) -> FormulaEvaluation {
    let text = match formula.into() {
        Some(text) if !text.trim().is_empty() => text,
        _ => {
            debug!("Empty formula evaluated as zero");
            return FormulaEvaluation::fallback(FallbackReason::EmptyFormula, Vec::new());
        }
    };

    let expr = match parse(text) {
        Ok(expr) => expr,
        Err(err) => {
            warn!(formula = %text, error = %err, "Malformed formula evaluated as zero");
            return FormulaEvaluation::fallback(FallbackReason::Malformed(err), Vec::new());
        }
    };

    let mut evaluator = Evaluator::new(variables);
    match evaluator.evaluate(&expr) {
        Ok(value) => {
            for name in &evaluator.unresolved {
                warn!(formula = %text, variable = %name, "Unresolved variable treated as zero");
            }
            FormulaEvaluation {
                value,
                unresolved: evaluator.unresolved,
                fallback: None,
            }
        }
        Err(err) => {
            let reason = match err {
                FormulaError::DivisionByZero => FallbackReason::DivisionByZero,
                _ => FallbackReason::Overflow,
            };
            warn!(formula = %text, reason = reason.code(), "Formula evaluated as zero");
            FormulaEvaluation::fallback(reason, evaluator.unresolved)
        }
    }
}

/// Evaluates a formula, surfacing failures as errors.
///
/// Unresolved variables still resolve to zero; empty text, parse errors,
/// division by zero and overflow are returned as [`FormulaError`]s.
///
/// # Example
///
/// ```
/// use payroll_formula::error::FormulaError;
/// use payroll_formula::formula::{VariableMap, try_evaluate};
/// use rust_decimal::Decimal;
///
/// let variables = VariableMap::new();
/// assert_eq!(try_evaluate("2 * (3 + 4)", &variables).unwrap(), Decimal::from(14));
/// assert!(matches!(try_evaluate("1 / 0", &variables), Err(FormulaError::DivisionByZero)));
/// ```
pub fn try_evaluate(formula: &str, variables: &VariableMap) -> FormulaResult<Decimal> {
    if formula.trim().is_empty() {
        return Err(FormulaError::EmptyFormula);
    }
    let expr = parse(formula)?;
    evaluate_expr(&expr, variables)
}

/// Evaluates an already-parsed expression.
pub fn evaluate_expr(expr: &Expr, variables: &VariableMap) -> FormulaResult<Decimal> {
    Evaluator::new(variables).evaluate(expr)
}

struct Evaluator<'a> {
    variables: &'a VariableMap,
    unresolved: Vec<String>,
}

impl<'a> Evaluator<'a> {
    fn new(variables: &'a VariableMap) -> Self {
        Self {
            variables,
            unresolved: Vec::new(),
        }
    }

    fn evaluate(&mut self, expr: &Expr) -> FormulaResult<Decimal> {
        match expr {
            Expr::Literal(value) => Ok(*value),
            Expr::Variable(name) => Ok(self.resolve(name)),
            Expr::Negate(inner) => Ok(-self.evaluate(inner)?),
            Expr::Binary {
                operator,
                left,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                apply(*operator, left, right)
            }
        }
    }

    fn resolve(&mut self, name: &str) -> Decimal {
        match self.variables.get(name) {
            Some(value) => *value,
            None => {
                if !self.unresolved.iter().any(|n| n == name) {
                    self.unresolved.push(name.to_string());
                }
                Decimal::ZERO
            }
        }
    }
}

fn apply(operator: BinaryOperator, left: Decimal, right: Decimal) -> FormulaResult<Decimal> {
    let result = match operator {
        BinaryOperator::Add => left.checked_add(right),
        BinaryOperator::Subtract => left.checked_sub(right),
        BinaryOperator::Multiply => left.checked_mul(right),
        BinaryOperator::Divide => {
            if right.is_zero() {
                return Err(FormulaError::DivisionByZero);
            }
            left.checked_div(right)
        }
    };
    result.ok_or(FormulaError::Overflow)
}
