//! Expression tree for payroll formulas.

use std::fmt;

use rust_decimal::Decimal;

/// A binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
}

impl BinaryOperator {
    /// Returns the operator's source symbol.
    pub fn symbol(self) -> char {
        match self {
            BinaryOperator::Add => '+',
            BinaryOperator::Subtract => '-',
            BinaryOperator::Multiply => '*',
            BinaryOperator::Divide => '/',
        }
    }
}

/// A parsed formula expression.
///
/// # Example
///
/// ```
/// use payroll_formula::formula::{BinaryOperator, Expr, parse};
/// use rust_decimal::Decimal;
///
/// let expr = parse("BasicSalary * 2").unwrap();
/// assert_eq!(
///     expr,
///     Expr::Binary {
///         operator: BinaryOperator::Multiply,
///         left: Box::new(Expr::Variable("BasicSalary".to_string())),
///         right: Box::new(Expr::Literal(Decimal::from(2))),
///     }
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A decimal literal such as `0.4`.
    Literal(Decimal),
    /// A named variable reference.
    Variable(String),
    /// A binary operation.
    Binary {
        /// The operator.
        operator: BinaryOperator,
        /// The left operand.
        left: Box<Expr>,
        /// The right operand.
        right: Box<Expr>,
    },
    /// Unary minus.
    Negate(Box<Expr>),
}

impl Expr {
    /// Returns the distinct variable names referenced by this expression,
    /// in first-occurrence order.
    pub fn variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables(&self, names: &mut Vec<String>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Variable(name) => {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            Expr::Binary { left, right, .. } => {
                left.collect_variables(names);
                right.collect_variables(names);
            }
            Expr::Negate(inner) => inner.collect_variables(names),
        }
    }
}

/// Renders the expression fully parenthesised, which makes the parsed
/// precedence visible in audit output.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write!(f, "{}", value.normalize()),
            Expr::Variable(name) => write!(f, "{}", name),
            Expr::Binary {
                operator,
                left,
                right,
            } => write!(f, "({} {} {})", left, operator.symbol(), right),
            Expr::Negate(inner) => write!(f, "-{}", inner),
        }
    }
}
