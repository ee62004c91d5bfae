//! Authoring-time formula validation.

use tracing::debug;

use crate::error::{FormulaError, FormulaResult};

use super::parser::parse;
use super::variables::extract_variables;

/// Returns true if `c` may appear anywhere in a formula.
fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace() || matches!(c, '.' | '+' | '-' | '*' | '/' | '(' | ')' | '_')
}

/// Checks that a formula is well-formed and only references known variables.
///
/// Checks run in this order and the first failure is returned:
/// 1. the formula is not blank
/// 2. every character belongs to the formula alphabet
/// 3. every referenced variable is in `known_variables`
/// 4. the formula parses
///
/// # Example
///
/// ```
/// use payroll_formula::error::FormulaError;
/// use payroll_formula::formula::check_formula;
///
/// assert!(check_formula("BasicSalary * 0.4", &["BasicSalary"]).is_ok());
///
/// let err = check_formula("BasicSalary + Commission", &["BasicSalary"]).unwrap_err();
/// assert!(matches!(err, FormulaError::UnknownVariable { name } if name == "Commission"));
/// ```
pub fn check_formula<S: AsRef<str>>(formula: &str, known_variables: &[S]) -> FormulaResult<()> {
    if formula.trim().is_empty() {
        return Err(FormulaError::EmptyFormula);
    }

    if let Some((position, character)) = formula.char_indices().find(|&(_, c)| !is_allowed_char(c)) {
        return Err(FormulaError::InvalidCharacter {
            character,
            position,
        });
    }

    for name in extract_variables(formula) {
        if !known_variables.iter().any(|known| known.as_ref() == name) {
            return Err(FormulaError::UnknownVariable { name });
        }
    }

    parse(formula)?;
    Ok(())
}

/// Returns true if the formula passes [`check_formula`].
///
/// # Examples
///
/// ```
/// use payroll_formula::formula::validate_formula;
///
/// assert!(validate_formula("a*0.4", &["a"]));
/// assert!(!validate_formula("a+missing", &["a"]));
/// assert!(!validate_formula("a*0.4 & b", &["a", "b"]));
/// ```
pub fn validate_formula<S: AsRef<str>>(formula: &str, known_variables: &[S]) -> bool {
    match check_formula(formula, known_variables) {
        Ok(()) => true,
        Err(err) => {
            debug!(formula = %formula, error = %err, "Formula failed validation");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::ParseError;

    #[test]
    fn test_known_variables_pass() {
        assert!(validate_formula("a*0.4", &["a"]));
        assert!(validate_formula("(BasicSalary * 0.4) + -LeaveDays / 2", &["BasicSalary", "LeaveDays"]));
    }

    #[test]
    fn test_literal_only_formula_passes_with_no_variables() {
        let known: [&str; 0] = [];
        assert!(validate_formula("1500 * 0.12", &known));
    }

    #[test]
    fn test_unknown_variable_fails() {
        assert!(!validate_formula("a+missing", &["a"]));
        assert!(matches!(
            check_formula("a+missing", &["a"]),
            Err(FormulaError::UnknownVariable { name }) if name == "missing"
        ));
    }

    #[test]
    fn test_illegal_characters_fail() {
        assert!(!validate_formula("a*0.4 & b", &["a", "b"]));
        assert!(!validate_formula("a % 2", &["a"]));
        assert!(!validate_formula("$a", &["a"]));
        assert!(matches!(
            check_formula("a*0.4 & b", &["a", "b"]),
            Err(FormulaError::InvalidCharacter { character: '&', position: 6 })
        ));
    }

    #[test]
    fn test_empty_formula_fails() {
        assert!(!validate_formula("", &["a"]));
        assert!(matches!(check_formula("  \t", &["a"]), Err(FormulaError::EmptyFormula)));
    }

    #[test]
    fn test_unparseable_formula_fails() {
        assert!(!validate_formula("(a + b", &["a", "b"]));
        assert!(!validate_formula("a b", &["a", "b"]));
        assert!(matches!(
            check_formula("a * / b", &["a", "b"]),
            Err(FormulaError::Parse(ParseError::UnexpectedToken { .. }))
        ));
    }

    #[test]
    fn test_deeply_nested_formula_fails() {
        let formula = format!("{}a{}", "(".repeat(10_000), ")".repeat(10_000));
        assert!(!validate_formula(&formula, &["a"]));
        assert!(matches!(
            check_formula(&formula, &["a"]),
            Err(FormulaError::Parse(ParseError::TooDeep { .. }))
        ));
    }

    #[test]
    fn test_known_names_accept_owned_strings() {
        let known = vec!["HRA".to_string(), "BasicSalary".to_string()];
        assert!(validate_formula("HRA * 0.1", &known));
    }
}
