//! Variable extraction from formula text.

use super::lexer::{is_identifier_char, is_identifier_start};

/// Returns the distinct variable names referenced in a formula.
///
/// Names are returned in first-occurrence order. Extraction is lenient: it
/// scans the text without parsing it, so names are still reported for
/// formulas that contain illegal characters or unbalanced parentheses.
/// Numeric literals (including malformed ones such as `2x`) are skipped.
///
/// # Examples
///
/// ```
/// use payroll_formula::formula::extract_variables;
///
/// assert_eq!(extract_variables("(a+b)*c-d"), vec!["a", "b", "c", "d"]);
/// assert_eq!(extract_variables("HRA + HRA * 0.1"), vec!["HRA"]);
/// assert!(extract_variables("100+200*0.5").is_empty());
/// ```
pub fn extract_variables(formula: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut chars = formula.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if is_identifier_start(c) {
            let mut end = start + c.len_utf8();
            while let Some(&(index, next)) = chars.peek() {
                if !is_identifier_char(next) {
                    break;
                }
                end = index + next.len_utf8();
                chars.next();
            }
            let name = &formula[start..end];
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        } else if c.is_ascii_digit() || c == '.' {
            while chars
                .next_if(|&(_, next)| is_identifier_char(next) || next == '.')
                .is_some()
            {}
        }
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_each_variable_once() {
        let names = extract_variables("(a+b)*c-d");
        assert_eq!(names.len(), 4);
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_literals_only_yield_nothing() {
        assert!(extract_variables("100+200*0.5").is_empty());
        assert!(extract_variables(".25 * 4").is_empty());
    }

    #[test]
    fn test_empty_formula_yields_nothing() {
        assert!(extract_variables("").is_empty());
        assert!(extract_variables("   ").is_empty());
    }

    #[test]
    fn test_duplicates_keep_first_position() {
        assert_eq!(
            extract_variables("Bonus + BasicSalary * Bonus / BasicSalary_2"),
            vec!["Bonus", "BasicSalary", "BasicSalary_2"]
        );
    }

    #[test]
    fn test_underscore_and_digits_in_names() {
        assert_eq!(extract_variables("_tmp1 + overtime_2x"), vec!["_tmp1", "overtime_2x"]);
    }

    #[test]
    fn test_digit_prefixed_word_is_not_a_variable() {
        assert_eq!(extract_variables("2x + y"), vec!["y"]);
    }

    #[test]
    fn test_extraction_ignores_illegal_characters() {
        assert_eq!(extract_variables("a*0.4 & b"), vec!["a", "b"]);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert_eq!(extract_variables("HRA + hra"), vec!["HRA", "hra"]);
    }
}
