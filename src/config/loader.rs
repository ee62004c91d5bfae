//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading formula sets
//! from YAML files.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{FormulaError, FormulaResult};
use crate::formula::{check_formula, evaluate_all_with_audit};
use crate::models::{BatchEvaluation, EvaluationContext, Formula};

use super::types::{FormulaSet, FormulaSetConfig};

/// The file name read from a configuration directory.
pub const FORMULAS_FILE: &str = "formulas.yaml";

/// Loads and provides access to a payroll formula set.
///
/// # Directory Structure
///
/// ```text
/// config/standard/
/// └── formulas.yaml   # Formula set name, version and formulas
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_formula::config::ConfigLoader;
/// use payroll_formula::models::EvaluationContext;
///
/// let loader = ConfigLoader::load("./config/standard")?;
/// let context = EvaluationContext::default();
///
/// loader.validate_against(&context)?;
/// let evaluation = loader.evaluate(&context);
/// println!("Net adjustment: {}", evaluation.totals.net_adjustment);
/// # Ok::<(), payroll_formula::error::FormulaError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    formula_set: FormulaSet,
}

impl ConfigLoader {
    /// Loads `formulas.yaml` from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - The file is missing (`ConfigNotFound`)
    /// - The file contains invalid YAML or is missing required fields (`ConfigParseError`)
    pub fn load<P: AsRef<Path>>(path: P) -> FormulaResult<Self> {
        Self::load_file(path.as_ref().join(FORMULAS_FILE))
    }

    /// Loads a formula set from a single YAML file.
    pub fn load_file<P: AsRef<Path>>(path: P) -> FormulaResult<Self> {
        let path = path.as_ref();
        let config = Self::load_yaml::<FormulaSetConfig>(path)?;
        let formula_set = FormulaSet::from(config);

        info!(
            path = %path.display(),
            formula_set = %formula_set.name(),
            version = %formula_set.version(),
            formulas_count = formula_set.formulas().len(),
            "Loaded formula set"
        );

        Ok(Self { formula_set })
    }

    /// Creates a loader from an in-memory formula set.
    pub fn from_formula_set(formula_set: FormulaSet) -> Self {
        Self { formula_set }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> FormulaResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| FormulaError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| FormulaError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded formula set.
    pub fn formula_set(&self) -> &FormulaSet {
        &self.formula_set
    }

    /// Gets a formula by name.
    pub fn get_formula(&self, name: &str) -> Option<&Formula> {
        self.formula_set.get(name)
    }

    /// Checks every active formula against the variables a context provides.
    ///
    /// Formulas are checked in evaluation order. Each formula may reference
    /// the context's variables and the names of earlier active formulas.
    /// The first failure is returned as [`FormulaError::InvalidFormula`].
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_formula::config::{ConfigLoader, FormulaSet};
    /// use payroll_formula::error::FormulaError;
    /// use payroll_formula::models::{EvaluationContext, Formula, FormulaType};
    ///
    /// let set = FormulaSet::new("Example", "1", vec![
    ///     Formula::new("Bonus", "HRA * 0.1", FormulaType::Bonus, 2),
    ///     Formula::new("HRA", "BasicSalary * 0.4", FormulaType::Allowance, 1),
    /// ]);
    /// let loader = ConfigLoader::from_formula_set(set);
    /// assert!(loader.validate_against(&EvaluationContext::default()).is_ok());
    ///
    /// let set = FormulaSet::new("Example", "1", vec![
    ///     Formula::new("Bonus", "Commission * 0.1", FormulaType::Bonus, 1),
    /// ]);
    /// let loader = ConfigLoader::from_formula_set(set);
    /// let err = loader.validate_against(&EvaluationContext::default()).unwrap_err();
    /// assert!(matches!(err, FormulaError::InvalidFormula { name, .. } if name == "Bonus"));
    /// ```
    pub fn validate_against(&self, context: &EvaluationContext) -> FormulaResult<()> {
        let mut known = context.variable_names();
        let mut seen: Vec<&str> = Vec::new();

        for formula in self.formula_set.active_formulas() {
            if seen.contains(&formula.name.as_str()) {
                return Err(FormulaError::InvalidFormula {
                    name: formula.name.clone(),
                    message: "duplicate active formula name".to_string(),
                });
            }

            check_formula(&formula.formula, &known).map_err(|err| FormulaError::InvalidFormula {
                name: formula.name.clone(),
                message: err.to_string(),
            })?;

            debug!(formula = %formula.name, "Formula passed validation");
            seen.push(&formula.name);
            if !known.contains(&formula.name) {
                known.push(formula.name.clone());
            }
        }

        Ok(())
    }

    /// Evaluates the formula set against a context.
    pub fn evaluate(&self, context: &EvaluationContext) -> BatchEvaluation {
        evaluate_all_with_audit(context, self.formula_set.formulas())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FormulaType;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/standard"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn loader_with(formulas: Vec<Formula>) -> ConfigLoader {
        ConfigLoader::from_formula_set(FormulaSet::new("Test", "1", formulas))
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.formula_set().name(), "Standard Monthly Payroll");
        assert_eq!(loader.formula_set().version(), "2025-01-01");
    }

    #[test]
    fn test_loaded_formulas_are_in_priority_order() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let priorities: Vec<i32> = loader.formula_set().formulas().iter().map(|f| f.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
    }

    #[test]
    fn test_get_formula() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let hra = loader.get_formula("HRA").unwrap();
        assert_eq!(hra.formula, "BasicSalary * 0.4");
        assert_eq!(hra.formula_type, FormulaType::Allowance);
        assert!(loader.get_formula("Unknown").is_none());
    }

    #[test]
    fn test_standard_configuration_validates() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let result = loader.validate_against(&EvaluationContext::default());
        assert!(result.is_ok(), "Validation failed: {:?}", result.err());
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(FormulaError::ConfigNotFound { path }) => {
                assert!(path.contains("formulas.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }

    #[test]
    fn test_load_invalid_yaml_returns_parse_error() {
        let path = std::env::temp_dir().join(format!("payroll_formula_bad_{}.yaml", std::process::id()));
        fs::write(&path, "name: [unclosed").unwrap();

        let result = ConfigLoader::load_file(&path);
        fs::remove_file(&path).ok();

        assert!(matches!(result, Err(FormulaError::ConfigParseError { .. })));
    }

    #[test]
    fn test_validation_rejects_unknown_variable() {
        let loader = loader_with(vec![
            Formula::new("HRA", "BasicSalary * 0.4", FormulaType::Allowance, 1),
            Formula::new("Bonus", "Commission * 0.1", FormulaType::Bonus, 2),
        ]);

        match loader.validate_against(&EvaluationContext::default()) {
            Err(FormulaError::InvalidFormula { name, message }) => {
                assert_eq!(name, "Bonus");
                assert_eq!(message, "Unknown variable: Commission");
            }
            other => panic!("Expected InvalidFormula error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_accepts_custom_values() {
        let loader = loader_with(vec![Formula::new(
            "Commission",
            "Sales * 0.05",
            FormulaType::Bonus,
            1,
        )]);
        let mut context = EvaluationContext::default();
        context.custom_values.insert("Sales".to_string(), dec("100000"));

        assert!(loader.validate_against(&context).is_ok());
    }

    #[test]
    fn test_validation_rejects_reference_to_later_formula() {
        let loader = loader_with(vec![
            Formula::new("Bonus", "HRA * 0.1", FormulaType::Bonus, 1),
            Formula::new("HRA", "BasicSalary * 0.4", FormulaType::Allowance, 2),
        ]);

        assert!(matches!(
            loader.validate_against(&EvaluationContext::default()),
            Err(FormulaError::InvalidFormula { name, .. }) if name == "Bonus"
        ));
    }

    #[test]
    fn test_validation_rejects_reference_to_inactive_formula() {
        let loader = loader_with(vec![
            Formula::new("HRA", "BasicSalary * 0.4", FormulaType::Allowance, 1).inactive(),
            Formula::new("Bonus", "HRA * 0.1", FormulaType::Bonus, 2),
        ]);

        assert!(loader.validate_against(&EvaluationContext::default()).is_err());
    }

    #[test]
    fn test_validation_ignores_broken_inactive_formula() {
        let loader = loader_with(vec![
            Formula::new("Legacy", "BasicSalary & 2", FormulaType::Allowance, 1).inactive(),
            Formula::new("HRA", "BasicSalary * 0.4", FormulaType::Allowance, 2),
        ]);

        assert!(loader.validate_against(&EvaluationContext::default()).is_ok());
    }

    #[test]
    fn test_validation_rejects_duplicate_names() {
        let loader = loader_with(vec![
            Formula::new("HRA", "BasicSalary * 0.4", FormulaType::Allowance, 1),
            Formula::new("HRA", "BasicSalary * 0.5", FormulaType::Allowance, 2),
        ]);

        match loader.validate_against(&EvaluationContext::default()) {
            Err(FormulaError::InvalidFormula { name, message }) => {
                assert_eq!(name, "HRA");
                assert_eq!(message, "duplicate active formula name");
            }
            other => panic!("Expected InvalidFormula error, got {:?}", other),
        }
    }

    #[test]
    fn test_evaluate_uses_loaded_formulas() {
        let loader = loader_with(vec![
            Formula::new("HRA", "BasicSalary * 0.4", FormulaType::Allowance, 1),
            Formula::new("Bonus", "HRA * 0.1", FormulaType::Bonus, 2),
        ]);
        let context = EvaluationContext {
            basic_salary: dec("10000"),
            ..EvaluationContext::default()
        };

        let evaluation = loader.evaluate(&context);
        assert_eq!(evaluation.results["HRA"], dec("4000"));
        assert_eq!(evaluation.results["Bonus"], dec("400"));
    }
}
