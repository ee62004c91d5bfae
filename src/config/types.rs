//! Configuration types for formula sets.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use serde::Deserialize;

use crate::models::Formula;

/// Formula set file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct FormulaSetConfig {
    /// The human-readable name of the formula set.
    pub name: String,
    /// The version or effective date of the formula set.
    pub version: String,
    /// The formulas, in any order.
    #[serde(default)]
    pub formulas: Vec<Formula>,
}

/// A loaded formula set, ordered for evaluation.
#[derive(Debug, Clone)]
pub struct FormulaSet {
    /// The human-readable name of the formula set.
    name: String,
    /// The version of the formula set.
    version: String,
    /// Formulas sorted by priority (ties keep file order).
    formulas: Vec<Formula>,
}

impl FormulaSet {
    /// Creates a new FormulaSet, ordering the formulas by priority.
    pub fn new(name: impl Into<String>, version: impl Into<String>, formulas: Vec<Formula>) -> Self {
        let mut sorted_formulas = formulas;
        sorted_formulas.sort_by_key(|formula| formula.priority);
        Self {
            name: name.into(),
            version: version.into(),
            formulas: sorted_formulas,
        }
    }

    /// Returns the formula set name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the formula set version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns all formulas in evaluation order.
    pub fn formulas(&self) -> &[Formula] {
        &self.formulas
    }

    /// Returns the active formulas in evaluation order.
    pub fn active_formulas(&self) -> impl Iterator<Item = &Formula> {
        self.formulas.iter().filter(|formula| formula.is_active)
    }

    /// Gets a formula by name.
    pub fn get(&self, name: &str) -> Option<&Formula> {
        self.formulas.iter().find(|formula| formula.name == name)
    }
}

impl From<FormulaSetConfig> for FormulaSet {
    fn from(config: FormulaSetConfig) -> Self {
        Self::new(config.name, config.version, config.formulas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FormulaType;

    #[test]
    fn test_new_sorts_by_priority_stably() {
        let set = FormulaSet::new(
            "Test",
            "1",
            vec![
                Formula::new("C", "1", FormulaType::Custom, 2),
                Formula::new("A", "1", FormulaType::Custom, 1),
                Formula::new("D", "1", FormulaType::Custom, 2),
                Formula::new("B", "1", FormulaType::Custom, 1),
            ],
        );

        let names: Vec<&str> = set.formulas().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_active_formulas_excludes_inactive() {
        let set = FormulaSet::new(
            "Test",
            "1",
            vec![
                Formula::new("A", "1", FormulaType::Custom, 1),
                Formula::new("B", "1", FormulaType::Custom, 2).inactive(),
            ],
        );

        let active: Vec<&str> = set.active_formulas().map(|f| f.name.as_str()).collect();
        assert_eq!(active, vec!["A"]);
        assert!(set.get("B").is_some());
        assert!(set.get("Z").is_none());
    }

    #[test]
    fn test_deserialize_formula_set_config() {
        let yaml = r#"
name: Standard
version: "2025-01"
formulas:
  - name: HRA
    formula: BasicSalary * 0.4
    type: allowance
    priority: 1
"#;

        let config: FormulaSetConfig = serde_yaml::from_str(yaml).unwrap();
        let set = FormulaSet::from(config);
        assert_eq!(set.name(), "Standard");
        assert_eq!(set.version(), "2025-01");
        assert_eq!(set.formulas().len(), 1);
        assert!(set.formulas()[0].is_active);
    }
}
