//! Formula model and related types.
//!
//! Formulas are owned by the payroll configuration; the engine only reads them.

use serde::{Deserialize, Serialize};

/// The kind of salary component a formula produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaType {
    /// An allowance added to pay (e.g. HRA, transport).
    Allowance,
    /// A deduction taken from pay (e.g. provident fund).
    Deduction,
    /// A bonus payment.
    Bonus,
    /// An overtime payment.
    Overtime,
    /// A tax withholding.
    Tax,
    /// An intermediate or informational value that is neither paid nor deducted.
    Custom,
}

impl FormulaType {
    /// Returns true if the result is paid to the employee.
    pub fn is_earning(self) -> bool {
        matches!(
            self,
            FormulaType::Allowance | FormulaType::Bonus | FormulaType::Overtime
        )
    }

    /// Returns true if the result is withheld from pay.
    pub fn is_deduction(self) -> bool {
        matches!(self, FormulaType::Deduction | FormulaType::Tax)
    }
}

fn default_active() -> bool {
    true
}

/// A named, prioritized payroll formula.
///
/// # Example
///
/// ```
/// use payroll_formula::models::{Formula, FormulaType};
///
/// let hra = Formula::new("HRA", "BasicSalary * 0.4", FormulaType::Allowance, 1);
/// assert!(hra.is_active);
/// assert!(!hra.inactive().is_active);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    /// The formula name; its result is exposed to later formulas under this name.
    pub name: String,
    /// The expression text.
    #[serde(default)]
    pub formula: String,
    /// The kind of salary component produced.
    #[serde(rename = "type")]
    pub formula_type: FormulaType,
    /// Evaluation order; lower values run first.
    #[serde(default)]
    pub priority: i32,
    /// Inactive formulas are skipped entirely.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Formula {
    /// Creates an active formula.
    pub fn new(
        name: impl Into<String>,
        formula: impl Into<String>,
        formula_type: FormulaType,
        priority: i32,
    ) -> Self {
        Self {
            name: name.into(),
            formula: formula.into(),
            formula_type,
            priority,
            is_active: true,
        }
    }

    /// Returns this formula marked inactive.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}
