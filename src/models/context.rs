//! Evaluation context model.
//!
//! The payroll service builds one [`EvaluationContext`] per employee per run
//! from employee, attendance and organization data.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::formula::VariableMap;

/// Variable name for the basic salary.
pub const BASIC_SALARY: &str = "BasicSalary";
/// Variable name for the gross salary.
pub const GROSS_SALARY: &str = "GrossSalary";
/// Variable name for overtime hours worked.
pub const OVERTIME_HOURS: &str = "OvertimeHours";
/// Variable name for scheduled working days.
pub const WORKING_DAYS: &str = "WorkingDays";
/// Variable name for days actually worked.
pub const ACTUAL_WORKING_DAYS: &str = "ActualWorkingDays";
/// Variable name for days absent.
pub const ABSENT_DAYS: &str = "AbsentDays";
/// Variable name for leave days taken.
pub const LEAVE_DAYS: &str = "LeaveDays";
/// Variable name for calendar days in the payroll month.
pub const DAYS_IN_MONTH: &str = "DaysInMonth";

/// Where an available variable comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableSource {
    /// One of the fixed context fields.
    Context,
    /// An entry in [`EvaluationContext::variables`].
    Variable,
    /// An entry in [`EvaluationContext::custom_values`].
    Custom,
}

/// A variable name and its current value, for formula-builder introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableVariable {
    /// The variable name as used in formulas.
    pub name: String,
    /// The current value.
    pub value: Decimal,
    /// The source of the value.
    pub source: VariableSource,
}

/// Payroll-run values available to formulas.
///
/// When the same name appears in more than one source, the merged mapping
/// applies fixed fields first, then `variables`, then `custom_values`; the
/// last write wins.
///
/// # Example
///
/// ```
/// use payroll_formula::models::EvaluationContext;
/// use rust_decimal::Decimal;
///
/// let mut context = EvaluationContext::for_month(2024, 2).unwrap();
/// context.basic_salary = Decimal::from(12000);
/// context.custom_values.insert("MealAllowance".to_string(), Decimal::from(500));
///
/// let variables = context.to_variable_map();
/// assert_eq!(variables["DaysInMonth"], Decimal::from(29));
/// assert_eq!(variables["MealAllowance"], Decimal::from(500));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationContext {
    /// Monthly basic salary.
    pub basic_salary: Decimal,
    /// Monthly gross salary.
    pub gross_salary: Decimal,
    /// Overtime hours worked in the period.
    pub overtime_hours: Decimal,
    /// Scheduled working days in the period.
    pub working_days: Decimal,
    /// Days actually worked.
    pub actual_working_days: Decimal,
    /// Days absent without leave.
    pub absent_days: Decimal,
    /// Leave days taken.
    pub leave_days: Decimal,
    /// Calendar days in the payroll month.
    pub days_in_month: Decimal,
    /// Ad hoc numeric overrides.
    pub variables: BTreeMap<String, Decimal>,
    /// Ad hoc custom values, applied after `variables`.
    pub custom_values: BTreeMap<String, Decimal>,
}

impl EvaluationContext {
    /// Creates an empty context with `days_in_month` set from the calendar.
    ///
    /// Returns `None` for an invalid year/month.
    pub fn for_month(year: i32, month: u32) -> Option<Self> {
        let days = days_in_month(year, month)?;
        Some(Self {
            days_in_month: Decimal::from(days),
            ..Self::default()
        })
    }

    /// Returns the fixed fields paired with their variable names.
    pub fn fixed_fields(&self) -> [(&'static str, Decimal); 8] {
        [
            (BASIC_SALARY, self.basic_salary),
            (GROSS_SALARY, self.gross_salary),
            (OVERTIME_HOURS, self.overtime_hours),
            (WORKING_DAYS, self.working_days),
            (ACTUAL_WORKING_DAYS, self.actual_working_days),
            (ABSENT_DAYS, self.absent_days),
            (LEAVE_DAYS, self.leave_days),
            (DAYS_IN_MONTH, self.days_in_month),
        ]
    }

    /// Merges every source into a single evaluation mapping.
    pub fn to_variable_map(&self) -> VariableMap {
        let mut merged: VariableMap = self
            .fixed_fields()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        for (name, value) in self.variables.iter().chain(self.custom_values.iter()) {
            merged.insert(name.clone(), *value);
        }
        merged
    }

    /// Returns every name a formula may reference, without duplicates.
    pub fn variable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for variable in self.available_variables() {
            if !names.contains(&variable.name) {
                names.push(variable.name);
            }
        }
        names
    }

    /// Lists fixed fields, then `variables`, then `custom_values`.
    ///
    /// Names present in several sources are listed once per source.
    pub fn available_variables(&self) -> Vec<AvailableVariable> {
        let fixed = self
            .fixed_fields()
            .into_iter()
            .map(|(name, value)| AvailableVariable {
                name: name.to_string(),
                value,
                source: VariableSource::Context,
            });
        let variables = self.variables.iter().map(|(name, value)| AvailableVariable {
            name: name.clone(),
            value: *value,
            source: VariableSource::Variable,
        });
        let custom_values = self.custom_values.iter().map(|(name, value)| AvailableVariable {
            name: name.clone(),
            value: *value,
            source: VariableSource::Custom,
        });

        fixed.chain(variables).chain(custom_values).collect()
    }
}

/// Returns the number of calendar days in a month.
///
/// # Example
///
/// ```
/// use payroll_formula::models::days_in_month;
///
/// assert_eq!(days_in_month(2024, 2), Some(29));
/// assert_eq!(days_in_month(2025, 12), Some(31));
/// assert_eq!(days_in_month(2025, 13), None);
/// ```
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_test_context() -> EvaluationContext {
        EvaluationContext {
            basic_salary: dec("10000"),
            overtime_hours: dec("12.5"),
            working_days: dec("22"),
            actual_working_days: dec("20"),
            absent_days: dec("1"),
            leave_days: dec("1"),
            days_in_month: dec("30"),
            ..EvaluationContext::default()
        }
    }

    #[test]
    fn test_variable_map_contains_fixed_fields() {
        let variables = create_test_context().to_variable_map();

        assert_eq!(variables.len(), 8);
        assert_eq!(variables[BASIC_SALARY], dec("10000"));
        assert_eq!(variables[OVERTIME_HOURS], dec("12.5"));
        assert_eq!(variables[GROSS_SALARY], Decimal::ZERO);
        assert_eq!(variables[DAYS_IN_MONTH], dec("30"));
    }

    #[test]
    fn test_custom_values_override_variables_override_fixed_fields() {
        let mut context = create_test_context();
        context.variables.insert("BasicSalary".to_string(), dec("11000"));
        context.variables.insert("Shared".to_string(), dec("1"));
        context.custom_values.insert("Shared".to_string(), dec("2"));

        let variables = context.to_variable_map();
        assert_eq!(variables[BASIC_SALARY], dec("11000"));
        assert_eq!(variables["Shared"], dec("2"));
    }

    #[test]
    fn test_available_variables_lists_every_source() {
        let mut context = create_test_context();
        context.variables.insert("Shared".to_string(), dec("1"));
        context.custom_values.insert("Shared".to_string(), dec("2"));

        let available = context.available_variables();
        assert_eq!(available.len(), 10);
        assert_eq!(available[0].name, BASIC_SALARY);
        assert_eq!(available[0].source, VariableSource::Context);
        assert_eq!(available[8].source, VariableSource::Variable);
        assert_eq!(available[9].source, VariableSource::Custom);
        assert_eq!(available[9].value, dec("2"));
    }

    #[test]
    fn test_variable_names_are_unique() {
        let mut context = create_test_context();
        context.variables.insert("Shared".to_string(), dec("1"));
        context.custom_values.insert("Shared".to_string(), dec("2"));

        let names = context.variable_names();
        assert_eq!(names.len(), 9);
        assert_eq!(names.last().unwrap(), "Shared");
    }

    #[test]
    fn test_for_month_sets_days_in_month() {
        let context = EvaluationContext::for_month(2025, 4).unwrap();
        assert_eq!(context.days_in_month, dec("30"));
        assert_eq!(context.basic_salary, Decimal::ZERO);
        assert!(EvaluationContext::for_month(2025, 0).is_none());
    }

    #[test]
    fn test_days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(1900, 2), Some(28));
        assert_eq!(days_in_month(2000, 2), Some(29));
    }

    #[test]
    fn test_deserialize_context_with_defaults() {
        let json = r#"{
            "basic_salary": "12000",
            "overtime_hours": "10",
            "custom_values": {"Commission": "750.50"}
        }"#;

        let context: EvaluationContext = serde_json::from_str(json).unwrap();
        assert_eq!(context.basic_salary, dec("12000"));
        assert_eq!(context.overtime_hours, dec("10"));
        assert_eq!(context.working_days, Decimal::ZERO);
        assert!(context.variables.is_empty());
        assert_eq!(context.custom_values["Commission"], dec("750.50"));
    }
}
