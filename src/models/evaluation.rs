//! Batch evaluation result models.
//!
//! This module contains the [`BatchEvaluation`] type and its associated
//! structures that capture all outputs from evaluating a formula set,
//! including per-formula results, totals and an audit trace.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::FormulaType;

/// A single step in the audit trace recording one formula evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The name of the formula evaluated.
    pub formula_name: String,
    /// The kind of salary component.
    pub formula_type: FormulaType,
    /// The formula's priority.
    pub priority: i32,
    /// The formula text as configured.
    pub expression: String,
    /// Values of the variables the formula references.
    pub input: serde_json::Value,
    /// The computed result and any fallback.
    pub output: serde_json::Value,
    /// Human-readable explanation of the result.
    pub reasoning: String,
}

/// A warning generated during evaluation.
///
/// Warnings mark results that were computed with a zero fallback and may
/// need attention, without stopping the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning (e.g. `DIVISION_BY_ZERO`).
    pub code: String,
    /// The formula the warning relates to.
    pub formula_name: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (`low`, `medium` or `high`).
    pub severity: String,
}

/// The complete audit trace for a batch evaluation.
///
/// # Example
///
/// ```
/// use payroll_formula::models::AuditTrace;
///
/// let trace = AuditTrace {
///     steps: vec![],
///     warnings: vec![],
///     duration_us: 1234,
/// };
/// assert!(!trace.has_warnings());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// One step per active formula, in evaluation order.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during evaluation.
    pub warnings: Vec<AuditWarning>,
    /// The total evaluation duration in microseconds.
    pub duration_us: u64,
}

impl AuditTrace {
    /// Returns true if any formula degraded to a fallback.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Aggregated totals by formula type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaTotals {
    /// Sum of allowance, bonus and overtime results.
    pub earnings_total: Decimal,
    /// Sum of deduction and tax results.
    pub deductions_total: Decimal,
    /// Earnings minus deductions.
    pub net_adjustment: Decimal,
}

impl FormulaTotals {
    /// Adds a formula result to the matching total.
    ///
    /// Returns `false`, leaving every total unchanged, when the new totals
    /// would overflow.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_formula::models::{FormulaTotals, FormulaType};
    /// use rust_decimal::Decimal;
    ///
    /// let mut totals = FormulaTotals::default();
    /// assert!(totals.add(FormulaType::Allowance, Decimal::from(4000)));
    /// assert!(totals.add(FormulaType::Deduction, Decimal::from(1200)));
    /// assert!(totals.add(FormulaType::Custom, Decimal::from(99)));
    /// assert_eq!(totals.net_adjustment, Decimal::from(2800));
    ///
    /// assert!(!totals.add(FormulaType::Bonus, Decimal::MAX));
    /// assert_eq!(totals.earnings_total, Decimal::from(4000));
    /// ```
    pub fn add(&mut self, formula_type: FormulaType, amount: Decimal) -> bool {
        let (earnings, deductions) = if formula_type.is_earning() {
            (self.earnings_total.checked_add(amount), Some(self.deductions_total))
        } else if formula_type.is_deduction() {
            (Some(self.earnings_total), self.deductions_total.checked_add(amount))
        } else {
            return true;
        };

        let updated = earnings
            .zip(deductions)
            .and_then(|(earnings, deductions)| Some((earnings, deductions, earnings.checked_sub(deductions)?)));

        match updated {
            Some((earnings, deductions, net)) => {
                self.earnings_total = earnings;
                self.deductions_total = deductions;
                self.net_adjustment = net;
                true
            }
            None => false,
        }
    }
}

/// The complete result of evaluating a formula set for one context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEvaluation {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// When the evaluation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the evaluation.
    pub engine_version: String,
    /// Result of each active formula, keyed by formula name.
    pub results: HashMap<String, Decimal>,
    /// Names of inactive formulas that were skipped.
    pub skipped_formulas: Vec<String>,
    /// Aggregated totals.
    pub totals: FormulaTotals,
    /// Complete audit trace of the run.
    pub audit_trace: AuditTrace,
}
