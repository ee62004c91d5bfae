//! Core data models for the payroll formula engine.
//!
//! This module contains the formula definition, the evaluation context and
//! the batch evaluation result types.

mod context;
mod evaluation;
mod formula;

pub use context::{
    ABSENT_DAYS, ACTUAL_WORKING_DAYS, AvailableVariable, BASIC_SALARY, DAYS_IN_MONTH,
    EvaluationContext, GROSS_SALARY, LEAVE_DAYS, OVERTIME_HOURS, VariableSource, WORKING_DAYS,
    days_in_month,
};
pub use evaluation::{AuditStep, AuditTrace, AuditWarning, BatchEvaluation, FormulaTotals};
pub use formula::{Formula, FormulaType};
