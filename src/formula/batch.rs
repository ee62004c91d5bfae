//! Batch evaluation of a prioritized formula set.
//!
//! Formulas run in ascending priority order (ties keep their input order).
//! Each active formula's result is added to the working variables under the
//! formula's name, so later formulas can reference earlier results.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    AuditStep, AuditTrace, AuditWarning, BatchEvaluation, EvaluationContext, Formula, FormulaTotals,
};

use super::evaluator::{FallbackReason, FormulaEvaluation, VariableMap, evaluate_with_diagnostics};
use super::variables::extract_variables;

/// Evaluates every active formula, returning each result by formula name.
///
/// # Example
///
/// ```
/// use payroll_formula::formula::evaluate_all;
/// use payroll_formula::models::{EvaluationContext, Formula, FormulaType};
/// use rust_decimal::Decimal;
///
/// let context = EvaluationContext {
///     basic_salary: Decimal::from(10000),
///     ..EvaluationContext::default()
/// };
/// let formulas = vec![
///     Formula::new("Bonus", "HRA * 0.1", FormulaType::Bonus, 3),
///     Formula::new("HRA", "BasicSalary * 0.4", FormulaType::Allowance, 1),
///     Formula::new("PF", "BasicSalary * 0.12", FormulaType::Deduction, 2),
/// ];
///
/// let results = evaluate_all(&context, &formulas);
/// assert_eq!(results["HRA"], Decimal::from(4000));
/// assert_eq!(results["PF"], Decimal::from(1200));
/// assert_eq!(results["Bonus"], Decimal::from(400));
/// ```
pub fn evaluate_all(context: &EvaluationContext, formulas: &[Formula]) -> HashMap<String, Decimal> {
    evaluate_all_with_audit(context, formulas).results
}

/// Evaluates every active formula and records an audit trace of the run.
pub fn evaluate_all_with_audit(context: &EvaluationContext, formulas: &[Formula]) -> BatchEvaluation {
    let start_time = Instant::now();
    let run_id = Uuid::new_v4();

    let mut variables = context.to_variable_map();
    let mut results: HashMap<String, Decimal> = HashMap::new();
    let mut skipped_formulas = Vec::new();
    let mut totals = FormulaTotals::default();
    let mut trace = AuditTrace::default();

    let mut ordered: Vec<&Formula> = formulas.iter().collect();
    ordered.sort_by_key(|formula| formula.priority);

    for formula in ordered {
        if !formula.is_active {
            debug!(run_id = %run_id, formula = %formula.name, "Skipping inactive formula");
            skipped_formulas.push(formula.name.clone());
            continue;
        }

        if results.contains_key(&formula.name) {
            warn!(run_id = %run_id, formula = %formula.name, "Duplicate formula name overwrites earlier result");
            trace.warnings.push(AuditWarning {
                code: "DUPLICATE_FORMULA_NAME".to_string(),
                formula_name: formula.name.clone(),
                message: format!(
                    "Formula '{}' appears more than once; the later result replaces the earlier one",
                    formula.name
                ),
                severity: "low".to_string(),
            });
        }

        let evaluation = evaluate_with_diagnostics(formula.formula.as_str(), &variables);
        record_warnings(formula, &evaluation, &mut trace.warnings);

        let step_number = trace.steps.len() as u32 + 1;
        trace
            .steps
            .push(build_audit_step(step_number, formula, &evaluation, &variables));

        if !totals.add(formula.formula_type, evaluation.value) {
            warn!(run_id = %run_id, formula = %formula.name, "Totals overflowed; result left out of totals");
            trace.warnings.push(AuditWarning {
                code: FallbackReason::Overflow.code().to_string(),
                formula_name: formula.name.clone(),
                message: format!(
                    "Adding '{}' to the totals overflowed; the result is kept but not totalled",
                    formula.name
                ),
                severity: "high".to_string(),
            });
        }
        variables.insert(formula.name.clone(), evaluation.value);
        results.insert(formula.name.clone(), evaluation.value);
    }

    trace.duration_us = start_time.elapsed().as_micros() as u64;

    info!(
        run_id = %run_id,
        formulas_count = formulas.len(),
        evaluated_count = trace.steps.len(),
        skipped_count = skipped_formulas.len(),
        warnings_count = trace.warnings.len(),
        duration_us = trace.duration_us,
        "Formula batch evaluated"
    );

    BatchEvaluation {
        run_id,
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        results,
        skipped_formulas,
        totals,
        audit_trace: trace,
    }
}

fn record_warnings(formula: &Formula, evaluation: &FormulaEvaluation, warnings: &mut Vec<AuditWarning>) {
    for name in &evaluation.unresolved {
        warnings.push(AuditWarning {
            code: "UNRESOLVED_VARIABLE".to_string(),
            formula_name: formula.name.clone(),
            message: format!("Variable '{}' has no value and was treated as 0", name),
            severity: "medium".to_string(),
        });
    }

    if let Some(reason) = &evaluation.fallback {
        let severity = match reason {
            FallbackReason::EmptyFormula => "medium",
            FallbackReason::Malformed(_) | FallbackReason::DivisionByZero | FallbackReason::Overflow => "high",
        };
        warnings.push(AuditWarning {
            code: reason.code().to_string(),
            formula_name: formula.name.clone(),
            message: format!("Formula evaluated as 0: {}", reason.describe()),
            severity: severity.to_string(),
        });
    }
}

fn build_audit_step(
    step_number: u32,
    formula: &Formula,
    evaluation: &FormulaEvaluation,
    variables: &VariableMap,
) -> AuditStep {
    let inputs: serde_json::Map<String, serde_json::Value> = extract_variables(&formula.formula)
        .into_iter()
        .map(|name| {
            let value = variables
                .get(&name)
                .map(|v| serde_json::Value::String(v.normalize().to_string()))
                .unwrap_or(serde_json::Value::Null);
            (name, value)
        })
        .collect();

    let value = evaluation.value.normalize();
    let reasoning = match &evaluation.fallback {
        Some(reason) => format!(
            "{} = {} evaluated as 0 ({})",
            formula.name,
            formula.formula,
            reason.describe()
        ),
        None => format!("{} = {} = {}", formula.name, formula.formula, value),
    };

    AuditStep {
        step_number,
        formula_name: formula.name.clone(),
        formula_type: formula.formula_type,
        priority: formula.priority,
        expression: formula.formula.clone(),
        input: serde_json::json!({ "variables": inputs }),
        output: serde_json::json!({
            "value": value.to_string(),
            "fallback": evaluation.fallback.as_ref().map(|reason| reason.code()),
            "unresolved": evaluation.unresolved,
        }),
        reasoning,
    }
}
