//! Derived payroll helpers that do not need the expression grammar.

use rust_decimal::Decimal;
use tracing::warn;

use crate::models::{AvailableVariable, EvaluationContext};

/// Normal working hours per day used to derive the hourly rate.
pub const NORMAL_HOURS_PER_DAY: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// Days per month used to derive the hourly rate.
pub const STANDARD_DAYS_PER_MONTH: Decimal = Decimal::from_parts(30, 0, 0, false, 0);

/// Calculates the overtime payment for a month.
///
/// The hourly rate is `basic_salary / (8 * 30)`, and the payment is
/// `overtime_hours * hourly_rate * overtime_rate`. Returns zero when either
/// the hours or the salary is zero, or when the payment overflows.
///
/// # Examples
///
/// ```
/// use payroll_formula::formula::calculate_overtime_amount;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let amount = calculate_overtime_amount(
///     Decimal::from(10),
///     Decimal::from(12000),
///     Decimal::from_str("1.5").unwrap(),
/// );
/// assert_eq!(amount, Decimal::from(750));
/// ```
pub fn calculate_overtime_amount(
    overtime_hours: Decimal,
    basic_salary: Decimal,
    overtime_rate: Decimal,
) -> Decimal {
    if overtime_hours.is_zero() || basic_salary.is_zero() {
        return Decimal::ZERO;
    }

    let amount = NORMAL_HOURS_PER_DAY
        .checked_mul(STANDARD_DAYS_PER_MONTH)
        .and_then(|monthly_hours| basic_salary.checked_div(monthly_hours))
        .and_then(|hourly_rate| overtime_hours.checked_mul(hourly_rate))
        .and_then(|pay| pay.checked_mul(overtime_rate));

    match amount {
        Some(amount) => amount,
        None => {
            warn!(
                overtime_hours = %overtime_hours,
                basic_salary = %basic_salary,
                overtime_rate = %overtime_rate,
                "Overtime amount overflowed; using zero"
            );
            Decimal::ZERO
        }
    }
}

/// Lists every variable a formula may reference, with its current value.
///
/// Fixed context fields come first, then `variables`, then `custom_values`.
pub fn get_available_variables(context: &EvaluationContext) -> Vec<AvailableVariable> {
    context.available_variables()
}
