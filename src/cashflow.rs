use rust_decimal::prelude::MathematicalOps;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::errors::{Result, ScheduleError};

const MAX_ITERATIONS: u32 = 100;
const EPSILON: Decimal = dec!(0.0000000001);

/// internal rate of return of cashflows spaced one year apart.
///
/// newton iteration from `guess`; stops once either the step or the net
/// present value drops below 1e-10. the flows must contain at least one
/// positive and one negative value.
pub fn irr(values: &[Decimal], guess: Decimal) -> Result<Decimal> {
    let has_inflow = values.iter().any(|v| v.is_sign_positive() && !v.is_zero());
    let has_outflow = values.iter().any(|v| v.is_sign_negative() && !v.is_zero());
    if !has_inflow || !has_outflow {
        return Err(ScheduleError::invalid_input(
            "cashflows need at least one positive and one negative value",
        ));
    }

    let mut rate = guess;
    for iteration in 1..MAX_ITERATIONS {
        let npv = net_present_value(values, rate)?;
        let slope = npv_derivative(values, rate)?;
        let step = npv
            .checked_div(slope)
            .ok_or_else(|| ScheduleError::arithmetic(format!("flat npv at rate {}", rate)))?;
        rate -= step;

        if step.abs() <= EPSILON || npv.abs() <= EPSILON {
            debug!(iteration, %rate, "irr converged");
            return Ok(rate.normalize());
        }
    }

    Err(ScheduleError::arithmetic(format!(
        "irr did not converge within {} iterations",
        MAX_ITERATIONS
    )))
}

/// `sum(v_i / (1 + r)^i)`
pub fn net_present_value(values: &[Decimal], rate: Decimal) -> Result<Decimal> {
    let base = Decimal::ONE + rate;
    values.iter().enumerate().try_fold(Decimal::ZERO, |acc, (i, v)| {
        let discount = base
            .checked_powi(i as i64)
            .filter(|d| !d.is_zero())
            .ok_or_else(|| overflow(rate))?;
        v.checked_div(discount)
            .and_then(|pv| acc.checked_add(pv))
            .ok_or_else(|| overflow(rate))
    })
}

/// `-sum(i * v_i / (1 + r)^(i + 1))`
fn npv_derivative(values: &[Decimal], rate: Decimal) -> Result<Decimal> {
    let base = Decimal::ONE + rate;
    values.iter().enumerate().skip(1).try_fold(Decimal::ZERO, |acc, (i, v)| {
        let discount = base
            .checked_powi(i as i64 + 1)
            .filter(|d| !d.is_zero())
            .ok_or_else(|| overflow(rate))?;
        (Decimal::from(i as i64) * v)
            .checked_div(discount)
            .and_then(|term| acc.checked_sub(term))
            .ok_or_else(|| overflow(rate))
    })
}

fn overflow(rate: Decimal) -> ScheduleError {
    ScheduleError::arithmetic(format!("discounting overflowed at rate {}", rate))
}
