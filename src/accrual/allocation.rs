use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use tracing::debug;

use crate::accrual::{overflow, AccrualSchedule, AccrualScheduler, RepaymentWalker};
use crate::day_count::{first_day_of_next_month, months_between, set_day_of_month};
use crate::decimal::Money;
use crate::errors::{Result, ScheduleError};
use crate::types::{AccrualDay, RepaymentSchedule};

/// first accrual date on or after `date` falling on `day`
fn anchor(date: NaiveDate, day: AccrualDay) -> NaiveDate {
    let base = if date.day() > day.get() {
        first_day_of_next_month(date)
    } else {
        date
    };
    set_day_of_month(base, day.get())
}

/// monthly accrual dates from the anchor of `start` through the anchor of `end`
pub fn accrual_dates(start: NaiveDate, end: NaiveDate, day: AccrualDay) -> Vec<NaiveDate> {
    let first = anchor(start, day);
    let last = anchor(end, day);
    let mut dates: Vec<NaiveDate> = months_between(first, last)
        .into_iter()
        .map(|month| month.day_clamped(day.get()))
        .collect();
    dates.dedup();
    dates
}

impl AccrualScheduler {
    /// capital-day weight of each accrual interval: `balance * days` summed
    /// over its constant-balance segments. days are not divided by the year
    /// basis, the weights only matter relative to each other.
    fn capital_day_weights(
        &self,
        principal: Money,
        start_date: NaiveDate,
        repayments: &RepaymentSchedule,
        day: AccrualDay,
    ) -> Result<Vec<(NaiveDate, Decimal)>> {
        self.validate_inputs(principal, start_date, repayments)?;

        let config = self.config();
        let mut walker = RepaymentWalker::new(
            repayments,
            principal,
            config.allocation_convention,
            config.amount_scale,
        );

        let mut gap_start = start_date;
        accrual_dates(start_date, repayments.last_date(), day)
            .into_iter()
            .map(|gap_end| {
                let weight = walker
                    .walk(gap_start, gap_end)?
                    .iter()
                    .try_fold(Decimal::ZERO, |acc, s| {
                        s.balance
                            .checked_mul(Decimal::from(s.days))
                            .and_then(|w| acc.checked_add(w))
                    })
                    .ok_or_else(|| overflow("capital-day weight"))?;
                gap_start = gap_end;
                Ok((gap_end, weight))
            })
            .collect()
    }

    /// share of the whole schedule booked on each accrual date.
    ///
    /// every share is rounded to the proportion scale except the last, which
    /// is `1 - sum(others)` so the shares always add up to exactly one. when
    /// the last interval carries no weight and the others rounded up, that
    /// last share is slightly negative.
    ///
    /// ```
    /// use deferred_income_rs::{AccrualDay, AccrualScheduler, Money, RepaymentSchedule};
    /// use deferred_income_rs::day_count::parse_date;
    /// use rust_decimal::Decimal;
    ///
    /// let scheduler = AccrualScheduler::default();
    /// let repayments = RepaymentSchedule::parse(&[("2021-04-01", "90000")]).unwrap();
    /// let scales = scheduler
    ///     .scales(
    ///         Money::from_major(90_000),
    ///         parse_date("2021-01-01").unwrap(),
    ///         &repayments,
    ///         AccrualDay::default(),
    ///     )
    ///     .unwrap();
    /// assert_eq!(scales.total().unwrap(), Decimal::ONE);
    /// assert_eq!(scales.for_month(2021, 4).to_string(), "0.333334");
    /// ```
    pub fn scales(
        &self,
        principal: Money,
        start_date: NaiveDate,
        repayments: &RepaymentSchedule,
        day: AccrualDay,
    ) -> Result<AccrualSchedule<NaiveDate>> {
        let weights = self.capital_day_weights(principal, start_date, repayments, day)?;
        let total_weight = weights
            .iter()
            .try_fold(Decimal::ZERO, |acc, (_, w)| acc.checked_add(*w))
            .ok_or_else(|| overflow("total capital-day weight"))?;
        if total_weight <= Decimal::ZERO {
            return Err(ScheduleError::arithmetic(format!(
                "total capital-day weight must be positive, got {}",
                total_weight
            )));
        }

        let scale = self.config().proportion_scale;
        let entries = weights
            .into_iter()
            .map(|(date, weight)| Ok((date, self.math.require_div(weight, total_weight, scale)?)))
            .collect::<Result<Vec<_>>>()?;

        let mut scales = AccrualSchedule::from_entries(entries);
        scales.reconcile_last(Decimal::ONE, scale)?;

        debug!(periods = scales.len(), %total_weight, "computed allocation scales");
        Ok(scales)
    }

    /// share for the accrual date in the given month, zero when absent
    pub fn scale(
        &self,
        principal: Money,
        start_date: NaiveDate,
        repayments: &RepaymentSchedule,
        year: i32,
        month: u32,
        day: AccrualDay,
    ) -> Result<Decimal> {
        Ok(self.scales(principal, start_date, repayments, day)?.for_month(year, month))
    }

    /// spread `amount` across the accrual dates in proportion to `scales`.
    ///
    /// all but the last date get `round(scale * amount)`; the last absorbs the
    /// rounding difference, so the amounts sum to `amount` exactly.
    pub fn amounts(
        &self,
        amount: Money,
        principal: Money,
        start_date: NaiveDate,
        repayments: &RepaymentSchedule,
        day: AccrualDay,
    ) -> Result<AccrualSchedule<NaiveDate>> {
        if amount.is_negative() {
            return Err(ScheduleError::invalid_input(format!(
                "amount to allocate must not be negative, got {}",
                amount
            )));
        }

        let amount_scale = self.config().amount_scale;
        let total = amount.as_decimal();
        let scales = self.scales(principal, start_date, repayments, day)?;
        let mut amounts = scales.try_map_values(|scale| self.math.require_mul(scale, total, amount_scale))?;
        amounts.reconcile_last(total, amount_scale)?;

        debug!(periods = amounts.len(), %amount, "allocated amount");
        Ok(amounts)
    }

    /// allocated amount for the accrual date in the given month, zero when absent
    #[allow(clippy::too_many_arguments)]
    pub fn amount(
        &self,
        amount: Money,
        principal: Money,
        start_date: NaiveDate,
        repayments: &RepaymentSchedule,
        year: i32,
        month: u32,
        day: AccrualDay,
    ) -> Result<Decimal> {
        Ok(self
            .amounts(amount, principal, start_date, repayments, day)?
            .for_month(year, month))
    }
}
