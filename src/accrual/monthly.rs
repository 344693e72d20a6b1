use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::accrual::{overflow, AccrualSchedule, AccrualScheduler, RepaymentWalker};
use crate::day_count::months_between;
use crate::decimal::{self, Money, Rate};
use crate::errors::Result;
use crate::types::{RepaymentSchedule, YearMonth};

impl AccrualScheduler {
    /// simple interest accrued in every calendar month from the start date
    /// through the month of the last repayment.
    ///
    /// each month runs from the previous boundary to the first day of the
    /// next month; interest is `days * balance * apr / year_basis` per
    /// constant-balance segment, and the month total is rounded to the
    /// amount scale. no reconciliation against an external total is applied.
    /// a product or month total beyond the `Decimal` range is an
    /// `ArithmeticError`.
    ///
    /// ```
    /// use deferred_income_rs::{AccrualScheduler, Money, Rate, RepaymentSchedule};
    /// use deferred_income_rs::day_count::parse_date;
    ///
    /// let scheduler = AccrualScheduler::default();
    /// let repayments = RepaymentSchedule::parse(&[("2021-03-01", "12000")]).unwrap();
    /// let months = scheduler
    ///     .month_amounts(
    ///         Money::from_major(12_000),
    ///         Rate::from_percentage(12),
    ///         parse_date("2021-01-01").unwrap(),
    ///         &repayments,
    ///     )
    ///     .unwrap();
    /// assert_eq!(months.len(), 3);
    /// assert_eq!(months.for_month(2021, 1).to_string(), "120.00");
    /// ```
    pub fn month_amounts(
        &self,
        principal: Money,
        apr: Rate,
        start_date: NaiveDate,
        repayments: &RepaymentSchedule,
    ) -> Result<AccrualSchedule<YearMonth>> {
        self.validate_inputs(principal, start_date, repayments)?;

        let config = self.config();
        let year_basis = Decimal::from(config.year_basis);
        let mut walker = RepaymentWalker::new(
            repayments,
            principal,
            config.interest_convention,
            config.amount_scale,
        );

        let months = months_between(start_date, repayments.last_date());
        let mut entries = Vec::with_capacity(months.len());
        let mut gap_start = start_date;

        for month in months {
            let gap_end = month.next().first_day();
            let accrued = walker
                .walk(gap_start, gap_end)?
                .iter()
                .try_fold(Decimal::ZERO, |acc, segment| {
                    let interest = Decimal::from(segment.days)
                        .checked_mul(segment.balance)
                        .and_then(|v| v.checked_mul(apr.as_decimal()))
                        .and_then(|v| v.checked_div(year_basis))
                        .ok_or_else(|| overflow("segment interest"))?;
                    trace!(start = %segment.start, end = %segment.end, %interest, "segment accrued");
                    acc.checked_add(interest).ok_or_else(|| overflow("month interest"))
                })?;
            entries.push((month, decimal::round(accrued, config.amount_scale)));
            gap_start = gap_end;
        }

        debug!(months = entries.len(), %principal, %apr, "computed month amounts");
        Ok(AccrualSchedule::from_entries(entries))
    }

    /// accrual for a single month, zero when the month is outside the schedule
    pub fn month_amount(
        &self,
        principal: Money,
        apr: Rate,
        start_date: NaiveDate,
        repayments: &RepaymentSchedule,
        year: i32,
        month: u32,
    ) -> Result<Decimal> {
        Ok(self
            .month_amounts(principal, apr, start_date, repayments)?
            .for_month(year, month))
    }
}
