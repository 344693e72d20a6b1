pub mod allocation;
pub mod monthly;
pub mod schedule;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{trace, warn};

use crate::config::SchedulerConfig;
use crate::day_count::DayCountConvention;
use crate::decimal::{self, DecimalMath, Money};
use crate::errors::{Result, ScheduleError};
use crate::types::{Repayment, RepaymentSchedule};

pub use allocation::accrual_dates;
pub use schedule::{AccrualSchedule, PeriodKey};

/// engine producing monthly accruals and day-weighted allocations over an
/// irregular principal repayment timeline
#[derive(Debug, Clone, Default)]
pub struct AccrualScheduler {
    config: SchedulerConfig,
    math: DecimalMath,
}

impl AccrualScheduler {
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        let math = config.math();
        Ok(Self { config, math })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// checks shared by every operation
    fn validate_inputs(
        &self,
        principal: Money,
        start_date: NaiveDate,
        repayments: &RepaymentSchedule,
    ) -> Result<()> {
        if !principal.is_positive() {
            return Err(ScheduleError::invalid_input(format!(
                "principal must be positive, got {}",
                principal
            )));
        }
        if repayments.first_date() < start_date {
            return Err(ScheduleError::invalid_input(format!(
                "repayment on {} precedes start date {}",
                repayments.first_date(),
                start_date
            )));
        }
        let repaid = repayments.total()?;
        if repaid > principal {
            warn!(%principal, %repaid, "repayments exceed principal, balance will go negative");
        }
        Ok(())
    }
}

pub(crate) fn overflow(what: &str) -> ScheduleError {
    ScheduleError::arithmetic(format!("{} overflowed", what))
}

/// sub-interval with a constant outstanding balance
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Segment {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: i64,
    pub balance: Decimal,
}

/// walks repayments in date order, splitting consecutive intervals into
/// constant-balance segments.
///
/// each repayment is consumed once, by the first interval whose end falls on
/// or after its date.
pub(crate) struct RepaymentWalker<'a> {
    repayments: &'a [Repayment],
    next: usize,
    balance: Decimal,
    convention: DayCountConvention,
    amount_scale: u32,
}

impl<'a> RepaymentWalker<'a> {
    pub fn new(
        repayments: &'a RepaymentSchedule,
        principal: Money,
        convention: DayCountConvention,
        amount_scale: u32,
    ) -> Self {
        Self {
            repayments: repayments.as_slice(),
            next: 0,
            balance: principal.as_decimal(),
            convention,
            amount_scale,
        }
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// segments covering `[gap_start, gap_end]`
    pub fn walk(&mut self, gap_start: NaiveDate, gap_end: NaiveDate) -> Result<Vec<Segment>> {
        let mut segments = Vec::new();
        let mut sub_start = gap_start;

        while let Some(&repayment) = self.repayments.get(self.next) {
            if repayment.date > gap_end {
                break;
            }
            segments.push(self.segment(sub_start, repayment.date));
            self.balance = decimal::checked_sub(self.balance, repayment.amount.as_decimal(), self.amount_scale)
                .ok_or_else(|| overflow("outstanding balance"))?;
            trace!(date = %repayment.date, balance = %self.balance, "principal repaid");
            sub_start = repayment.date;
            self.next += 1;
        }

        segments.push(self.segment(sub_start, gap_end));
        Ok(segments)
    }

    fn segment(&self, start: NaiveDate, end: NaiveDate) -> Segment {
        Segment {
            start,
            end,
            days: self.convention.days(start, end),
            balance: self.balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day_count::parse_date;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_walker_splits_on_repayments() {
        let repayments = RepaymentSchedule::parse(&[
            ("2021-03-10", "60000"),
            ("2021-05-01", "60000"),
        ])
        .unwrap();
        let mut walker = RepaymentWalker::new(
            &repayments,
            Money::from_major(120_000),
            DayCountConvention::Thirty360,
            2,
        );

        let march = walker.walk(date("2021-03-01"), date("2021-04-01")).unwrap();
        assert_eq!(march.len(), 2);
        assert_eq!(march[0].days, 9);
        assert_eq!(march[0].balance, dec!(120000));
        assert_eq!(march[1].start, date("2021-03-10"));
        assert_eq!(march[1].days, 21);
        assert_eq!(march[1].balance, dec!(60000));

        let april = walker.walk(date("2021-04-01"), date("2021-05-01")).unwrap();
        assert_eq!(april.len(), 2);
        assert_eq!(april[0].days, 30);
        assert_eq!(april[1].days, 0);
        assert_eq!(walker.balance(), dec!(0));
    }

    #[test]
    fn test_boundary_repayment_consumed_once() {
        let repayments = RepaymentSchedule::parse(&[("2021-02-01", "500")]).unwrap();
        let mut walker = RepaymentWalker::new(
            &repayments,
            Money::from_major(1_000),
            DayCountConvention::Actual,
            2,
        );

        walker.walk(date("2021-01-01"), date("2021-02-01")).unwrap();
        assert_eq!(walker.balance(), dec!(500));

        let february = walker.walk(date("2021-02-01"), date("2021-03-01")).unwrap();
        assert_eq!(february.len(), 1);
        assert_eq!(february[0].days, 28);
        assert_eq!(walker.balance(), dec!(500));
    }

    #[test]
    fn test_rejects_non_positive_principal() {
        let scheduler = AccrualScheduler::default();
        let repayments = RepaymentSchedule::parse(&[("2021-06-01", "100")]).unwrap();
        let result = scheduler.validate_inputs(Money::ZERO, date("2021-01-01"), &repayments);
        assert!(matches!(result, Err(ScheduleError::InvalidInput { .. })));
    }

    #[test]
    fn test_rejects_repayment_before_start() {
        let scheduler = AccrualScheduler::default();
        let repayments = RepaymentSchedule::parse(&[("2020-12-31", "100")]).unwrap();
        let result = scheduler.validate_inputs(Money::from_major(100), date("2021-01-01"), &repayments);
        assert!(matches!(result, Err(ScheduleError::InvalidInput { .. })));
    }

    #[test]
    fn test_repayment_total_overflow_is_arithmetic_error() {
        let scheduler = AccrualScheduler::default();
        let huge = "70000000000000000000000000000";
        let repayments = RepaymentSchedule::parse(&[("2021-02-01", huge), ("2021-03-01", huge)]).unwrap();
        let result = scheduler.validate_inputs(Money::from_major(100), date("2021-01-01"), &repayments);
        assert!(matches!(result, Err(ScheduleError::ArithmeticError { .. })));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = SchedulerConfig { year_basis: 0, ..SchedulerConfig::default() };
        assert!(AccrualScheduler::new(config).is_err());
    }
}
