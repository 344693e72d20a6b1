use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::decimal;
use crate::errors::{Result, ScheduleError};
use crate::types::YearMonth;

/// key of an accrual schedule entry
pub trait PeriodKey: Ord + Copy {
    fn year_month(&self) -> YearMonth;
}

impl PeriodKey for YearMonth {
    fn year_month(&self) -> YearMonth {
        *self
    }
}

impl PeriodKey for NaiveDate {
    fn year_month(&self) -> YearMonth {
        YearMonth::from_date(*self)
    }
}

/// ordered accrual output, keyed by month or accrual date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AccrualSchedule<K: Ord> {
    entries: BTreeMap<K, Decimal>,
}

impl<K: PeriodKey> AccrualSchedule<K> {
    pub(crate) fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Decimal)>,
    {
        Self { entries: entries.into_iter().collect() }
    }

    pub fn get(&self, key: &K) -> Option<Decimal> {
        self.entries.get(key).copied()
    }

    /// value booked in the given month, zero when the month has no entry
    pub fn for_month(&self, year: i32, month: u32) -> Decimal {
        self.entries
            .iter()
            .find(|(key, _)| {
                let ym = key.year_month();
                ym.year() == year && ym.month() == month
            })
            .map(|(_, value)| *value)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, K, Decimal> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.entries.values().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<(K, Decimal)> {
        self.entries.iter().next().map(|(k, v)| (*k, *v))
    }

    pub fn last(&self) -> Option<(K, Decimal)> {
        self.entries.iter().next_back().map(|(k, v)| (*k, *v))
    }

    /// exact sum of every value
    pub fn total(&self) -> Result<Decimal> {
        self.entries
            .values()
            .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
            .ok_or_else(|| ScheduleError::arithmetic("schedule total overflowed"))
    }

    pub(crate) fn try_map_values<F>(&self, f: F) -> Result<Self>
    where
        F: Fn(Decimal) -> Result<Decimal>,
    {
        let entries = self
            .entries
            .iter()
            .map(|(k, v)| Ok((*k, f(*v)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok(Self { entries })
    }

    /// overwrite the last value with `target - sum(others)` so the total is exact.
    ///
    /// the last value is not clamped: when the other values were rounded up
    /// past `target` it comes out slightly negative.
    pub(crate) fn reconcile_last(&mut self, target: Decimal, scale: u32) -> Result<()> {
        let Some((_, last)) = self.last() else {
            return Ok(());
        };
        let others = self
            .total()?
            .checked_sub(last)
            .ok_or_else(|| ScheduleError::arithmetic("schedule total overflowed"))?;
        let remainder = decimal::checked_sub(target, others, scale).ok_or_else(|| {
            ScheduleError::arithmetic(format!("{} - {} overflowed", target, others))
        })?;
        if let Some((_, value)) = self.entries.iter_mut().next_back() {
            *value = remainder;
        }
        Ok(())
    }
}

impl<K: PeriodKey + Serialize> AccrualSchedule<K> {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| ScheduleError::invalid_input(format!("cannot serialize schedule: {}", e)))
    }
}

impl<'a, K: PeriodKey> IntoIterator for &'a AccrualSchedule<K> {
    type Item = (&'a K, &'a Decimal);
    type IntoIter = btree_map::Iter<'a, K, Decimal>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day_count::parse_date;
    use rust_decimal_macros::dec;

    fn schedule() -> AccrualSchedule<NaiveDate> {
        AccrualSchedule::from_entries(vec![
            (parse_date("2021-03-01").unwrap(), dec!(0.333333)),
            (parse_date("2021-01-01").unwrap(), dec!(0.333333)),
            (parse_date("2021-02-01").unwrap(), dec!(0.333333)),
        ])
    }

    #[test]
    fn test_keys_are_ordered() {
        let keys: Vec<String> = schedule().keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["2021-01-01", "2021-02-01", "2021-03-01"]);
    }

    #[test]
    fn test_reconcile_last() {
        let mut s = schedule();
        s.reconcile_last(Decimal::ONE, 6).unwrap();
        assert_eq!(s.last().unwrap().1.to_string(), "0.333334");
        assert_eq!(s.total().unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_reconcile_last_may_go_negative() {
        let mut s = AccrualSchedule::from_entries(vec![
            (parse_date("2021-01-01").unwrap(), dec!(0.666667)),
            (parse_date("2021-02-01").unwrap(), dec!(0.333334)),
            (parse_date("2021-03-01").unwrap(), dec!(0)),
        ]);
        s.reconcile_last(Decimal::ONE, 6).unwrap();
        assert_eq!(s.last().unwrap().1, dec!(-0.000001));
        assert_eq!(s.total().unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_total_overflow_is_arithmetic_error() {
        let mut s = AccrualSchedule::from_entries(vec![
            (parse_date("2021-01-01").unwrap(), Decimal::MAX),
            (parse_date("2021-02-01").unwrap(), Decimal::MAX),
        ]);
        assert!(matches!(s.total(), Err(ScheduleError::ArithmeticError { .. })));
        assert!(matches!(
            s.reconcile_last(Decimal::ONE, 6),
            Err(ScheduleError::ArithmeticError { .. })
        ));
    }

    #[test]
    fn test_for_month() {
        let s = schedule();
        assert_eq!(s.for_month(2021, 2), dec!(0.333333));
        assert_eq!(s.for_month(2021, 4), Decimal::ZERO);
    }

    #[test]
    fn test_to_json() {
        let s = AccrualSchedule::from_entries(vec![(YearMonth::new(2021, 1).unwrap(), dec!(640.00))]);
        assert_eq!(s.to_json().unwrap(), r#"{"2021-01":"640.00"}"#);
    }
}
