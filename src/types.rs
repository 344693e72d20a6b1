use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::day_count::parse_date;
use crate::decimal::{self, Money, MONEY_SCALE};
use crate::errors::{Result, ScheduleError};

/// calendar month, displayed as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(YearMonth)
            .ok_or_else(|| ScheduleError::invalid_input(format!("no such month: {}-{}", year, month)))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        YearMonth(date.with_day(1).unwrap_or(date))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn next(&self) -> Self {
        YearMonth(self.0 + Months::new(1))
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().0 - Duration::days(1)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// the given day of this month, clamped to `1..=days_in_month`
    pub fn day_clamped(&self, day: u32) -> NaiveDate {
        let day = day.clamp(1, self.days_in_month());
        self.0.with_day(day).unwrap_or(self.0)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        YearMonth::from_date(date) == *self
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        let date = parse_date(&format!("{}-01", s.trim()))
            .map_err(|_| ScheduleError::parse(s, "expected YYYY-MM"))?;
        Ok(YearMonth(date))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// day of month on which recurring accruals are booked
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct AccrualDay(u32);

impl AccrualDay {
    pub fn new(day: u32) -> Result<Self> {
        if !(1..=31).contains(&day) {
            return Err(ScheduleError::invalid_input(format!(
                "accrual day must be within 1..=31, got {}",
                day
            )));
        }
        Ok(AccrualDay(day))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for AccrualDay {
    fn default() -> Self {
        AccrualDay(1)
    }
}

impl TryFrom<u32> for AccrualDay {
    type Error = ScheduleError;

    fn try_from(day: u32) -> Result<Self> {
        AccrualDay::new(day)
    }
}

impl From<AccrualDay> for u32 {
    fn from(day: AccrualDay) -> u32 {
        day.0
    }
}

/// principal repayment on a given date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repayment {
    pub date: NaiveDate,
    pub amount: Money,
}

impl Repayment {
    pub fn new(date: NaiveDate, amount: Money) -> Self {
        Self { date, amount }
    }
}

/// non-empty repayments with strictly ascending, unique dates.
///
/// the last entry's date is the end of the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Repayment>", into = "Vec<Repayment>")]
pub struct RepaymentSchedule {
    entries: Vec<Repayment>,
}

impl RepaymentSchedule {
    pub fn new(entries: Vec<Repayment>) -> Result<Self> {
        if entries.is_empty() {
            return Err(ScheduleError::invalid_input("repayment schedule is empty"));
        }
        for pair in entries.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ScheduleError::invalid_input(format!(
                    "repayment dates must be strictly ascending: {} follows {}",
                    pair[1].date, pair[0].date
                )));
            }
        }
        if let Some(negative) = entries.iter().find(|r| r.amount.is_negative()) {
            return Err(ScheduleError::invalid_input(format!(
                "negative repayment of {} on {}",
                negative.amount, negative.date
            )));
        }
        Ok(Self { entries })
    }

    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDate, Money)>,
    {
        Self::new(pairs.into_iter().map(|(date, amount)| Repayment::new(date, amount)).collect())
    }

    /// build from `(YYYY-MM-DD, amount)` string pairs
    pub fn parse(pairs: &[(&str, &str)]) -> Result<Self> {
        let entries = pairs
            .iter()
            .map(|(date, amount)| Ok(Repayment::new(parse_date(date)?, Money::from_str_exact(amount)?)))
            .collect::<Result<Vec<_>>>()?;
        Self::new(entries)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Repayment> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Repayment] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// always false, kept for the `len` convention
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.entries[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.entries[self.entries.len() - 1].date
    }

    /// sum of every repayment, `ArithmeticError` on overflow
    pub fn total(&self) -> Result<Money> {
        decimal::checked_sum(self.entries.iter().map(|r| r.amount.as_decimal()), MONEY_SCALE)
            .map(Money::from_decimal)
            .ok_or_else(|| ScheduleError::arithmetic("repayment total overflowed"))
    }
}

impl TryFrom<Vec<Repayment>> for RepaymentSchedule {
    type Error = ScheduleError;

    fn try_from(entries: Vec<Repayment>) -> Result<Self> {
        RepaymentSchedule::new(entries)
    }
}

impl From<RepaymentSchedule> for Vec<Repayment> {
    fn from(schedule: RepaymentSchedule) -> Self {
        schedule.entries
    }
}

impl<'a> IntoIterator for &'a RepaymentSchedule {
    type Item = &'a Repayment;
    type IntoIter = std::slice::Iter<'a, Repayment>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
