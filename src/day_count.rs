//! calendar arithmetic for the scheduler: day counts, month walks and
//! day-of-month anchoring. no monetary logic lives here.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ScheduleError};
use crate::types::YearMonth;

/// day count convention for accrual intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayCountConvention {
    /// actual calendar days
    Actual,
    /// every month counts as 30 days, every year as 360
    Thirty360,
}

impl DayCountConvention {
    /// days between `start` and `end` under this convention
    pub fn days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        match self {
            DayCountConvention::Actual => interval_days(start, end),
            DayCountConvention::Thirty360 => days_30_360(start, end),
        }
    }
}

/// parse a strict `YYYY-MM-DD` date
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| ScheduleError::parse(input, e.to_string()))
}

/// actual calendar days from `start` to `end`, negative if `end` is earlier
pub fn interval_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// 30/360 days using the raw year, month and day components.
///
/// no end-of-month adjustment is made, so 01-31 to 02-28 counts as 27 days.
pub fn days_30_360(start: NaiveDate, end: NaiveDate) -> i64 {
    let years = (end.year() - start.year()) as i64;
    let months = end.month() as i64 - start.month() as i64;
    let days = end.day() as i64 - start.day() as i64;
    years * 360 + months * 30 + days
}

/// `use_360` selects 30/360, otherwise actual days
pub fn days(start: NaiveDate, end: NaiveDate, use_360: bool) -> i64 {
    if use_360 {
        DayCountConvention::Thirty360.days(start, end)
    } else {
        DayCountConvention::Actual.days(start, end)
    }
}

/// every calendar day from `start` to `end` inclusive, empty if `start > end`
pub fn period_dates(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    start.iter_days().take_while(|d| *d <= end).collect()
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn first_day_of_next_month(date: NaiveDate) -> NaiveDate {
    YearMonth::from_date(date).next().first_day()
}

pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    YearMonth::from_date(date).last_day()
}

/// replace the day of month, clamped to the month's last day
pub fn set_day_of_month(date: NaiveDate, day: u32) -> NaiveDate {
    YearMonth::from_date(date).day_clamped(day)
}

/// every month from the month of `start` to the month of `end` inclusive
pub fn months_between(start: NaiveDate, end: NaiveDate) -> Vec<YearMonth> {
    let last = YearMonth::from_date(end);
    let mut month = YearMonth::from_date(start);
    let mut months = Vec::new();
    while month <= last {
        months.push(month);
        month = month.next();
    }
    months
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_days_by_convention() {
        let start = date("2021-01-15");
        let end = date("2021-02-15");
        assert_eq!(days(start, end, true), 30);
        assert_eq!(days(start, end, false), 31);
    }

    #[test]
    fn test_30_360_uses_raw_components() {
        assert_eq!(days_30_360(date("2021-01-31"), date("2021-02-28")), 27);
        assert_eq!(days_30_360(date("2021-02-28"), date("2021-03-01")), 3);
        assert_eq!(days_30_360(date("2020-12-15"), date("2022-01-15")), 390);
        assert_eq!(days_30_360(date("2021-03-01"), date("2021-02-01")), -30);
    }

    #[test]
    fn test_interval_days() {
        assert_eq!(interval_days(date("2024-02-28"), date("2024-03-01")), 2);
        assert_eq!(interval_days(date("2023-02-28"), date("2023-03-01")), 1);
        assert_eq!(interval_days(date("2021-01-10"), date("2021-01-01")), -9);
    }

    #[test]
    fn test_period_dates() {
        let dates = period_dates(date("2021-12-30"), date("2022-01-02"));
        assert_eq!(
            dates,
            vec![date("2021-12-30"), date("2021-12-31"), date("2022-01-01"), date("2022-01-02")]
        );
        assert_eq!(period_dates(date("2021-01-01"), date("2021-01-01")), vec![date("2021-01-01")]);
        assert!(period_dates(date("2021-01-02"), date("2021-01-01")).is_empty());
    }

    #[test]
    fn test_set_day_of_month_clamps() {
        assert_eq!(set_day_of_month(date("2021-02-10"), 31), date("2021-02-28"));
        assert_eq!(set_day_of_month(date("2024-02-10"), 30), date("2024-02-29"));
        assert_eq!(set_day_of_month(date("2021-04-30"), 15), date("2021-04-15"));
        assert_eq!(set_day_of_month(date("2021-01-05"), 31), date("2021-01-31"));
    }

    #[test]
    fn test_month_boundaries() {
        assert_eq!(first_day_of_next_month(date("2021-01-31")), date("2021-02-01"));
        assert_eq!(first_day_of_next_month(date("2021-12-01")), date("2022-01-01"));
        assert_eq!(last_day_of_month(date("2023-02-11")), date("2023-02-28"));
        assert_eq!(first_day_of_month(date("2023-02-11")), date("2023-02-01"));
    }

    #[test]
    fn test_months_between() {
        let months = months_between(date("2021-11-30"), date("2022-02-01"));
        let labels: Vec<String> = months.iter().map(|m| m.to_string()).collect();
        assert_eq!(labels, vec!["2021-11", "2021-12", "2022-01", "2022-02"]);
        assert!(months_between(date("2022-03-01"), date("2022-02-01")).is_empty());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2021-06-01").unwrap(), NaiveDate::from_ymd_opt(2021, 6, 1).unwrap());
        assert!(matches!(parse_date("2021-02-30"), Err(ScheduleError::ParseError { .. })));
        assert!(matches!(parse_date("01/06/2021"), Err(ScheduleError::ParseError { .. })));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn date_strategy() -> impl Strategy<Value = NaiveDate> {
            (1990i32..2100i32, 1u32..13u32, 1u32..29u32)
                .prop_filter_map("valid date", |(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        }

        proptest! {
            #[test]
            fn test_day_counts_are_antisymmetric(a in date_strategy(), b in date_strategy()) {
                prop_assert_eq!(days_30_360(a, b), -days_30_360(b, a));
                prop_assert_eq!(interval_days(a, b), -interval_days(b, a));
            }

            #[test]
            fn test_period_dates_len_matches_interval(a in date_strategy(), n in 0i64..400) {
                let b = a + chrono::Duration::days(n);
                prop_assert_eq!(period_dates(a, b).len() as i64, interval_days(a, b) + 1);
            }

            #[test]
            fn test_set_day_stays_in_month(a in date_strategy(), day in 1u32..32) {
                let anchored = set_day_of_month(a, day);
                prop_assert_eq!(anchored.month(), a.month());
                prop_assert_eq!(anchored.year(), a.year());
                prop_assert!(anchored.day() <= day);
            }
        }
    }
}
