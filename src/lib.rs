pub mod accrual;
pub mod cashflow;
pub mod config;
pub mod day_count;
pub mod decimal;
pub mod errors;
pub mod types;

// re-export key types
pub use accrual::{accrual_dates, AccrualSchedule, AccrualScheduler, PeriodKey};
pub use config::SchedulerConfig;
pub use day_count::DayCountConvention;
pub use decimal::{DecimalMath, Money, Rate};
pub use errors::{Result, ScheduleError};
pub use types::{AccrualDay, Repayment, RepaymentSchedule, YearMonth};

// re-export external dependencies that users will need
pub use chrono;
pub use rust_decimal::Decimal;
