/// quick start - split a fee across accrual dates
use deferred_income_rs::day_count::parse_date;
use deferred_income_rs::{AccrualDay, AccrualScheduler, Money, RepaymentSchedule};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let scheduler = AccrualScheduler::default();
    let repayments = RepaymentSchedule::parse(&[("2021-06-01", "100000")])?;

    // spread a 10,000 fee over a 100,000 bullet loan
    let amounts = scheduler.amounts(
        Money::from_major(10_000),
        Money::from_major(100_000),
        parse_date("2021-01-01")?,
        &repayments,
        AccrualDay::default(),
    )?;

    println!("{}", amounts.to_json()?);

    Ok(())
}
