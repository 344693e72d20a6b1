/// monthly interest - report accrued interest per calendar month
use deferred_income_rs::day_count::parse_date;
use deferred_income_rs::{AccrualScheduler, Money, Rate, RepaymentSchedule};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== monthly interest example ===\n");

    let scheduler = AccrualScheduler::default();
    let repayments = RepaymentSchedule::parse(&[
        ("2021-03-10", "60000"),
        ("2021-05-01", "60000"),
    ])?;

    let months = scheduler.month_amounts(
        Money::from_major(120_000),
        Rate::from_str_exact("0.12")?,
        parse_date("2021-01-15")?,
        &repayments,
    )?;

    for (month, interest) in &months {
        println!("{}: {}", month, interest);
    }
    println!("\ntotal interest: {}", months.total()?);

    Ok(())
}
