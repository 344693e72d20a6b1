/// allocation - proportions and amounts on a custom accrual day
use deferred_income_rs::day_count::parse_date;
use deferred_income_rs::{
    AccrualDay, AccrualScheduler, DayCountConvention, Money, RepaymentSchedule, SchedulerConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== allocation example ===\n");

    let repayments = RepaymentSchedule::parse(&[
        ("2021-04-20", "30000"),
        ("2021-08-20", "30000"),
        ("2021-12-20", "40000"),
    ])?;
    let principal = Money::from_major(100_000);
    let start = parse_date("2021-01-20")?;
    let day = AccrualDay::new(25)?;

    for convention in [DayCountConvention::Thirty360, DayCountConvention::Actual] {
        let config = SchedulerConfig::default().with_allocation_convention(convention);
        let scheduler = AccrualScheduler::new(config)?;

        let scales = scheduler.scales(principal, start, &repayments, day)?;
        let amounts = scheduler.amounts(Money::from_major(8_888), principal, start, &repayments, day)?;

        println!("{:?}:", convention);
        for ((date, scale), (_, amount)) in scales.iter().zip(amounts.iter()) {
            println!("  {}  {}  {}", date, scale, amount);
        }
        println!("  total  {}  {}\n", scales.total()?, amounts.total()?);
    }

    Ok(())
}
