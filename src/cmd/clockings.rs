use chrono::{Datelike, Local, NaiveDate, Weekday};
use clap::Args;

use crate::context::AppContext;
use crate::domain::public_holidays::is_italian_public_holiday;
use crate::error::AppResult;
use crate::workflow::clockings;

#[derive(Args)]
pub struct ClockingsArgs {
    /// Any day of the month to download; defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

fn day_marker(day: NaiveDate) -> &'static str {
    if is_italian_public_holiday(day) {
        "holiday"
    } else if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
        "weekend"
    } else {
        ""
    }
}

pub async fn run(ctx: &AppContext, helper: Option<&str>, args: ClockingsArgs) -> AppResult<()> {
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let records = clockings::month_records(ctx, helper, date).await?;
    for (day, entries) in records.days() {
        let entries = entries
            .iter()
            .map(|record| record.to_string())
            .collect::<Vec<_>>()
            .join(" | ");
        println!("{day}  {entries:<40} {}", day_marker(*day));
    }
    Ok(())
}
