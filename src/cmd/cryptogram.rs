use chrono::{Datelike, Local};
use clap::Args;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::cryptogram;

#[derive(Args)]
pub struct CryptogramArgs {
    /// Publication year; defaults to the current year.
    #[arg(long)]
    pub year: Option<i32>,
    /// Publication month (1-12); defaults to the current month.
    #[arg(long)]
    pub month: Option<u32>,
}

pub async fn run(ctx: &AppContext, helper: Option<&str>, args: CryptogramArgs) -> AppResult<()> {
    let today = Local::now().date_naive();
    let ticket = cryptogram::schedule(
        ctx,
        helper,
        args.year.unwrap_or_else(|| today.year()),
        args.month.unwrap_or_else(|| today.month()),
    )
    .await?;
    println!("Crypto-Gram publication scheduled: {ticket}");
    Ok(())
}
