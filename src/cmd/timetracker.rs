use std::fs;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Args;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::timetracker;

#[derive(Args)]
pub struct TimetrackerArgs {
    /// Day to report on; defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Users to report on; defaults to the configured list.
    #[arg(long = "user")]
    pub users: Vec<String>,
    /// Write the HTML report here instead of printing it.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub async fn run(ctx: &AppContext, helper: Option<&str>, args: TimetrackerArgs) -> AppResult<()> {
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let html = timetracker::report(ctx, helper, date, args.users).await?;
    match args.output {
        Some(path) => {
            fs::write(&path, html)?;
            println!("Worklog report written to {}", path.display());
        }
        None => println!("{html}"),
    }
    Ok(())
}
