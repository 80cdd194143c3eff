use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand, ValueEnum};

use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::reports::{self, ReportKind};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportKindArg {
    Forecast,
    Final,
    Monthly,
}

impl From<ReportKindArg> for ReportKind {
    fn from(arg: ReportKindArg) -> Self {
        match arg {
            ReportKindArg::Forecast => ReportKind::Forecast,
            ReportKindArg::Final => ReportKind::Final,
            ReportKindArg::Monthly => ReportKind::Monthly,
        }
    }
}

#[derive(Args)]
pub struct ReportsArgs {
    #[command(subcommand)]
    pub command: ReportsCommand,
}

#[derive(Subcommand)]
pub enum ReportsCommand {
    /// Find (and if needed create) the report file, printing its path.
    Locate {
        #[arg(value_enum)]
        kind: ReportKindArg,
        /// Report day; defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Mail the report to the configured recipients.
    Send {
        #[arg(value_enum)]
        kind: ReportKindArg,
        /// Report day; defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Replace the day's tracker worklogs with the final report's entries.
    Worklogs {
        /// Report day; defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

fn day(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

pub async fn run(ctx: &AppContext, helper: Option<&str>, args: ReportsArgs) -> AppResult<()> {
    match args.command {
        ReportsCommand::Locate { kind, date } => {
            let file = reports::locate(ctx, helper, kind.into(), day(date))?;
            println!("{}", file.display());
        }
        ReportsCommand::Send { kind, date } => {
            let file = reports::send(ctx, helper, kind.into(), day(date)).await?;
            println!("Report {} sent", file.display());
        }
        ReportsCommand::Worklogs { date } => {
            let added = reports::upload_worklogs(ctx, helper, day(date)).await?;
            println!("{added} worklogs uploaded");
        }
    }
    Ok(())
}
