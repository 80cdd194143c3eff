use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Args, ValueEnum};

use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::workflow::holidays::{self, HolidayKind, HolidayRequest};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RequestKindArg {
    /// A permit for part of a day.
    Permit,
    /// One full day off.
    Day,
    /// A multi-day leave.
    MultiDay,
}

#[derive(Args)]
pub struct HolidaysArgs {
    #[arg(value_enum)]
    pub kind: RequestKindArg,
    /// Reason, archived next to the request.
    #[arg(long)]
    pub description: String,
    /// Date written on the form; defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// The day of the permit or day off.
    #[arg(long)]
    pub day: Option<NaiveDate>,
    /// Permit start time, HH:MM.
    #[arg(long)]
    pub beginning: Option<NaiveTime>,
    /// Permit end time, HH:MM.
    #[arg(long)]
    pub ending: Option<NaiveTime>,
    /// First day of a multi-day leave.
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day of a multi-day leave.
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

fn required<T>(value: Option<T>, flag: &str, kind: &str) -> AppResult<T> {
    value.ok_or_else(|| {
        AppError::Configuration(format!("--{flag} is required for a {kind} request"))
    })
}

pub async fn run(ctx: &AppContext, helper: Option<&str>, args: HolidaysArgs) -> AppResult<()> {
    let kind = match args.kind {
        RequestKindArg::Permit => HolidayKind::Permit {
            day: required(args.day, "day", "permit")?,
            beginning: required(args.beginning, "beginning", "permit")?,
            ending: required(args.ending, "ending", "permit")?,
        },
        RequestKindArg::Day => HolidayKind::SingleDay {
            day: required(args.day, "day", "day-off")?,
        },
        RequestKindArg::MultiDay => HolidayKind::MultiDay {
            beginning: required(args.from, "from", "multi-day")?,
            ending: required(args.to, "to", "multi-day")?,
        },
    };
    let now = Local::now().naive_local();
    let request = HolidayRequest {
        kind,
        description: args.description,
        date: args.date.unwrap_or_else(|| now.date()),
    };
    let pdf = holidays::create_request(ctx, helper, request, now).await?;
    println!("Holiday request archived: {}", pdf.display());
    Ok(())
}
