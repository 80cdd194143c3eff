use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, ValueEnum};

use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::bills::{self, BillUpload, Utility};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UtilityArg {
    Telephone,
    Electricity,
    Gas,
    Water,
}

impl From<UtilityArg> for Utility {
    fn from(arg: UtilityArg) -> Self {
        match arg {
            UtilityArg::Telephone => Utility::Telephone,
            UtilityArg::Electricity => Utility::Electricity,
            UtilityArg::Gas => Utility::Gas,
            UtilityArg::Water => Utility::Water,
        }
    }
}

#[derive(Args)]
pub struct BillsArgs {
    /// Which utility the bill is for.
    #[arg(value_enum)]
    pub utility: UtilityArg,
    /// Due date (or reading date), YYYY-MM-DD.
    #[arg(long)]
    pub date: NaiveDate,
    /// Billing period shown in the archive table.
    #[arg(long)]
    pub period: String,
    /// Amount in euro.
    #[arg(long)]
    pub amount: f64,
    /// Metered gas consumption in cubic meters.
    #[arg(long)]
    pub cubic_meters: Option<u32>,
    #[arg(long, default_value = "")]
    pub notes: String,
    /// Scanned bill PDFs, concatenated in the given order.
    #[arg(required = true)]
    pub documents: Vec<PathBuf>,
}

pub async fn run(ctx: &AppContext, helper: Option<&str>, args: BillsArgs) -> AppResult<()> {
    let file_name = bills::upload(
        ctx,
        helper,
        BillUpload {
            utility: args.utility.into(),
            date: args.date,
            period: args.period,
            amount: args.amount,
            cubic_meters: args.cubic_meters,
            notes: args.notes,
            documents: args.documents,
        },
    )
    .await?;
    println!("Bill archived as {file_name}");
    Ok(())
}
