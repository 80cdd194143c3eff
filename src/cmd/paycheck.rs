use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, ValueEnum};

use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::paycheck::{self, PaycheckUpload, PaycheckVariant};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum VariantArg {
    Monthly,
    Thirteenth,
    Fourteenth,
}

impl From<VariantArg> for PaycheckVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Monthly => PaycheckVariant::Monthly,
            VariantArg::Thirteenth => PaycheckVariant::Thirteenth,
            VariantArg::Fourteenth => PaycheckVariant::Fourteenth,
        }
    }
}

#[derive(Args)]
pub struct PaycheckArgs {
    /// Payday, YYYY-MM-DD.
    #[arg(long)]
    pub day: NaiveDate,
    #[arg(long, value_enum, default_value = "monthly")]
    pub variant: VariantArg,
    /// Worked hours on the paycheck.
    #[arg(long)]
    pub hours: f64,
    #[arg(long, default_value_t = 0.0)]
    pub overtime: f64,
    #[arg(long)]
    pub gross: f64,
    #[arg(long)]
    pub net: f64,
    /// Remaining holiday balance, in hours.
    #[arg(long)]
    pub holidays: f64,
    /// Remaining festivity balance, in hours.
    #[arg(long)]
    pub festivities: f64,
    /// Remaining permit balance, in hours.
    #[arg(long)]
    pub permits: f64,
    /// Scanned paycheck PDF.
    pub pdf: PathBuf,
}

pub async fn run(ctx: &AppContext, helper: Option<&str>, args: PaycheckArgs) -> AppResult<()> {
    let file_name = paycheck::upload(
        ctx,
        helper,
        PaycheckUpload {
            day: args.day,
            variant: args.variant.into(),
            hours: args.hours,
            overtime: args.overtime,
            gross: args.gross,
            net: args.net,
            holidays: args.holidays,
            festivities: args.festivities,
            permits: args.permits,
            pdf: args.pdf,
        },
    )
    .await?;
    println!("Paycheck archived as {file_name}");
    Ok(())
}
