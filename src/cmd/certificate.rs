use chrono::NaiveDateTime;
use clap::Args;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::certificate;

#[derive(Args)]
pub struct CertificateArgs {
    /// Certificate expiry, YYYY-MM-DDTHH:MM:SS.
    pub expiry: NaiveDateTime,
}

pub async fn run(ctx: &AppContext, helper: Option<&str>, args: CertificateArgs) -> AppResult<()> {
    let ticket = certificate::schedule(ctx, helper, args.expiry).await?;
    println!("Certificate renewal scheduled: {ticket}");
    Ok(())
}
