use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::upload::{self, UploadTarget};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TargetArg {
    Forge,
    Ftp,
}

impl From<TargetArg> for UploadTarget {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Forge => UploadTarget::Forge,
            TargetArg::Ftp => UploadTarget::Ftp,
        }
    }
}

#[derive(Args)]
pub struct UploadArgs {
    /// Local file to upload.
    pub file: PathBuf,
    #[arg(long, value_enum, default_value = "forge")]
    pub via: TargetArg,
    /// Remote file name; defaults to the local name.
    #[arg(long)]
    pub name: Option<String>,
}

pub async fn run(ctx: &AppContext, helper: Option<&str>, args: UploadArgs) -> AppResult<()> {
    let stored = upload::run(
        ctx,
        helper,
        args.via.into(),
        &args.file,
        args.name.as_deref(),
    )
    .await?;
    println!("Uploaded: {stored}");
    Ok(())
}
