mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod organization;
mod render;
mod services;
mod workflow;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::bills::BillsArgs;
use crate::cmd::certificate::CertificateArgs;
use crate::cmd::clockings::ClockingsArgs;
use crate::cmd::cryptogram::CryptogramArgs;
use crate::cmd::holidays::HolidaysArgs;
use crate::cmd::lifelong::LifelongArgs;
use crate::cmd::paycheck::PaycheckArgs;
use crate::cmd::reports::ReportsArgs;
use crate::cmd::timetracker::TimetrackerArgs;
use crate::cmd::upload::UploadArgs;
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::AppResult;

#[derive(Parser)]
#[command(
    name = "deskhand",
    author,
    version,
    about = "Personal clerical-automation helpers"
)]
struct Cli {
    /// Print debug-level diagnostics.
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Configuration file; defaults to $DESKHAND_CONFIG or
    /// ~/.config/deskhand/config.json.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Helper name, needed when several helpers of the same kind are
    /// configured.
    #[arg(long, global = true)]
    helper: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Archive a household utility bill on the wiki.
    Bills(BillsArgs),
    /// Archive a paycheck on the forge wiki.
    Paycheck(PaycheckArgs),
    /// Generate and archive a permit/holiday request form.
    Holidays(HolidaysArgs),
    /// Track a professional-training event.
    Lifelong(LifelongArgs),
    /// Schedule the monthly Crypto-Gram e-book publication.
    Cryptogram(CryptogramArgs),
    /// Schedule a TLS certificate renewal.
    Certificate(CertificateArgs),
    /// Download the month's clock-in/out records.
    Clockings(ClockingsArgs),
    /// Daily and monthly report files, report mails and worklog upload.
    Reports(ReportsArgs),
    /// Per-user worklog report for a day.
    Timetracker(TimetrackerArgs),
    /// Upload a file to the forge file store or over FTP.
    Upload(UploadArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(error) = run(cli).await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "deskhand=debug"
    } else {
        "deskhand=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let ctx = AppContext::new(config);
    let helper = cli.helper.as_deref();
    match cli.command {
        Commands::Bills(args) => cmd::bills::run(&ctx, helper, args).await,
        Commands::Paycheck(args) => cmd::paycheck::run(&ctx, helper, args).await,
        Commands::Holidays(args) => cmd::holidays::run(&ctx, helper, args).await,
        Commands::Lifelong(args) => cmd::lifelong::run(&ctx, helper, args).await,
        Commands::Cryptogram(args) => cmd::cryptogram::run(&ctx, helper, args).await,
        Commands::Certificate(args) => cmd::certificate::run(&ctx, helper, args).await,
        Commands::Clockings(args) => cmd::clockings::run(&ctx, helper, args).await,
        Commands::Reports(args) => cmd::reports::run(&ctx, helper, args).await,
        Commands::Timetracker(args) => cmd::timetracker::run(&ctx, helper, args).await,
        Commands::Upload(args) => cmd::upload::run(&ctx, helper, args).await,
    }
}
