use chrono::NaiveDateTime;
use clap::Args;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::lifelong::{self, LearningEvent};

#[derive(Args)]
pub struct LifelongArgs {
    /// Accreditation code of the event.
    #[arg(long)]
    pub code: String,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub location: String,
    /// Event start, YYYY-MM-DDTHH:MM:SS.
    #[arg(long)]
    pub beginning: NaiveDateTime,
    /// Event end, YYYY-MM-DDTHH:MM:SS.
    #[arg(long)]
    pub ending: NaiveDateTime,
    /// Training credits the event is worth.
    #[arg(long)]
    pub credits: u32,
    #[arg(long, default_value = "")]
    pub notes: String,
}

pub async fn run(ctx: &AppContext, helper: Option<&str>, args: LifelongArgs) -> AppResult<()> {
    let task_key = lifelong::schedule(
        ctx,
        helper,
        LearningEvent {
            code: args.code,
            title: args.title,
            location: args.location,
            beginning: args.beginning,
            ending: args.ending,
            credits: args.credits,
            notes: args.notes,
        },
    )
    .await?;
    println!("Learning event scheduled: {task_key}");
    Ok(())
}
