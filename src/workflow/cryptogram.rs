use chrono::NaiveDate;
use serde_json::json;
use tracing::info;

use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::services::calendar::{EventRequest, filter_text};
use crate::services::issue_tracker::TicketRequest;

const DESCRIPTION: &str = "Crypto-Gram is a famous free monthly newsletter from security \
                           expert Bruce Schneier. I publish an edition in EPUB and MOBI \
                           format on my website.";

fn month_name(year: i32, month: u32) -> AppResult<String> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::Configuration(format!("invalid month {year}-{month}")))?;
    Ok(first.format("%B").to_string())
}

pub fn ticket_summary(year: i32, month: u32) -> AppResult<String> {
    Ok(format!("Crypto-Gram, {} {year}", month_name(year, month)?))
}

/// Schedule the monthly Crypto-Gram e-book publication: one ticket plus a
/// calendar slot on the 15th. Returns the ticket key.
pub async fn schedule(
    ctx: &AppContext,
    helper_name: Option<&str>,
    year: i32,
    month: u32,
) -> AppResult<String> {
    let helper = ctx.helper("cryptogram", helper_name)?;
    let org = ctx.organization_for(helper)?;
    let tracker = org.issue_tracker()?;
    let calendar = org.calendar()?;

    let ticket = tracker
        .create_ticket(TicketRequest {
            project: helper.param("jira_project")?.to_string(),
            issue_type: helper.param("jira_issue_type")?.to_string(),
            summary: ticket_summary(year, month)?,
            description: DESCRIPTION.to_string(),
            assign_to_self: true,
            custom_fields: vec![(
                helper.param("jira_language_field")?.to_string(),
                json!({"value": helper.param("jira_language_value")?}),
            )],
        })
        .await?;

    let day = NaiveDate::from_ymd_opt(year, month, 15)
        .ok_or_else(|| AppError::Configuration(format!("invalid month {year}-{month}")))?;
    calendar
        .add_event(&EventRequest {
            summary: filter_text(&format!(
                "{}: Crypto-Gram, {} - {year}",
                ticket.key,
                month_name(year, month)?
            )),
            location: String::new(),
            beginning: day.and_hms_opt(15, 0, 0).unwrap(),
            ending: day.and_hms_opt(16, 0, 0).unwrap(),
            alarm_trigger: "-PT0S".to_string(),
        })
        .await?;
    info!(ticket = ticket.key, "crypto-gram publication scheduled");
    Ok(ticket.key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_spells_the_month_out() {
        assert_eq!(ticket_summary(2026, 8).unwrap(), "Crypto-Gram, August 2026");
        assert!(ticket_summary(2026, 13).is_err());
    }
}
