use chrono::{Days, NaiveDateTime};
use serde_json::json;
use tracing::info;

use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::services::calendar::{EventRequest, filter_text};
use crate::services::issue_tracker::{TicketRequest, WikiPageLink};

const EXPIRY_FORMAT: &str = "%A %d %B %Y, %H.%M";

pub fn ticket_summary(expiry: NaiveDateTime) -> String {
    format!(
        "Let's Encrypt renewal (expires on {})",
        expiry.format(EXPIRY_FORMAT)
    )
}

pub fn ticket_description(hostname: &str, expiry: NaiveDateTime) -> String {
    format!(
        "Renew {hostname}'s Let's Encrypt certificate, as it expires on {}",
        expiry.format(EXPIRY_FORMAT)
    )
}

/// Schedule a TLS certificate renewal: a ticket linked to the renewal
/// how-to wiki page, plus a calendar reminder ten days before the expiry.
/// Returns the ticket key.
pub async fn schedule(
    ctx: &AppContext,
    helper_name: Option<&str>,
    expiry: NaiveDateTime,
) -> AppResult<String> {
    let helper = ctx.helper("certificate", helper_name)?;
    let org = ctx.organization_for(helper)?;
    let tracker = org.issue_tracker()?;
    let wiki = org.wiki()?;
    let calendar = org.calendar()?;

    let summary = ticket_summary(expiry);
    let ticket = tracker
        .create_ticket(TicketRequest {
            project: helper.param("jira_project")?.to_string(),
            issue_type: helper.param("jira_issue_type")?.to_string(),
            summary: summary.clone(),
            description: ticket_description(helper.param("hostname")?, expiry),
            assign_to_self: true,
            custom_fields: vec![(
                helper.param("jira_language_field")?.to_string(),
                json!({"value": helper.param("jira_language_value")?}),
            )],
        })
        .await?;

    let space = helper.param("confluence_space")?;
    let title = helper.param("howto_page")?;
    let page_id = wiki
        .page_id(space, title)
        .await?
        .ok_or_else(|| AppError::Wiki(format!("page not found: {space} / {title}")))?;
    let page_url = wiki.page_url(&page_id).await?;
    tracker
        .link_wiki_page(
            &ticket.key,
            &WikiPageLink {
                page_url,
                title: title.to_string(),
                application_name: wiki.site_name().to_string(),
                application_id: wiki.global_identifier().to_string(),
                page_id,
            },
        )
        .await?;

    let reminder_day = expiry
        .date()
        .checked_sub_days(Days::new(10))
        .ok_or_else(|| AppError::Configuration(format!("invalid expiry date {expiry}")))?;
    calendar
        .add_event(&EventRequest {
            summary: filter_text(&format!("{}: {summary}", ticket.key)),
            location: String::new(),
            beginning: reminder_day.and_hms_opt(10, 0, 0).unwrap(),
            ending: reminder_day.and_hms_opt(11, 0, 0).unwrap(),
            alarm_trigger: "-PT0S".to_string(),
        })
        .await?;
    info!(ticket = ticket.key, "certificate renewal scheduled");
    Ok(ticket.key)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn summary_and_description_spell_the_expiry_out() {
        let expiry = NaiveDate::from_ymd_opt(2026, 11, 20)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(
            ticket_summary(expiry),
            "Let's Encrypt renewal (expires on Friday 20 November 2026, 08.30)"
        );
        assert_eq!(
            ticket_description("diffie.example.net", expiry),
            "Renew diffie.example.net's Let's Encrypt certificate, as it expires on \
             Friday 20 November 2026, 08.30"
        );
    }
}
