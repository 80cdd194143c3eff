use chrono::{Datelike, NaiveDateTime};
use serde_json::json;
use tracing::info;

use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::render::markup::append_row_to_first_table;
use crate::services::calendar::{EventRequest, filter_text};
use crate::services::forge::{ForgeTaskRequest, urlize};

const EVENT_DATE_FORMAT: &str = "%A %d %B %Y, %H.%M";

/// A professional-training event to track: forge task, calendar event and
/// wiki record pages.
#[derive(Debug, Clone)]
pub struct LearningEvent {
    /// Accreditation code assigned by the professional register.
    pub code: String,
    pub title: String,
    pub location: String,
    pub beginning: NaiveDateTime,
    pub ending: NaiveDateTime,
    pub credits: u32,
    pub notes: String,
}

pub fn task_description(event: &LearningEvent) -> String {
    format!(
        "* **Location:** {}\n* **From:** {}\n* **To:** {}\n* **Credits:** {}",
        event.location,
        event.beginning.format(EVENT_DATE_FORMAT),
        event.ending.format(EVENT_DATE_FORMAT),
        event.credits
    )
}

pub fn detail_page_body(event: &LearningEvent, task_key: &str) -> String {
    let plural = if event.credits == 1 { "" } else { "s" };
    format!(
        "**Task:** {task_key}\n\n\
         Attending this event is worth {} training credit{plural}.\n\n\
         == Logistics ==\n\
         **Location:** {}\n\
         **From:** {}\n\
         **To:** {}\n\n\
         {}",
        event.credits,
        event.location,
        event.beginning.format(EVENT_DATE_FORMAT),
        event.ending.format(EVENT_DATE_FORMAT),
        event.notes
    )
}

/// Skeleton of the yearly summary page: one table per learning category,
/// filled in over the year.
pub fn summary_skeleton(year: i32) -> String {
    format!(
        "= For {} =\n\n\
         == Non-formal learning ==\n\n\
         Accredited events I attended:\n\n\
         <table>\n\
         <tr><th>Code</th><th>Name</th><th>Date</th><th>Location</th><th>Credits</th><th>Certificate</th></tr>\n\
         </table>\n\n\
         == Informal learning ==\n\n\
         Events I attended:\n\n\
         <table>\n\
         <tr><th>Name</th><th>Date</th><th>Location</th><th>Notes</th></tr>\n\
         </table>\n\n\
         Online courses I followed:\n\n\
         <table>\n\
         <tr><th>Name</th><th>Provider</th><th>Date</th><th>Notes</th></tr>\n\
         </table>\n\n\
         Things I read:\n\n\
         <table>\n\
         <tr><th>Name</th><th>Date</th></tr>\n\
         </table>\n",
        year + 1
    )
}

pub fn summary_row(event: &LearningEvent, detail_slug: &str) -> String {
    format!(
        "<tr><td>{}</td><td>[[{detail_slug} | {}]]</td><td>{}</td><td>{}</td><td>{}</td><td></td></tr>",
        event.code,
        event.title,
        event.beginning.format("%Y-%m-%d"),
        event.location,
        event.credits
    )
}

/// Track a learning event end to end: open a forge task, put it on the
/// calendar, record it on the yearly summary page and a per-event detail
/// page, then point the task at the detail page. Returns the task key.
pub async fn schedule(
    ctx: &AppContext,
    helper_name: Option<&str>,
    event: LearningEvent,
) -> AppResult<String> {
    let helper = ctx.helper("lifelong", helper_name)?;
    let org = ctx.organization_for(helper)?;
    let forge = org.forge()?;
    let calendar = org.calendar()?;

    let task = forge
        .create_task(ForgeTaskRequest {
            title: event.title.clone(),
            description: task_description(&event),
            project_phid: helper.param("forge_project")?.to_string(),
            transactions: vec![
                (
                    helper.param("issuetype_field")?.to_string(),
                    json!(helper.param("issuetype_value")?),
                ),
                (
                    helper.param("credits_field")?.to_string(),
                    json!(event.credits),
                ),
                (
                    helper.param("language_field")?.to_string(),
                    json!(helper.param("language_value")?),
                ),
            ],
        })
        .await?;
    let task_key = task.key();

    calendar
        .add_event(&EventRequest {
            summary: filter_text(&format!("{task_key} {}", event.title)),
            location: filter_text(&event.location),
            beginning: event.beginning,
            ending: event.ending,
            alarm_trigger: "-PT1H".to_string(),
        })
        .await?;

    let year = event.beginning.year();
    let path_prefix = helper.param("path_prefix")?;
    let page_suffix = helper.param("page_suffix")?;
    let summary_path = format!("{path_prefix}{year}");
    if forge.find_document(&summary_path, false).await?.is_none() {
        forge
            .create_document(
                &summary_path,
                &format!("{year}{page_suffix}"),
                &summary_skeleton(year),
            )
            .await?;
    }

    let detail_slug = urlize(&format!("{path_prefix}{year}/{}", event.title));
    if forge.find_document(&detail_slug, false).await?.is_none() {
        forge
            .create_document(
                &detail_slug,
                &format!("{}{page_suffix}", event.title),
                &detail_page_body(&event, &task_key),
            )
            .await?;
    }

    let summary = forge
        .find_document(&summary_path, true)
        .await?
        .ok_or_else(|| AppError::Forge(format!("wiki page not found: {summary_path}")))?;
    let body = summary
        .body
        .ok_or_else(|| AppError::Forge(format!("wiki page {summary_path} has no body")))?;
    let body = append_row_to_first_table(&body, &summary_row(&event, &detail_slug))?;
    forge
        .update_document(&summary_path, &summary.title, &body)
        .await?;

    forge
        .edit_task(
            &task.phid,
            &[
                (
                    helper.param("wiki_field")?.to_string(),
                    json!(forge.document_url(&detail_slug)),
                ),
                (
                    helper.param("start_field")?.to_string(),
                    json!(event.beginning.and_utc().timestamp()),
                ),
                (
                    helper.param("end_field")?.to_string(),
                    json!(event.ending.and_utc().timestamp()),
                ),
            ],
        )
        .await?;
    info!(task = task_key, "learning event scheduled");
    Ok(task_key)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn event() -> LearningEvent {
        LearningEvent {
            code: "ING-2026-114".to_string(),
            title: "Rust for engineers".to_string(),
            location: "Terni".to_string(),
            beginning: NaiveDate::from_ymd_opt(2026, 10, 2)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap(),
            ending: NaiveDate::from_ymd_opt(2026, 10, 2)
                .unwrap()
                .and_hms_opt(18, 30, 0)
                .unwrap(),
            credits: 4,
            notes: "Bring the membership card.".to_string(),
        }
    }

    #[test]
    fn task_description_lists_the_logistics() {
        let description = task_description(&event());
        assert!(description.contains("* **Location:** Terni"));
        assert!(description.contains("* **From:** Friday 02 October 2026, 14.30"));
        assert!(description.contains("* **Credits:** 4"));
    }

    #[test]
    fn detail_page_links_the_task_and_pluralizes_credits() {
        let body = detail_page_body(&event(), "T123");
        assert!(body.starts_with("**Task:** T123"));
        assert!(body.contains("worth 4 training credits."));
        let mut single = event();
        single.credits = 1;
        assert!(detail_page_body(&single, "T123").contains("worth 1 training credit."));
    }

    #[test]
    fn summary_skeleton_points_at_the_next_year() {
        let skeleton = summary_skeleton(2026);
        assert!(skeleton.starts_with("= For 2027 ="));
        assert_eq!(skeleton.matches("<table>").count(), 4);
    }

    #[test]
    fn summary_row_links_the_detail_page() {
        let row = summary_row(&event(), "learning/2026/Rust_for_engineers");
        assert!(row.contains("<td>ING-2026-114</td>"));
        assert!(row.contains("[[learning/2026/Rust_for_engineers | Rust for engineers]]"));
        assert!(row.contains("<td>2026-10-02</td>"));
    }
}
