use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::context::AppContext;
use crate::domain::worklog::Worklog;
use crate::error::AppResult;
use crate::organization::Organization;

/// Worklogs registered on the given date, grouped per user. The search goes
/// through every ticket that received a worklog that day; each ticket's
/// worklog list is fetched once and shared across users.
pub async fn worklogs_by_user(
    org: &Organization,
    date: NaiveDate,
    users: &[String],
) -> AppResult<BTreeMap<String, Vec<Worklog>>> {
    let tracker = org.issue_tracker()?;
    let tickets = tracker.tickets_with_worklogs_on(date).await?;
    let mut per_ticket = Vec::with_capacity(tickets.len());
    for ticket in &tickets {
        per_ticket.push(tracker.ticket_worklogs(&ticket.key).await?);
    }
    debug!(tickets = tickets.len(), %date, "worklog search");

    let mut by_user = BTreeMap::new();
    for user in users {
        let mut worklogs: Vec<Worklog> = Vec::new();
        for (ticket, ticket_worklogs) in tickets.iter().zip(&per_ticket) {
            for worklog in ticket_worklogs {
                if worklog.author != *user || worklog.started.date() != date {
                    continue;
                }
                let mut worklog = worklog.clone();
                worklog.ticket = ticket.key.clone();
                worklog.summary = ticket.summary.clone();
                worklogs.push(worklog);
            }
        }
        worklogs.sort_by_key(|worklog| worklog.started);
        by_user.insert(user.clone(), worklogs);
    }
    Ok(by_user)
}

/// Per-user worklog tables with a grand total, one section per user in the
/// given order.
pub fn worklogs_to_html(by_user: &BTreeMap<String, Vec<Worklog>>, users: &[String]) -> String {
    let mut html = String::from("<body>");
    for (index, user) in users.iter().enumerate() {
        if index > 0 {
            html.push_str("<hr>");
        }
        html.push_str(&format!("<br><h1>{user}</h1><br>"));
        html.push_str(r#"<table border="1" style="font-size: 12px">"#);
        html.push_str(
            "<tr><th>Issue</th><th>Summary</th><th>Time</th>\
             <th>Author</th><th>Started</th><th>Comment</th></tr>",
        );
        let mut total_hours = 0.0;
        for worklog in by_user.get(user).map(Vec::as_slice).unwrap_or_default() {
            total_hours += worklog.duration;
            html.push_str(&format!(
                concat!(
                    r#"<tr><td style="padding: 5px">{}</td>"#,
                    r#"<td style="padding: 5px">{}</td>"#,
                    r#"<td style="padding: 5px; text-align: right">{}</td>"#,
                    r#"<td style="padding: 5px">{}</td>"#,
                    r#"<td style="padding: 5px">{}</td>"#,
                    r#"<td style="padding: 5px">{}</td></tr>"#,
                ),
                worklog.ticket,
                worklog.summary,
                worklog.duration,
                worklog.author,
                worklog.started.format("%H:%M"),
                worklog.description
            ));
        }
        html.push_str("</table>");
        html.push_str(&format!(
            r#"<br><h4 style="font-size: 16px">Total hours: {total_hours}</h4><br>"#
        ));
    }
    html.push_str("</body>");
    html
}

/// Fetch and render the worklog report for a date. Users default to the
/// helper's configured list.
pub async fn report(
    ctx: &AppContext,
    helper_name: Option<&str>,
    date: NaiveDate,
    users: Vec<String>,
) -> AppResult<String> {
    let helper = ctx.helper("timetracker", helper_name)?;
    let org = ctx.organization_for(helper)?;
    let users = if users.is_empty() {
        helper.list_param("jira_users")?
    } else {
        users
    };
    let by_user = worklogs_by_user(&org, date, &users).await?;
    Ok(worklogs_to_html(&by_user, &users))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worklog(user: &str, hour: u32, duration: f64) -> Worklog {
        let started = NaiveDate::from_ymd_opt(2026, 8, 24)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        let mut worklog = Worklog::new("TCK-7", user, "TCK-7: plumbing", started, duration);
        worklog.summary = "Fix the plumbing".to_string();
        worklog
    }

    #[test]
    fn renders_one_section_per_user_with_totals() {
        let users = vec!["alice".to_string(), "bob".to_string()];
        let mut by_user = BTreeMap::new();
        by_user.insert("alice".to_string(), vec![worklog("alice", 9, 1.5), worklog("alice", 11, 2.0)]);
        by_user.insert("bob".to_string(), vec![]);

        let html = worklogs_to_html(&by_user, &users);
        assert!(html.contains("<h1>alice</h1>"));
        assert!(html.contains("<h1>bob</h1>"));
        assert_eq!(html.matches("<hr>").count(), 1);
        assert!(html.contains("Total hours: 3.5"));
        assert!(html.contains("Total hours: 0"));
        assert!(html.contains(r#"<td style="padding: 5px">09:00</td>"#));
    }
}
