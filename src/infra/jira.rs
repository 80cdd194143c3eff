use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::domain::worklog::Worklog;
use crate::error::{AppError, AppResult};
use crate::services::{
    CreatedTicket, IssueTrackerService, TicketRef, TicketRequest, WikiPageLink,
};

const WORKLOG_STARTED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

pub struct JiraClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
}

impl JiraClient {
    pub fn new(base_url: &str, username: &str, password: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/rest/api/2/{path}", self.base_url)
    }

    async fn check(response: Response, what: &str) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unable to read response>".to_string());
        Err(AppError::IssueTracker(format!(
            "{what}: Jira responded with {status}: {body}"
        )))
    }

    async fn post_json(&self, path: &str, body: &Value, what: &str) -> AppResult<Response> {
        let response = self
            .http
            .post(self.endpoint(path))
            .basic_auth(&self.username, Some(&self.password))
            .json(body)
            .send()
            .await
            .map_err(|err| AppError::IssueTracker(format!("{what}: {err}")))?;
        Self::check(response, what).await
    }
}

#[async_trait]
impl IssueTrackerService for JiraClient {
    fn username(&self) -> &str {
        &self.username
    }

    async fn create_ticket(&self, request: TicketRequest) -> AppResult<CreatedTicket> {
        debug!(summary = %request.summary, "jira: create ticket");
        let mut fields = json!({
            "project": {"key": request.project},
            "issuetype": {"name": request.issue_type},
            "summary": request.summary,
            "description": request.description,
        });
        if request.assign_to_self {
            fields["assignee"] = json!({"name": self.username});
        }
        for (field, value) in &request.custom_fields {
            fields[field] = value.clone();
        }
        let response = self
            .post_json("issue", &json!({"fields": fields}), "create ticket")
            .await?;
        let payload: CreateIssueResponse = response.json().await.map_err(|err| {
            AppError::IssueTracker(format!("failed to parse ticket reply: {err}"))
        })?;
        Ok(CreatedTicket { key: payload.key })
    }

    async fn tickets_with_worklogs_on(&self, date: NaiveDate) -> AppResult<Vec<TicketRef>> {
        let jql = format!("worklogDate = {}", date.format("%Y-%m-%d"));
        debug!(%jql, "jira: search tickets");
        let body = json!({"jql": jql, "fields": ["summary"], "maxResults": 500});
        let response = self.post_json("search", &body, "search tickets").await?;
        let payload: SearchResponse = response.json().await.map_err(|err| {
            AppError::IssueTracker(format!("failed to parse search reply: {err}"))
        })?;
        Ok(payload
            .issues
            .into_iter()
            .map(|issue| TicketRef {
                key: issue.key,
                summary: issue.fields.summary.unwrap_or_default(),
            })
            .collect())
    }

    async fn ticket_worklogs(&self, ticket_key: &str) -> AppResult<Vec<Worklog>> {
        debug!(ticket = ticket_key, "jira: fetch worklogs");
        let response = self
            .http
            .get(self.endpoint(&format!("issue/{ticket_key}/worklog")))
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|err| AppError::IssueTracker(format!("fetch worklogs: {err}")))?;
        let response = Self::check(response, "fetch worklogs").await?;
        let payload: WorklogListResponse = response.json().await.map_err(|err| {
            AppError::IssueTracker(format!("failed to parse worklog reply: {err}"))
        })?;
        payload
            .worklogs
            .into_iter()
            .map(|entry| entry.into_worklog(ticket_key))
            .collect()
    }

    async fn add_worklog(&self, worklog: &Worklog) -> AppResult<()> {
        debug!(ticket = %worklog.ticket, started = %worklog.started, "jira: add worklog");
        let body = json!({
            "started": worklog.started.format("%Y-%m-%dT%H:%M:%S.000+0000").to_string(),
            "timeSpentSeconds": worklog.duration_seconds(),
            "comment": worklog.description,
        });
        self.post_json(
            &format!("issue/{}/worklog", worklog.ticket),
            &body,
            "add worklog",
        )
        .await?;
        Ok(())
    }

    async fn delete_worklog(&self, worklog: &Worklog) -> AppResult<()> {
        let Some(self_url) = &worklog.self_url else {
            return Ok(());
        };
        // The back-reference is absolute when it came from the API.
        let url = if self_url.starts_with("http://") || self_url.starts_with("https://") {
            self_url.clone()
        } else {
            format!("{}/{}", self.base_url, self_url.trim_start_matches('/'))
        };
        debug!(%url, "jira: delete worklog");
        let response = self
            .http
            .delete(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|err| AppError::IssueTracker(format!("delete worklog: {err}")))?;
        Self::check(response, "delete worklog").await?;
        Ok(())
    }

    async fn link_wiki_page(&self, ticket_key: &str, link: &WikiPageLink) -> AppResult<()> {
        debug!(ticket = ticket_key, page = %link.title, "jira: link wiki page");
        let body = json!({
            "globalId": format!("appId={}&pageId={}", link.application_id, link.page_id),
            "application": {
                "type": "com.atlassian.confluence",
                "name": link.application_name,
            },
            "relationship": "Wiki Page",
            "object": {"url": link.page_url, "title": link.title},
        });
        self.post_json(
            &format!("issue/{ticket_key}/remotelink"),
            &body,
            "link wiki page",
        )
        .await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct CreateIssueResponse {
    key: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<SearchIssue>,
}

#[derive(Deserialize)]
struct SearchIssue {
    key: String,
    fields: SearchIssueFields,
}

#[derive(Deserialize)]
struct SearchIssueFields {
    summary: Option<String>,
}

#[derive(Deserialize)]
struct WorklogListResponse {
    #[serde(default)]
    worklogs: Vec<WorklogEntry>,
}

#[derive(Deserialize)]
struct WorklogEntry {
    #[serde(rename = "self")]
    self_url: String,
    #[serde(rename = "updateAuthor")]
    update_author: WorklogAuthor,
    #[serde(default)]
    comment: String,
    started: String,
    #[serde(rename = "timeSpentSeconds")]
    time_spent_seconds: i64,
}

#[derive(Deserialize)]
struct WorklogAuthor {
    key: Option<String>,
    name: Option<String>,
}

impl WorklogEntry {
    fn into_worklog(self, ticket_key: &str) -> AppResult<Worklog> {
        let started = DateTime::parse_from_str(&self.started, WORKLOG_STARTED_FORMAT)
            .map_err(|err| {
                AppError::IssueTracker(format!(
                    "cannot parse worklog start '{}': {err}",
                    self.started
                ))
            })?
            .naive_utc();
        let author = self
            .update_author
            .key
            .or(self.update_author.name)
            .unwrap_or_default();
        let mut worklog = Worklog::new(
            ticket_key,
            author,
            self.comment,
            started,
            self.time_spent_seconds as f64 / 3600.0,
        );
        worklog.self_url = Some(self.self_url);
        Ok(worklog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(server: &mockito::ServerGuard) -> JiraClient {
        JiraClient::new(&server.url(), "me", "secret")
    }

    #[tokio::test]
    async fn creates_a_ticket() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/api/2/issue")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "fields": {
                    "project": {"key": "TCK"},
                    "issuetype": {"name": "Task"},
                    "summary": "Do the thing",
                    "assignee": {"name": "me"},
                }
            })))
            .with_status(201)
            .with_body(r#"{"id": "1", "key": "TCK-7", "self": "x"}"#)
            .create_async()
            .await;

        let ticket = client(&server)
            .create_ticket(TicketRequest {
                project: "TCK".to_string(),
                issue_type: "Task".to_string(),
                summary: "Do the thing".to_string(),
                description: "details".to_string(),
                assign_to_self: true,
                custom_fields: vec![],
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(ticket.key, "TCK-7");
    }

    #[tokio::test]
    async fn surfaces_error_replies() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/api/2/issue")
            .with_status(400)
            .with_body(r#"{"errorMessages": ["project is required"]}"#)
            .create_async()
            .await;

        let err = client(&server)
            .create_ticket(TicketRequest {
                project: String::new(),
                issue_type: "Task".to_string(),
                summary: "x".to_string(),
                description: String::new(),
                assign_to_self: false,
                custom_fields: vec![],
            })
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("400"), "unexpected error: {message}");
        assert!(message.contains("project is required"));
    }

    #[tokio::test]
    async fn parses_ticket_worklogs() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/api/2/issue/TCK-7/worklog")
            .with_body(
                r#"{"worklogs": [{
                    "self": "https://jira.test/rest/api/2/issue/10/worklog/100",
                    "updateAuthor": {"key": "me"},
                    "comment": "TCK-7: fixing",
                    "started": "2026-08-24T09:00:00.000+0000",
                    "timeSpentSeconds": 5400
                }]}"#,
            )
            .create_async()
            .await;

        let worklogs = client(&server).ticket_worklogs("TCK-7").await.unwrap();
        assert_eq!(worklogs.len(), 1);
        assert_eq!(worklogs[0].ticket, "TCK-7");
        assert_eq!(worklogs[0].author, "me");
        assert_eq!(worklogs[0].duration, 1.5);
        assert_eq!(
            worklogs[0].started.format("%Y-%m-%d %H:%M").to_string(),
            "2026-08-24 09:00"
        );
        assert!(worklogs[0].self_url.as_deref().unwrap().ends_with("/100"));
    }

    #[tokio::test]
    async fn deleting_without_back_reference_is_a_no_op() {
        let server = mockito::Server::new_async().await;
        let started = NaiveDate::from_ymd_opt(2026, 8, 24)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let worklog = Worklog::new("TCK-7", "me", "work", started, 1.0);
        client(&server).delete_worklog(&worklog).await.unwrap();
    }
}
