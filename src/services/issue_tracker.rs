use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::worklog::Worklog;
use crate::error::AppResult;

/// Request to open a ticket. `custom_fields` carries backend field ids and
/// raw JSON values (language selectors and the like).
#[derive(Debug, Clone)]
pub struct TicketRequest {
    pub project: String,
    pub issue_type: String,
    pub summary: String,
    pub description: String,
    /// Assign the ticket to the authenticated user.
    pub assign_to_self: bool,
    pub custom_fields: Vec<(String, serde_json::Value)>,
}

#[derive(Debug, Clone)]
pub struct CreatedTicket {
    pub key: String,
}

/// Ticket key and summary as returned by a search.
#[derive(Debug, Clone)]
pub struct TicketRef {
    pub key: String,
    pub summary: String,
}

/// Remote link from a ticket to a wiki page.
#[derive(Debug, Clone)]
pub struct WikiPageLink {
    pub page_url: String,
    pub title: String,
    pub application_name: String,
    pub application_id: String,
    pub page_id: String,
}

#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    /// Authenticated user, used as the default assignee.
    fn username(&self) -> &str;
    async fn create_ticket(&self, request: TicketRequest) -> AppResult<CreatedTicket>;
    /// Tickets that received at least one worklog on the given date.
    async fn tickets_with_worklogs_on(&self, date: NaiveDate) -> AppResult<Vec<TicketRef>>;
    async fn ticket_worklogs(&self, ticket_key: &str) -> AppResult<Vec<Worklog>>;
    async fn add_worklog(&self, worklog: &Worklog) -> AppResult<()>;
    /// Delete a worklog through its back-reference URL; entries without one
    /// are left alone.
    async fn delete_worklog(&self, worklog: &Worklog) -> AppResult<()>;
    async fn link_wiki_page(&self, ticket_key: &str, link: &WikiPageLink) -> AppResult<()>;
}
