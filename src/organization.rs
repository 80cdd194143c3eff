use std::sync::Arc;

use crate::config::OrganizationConfig;
use crate::error::{AppError, AppResult};
use crate::infra::badgebox::BadgeBoxClient;
use crate::infra::caldav::CalDavClient;
use crate::infra::confluence::ConfluenceClient;
use crate::infra::ftp::FtpClient;
use crate::infra::jira::JiraClient;
use crate::infra::phabricator::PhabricatorClient;
use crate::infra::smtp::SmtpMailer;
use crate::services::{
    CalendarService, FileTransferService, ForgeService, IssueTrackerService, MailerService,
    TimeClockService, WikiService,
};

/// A named bundle of optional service handles, built once from
/// configuration and immutable afterwards. Accessing a service that was not
/// configured for the organization is a configuration error.
#[derive(Clone)]
pub struct Organization {
    pub name: String,
    issue_tracker: Option<Arc<dyn IssueTrackerService>>,
    wiki: Option<Arc<dyn WikiService>>,
    forge: Option<Arc<dyn ForgeService>>,
    calendar: Option<Arc<dyn CalendarService>>,
    time_clock: Option<Arc<dyn TimeClockService>>,
    mailer: Option<Arc<dyn MailerService>>,
    file_transfer: Option<Arc<dyn FileTransferService>>,
}

impl Organization {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            issue_tracker: None,
            wiki: None,
            forge: None,
            calendar: None,
            time_clock: None,
            mailer: None,
            file_transfer: None,
        }
    }

    pub fn from_config(name: &str, config: &OrganizationConfig) -> AppResult<Self> {
        let mut org = Self::new(name);
        if let Some(jira) = &config.jira {
            org.set_issue_tracker(Arc::new(JiraClient::new(
                &jira.url,
                &jira.username,
                &jira.password,
            )));
        }
        if let Some(confluence) = &config.confluence {
            org.set_wiki(Arc::new(ConfluenceClient::new(
                &confluence.url,
                &confluence.username,
                &confluence.password,
                &confluence.global_identifier,
                &confluence.name,
            )));
        }
        if let Some(forge) = &config.forge {
            org.set_forge(Arc::new(PhabricatorClient::new(
                &forge.url,
                &forge.user_phid,
                &forge.token,
            )));
        }
        if let Some(calendar) = &config.calendar {
            org.set_calendar(Arc::new(CalDavClient::new(
                &calendar.url,
                &calendar.username,
                &calendar.password,
            )));
        }
        if let Some(badgebox) = &config.badgebox {
            let client = match &badgebox.url {
                Some(url) => {
                    BadgeBoxClient::with_server(url, &badgebox.username, &badgebox.password)
                }
                None => BadgeBoxClient::new(&badgebox.username, &badgebox.password),
            };
            org.set_time_clock(Arc::new(client));
        }
        if let Some(smtp) = &config.smtp {
            org.set_mailer(Arc::new(SmtpMailer::new(smtp)?));
        }
        if let Some(ftp) = &config.ftp {
            org.set_file_transfer(Arc::new(FtpClient::new(
                &ftp.host,
                ftp.port,
                &ftp.username,
                &ftp.password,
            )));
        }
        Ok(org)
    }

    pub fn set_issue_tracker(&mut self, service: Arc<dyn IssueTrackerService>) {
        self.issue_tracker = Some(service);
    }

    pub fn set_wiki(&mut self, service: Arc<dyn WikiService>) {
        self.wiki = Some(service);
    }

    pub fn set_forge(&mut self, service: Arc<dyn ForgeService>) {
        self.forge = Some(service);
    }

    pub fn set_calendar(&mut self, service: Arc<dyn CalendarService>) {
        self.calendar = Some(service);
    }

    pub fn set_time_clock(&mut self, service: Arc<dyn TimeClockService>) {
        self.time_clock = Some(service);
    }

    pub fn set_mailer(&mut self, service: Arc<dyn MailerService>) {
        self.mailer = Some(service);
    }

    pub fn set_file_transfer(&mut self, service: Arc<dyn FileTransferService>) {
        self.file_transfer = Some(service);
    }

    pub fn issue_tracker(&self) -> AppResult<Arc<dyn IssueTrackerService>> {
        self.issue_tracker
            .clone()
            .ok_or_else(|| self.missing("issue tracker"))
    }

    pub fn wiki(&self) -> AppResult<Arc<dyn WikiService>> {
        self.wiki.clone().ok_or_else(|| self.missing("wiki"))
    }

    pub fn forge(&self) -> AppResult<Arc<dyn ForgeService>> {
        self.forge.clone().ok_or_else(|| self.missing("forge"))
    }

    pub fn calendar(&self) -> AppResult<Arc<dyn CalendarService>> {
        self.calendar.clone().ok_or_else(|| self.missing("calendar"))
    }

    pub fn time_clock(&self) -> AppResult<Arc<dyn TimeClockService>> {
        self.time_clock
            .clone()
            .ok_or_else(|| self.missing("time clock"))
    }

    pub fn mailer(&self) -> AppResult<Arc<dyn MailerService>> {
        self.mailer.clone().ok_or_else(|| self.missing("mail relay"))
    }

    pub fn file_transfer(&self) -> AppResult<Arc<dyn FileTransferService>> {
        self.file_transfer
            .clone()
            .ok_or_else(|| self.missing("file transfer"))
    }

    fn missing(&self, what: &str) -> AppError {
        AppError::Configuration(format!("{} {what} is not configured", self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn unconfigured_service_names_the_organization() {
        let org = Organization::new("acme");
        let err = org.calendar().err().unwrap();
        assert_eq!(
            err.to_string(),
            "configuration error: acme calendar is not configured"
        );
    }

    #[test]
    fn builds_only_configured_services() {
        let config = AppConfig::parse(
            r#"{
                "organizations": {
                    "acme": {
                        "jira": {"url": "https://jira.acme.test", "username": "u", "password": "p"}
                    }
                }
            }"#,
        )
        .unwrap();
        let org =
            Organization::from_config("acme", config.organization("acme").unwrap()).unwrap();
        assert!(org.issue_tracker().is_ok());
        assert!(org.wiki().is_err());
        assert!(org.forge().is_err());
    }
}
