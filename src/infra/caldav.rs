use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::{CalendarService, EventRequest};

const VCALENDAR_DATE_FORMAT: &str = "%Y%m%dT%H%M%S";

/// CalDAV calendar collection; events are PUT as single-event VCALENDAR
/// resources.
pub struct CalDavClient {
    http: Client,
    collection_url: String,
    username: String,
    password: String,
}

impl CalDavClient {
    pub fn new(collection_url: &str, username: &str, password: &str) -> Self {
        Self {
            http: Client::new(),
            collection_url: collection_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// Render the event as a VCALENDAR block. The timezone definition is fixed
/// to Europe/Rome and must be reproduced verbatim for the server to accept
/// the local times.
pub fn render_event(event: &EventRequest, uid: &str) -> String {
    let beginning = event.beginning.format(VCALENDAR_DATE_FORMAT);
    let ending = event.ending.format(VCALENDAR_DATE_FORMAT);
    format!(
        "BEGIN:VCALENDAR\n\
         VERSION:2.0\n\
         PRODID:-//PBSE//Deskhand//EN\n\
         BEGIN:VTIMEZONE\n\
         TZID:Europe/Rome\n\
         BEGIN:DAYLIGHT\n\
         TZOFFSETFROM:+0100\n\
         TZOFFSETTO:+0200\n\
         TZNAME:CEST\n\
         DTSTART:19700329T020000\n\
         RRULE:FREQ=YEARLY;BYDAY=-1SU;BYMONTH=3\n\
         END:DAYLIGHT\n\
         BEGIN:STANDARD\n\
         TZOFFSETFROM:+0200\n\
         TZOFFSETTO:+0100\n\
         TZNAME:CET\n\
         DTSTART:19701025T030000\n\
         RRULE:FREQ=YEARLY;BYDAY=-1SU;BYMONTH=10\n\
         END:STANDARD\n\
         END:VTIMEZONE\n\
         BEGIN:VEVENT\n\
         LOCATION:{location}\n\
         SUMMARY:{summary}\n\
         DTSTART;TZID=Europe/Rome:{beginning}\n\
         DTEND;TZID=Europe/Rome:{ending}\n\
         UID:{uid}\n\
         TRANSP:OPAQUE\n\
         BEGIN:VALARM\n\
         ACTION:DISPLAY\n\
         TRIGGER;RELATED=START:{trigger}\n\
         DESCRIPTION:{summary}\n\
         END:VALARM\n\
         END:VEVENT\n\
         END:VCALENDAR",
        location = event.location,
        summary = event.summary,
        trigger = event.alarm_trigger,
    )
}

#[async_trait]
impl CalendarService for CalDavClient {
    async fn add_event(&self, event: &EventRequest) -> AppResult<()> {
        let uid = Uuid::new_v4().to_string();
        let body = render_event(event, &uid);
        let url = format!("{}/{uid}.ics", self.collection_url);
        debug!(%url, summary = %event.summary, "caldav: put event");
        let response = self
            .http
            .put(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "text/calendar; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|err| AppError::Calendar(format!("put event: {err}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::Calendar(format!(
                "calendar responded with {status}: {body}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn event() -> EventRequest {
        EventRequest {
            summary: "TCK-7: Crypto-Gram\\, August 2026".to_string(),
            location: "Terni".to_string(),
            beginning: NaiveDate::from_ymd_opt(2026, 8, 15)
                .unwrap()
                .and_hms_opt(15, 0, 0)
                .unwrap(),
            ending: NaiveDate::from_ymd_opt(2026, 8, 15)
                .unwrap()
                .and_hms_opt(16, 0, 0)
                .unwrap(),
            alarm_trigger: "-PT1H".to_string(),
        }
    }

    #[test]
    fn renders_the_fixed_timezone_block() {
        let rendered = render_event(&event(), "abc-123");
        assert!(rendered.contains("TZID:Europe/Rome"));
        assert!(rendered.contains("RRULE:FREQ=YEARLY;BYDAY=-1SU;BYMONTH=3"));
        assert!(rendered.contains("DTSTART;TZID=Europe/Rome:20260815T150000"));
        assert!(rendered.contains("DTEND;TZID=Europe/Rome:20260815T160000"));
        assert!(rendered.contains("UID:abc-123"));
        assert!(rendered.contains("TRIGGER;RELATED=START:-PT1H"));
        // The alarm repeats the summary as its description.
        assert_eq!(
            rendered.matches("TCK-7: Crypto-Gram\\, August 2026").count(),
            2
        );
    }

    #[tokio::test]
    async fn puts_the_event_into_the_collection() {
        let mut server = mockito::Server::new_async().await;
        let put = server
            .mock("PUT", mockito::Matcher::Regex(r"^/calendars/home/.+\.ics$".into()))
            .match_header("content-type", "text/calendar; charset=utf-8")
            .match_body(mockito::Matcher::Regex("BEGIN:VCALENDAR".into()))
            .with_status(201)
            .create_async()
            .await;

        let client = CalDavClient::new(
            &format!("{}/calendars/home/", server.url()),
            "me",
            "secret",
        );
        client.add_event(&event()).await.unwrap();
        put.assert_async().await;
    }
}
