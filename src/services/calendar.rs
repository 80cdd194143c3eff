use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::AppResult;

/// A calendar event with a display alarm. Times are wall-clock times in the
/// calendar's fixed timezone; the alarm trigger is an ISO 8601 duration
/// relative to the event start (e.g. `-PT1H`).
#[derive(Debug, Clone)]
pub struct EventRequest {
    pub summary: String,
    pub location: String,
    pub beginning: NaiveDateTime,
    pub ending: NaiveDateTime,
    pub alarm_trigger: String,
}

#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn add_event(&self, event: &EventRequest) -> AppResult<()>;
}

/// Escape event text for the iCalendar grammar.
pub fn filter_text(text: &str) -> String {
    text.replace(',', "\\,")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_commas() {
        assert_eq!(filter_text("Rome, Italy"), "Rome\\, Italy");
        assert_eq!(filter_text("plain"), "plain");
    }
}
