use chrono::NaiveDateTime;

/// A single time-tracking entry tied to an issue-tracker ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct Worklog {
    pub ticket: String,
    /// Ticket summary, filled in when the entry comes back from a search.
    pub summary: String,
    pub author: String,
    pub description: String,
    pub started: NaiveDateTime,
    /// Duration in hours.
    pub duration: f64,
    /// Back-reference URL of the remote worklog, used only for deletion.
    pub self_url: Option<String>,
}

impl Worklog {
    pub fn new(
        ticket: impl Into<String>,
        author: impl Into<String>,
        description: impl Into<String>,
        started: NaiveDateTime,
        duration: f64,
    ) -> Self {
        Self {
            ticket: ticket.into(),
            summary: String::new(),
            author: author.into(),
            description: description.into(),
            started,
            duration,
            self_url: None,
        }
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.duration * 3600.0).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn converts_hours_to_seconds() {
        let started = NaiveDate::from_ymd_opt(2026, 8, 24)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let worklog = Worklog::new("TCK-1", "me", "TCK-1: work", started, 1.5);
        assert_eq!(worklog.duration_seconds(), 5400);
    }
}
