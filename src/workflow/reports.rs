use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Days, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::{debug, info};

use crate::config::HelperConfig;
use crate::context::AppContext;
use crate::domain::worklog::Worklog;
use crate::error::{AppError, AppResult};
use crate::render::spreadsheet::{read_cell_string, read_log_rows};
use crate::services::mailer::EmailMessage;
use crate::workflow::timetracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Forecast,
    Final,
    Monthly,
}

/// Where the report spreadsheets live: a per-month (or per-year) directory
/// tree per kind, plus the blank templates used when no previous report
/// exists.
#[derive(Debug, Clone)]
pub struct ReportLayout {
    pub forecast_template: PathBuf,
    pub forecast_report_dir: PathBuf,
    pub final_template: PathBuf,
    pub final_report_dir: PathBuf,
    pub monthly_template: PathBuf,
    pub monthly_report_dir: PathBuf,
    pub suffix_forecast: String,
    pub suffix_final: String,
    pub prefix_monthly: String,
    pub suffix_monthly: String,
    pub max_days_back: u32,
}

impl ReportLayout {
    pub fn from_helper(helper: &HelperConfig) -> AppResult<Self> {
        Ok(Self {
            forecast_template: helper.path_param("forecast_template")?,
            forecast_report_dir: helper.path_param("forecast_report_dir")?,
            final_template: helper.path_param("final_template")?,
            final_report_dir: helper.path_param("final_report_dir")?,
            monthly_template: helper.path_param("monthly_template")?,
            monthly_report_dir: helper.path_param("monthly_report_dir")?,
            suffix_forecast: helper.param("suffix_forecast")?.to_string(),
            suffix_final: helper.param("suffix_final")?.to_string(),
            prefix_monthly: helper.param("prefix_monthly")?.to_string(),
            suffix_monthly: helper.param("suffix_monthly")?.to_string(),
            max_days_back: helper.int_param("max_days_back")?,
        })
    }

    fn candidate(&self, kind: ReportKind, day: NaiveDate) -> PathBuf {
        match kind {
            ReportKind::Forecast => self
                .forecast_report_dir
                .join(day.format("%Y-%m").to_string())
                .join(format!("{}{}", day.format("%d%m%Y"), self.suffix_forecast)),
            ReportKind::Final => self
                .final_report_dir
                .join(day.format("%Y-%m").to_string())
                .join(format!("{}{}", day.format("%d%m%Y"), self.suffix_final)),
            ReportKind::Monthly => self
                .monthly_report_dir
                .join(day.format("%Y").to_string())
                .join(format!(
                    "{}{}_{}{}",
                    self.prefix_monthly,
                    day.format("%B"),
                    day.format("%Y"),
                    self.suffix_monthly
                )),
        }
    }

    fn template(&self, kind: ReportKind) -> &Path {
        match kind {
            ReportKind::Forecast => &self.forecast_template,
            ReportKind::Final => &self.final_template,
            ReportKind::Monthly => &self.monthly_template,
        }
    }
}

/// Find today's report file, creating it from the most recent previous
/// report when it does not exist yet.
///
/// The search walks back one day at a time within the lookback window. A
/// forecast starts from the previous day's final report rather than the
/// previous forecast; a final report starts from the same day's forecast
/// when there is one. When nothing is found the blank template is used.
/// Whatever source is picked gets copied into today's slot.
pub fn locate_report(
    layout: &ReportLayout,
    kind: ReportKind,
    today: NaiveDate,
) -> AppResult<PathBuf> {
    let target = layout.candidate(kind, today);
    let mut kind = kind;
    let mut day = today;
    let mut found = None;
    for days_back in 0..layout.max_days_back {
        if days_back == 1 && kind == ReportKind::Forecast {
            kind = ReportKind::Final;
        }
        let candidate = layout.candidate(kind, day);
        debug!(candidate = %candidate.display(), "report lookup");
        if candidate.exists() {
            found = Some(candidate);
            break;
        }
        if days_back == 0 && kind == ReportKind::Final {
            let forecast = layout.candidate(ReportKind::Forecast, day);
            if forecast.exists() {
                found = Some(forecast);
                break;
            }
        }
        day = day
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| AppError::Configuration(format!("invalid date {day}")))?;
    }
    let source = match found {
        Some(path) => path,
        None => {
            let template = layout.template(kind);
            if !template.exists() {
                return Err(AppError::Template(format!(
                    "report template {} not found",
                    template.display()
                )));
            }
            template.to_path_buf()
        }
    };
    if source != target {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&source, &target)?;
        info!(from = %source.display(), to = %target.display(), "report file created");
    }
    Ok(target)
}

/// Cell coordinates of the fixed report layout.
#[derive(Debug, Clone, Copy)]
pub struct LogCells {
    pub first_log_row: u32,
    pub first_log_column: u32,
    pub sending_time_row: u32,
    pub sending_time_column: u32,
}

impl LogCells {
    pub fn from_helper(helper: &HelperConfig) -> AppResult<Self> {
        Ok(Self {
            first_log_row: helper.int_param("first_log_row")?,
            first_log_column: helper.int_param("first_log_col")?,
            sending_time_row: helper.int_param("sending_time_row")?,
            sending_time_column: helper.int_param("sending_time_col")?,
        })
    }
}

/// The sending time cell holds a bare `H.M` clock time.
pub fn parse_sending_time(raw: &str, day: NaiveDate) -> AppResult<NaiveDateTime> {
    let time = NaiveTime::parse_from_str(raw.trim(), "%H.%M")
        .map_err(|err| AppError::Spreadsheet(format!("cannot parse sending time '{raw}': {err}")))?;
    Ok(day.and_time(time))
}

pub fn sending_time(
    layout: &ReportLayout,
    cells: LogCells,
    day: NaiveDate,
) -> AppResult<NaiveDateTime> {
    let file = locate_report(layout, ReportKind::Forecast, day)?;
    let raw = read_cell_string(&file, cells.sending_time_row, cells.sending_time_column)?;
    parse_sending_time(&raw, day)
}

/// Turn the report's description/duration rows into worklogs. Entries run
/// back to back from the sending time; one hour is skipped for lunch the
/// first time an entry would start at 13:00 or later. The ticket key is the
/// description up to the first colon, with the configured corrections
/// applied.
pub fn worklogs_from_rows(
    rows: &[(String, f64)],
    sending_time: NaiveDateTime,
    user: &str,
    replacements: &BTreeMap<String, String>,
) -> Vec<Worklog> {
    let mut start = sending_time;
    let mut lunch_break = false;
    let mut worklogs = Vec::with_capacity(rows.len());
    for (description, duration) in rows {
        let mut ticket = description
            .split(':')
            .next()
            .unwrap_or(description)
            .to_string();
        let mut description = description.clone();
        for (wrong, correct) in replacements {
            ticket = ticket.replace(wrong, correct);
            description = description.replace(wrong, correct);
        }
        worklogs.push(Worklog::new(ticket, user, description, start, *duration));
        start += Duration::seconds((duration * 3600.0).round() as i64);
        if start.hour() >= 13 && !lunch_break {
            start += Duration::hours(1);
            lunch_break = true;
        }
    }
    worklogs
}

pub fn compose_mail(kind: ReportKind, day: NaiveDate, signature: &str) -> (String, String) {
    match kind {
        ReportKind::Forecast => (
            format!("Forecast {}", day.format("%d/%m/%Y")),
            format!("<p>Please find attached today's forecast report.</p><p>{signature}</p>"),
        ),
        ReportKind::Final => (
            format!("Final report {}", day.format("%d/%m/%Y")),
            format!("<p>Please find attached today's final report.</p><p>{signature}</p>"),
        ),
        ReportKind::Monthly => {
            let month = day.format("%B %Y");
            (
                format!("Attendance {month}"),
                format!(
                    "<p>Please find attached the attendance report for {month}.</p><p>{signature}</p>"
                ),
            )
        }
    }
}

/// Find (and if needed create) the report file for the given day.
pub fn locate(ctx: &AppContext, helper_name: Option<&str>, kind: ReportKind, day: NaiveDate) -> AppResult<PathBuf> {
    let helper = ctx.helper("reports", helper_name)?;
    locate_report(&ReportLayout::from_helper(helper)?, kind, day)
}

/// Mail the report for the given day to the configured recipients, with the
/// spreadsheet attached and the signature images inlined.
pub async fn send(
    ctx: &AppContext,
    helper_name: Option<&str>,
    kind: ReportKind,
    day: NaiveDate,
) -> AppResult<PathBuf> {
    let helper = ctx.helper("reports", helper_name)?;
    let org = ctx.organization_for(helper)?;
    let file = locate_report(&ReportLayout::from_helper(helper)?, kind, day)?;

    let (to, cc) = match kind {
        ReportKind::Monthly => (
            helper.list_param("rcpt_to_monthly")?,
            helper.list_param("rcpt_cc_monthly")?,
        ),
        _ => (
            helper.list_param("rcpt_to_daily")?,
            helper.list_param("rcpt_cc_daily")?,
        ),
    };
    let images_dir = helper.path_param("images_dir")?;
    let inline_images = helper
        .list_param("images")?
        .into_iter()
        .map(|name| images_dir.join(format!("{name}.jpg")))
        .collect();
    let (subject, body_html) = compose_mail(kind, day, helper.param("signature")?);
    org.mailer()?
        .send(&EmailMessage {
            to,
            cc,
            from: Some(helper.param("from_address")?.to_string()),
            subject,
            body_html,
            attachments: vec![file.clone()],
            inline_images,
        })
        .await?;
    info!(file = %file.display(), "report mailed");
    Ok(file)
}

/// Replace the day's tracker worklogs with the entries of the final report:
/// existing worklogs of the configured user are deleted, then the report
/// rows are added back to back from the forecast's sending time.
pub async fn upload_worklogs(
    ctx: &AppContext,
    helper_name: Option<&str>,
    day: NaiveDate,
) -> AppResult<usize> {
    let helper = ctx.helper("reports", helper_name)?;
    let org = ctx.organization_for(helper)?;
    let layout = ReportLayout::from_helper(helper)?;
    let cells = LogCells::from_helper(helper)?;

    let sending = sending_time(&layout, cells, day)?;
    let file = locate_report(&layout, ReportKind::Final, day)?;
    let rows = read_log_rows(
        &file,
        cells.first_log_row,
        cells.first_log_column,
        cells.first_log_column + 3,
    )?;
    let worklogs = worklogs_from_rows(
        &rows,
        sending,
        helper.param("worklog_jira_user")?,
        &helper.map_param("ticket_replace")?,
    );

    let tracker = org.issue_tracker()?;
    let jira_user = helper.param("jira_user")?.to_string();
    let existing = timetracker::worklogs_by_user(&org, day, std::slice::from_ref(&jira_user)).await?;
    for worklog in existing.get(&jira_user).map(Vec::as_slice).unwrap_or_default() {
        tracker.delete_worklog(worklog).await?;
    }
    for worklog in &worklogs {
        tracker.add_worklog(worklog).await?;
    }
    info!(added = worklogs.len(), %day, "worklogs replaced");
    Ok(worklogs.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(root: &Path) -> ReportLayout {
        ReportLayout {
            forecast_template: root.join("templates/forecast.xls"),
            forecast_report_dir: root.join("forecast"),
            final_template: root.join("templates/final.xls"),
            final_report_dir: root.join("final"),
            monthly_template: root.join("templates/monthly.xls"),
            monthly_report_dir: root.join("monthly"),
            suffix_forecast: "_forecast.xls".to_string(),
            suffix_final: "_final.xls".to_string(),
            prefix_monthly: "attendance_".to_string(),
            suffix_monthly: ".xls".to_string(),
            max_days_back: 15,
        }
    }

    fn seed(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 24).unwrap()
    }

    #[test]
    fn todays_file_is_used_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        let existing = dir.path().join("forecast/2026-08/24082026_forecast.xls");
        seed(&existing, "today");

        let found = locate_report(&layout, ReportKind::Forecast, today()).unwrap();
        assert_eq!(found, existing);
        assert_eq!(fs::read_to_string(found).unwrap(), "today");
    }

    #[test]
    fn forecast_starts_from_the_previous_final() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        seed(
            &dir.path().join("forecast/2026-08/23082026_forecast.xls"),
            "old forecast",
        );
        seed(
            &dir.path().join("final/2026-08/23082026_final.xls"),
            "yesterday final",
        );

        let found = locate_report(&layout, ReportKind::Forecast, today()).unwrap();
        assert_eq!(found, dir.path().join("forecast/2026-08/24082026_forecast.xls"));
        assert_eq!(fs::read_to_string(found).unwrap(), "yesterday final");
    }

    #[test]
    fn final_report_starts_from_the_same_day_forecast() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        seed(
            &dir.path().join("forecast/2026-08/24082026_forecast.xls"),
            "today forecast",
        );

        let found = locate_report(&layout, ReportKind::Final, today()).unwrap();
        assert_eq!(found, dir.path().join("final/2026-08/24082026_final.xls"));
        assert_eq!(fs::read_to_string(found).unwrap(), "today forecast");
    }

    #[test]
    fn template_is_the_last_resort() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        seed(&layout.final_template, "blank");

        let found = locate_report(&layout, ReportKind::Forecast, today()).unwrap();
        assert_eq!(found, dir.path().join("forecast/2026-08/24082026_forecast.xls"));
        assert_eq!(fs::read_to_string(found).unwrap(), "blank");
    }

    #[test]
    fn missing_template_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        let err = locate_report(&layout, ReportKind::Monthly, today()).unwrap_err();
        assert!(err.to_string().contains("monthly.xls"));
    }

    #[test]
    fn sending_time_accepts_single_digit_hours() {
        let parsed = parse_sending_time("9.30", today()).unwrap();
        assert_eq!(parsed, today().and_hms_opt(9, 30, 0).unwrap());
        assert!(parse_sending_time("soon", today()).is_err());
    }

    #[test]
    fn worklogs_run_back_to_back_with_a_lunch_break() {
        let rows = vec![
            ("TCK-1: morning work".to_string(), 3.0),
            ("TCK-2: more work".to_string(), 2.0),
            ("TCK-3: afternoon work".to_string(), 1.5),
        ];
        let sending = today().and_hms_opt(9, 0, 0).unwrap();
        let worklogs = worklogs_from_rows(&rows, sending, "me", &BTreeMap::new());

        assert_eq!(worklogs[0].started, today().and_hms_opt(9, 0, 0).unwrap());
        assert_eq!(worklogs[1].started, today().and_hms_opt(12, 0, 0).unwrap());
        // 14:00 end crosses into the afternoon, so lunch pushes the next
        // entry to 15:00; the break is only taken once.
        assert_eq!(worklogs[2].started, today().and_hms_opt(15, 0, 0).unwrap());
        assert_eq!(worklogs[0].ticket, "TCK-1");
        assert_eq!(worklogs[0].author, "me");
    }

    #[test]
    fn ticket_corrections_apply_to_key_and_description() {
        let rows = vec![("OLD-9: port the gadget".to_string(), 1.0)];
        let replacements =
            BTreeMap::from([("OLD".to_string(), "NEW".to_string())]);
        let sending = today().and_hms_opt(9, 0, 0).unwrap();
        let worklogs = worklogs_from_rows(&rows, sending, "me", &replacements);
        assert_eq!(worklogs[0].ticket, "NEW-9");
        assert_eq!(worklogs[0].description, "NEW-9: port the gadget");
    }

    #[test]
    fn mail_subjects_follow_the_report_kind() {
        let (subject, body) = compose_mail(ReportKind::Forecast, today(), "Me");
        assert_eq!(subject, "Forecast 24/08/2026");
        assert!(body.contains("forecast report"));
        let (subject, _) = compose_mail(ReportKind::Monthly, today(), "Me");
        assert_eq!(subject, "Attendance August 2026");
    }
}
