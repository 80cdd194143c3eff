use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::info;

use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::render::markup::attachment_link;
use crate::render::markup::prepend_row_after_tbody;
use crate::render::office::convert_to_pdf;
use crate::render::pdf::set_metadata;
use crate::render::template::render_file;

const EMPTY_FIELD: &str = "..................";
const CHECKED: &str = "☑";
const UNCHECKED: &str = "☐";

/// What is being requested: a permit for part of a day, one full day off or
/// a multi-day leave.
#[derive(Debug, Clone)]
pub enum HolidayKind {
    Permit {
        day: NaiveDate,
        beginning: NaiveTime,
        ending: NaiveTime,
    },
    SingleDay {
        day: NaiveDate,
    },
    MultiDay {
        beginning: NaiveDate,
        ending: NaiveDate,
    },
}

#[derive(Debug, Clone)]
pub struct HolidayRequest {
    pub kind: HolidayKind,
    pub description: String,
    /// Date written on the request form.
    pub date: NaiveDate,
}

/// The description ends up between parentheses: lower-case the first letter
/// and drop a trailing full stop.
pub fn normalize_description(description: &str) -> String {
    let mut description = description.trim().to_string();
    if description.ends_with('.') {
        description.pop();
    }
    let mut chars = description.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => description,
    }
}

pub fn file_stem(request: &HolidayRequest, pdf_prefix: &str, now: NaiveDateTime) -> String {
    let form = match request.kind {
        HolidayKind::Permit { .. } => "permit_request",
        _ => "holiday_request",
    };
    format!(
        "{pdf_prefix}_{form}_{}_{}",
        request.date.format("%Y-%m-%d"),
        now.format("%H-%M-%S")
    )
}

fn day_label(day: NaiveDate) -> String {
    day.format("%A %d/%m/%Y").to_string().to_lowercase()
}

/// Placeholder values for the request form template. Fields that do not
/// apply to the chosen request kind are filled with a dotted line.
pub fn template_values(request: &HolidayRequest) -> BTreeMap<String, String> {
    let mut values: BTreeMap<String, String> = [
        "p_day",
        "p_beginning",
        "p_ending",
        "d_day",
        "md_beginning",
        "md_ending",
    ]
    .into_iter()
    .map(|key| (key.to_string(), EMPTY_FIELD.to_string()))
    .collect();
    for key in ["p_chosen", "d_chosen", "md_chosen"] {
        values.insert(key.to_string(), UNCHECKED.to_string());
    }
    values.insert("date".to_string(), day_label(request.date));
    match &request.kind {
        HolidayKind::Permit {
            day,
            beginning,
            ending,
        } => {
            values.insert("p_chosen".to_string(), CHECKED.to_string());
            values.insert("p_day".to_string(), day_label(*day));
            values.insert("p_beginning".to_string(), beginning.format("%H:%M").to_string());
            values.insert("p_ending".to_string(), ending.format("%H:%M").to_string());
        }
        HolidayKind::SingleDay { day } => {
            values.insert("d_chosen".to_string(), CHECKED.to_string());
            values.insert("d_day".to_string(), day_label(*day));
        }
        HolidayKind::MultiDay { beginning, ending } => {
            values.insert("md_chosen".to_string(), CHECKED.to_string());
            values.insert("md_beginning".to_string(), day_label(*beginning));
            values.insert("md_ending".to_string(), day_label(*ending));
        }
    }
    values
}

/// One-line summary of the request for the wiki archive table.
pub fn wiki_description(request: &HolidayRequest) -> String {
    let description = normalize_description(&request.description);
    match &request.kind {
        HolidayKind::Permit {
            day,
            beginning,
            ending,
        } => format!(
            "Permit request for {}, {}-{} ({description})",
            day_label(*day),
            beginning.format("%H:%M"),
            ending.format("%H:%M")
        ),
        HolidayKind::SingleDay { day } => {
            format!("Holiday request for {} ({description})", day_label(*day))
        }
        HolidayKind::MultiDay { beginning, ending } => format!(
            "Holiday request from {} to {} ({description})",
            day_label(*beginning),
            day_label(*ending)
        ),
    }
}

/// Generate a signed request form from the office template, convert it to
/// PDF and archive it on the holidays wiki page. Returns the PDF path.
pub async fn create_request(
    ctx: &AppContext,
    helper_name: Option<&str>,
    request: HolidayRequest,
    now: NaiveDateTime,
) -> AppResult<PathBuf> {
    let helper = ctx.helper("holidays", helper_name)?;
    let org = ctx.organization_for(helper)?;
    let wiki = org.wiki()?;

    let home = env::var("HOME")
        .map(PathBuf::from)
        .map_err(|_| AppError::Configuration("cannot determine the home directory".to_string()))?;
    let stem = file_stem(&request, helper.param("pdf_prefix")?, now);
    let form = home.join(format!("{stem}.odt"));
    render_file(
        &helper.path_param("odt_template")?,
        &form,
        &template_values(&request),
    )?;
    let pdf = convert_to_pdf(&form, &home).await?;
    set_metadata(
        &pdf,
        "Permit/holiday request",
        helper.param("employee")?,
        "deskhand",
        "deskhand",
    )?;

    let space = helper.param("confluence_space")?;
    let title = helper.param("holidays_page")?;
    let page_id = wiki
        .page_id(space, title)
        .await?
        .ok_or_else(|| AppError::Wiki(format!("page not found: {space} / {title}")))?;
    let row = format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
        request.date.format("%Y-%m-%d"),
        wiki_description(&request),
        attachment_link(&format!("{stem}.pdf"), "Download")
    );
    let body = prepend_row_after_tbody(&wiki.page_body(&page_id).await?, &row)?;
    wiki.update_page(&page_id, title, &body).await?;
    wiki.attach_file(&pdf, "application/pdf", &page_id).await?;
    info!(form = %pdf.display(), "holiday request archived");
    Ok(pdf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, day).unwrap()
    }

    fn permit() -> HolidayRequest {
        HolidayRequest {
            kind: HolidayKind::Permit {
                day: date(7),
                beginning: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                ending: NaiveTime::from_hms_opt(11, 30, 0).unwrap(),
            },
            description: "Dentist appointment.".to_string(),
            date: date(4),
        }
    }

    #[test]
    fn descriptions_are_normalized_for_parentheses() {
        assert_eq!(normalize_description("Dentist appointment."), "dentist appointment");
        assert_eq!(normalize_description("already fine"), "already fine");
        assert_eq!(normalize_description(""), "");
    }

    #[test]
    fn file_stem_carries_the_request_date_and_time() {
        let now = date(4).and_hms_opt(18, 32, 5).unwrap();
        assert_eq!(
            file_stem(&permit(), "acme", now),
            "acme_permit_request_2026-09-04_18-32-05"
        );
        let full_day = HolidayRequest {
            kind: HolidayKind::SingleDay { day: date(7) },
            ..permit()
        };
        assert_eq!(
            file_stem(&full_day, "acme", now),
            "acme_holiday_request_2026-09-04_18-32-05"
        );
    }

    #[test]
    fn permit_values_fill_only_the_permit_fields() {
        let values = template_values(&permit());
        assert_eq!(values["p_chosen"], CHECKED);
        assert_eq!(values["d_chosen"], UNCHECKED);
        assert_eq!(values["md_chosen"], UNCHECKED);
        assert_eq!(values["p_day"], "monday 07/09/2026");
        assert_eq!(values["p_beginning"], "09:00");
        assert_eq!(values["p_ending"], "11:30");
        assert_eq!(values["d_day"], EMPTY_FIELD);
        assert_eq!(values["md_beginning"], EMPTY_FIELD);
    }

    #[test]
    fn multi_day_values_fill_the_range_fields() {
        let request = HolidayRequest {
            kind: HolidayKind::MultiDay {
                beginning: date(7),
                ending: date(11),
            },
            ..permit()
        };
        let values = template_values(&request);
        assert_eq!(values["md_chosen"], CHECKED);
        assert_eq!(values["md_beginning"], "monday 07/09/2026");
        assert_eq!(values["md_ending"], "friday 11/09/2026");
        assert_eq!(values["p_day"], EMPTY_FIELD);
    }

    #[test]
    fn wiki_description_per_request_kind() {
        assert_eq!(
            wiki_description(&permit()),
            "Permit request for monday 07/09/2026, 09:00-11:30 (dentist appointment)"
        );
        let range = HolidayRequest {
            kind: HolidayKind::MultiDay {
                beginning: date(7),
                ending: date(11),
            },
            ..permit()
        };
        assert_eq!(
            wiki_description(&range),
            "Holiday request from monday 07/09/2026 to friday 11/09/2026 (dentist appointment)"
        );
    }
}
