use chrono::{Datelike, Days, Months, NaiveDate};

use crate::context::AppContext;
use crate::domain::record::Records;
use crate::error::{AppError, AppResult};

/// First and last day of the month the given date falls in.
pub fn month_bounds(date: NaiveDate) -> AppResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .ok_or_else(|| AppError::Configuration(format!("invalid date {date}")))?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.checked_sub_days(Days::new(1)))
        .ok_or_else(|| AppError::Configuration(format!("invalid date {date}")))?;
    Ok((first, last))
}

/// Download the clock-in/out records for the month the given date falls in,
/// including the still-open clocking of the current day.
pub async fn month_records(
    ctx: &AppContext,
    helper_name: Option<&str>,
    date: NaiveDate,
) -> AppResult<Records> {
    let helper = ctx.helper("clockings", helper_name)?;
    let org = ctx.organization_for(helper)?;
    let (from, to) = month_bounds(date)?;
    org.time_clock()?.records(from, to, true).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_handle_month_lengths() {
        let (from, to) = month_bounds(NaiveDate::from_ymd_opt(2026, 8, 24).unwrap()).unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2026, 8, 31).unwrap());

        let (_, to) = month_bounds(NaiveDate::from_ymd_opt(2028, 2, 3).unwrap()).unwrap();
        assert_eq!(to, NaiveDate::from_ymd_opt(2028, 2, 29).unwrap());

        let (_, to) = month_bounds(NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()).unwrap();
        assert_eq!(to, NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
    }
}
