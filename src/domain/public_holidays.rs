use chrono::{Days, NaiveDate};

/// Butcher's algorithm for the date of Easter (Western church). Valid for
/// any Gregorian year from 1583 onward.
pub fn easter(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = (19 * a + b - b / 4 - ((b - (b + 8) / 25 + 1) / 3) + 15) % 30;
    let e = (32 + 2 * (b % 4) + 2 * (c / 4) - d - (c % 4)) % 7;
    let f = d + e - 7 * ((a + 11 * d + 22 * e) / 451) + 114;
    let month = f / 31;
    let day = f % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
        .expect("Butcher's algorithm yields a valid March or April date")
}

const FIXED_HOLIDAYS: [(u32, u32); 10] = [
    (1, 1),
    (1, 6),
    (4, 25),
    (5, 1),
    (6, 2),
    (8, 15),
    (11, 1),
    (12, 8),
    (12, 25),
    (12, 26),
];

/// Whether the given date is an Italian public holiday (fixed dates plus
/// Easter and Easter Monday).
pub fn is_italian_public_holiday(date: NaiveDate) -> bool {
    use chrono::Datelike;

    if FIXED_HOLIDAYS.contains(&(date.month(), date.day())) {
        return true;
    }
    let easter = easter(date.year());
    date == easter || date == easter + Days::new(1)
}

/// Terni's saint patron day, St. Valentine (February 14).
pub fn is_terni_saint_patron(date: NaiveDate) -> bool {
    use chrono::Datelike;

    date.month() == 2 && date.day() == 14
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn easter_matches_reference_dates() {
        // Reference dates from the Astronomical Almanac.
        assert_eq!(easter(2000), date(2000, 4, 23));
        assert_eq!(easter(2008), date(2008, 3, 23));
        assert_eq!(easter(2011), date(2011, 4, 24));
        assert_eq!(easter(2016), date(2016, 3, 27));
        assert_eq!(easter(2020), date(2020, 4, 12));
        assert_eq!(easter(2024), date(2024, 3, 31));
        assert_eq!(easter(2026), date(2026, 4, 5));
        assert_eq!(easter(2038), date(2038, 4, 25));
        assert_eq!(easter(1818), date(1818, 3, 22));
    }

    #[test]
    fn fixed_holidays() {
        assert!(is_italian_public_holiday(date(2026, 1, 1)));
        assert!(is_italian_public_holiday(date(2026, 4, 25)));
        assert!(is_italian_public_holiday(date(2026, 12, 26)));
        assert!(!is_italian_public_holiday(date(2026, 8, 24)));
    }

    #[test]
    fn easter_monday_is_a_holiday() {
        assert!(is_italian_public_holiday(date(2026, 4, 5)));
        assert!(is_italian_public_holiday(date(2026, 4, 6)));
        assert!(!is_italian_public_holiday(date(2026, 4, 7)));
    }

    #[test]
    fn terni_saint_patron() {
        assert!(is_terni_saint_patron(date(2026, 2, 14)));
        assert!(!is_terni_saint_patron(date(2026, 2, 13)));
    }
}
