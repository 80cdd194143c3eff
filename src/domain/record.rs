use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{Days, NaiveDate, NaiveDateTime};

/// A single check-in/check-out pair. Either side can be missing and the
/// check-out may have been closed automatically by the time clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub check_in: Option<NaiveDateTime>,
    pub check_out: Option<NaiveDateTime>,
    pub auto_check_out: bool,
}

impl Record {
    pub fn new(
        check_in: Option<NaiveDateTime>,
        check_out: Option<NaiveDateTime>,
        auto_check_out: bool,
    ) -> Self {
        Self {
            check_in,
            check_out,
            auto_check_out,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.check_in.is_none() && self.check_out.is_none()
    }

    /// The day a record belongs to: its check-in day, or the check-out day
    /// for orphan check-outs.
    pub fn day(&self) -> Option<NaiveDate> {
        self.check_in
            .or(self.check_out)
            .map(|timestamp| timestamp.date())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.check_in {
            Some(check_in) => write!(f, "{}", check_in.format("%H:%M"))?,
            None => write!(f, "X")?,
        }
        write!(f, " -> ")?;
        match self.check_out {
            Some(check_out) => {
                write!(f, "{}", check_out.format("%H:%M"))?;
                if self.auto_check_out {
                    write!(f, " (auto)")?;
                }
            }
            None => write!(f, "--.--")?,
        }
        Ok(())
    }
}

impl Ord for Record {
    /// Records with a missing check-in sort first, then by check-in, then by
    /// the same rule on check-outs.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.check_in, other.check_in) {
            (Some(mine), Some(theirs)) => mine.cmp(&theirs),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => match (self.check_out, other.check_out) {
                (Some(mine), Some(theirs)) => mine.cmp(&theirs),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Time-clock records grouped by day over an inclusive date window. Every
/// day of the window is present, possibly with no records.
#[derive(Debug, Clone)]
pub struct Records {
    pub from: NaiveDate,
    pub to: NaiveDate,
    days: BTreeMap<NaiveDate, Vec<Record>>,
}

impl Records {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        let mut days = BTreeMap::new();
        let mut day = from;
        while day <= to {
            days.insert(day, Vec::new());
            day = day + Days::new(1);
        }
        Self { from, to, days }
    }

    /// Add a record to its day. Empty records, records outside the window
    /// and exact duplicates are ignored; the day stays sorted.
    pub fn add(&mut self, record: Record) {
        let Some(day) = record.day() else {
            return;
        };
        let Some(entries) = self.days.get_mut(&day) else {
            return;
        };
        if entries.contains(&record) {
            return;
        }
        entries.push(record);
        entries.sort();
    }

    pub fn contains(&self, record: &Record) -> bool {
        record
            .day()
            .and_then(|day| self.days.get(&day))
            .is_some_and(|entries| entries.contains(record))
    }

    /// Number of days in the window (a day may hold several records).
    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    pub fn record_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn days(&self) -> impl Iterator<Item = (&NaiveDate, &[Record])> {
        self.days.iter().map(|(day, entries)| (day, entries.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timestamp(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, day).unwrap()
    }

    #[test]
    fn window_has_every_day() {
        let records = Records::new(date(1), date(31));
        assert_eq!(records.day_count(), 31);
        assert_eq!(records.record_count(), 0);
    }

    #[test]
    fn groups_records_by_day() {
        let mut records = Records::new(date(1), date(31));
        records.add(Record::new(
            Some(timestamp(3, 9, 0)),
            Some(timestamp(3, 13, 0)),
            false,
        ));
        records.add(Record::new(
            Some(timestamp(3, 14, 0)),
            Some(timestamp(3, 18, 0)),
            false,
        ));
        records.add(Record::new(Some(timestamp(4, 9, 5)), None, false));
        assert_eq!(records.record_count(), 3);
        let day: Vec<_> = records
            .days()
            .find(|(day, _)| **day == date(3))
            .map(|(_, entries)| entries.to_vec())
            .unwrap();
        assert_eq!(day.len(), 2);
        assert!(day[0].check_in.unwrap() < day[1].check_in.unwrap());
    }

    #[test]
    fn never_duplicates_on_overlapping_ranges() {
        // Same record fed twice, as happens when two report windows overlap.
        let record = Record::new(Some(timestamp(10, 8, 30)), Some(timestamp(10, 17, 0)), true);
        let mut records = Records::new(date(1), date(31));
        records.add(record.clone());
        records.add(record.clone());
        assert_eq!(records.record_count(), 1);
        assert!(records.contains(&record));
    }

    #[test]
    fn ignores_empty_and_out_of_window_records() {
        let mut records = Records::new(date(10), date(20));
        records.add(Record::new(None, None, false));
        records.add(Record::new(Some(timestamp(9, 9, 0)), None, false));
        records.add(Record::new(Some(timestamp(21, 9, 0)), None, false));
        assert_eq!(records.record_count(), 0);
    }

    #[test]
    fn orphan_check_out_lands_on_its_own_day() {
        let mut records = Records::new(date(1), date(31));
        let orphan = Record::new(None, Some(timestamp(5, 17, 30)), false);
        records.add(orphan.clone());
        assert!(records.contains(&orphan));
    }

    #[test]
    fn sorts_missing_check_in_first() {
        let mut records = Records::new(date(1), date(31));
        records.add(Record::new(
            Some(timestamp(5, 9, 0)),
            Some(timestamp(5, 12, 0)),
            false,
        ));
        records.add(Record::new(None, Some(timestamp(5, 8, 0)), false));
        let day: Vec<_> = records
            .days()
            .find(|(day, _)| **day == date(5))
            .map(|(_, entries)| entries.to_vec())
            .unwrap();
        assert!(day[0].check_in.is_none());
        assert!(day[1].check_in.is_some());
    }

    #[test]
    fn formats_auto_check_out() {
        let record = Record::new(Some(timestamp(3, 9, 0)), Some(timestamp(3, 18, 0)), true);
        assert_eq!(record.to_string(), "09:00 -> 18:00 (auto)");
        let open = Record::new(Some(timestamp(3, 9, 0)), None, false);
        assert_eq!(open.to_string(), "09:00 -> --.--");
    }
}
