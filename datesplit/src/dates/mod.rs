//! Date detection and date-part extraction.
//!
//! - [`parser`] - permissive date/time string parser
//! - [`is_date_like`] - classify a sample value
//! - [`time_of_day`] - coarse English label for a clock time
//! - [`DateParts`] - year, month name, day and time-of-day of one value

pub mod parser;

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;

pub use parser::DateParser;

/// English month names, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Suffixes of the four columns a date column expands into, in output order.
pub const PART_SUFFIXES: [&str; 4] = ["Year", "Month", "Day", "Time Of Day"];

/// Full English name of a 1-based month number.
pub fn month_name(month: u32) -> Option<&'static str> {
    let index = month.checked_sub(1)?;
    MONTH_NAMES.get(index as usize).copied()
}

/// Coarse label for a clock time.
///
/// Midnight exactly (`00:00:00`) means the value carried no time at all and
/// maps to `""`. Hours past 23 are treated as night.
pub fn time_of_day(hour: u32, minute: u32, second: u32) -> &'static str {
    if hour == 0 && minute == 0 && second == 0 {
        return "";
    }
    match hour {
        0..=5 | 21.. => "Night",
        6..=11 => "Morning",
        12..=15 => "Afternoon",
        16..=20 => "Evening",
    }
}

/// Whether `sample` reads as a date/time, relative to today.
///
/// Use [`DateParser::is_date_like`] when classifying many values.
pub fn is_date_like(sample: &str, fuzzy: bool) -> bool {
    DateParser::new().is_date_like(sample, fuzzy)
}

/// The four derived values of one date cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateParts {
    pub year: i32,
    pub month_name: &'static str,
    pub day: u32,
    pub time_of_day: &'static str,
}

impl DateParts {
    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        Self {
            year: dt.year(),
            month_name: MONTH_NAMES[dt.month0() as usize],
            day: dt.day(),
            time_of_day: time_of_day(dt.hour(), dt.minute(), dt.second()),
        }
    }

    /// Output fields in column order: year, month, day, time of day.
    pub fn into_fields(self) -> [String; 4] {
        [
            self.year.to_string(),
            self.month_name.to_string(),
            self.day.to_string(),
            self.time_of_day.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    #[test]
    fn test_time_of_day_boundaries() {
        assert_eq!(time_of_day(0, 0, 0), "");
        assert_eq!(time_of_day(0, 0, 1), "Night");
        assert_eq!(time_of_day(0, 30, 0), "Night");
        assert_eq!(time_of_day(5, 59, 59), "Night");
        assert_eq!(time_of_day(6, 0, 0), "Morning");
        assert_eq!(time_of_day(11, 59, 59), "Morning");
        assert_eq!(time_of_day(12, 0, 0), "Afternoon");
        assert_eq!(time_of_day(15, 59, 0), "Afternoon");
        assert_eq!(time_of_day(16, 0, 0), "Evening");
        assert_eq!(time_of_day(20, 59, 0), "Evening");
        assert_eq!(time_of_day(21, 0, 0), "Night");
        assert_eq!(time_of_day(23, 59, 59), "Night");
    }

    #[test]
    fn test_time_of_day_is_total() {
        let labels = ["Morning", "Afternoon", "Evening", "Night"];
        for hour in 0..24 {
            let label = time_of_day(hour, 0, 1);
            assert!(labels.contains(&label), "hour {} -> {:?}", hour, label);
        }
    }

    #[test]
    fn test_month_names_bijection() {
        let names: HashSet<&str> = (1..=12).filter_map(month_name).collect();
        assert_eq!(names.len(), 12);
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(12), Some("December"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn test_date_parts_fields() {
        let dt = NaiveDate::from_ymd_opt(2023, 5, 4)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap();
        let parts = DateParts::from_datetime(&dt);
        assert_eq!(parts.into_fields(), ["2023", "May", "4", "Morning"].map(String::from));
    }

    #[test]
    fn test_date_parts_without_time() {
        let dt = NaiveDate::from_ymd_opt(2023, 12, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let parts = DateParts::from_datetime(&dt);
        assert_eq!(parts.time_of_day, "");
        assert_eq!(parts.month_name, "December");
    }

    #[test]
    fn test_is_date_like() {
        assert!(is_date_like("2023-05-14T09:15:00", false));
        assert!(is_date_like("May 14, 2023", false));
        assert!(!is_date_like("Brooklyn", false));
        assert!(!is_date_like("", false));
        assert!(is_date_like("reported 2023-05-14", true));
        assert!(!is_date_like("reported 2023-05-14", false));
    }
}
