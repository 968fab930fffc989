//! Calendar-week values for `calendar_weeks` columns.
//!
//! Weeks follow ISO 8601: they start on Monday and week 1 is the week that
//! contains the year's first Thursday. A year therefore has 52 or 53 weeks.
//! Cells store the compact form `KW<week>-<year>`.

use chrono::{Datelike, NaiveDate, Weekday as ChronoWeekday};

/// One selectable week of a year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarWeek {
    pub week: u32,
    /// Monday of the week.
    pub start: NaiveDate,
    /// Sunday of the week.
    pub end: NaiveDate,
    /// `KW 3 (15.01.2024 - 21.01.2024)`
    pub label: String,
    /// `KW3-2024`
    pub value: String,
}

impl CalendarWeek {
    /// Build the week `week` of ISO year `year`, if it exists.
    pub fn new(year: i32, week: u32) -> Option<Self> {
        let start = NaiveDate::from_isoywd_opt(year, week, ChronoWeekday::Mon)?;
        let end = NaiveDate::from_isoywd_opt(year, week, ChronoWeekday::Sun)?;
        Some(Self {
            week,
            start,
            end,
            label: format!(
                "KW {} ({} - {})",
                week,
                start.format("%d.%m.%Y"),
                end.format("%d.%m.%Y")
            ),
            value: format_calendar_week(week, year),
        })
    }
}

/// Number of ISO weeks in `year` (52 or 53).
pub fn weeks_in_year(year: i32) -> u32 {
    // December 28th always falls in the last ISO week of its year.
    NaiveDate::from_ymd_opt(year, 12, 28).map_or(52, |date| date.iso_week().week())
}

/// All weeks of `year` in order.
pub fn calendar_weeks(year: i32) -> Vec<CalendarWeek> {
    (1..=weeks_in_year(year))
        .filter_map(|week| CalendarWeek::new(year, week))
        .collect()
}

/// Stored form of a week: `KW<week>-<year>`.
pub fn format_calendar_week(week: u32, year: i32) -> String {
    format!("KW{week}-{year}")
}

/// Parse `KW<week>-<year>` into `(week, year)`.
///
/// Both parts must be plain digit runs; anything else yields `None`.
pub fn parse_calendar_week(value: &str) -> Option<(u32, i32)> {
    let rest = value.strip_prefix("KW")?;
    let (week, year) = rest.split_once('-')?;
    if !is_digits(week) || !is_digits(year) {
        return None;
    }
    Some((week.parse().ok()?, year.parse().ok()?))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
