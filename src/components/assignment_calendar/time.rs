use chrono::{Datelike, NaiveDate};

/// Date format used by the service and the widget
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar date.
///
/// The string is split into its year/month/day components and validated
/// as a calendar date. No timestamp or timezone interpretation is done, so
/// a date can never shift across a midnight boundary.
pub fn parse_calendar_date(date_str: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = date_str.trim().split('-').collect();
    if parts.len() != 3 {
        return None;
    }
    if parts[0].len() != 4 || parts[1].len() != 2 || parts[2].len() != 2 {
        return None;
    }
    if !parts.iter().all(|p| p.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }
    let year = parts[0].parse::<i32>().ok()?;
    let month = parts[1].parse::<u32>().ok()?;
    let day = parts[2].parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Format a calendar date as `YYYY-MM-DD`
pub fn format_calendar_date(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Turn an inclusive end date into the exclusive end date the widget expects
/// by advancing it one day, rolling over month and year boundaries.
pub fn exclusive_end_date(end_date: &str) -> Option<String> {
    let date = parse_calendar_date(end_date)?;
    date.succ_opt().map(format_calendar_date)
}
