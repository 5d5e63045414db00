//! Permissive `publish_time` parsing.
//!
//! Metadata exports mix ISO dates, timestamps, month names and bare years.
//! Every accepted shape maps to a single calendar date. Nothing here reads
//! the local time zone or locale: month names are English, and a timestamp
//! with an offset keeps the calendar date it was written with.
//!
//! A `%Y` match only counts when the value carries that year as a four-digit
//! field, so `3/4/20` never becomes year 3. Two-digit years are read from
//! explicit `%y` shapes (`3/4/20`, `01-Mar-20`, `01.03.20`) and land in
//! 1969-2068, chrono's `%y` window. A two-digit year in leading position
//! (`20-03-01`) is ambiguous and left unparsed.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

// Partial-date patterns - compiled once at startup
static YEAR_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})$").expect("Invalid regex: YYYY"));
static YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})$").expect("Invalid regex: YYYY-MM"));
static COMPACT_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{8}$").expect("Invalid regex: YYYYMMDD"));
static YEAR_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)(\d{4})(?:\D|$)").expect("Invalid regex: year field"));

/// Full date-time shapes; the time of day is discarded.
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Full date shapes, tried in order. Slash dates are month-first, with a
/// day-first fallback for values like `25/03/2020`.
const DATE_FORMATS: [&str; 15] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%Y %B %d",
    "%Y %b %d",
    "%d-%b-%Y",
];

/// Day-month-year shapes with a two-digit year, tried after every `%Y` shape.
const SHORT_YEAR_FORMATS: [&str; 7] = [
    "%m/%d/%y",
    "%d/%m/%y",
    "%d.%m.%y",
    "%d-%b-%y",
    "%d %b %y",
    "%d %B %y",
    "%b %d, %y",
];

/// Month-and-year shapes, completed to the first of the month.
const MONTH_YEAR_FORMATS: [&str; 4] = ["%Y %B", "%Y %b", "%B %Y", "%b %Y"];

/// Parse a `publish_time` cell into a calendar date.
///
/// Returns `None` for blank or unrecognized values. Partial dates resolve
/// to their first day: `2020` is 2020-01-01, `2020 Mar` is 2020-03-01.
pub fn parse_publish_time(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(stamp) = DateTime::parse_from_rfc3339(value) {
        return Some(stamp.date_naive());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt)
            && has_year_field(value, dt.year())
        {
            return Some(dt.date());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt)
            && has_year_field(value, date.year())
        {
            return Some(date);
        }
    }

    for fmt in SHORT_YEAR_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }

    if COMPACT_DATE.is_match(value) {
        return NaiveDate::parse_from_str(value, "%Y%m%d").ok();
    }

    parse_partial_date(value)
}

fn parse_partial_date(value: &str) -> Option<NaiveDate> {
    if let Some(caps) = YEAR_ONLY.captures(value) {
        let year = caps[1].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }

    if let Some(caps) = YEAR_MONTH.captures(value) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }

    // chrono needs a day; pin it to the 1st
    let with_day = format!("{value} 1");
    MONTH_YEAR_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(&with_day, &format!("{fmt} %d"))
            .ok()
            .filter(|date| has_year_field(value, date.year()))
    })
}

/// Whether `value` spells `year` as a standalone four-digit field.
fn has_year_field(value: &str, year: i32) -> bool {
    YEAR_FIELD
        .captures_iter(value)
        .any(|caps| caps[1].parse::<i32>().is_ok_and(|y| y == year))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_iso_dates() {
        assert_eq!(parse_publish_time("2020-03-01"), ymd(2020, 3, 1));
        assert_eq!(parse_publish_time("2020/03/01"), ymd(2020, 3, 1));
        assert_eq!(parse_publish_time("  2020-3-1 "), ymd(2020, 3, 1));
    }

    #[test]
    fn test_datetimes_drop_time() {
        assert_eq!(parse_publish_time("2020-03-01 23:59:59"), ymd(2020, 3, 1));
        assert_eq!(parse_publish_time("2020-03-01T08:30:00"), ymd(2020, 3, 1));
        assert_eq!(
            parse_publish_time("2020-03-01 00:00:00.000"),
            ymd(2020, 3, 1)
        );
    }

    #[test]
    fn test_rfc3339_keeps_written_date() {
        // Late evening in UTC-5 is already the next day in UTC
        assert_eq!(
            parse_publish_time("2020-03-01T23:30:00-05:00"),
            ymd(2020, 3, 1)
        );
        assert_eq!(parse_publish_time("2019-12-31T10:00:00Z"), ymd(2019, 12, 31));
    }

    #[test]
    fn test_slash_dates_month_first_then_day_first() {
        assert_eq!(parse_publish_time("03/04/2020"), ymd(2020, 3, 4));
        assert_eq!(parse_publish_time("25/03/2020"), ymd(2020, 3, 25));
    }

    #[test]
    fn test_month_names() {
        assert_eq!(parse_publish_time("1 March 2020"), ymd(2020, 3, 1));
        assert_eq!(parse_publish_time("Mar 5, 2020"), ymd(2020, 3, 5));
        assert_eq!(parse_publish_time("2020 Mar 5"), ymd(2020, 3, 5));
        assert_eq!(parse_publish_time("05-Mar-2020"), ymd(2020, 3, 5));
    }

    #[test]
    fn test_partial_dates() {
        assert_eq!(parse_publish_time("2020"), ymd(2020, 1, 1));
        assert_eq!(parse_publish_time("2020-07"), ymd(2020, 7, 1));
        assert_eq!(parse_publish_time("2020 Jul"), ymd(2020, 7, 1));
        assert_eq!(parse_publish_time("July 2020"), ymd(2020, 7, 1));
        assert_eq!(parse_publish_time("20200315"), ymd(2020, 3, 15));
    }

    #[test]
    fn test_unparseable_values() {
        assert_eq!(parse_publish_time(""), None);
        assert_eq!(parse_publish_time("   "), None);
        assert_eq!(parse_publish_time("not-a-date"), None);
        assert_eq!(parse_publish_time("2020-13-01"), None);
        assert_eq!(parse_publish_time("2020-02-30"), None);
        assert_eq!(parse_publish_time("2020-13"), None);
        assert_eq!(parse_publish_time("spring 2020"), None);
        assert_eq!(parse_publish_time("12345"), None);
    }

    #[test]
    fn test_two_digit_years() {
        assert_eq!(parse_publish_time("3/4/20"), ymd(2020, 3, 4));
        assert_eq!(parse_publish_time("25/03/20"), ymd(2020, 3, 25));
        assert_eq!(parse_publish_time("01-Mar-20"), ymd(2020, 3, 1));
        assert_eq!(parse_publish_time("01.03.20"), ymd(2020, 3, 1));
        assert_eq!(parse_publish_time("1 Mar 99"), ymd(1999, 3, 1));

        // Leading two-digit year: could be yy-mm-dd or dd-mm-yy
        assert_eq!(parse_publish_time("20-03-01"), None);
        assert_eq!(parse_publish_time("20-03-01 10:00"), None);
        assert_eq!(parse_publish_time("March 20"), None);
    }

    #[test]
    fn test_years_are_never_truncated() {
        for value in ["3/4/20", "20-03-01", "01-Mar-20", "01.03.20", "5 May 21"] {
            if let Some(date) = parse_publish_time(value) {
                assert!(date.year() >= 1000, "{value} parsed as {date}");
            }
        }
    }
}
