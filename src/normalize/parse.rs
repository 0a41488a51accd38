//! Tolerant grammar for roster cells.
//!
//! Times accept `HH:MM`, `HHhMM`, `HH.MM`, `8h`, bare `HH`, optional seconds,
//! `24:00` as midnight, date-time strings, and Excel fractional days.
//! Dates try the configured formats first, then a day-first (or month-first)
//! numeric fallback, then Excel day serials.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::IngestionSettings;

use super::aliases::fold_accents;

static EXCEL_FRACTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0[.,]\d+$").unwrap());
static CLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})\s*[:hH.]\s*(\d{2})(?:\s*[:.]\s*\d{2})?$").unwrap());
static HOUR_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})\s*[hH]?$").unwrap());
static TIME_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(\d{1,2}(?:\s*[:hH.]\s*\d{2})?\s*[hH]?)\s*(?:-|–|—|à|a|to|/)\s*(\d{1,2}(?:\s*[:hH.]\s*\d{2})?\s*[hH]?)\s*$",
    )
    .unwrap()
});
static DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})\s*[:hH]\s*(\d{2})?\s*(?:min|mn|m)?$").unwrap());
static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Parses a clock time.
///
/// A single `0` followed by a decimal separator is an Excel fractional day
/// (`0.25` is 06:00). Two-digit hours keep the clock reading (`00.25` is 00:25).
///
/// # Example
///
/// ```
/// use shift_compliance::normalize::parse_time;
/// use chrono::NaiveTime;
///
/// let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// assert_eq!(parse_time("08:30"), Some(t(8, 30)));
/// assert_eq!(parse_time("8h30"), Some(t(8, 30)));
/// assert_eq!(parse_time("22.15"), Some(t(22, 15)));
/// assert_eq!(parse_time("7"), Some(t(7, 0)));
/// assert_eq!(parse_time("0.25"), Some(t(6, 0)));
/// assert_eq!(parse_time("00.25"), Some(t(0, 25)));
/// assert_eq!(parse_time("0.3333333333"), Some(t(8, 0)));
/// assert_eq!(parse_time("24:00"), Some(t(0, 0)));
/// assert_eq!(parse_time("25:00"), None);
/// ```
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    // Date-time cells: keep the time part.
    if let Some((_, time)) = value.split_once(['T', ' ']) {
        if value.len() > 10 && value.as_bytes().get(4) == Some(&b'-') {
            return parse_time(time);
        }
    }

    if EXCEL_FRACTION.is_match(value) {
        return excel_fraction(value);
    }

    if let Some(caps) = CLOCK.captures(value) {
        if let Some(time) = clock(caps[1].parse().ok()?, caps[2].parse().ok()?) {
            return Some(time);
        }
    }

    if let Some(caps) = HOUR_ONLY.captures(value) {
        return clock(caps[1].parse().ok()?, 0);
    }

    excel_fraction(value)
}

fn clock(hour: u32, minute: u32) -> Option<NaiveTime> {
    match (hour, minute) {
        (24, 0) => Some(NaiveTime::MIN),
        (h, m) => NaiveTime::from_hms_opt(h, m, 0),
    }
}

/// Fractional day in `[0, 1)`, rounded to the minute.
fn excel_fraction(value: &str) -> Option<NaiveTime> {
    let fraction: f64 = value.replace(',', ".").parse().ok()?;
    if !(0.0..1.0).contains(&fraction) {
        return None;
    }
    let minutes = (fraction * 1440.0).round() as u32 % 1440;
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}

/// Parses a date with the configured formats, then the numeric fallback.
///
/// # Example
///
/// ```
/// use shift_compliance::config::IngestionSettings;
/// use shift_compliance::normalize::parse_date;
/// use chrono::NaiveDate;
///
/// let settings = IngestionSettings::default();
/// let july_1 = NaiveDate::from_ymd_opt(2025, 7, 1);
/// assert_eq!(parse_date("2025-07-01", &settings), july_1);
/// assert_eq!(parse_date("01/07/2025", &settings), july_1);
/// assert_eq!(parse_date("mardi 1.7.25", &settings), july_1);
/// assert_eq!(parse_date("45839", &settings), july_1);
/// assert_eq!(parse_date("not a date", &settings), None);
/// ```
pub fn parse_date(value: &str, settings: &IngestionSettings) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(date) = try_formats(value, settings) {
        return Some(date);
    }

    // Drop a leading weekday and a trailing time: "lundi 07/07/2025 08:00".
    let tokens: Vec<&str> = value
        .split(|c: char| c.is_whitespace() || c == 'T' || c == ',')
        .filter(|t| !t.is_empty())
        .collect();
    if let Some(token) = tokens
        .iter()
        .find(|t| t.chars().next().is_some_and(|c| c.is_ascii_digit()))
    {
        if *token != value {
            if let Some(date) = try_formats(token, settings) {
                return Some(date);
            }
        }
        if let Some(date) = numeric_fallback(token, settings.day_first) {
            return Some(date);
        }
        return excel_serial(token);
    }

    None
}

fn try_formats(value: &str, settings: &IngestionSettings) -> Option<NaiveDate> {
    settings
        .date_formats
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(value, format).ok())
        // `%Y` also accepts two-digit years.
        .find(|date| date.year() >= 1900)
}

fn numeric_fallback(value: &str, day_first: bool) -> Option<NaiveDate> {
    let parts: Vec<&str> = value.split(['/', '-', '.']).collect();
    let [a, b, c] = parts.as_slice() else {
        return None;
    };
    let (a_num, b_num, c_num): (i32, u32, i32) = (a.parse().ok()?, b.parse().ok()?, c.parse().ok()?);

    if a.len() == 4 {
        return NaiveDate::from_ymd_opt(a_num, b_num, u32::try_from(c_num).ok()?);
    }

    let year = if c.len() <= 2 { 2000 + c_num } else { c_num };
    let (day, month) = if day_first {
        (u32::try_from(a_num).ok()?, b_num)
    } else {
        (b_num, u32::try_from(a_num).ok()?)
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Excel 1900-system day serial, fractional part ignored.
fn excel_serial(value: &str) -> Option<NaiveDate> {
    let serial: f64 = value.replace(',', ".").parse().ok()?;
    if !(20_000.0..80_000.0).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Parses a break cell into minutes. Unreadable or empty cells mean no break.
///
/// # Example
///
/// ```
/// use shift_compliance::normalize::parse_break_minutes;
///
/// assert_eq!(parse_break_minutes("30"), 30);
/// assert_eq!(parse_break_minutes("45 min"), 45);
/// assert_eq!(parse_break_minutes("0:30"), 30);
/// assert_eq!(parse_break_minutes("1h"), 60);
/// assert_eq!(parse_break_minutes("1h15"), 75);
/// assert_eq!(parse_break_minutes(""), 0);
/// ```
pub fn parse_break_minutes(value: &str) -> u32 {
    let value = value.trim().to_lowercase();
    if value.is_empty() {
        return 0;
    }

    if let Some(caps) = DURATION.captures(&value) {
        let hours: u32 = caps[1].parse().unwrap_or(0);
        let minutes: u32 = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        return hours * 60 + minutes;
    }

    FIRST_NUMBER
        .find(&value)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Parses a yes/no cell. Anything not recognized as yes is no.
///
/// # Example
///
/// ```
/// use shift_compliance::normalize::parse_flag;
///
/// assert!(parse_flag("Oui"));
/// assert!(parse_flag("x"));
/// assert!(!parse_flag("non"));
/// assert!(!parse_flag(""));
/// ```
pub fn parse_flag(value: &str) -> bool {
    matches!(
        fold_accents(value.trim()).to_lowercase().as_str(),
        "1" | "true" | "vrai" | "oui" | "o" | "yes" | "y" | "x"
    )
}

/// Splits a `start - end` cell into two clock times.
///
/// # Example
///
/// ```
/// use shift_compliance::normalize::parse_time_range;
/// use chrono::NaiveTime;
///
/// let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// assert_eq!(parse_time_range("08:00 - 16:00"), Some((t(8, 0), t(16, 0))));
/// assert_eq!(parse_time_range("22h à 6h"), Some((t(22, 0), t(6, 0))));
/// assert_eq!(parse_time_range("repos"), None);
/// ```
pub fn parse_time_range(value: &str) -> Option<(NaiveTime, NaiveTime)> {
    let caps = TIME_RANGE.captures(value)?;
    Some((parse_time(&caps[1])?, parse_time(&caps[2])?))
}
