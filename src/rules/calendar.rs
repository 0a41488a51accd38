//! Time arithmetic shared by the rules.
//!
//! Quantities are carried as whole minutes and compared against thresholds
//! converted to minutes, so boundary cases are exact.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

/// Converts minutes to hours.
pub fn minutes_to_hours(minutes: i64) -> Decimal {
    Decimal::new(minutes, 0) / Decimal::new(60, 0)
}

/// Hours in `minutes`, rounded to 2 decimal places for reporting.
pub fn reported_hours(minutes: i64) -> Decimal {
    minutes_to_hours(minutes).round_dp(2)
}

/// True when `minutes` is strictly above `threshold_hours`.
///
/// # Example
///
/// ```
/// use shift_compliance::rules::exceeds_hours;
/// use rust_decimal::Decimal;
///
/// let ten = Decimal::new(10, 0);
/// assert!(!exceeds_hours(600, ten));
/// assert!(exceeds_hours(601, ten));
/// ```
pub fn exceeds_hours(minutes: i64, threshold_hours: Decimal) -> bool {
    Decimal::new(minutes, 0) > threshold_hours * Decimal::new(60, 0)
}

/// True when `minutes` is strictly below `threshold_hours`.
pub fn below_hours(minutes: i64, threshold_hours: Decimal) -> bool {
    Decimal::new(minutes, 0) < threshold_hours * Decimal::new(60, 0)
}

/// Overlap of two half-open intervals in minutes, never negative.
///
/// # Example
///
/// ```
/// use shift_compliance::rules::overlap_minutes;
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
/// let at = |h| day.and_hms_opt(h, 0, 0).unwrap();
///
/// assert_eq!(overlap_minutes(at(8), at(12), at(10), at(14)), 120);
/// assert_eq!(overlap_minutes(at(8), at(10), at(10), at(14)), 0);
/// ```
pub fn overlap_minutes(
    start_a: NaiveDateTime,
    end_a: NaiveDateTime,
    start_b: NaiveDateTime,
    end_b: NaiveDateTime,
) -> i64 {
    let start = start_a.max(start_b);
    let end = end_a.min(end_b);
    (end - start).num_minutes().max(0)
}

/// Splits an interval at midnight boundaries.
///
/// Returns `(date, start, end)` pieces in order; empty pieces are skipped.
pub fn split_at_midnight(
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<(NaiveDate, NaiveDateTime, NaiveDateTime)> {
    let mut pieces = Vec::new();
    let mut current = start;

    while current < end {
        let next_midnight = (current.date() + Duration::days(1)).and_time(NaiveTime::MIN);
        let piece_end = next_midnight.min(end);
        pieces.push((current.date(), current, piece_end));
        current = piece_end;
    }

    pieces
}

/// Portions of calendar day `date` covered by a daily clock window.
///
/// A window whose end is at or before its start spans midnight: on any
/// given day it covers `[00:00, end)` and `[start, 24:00)`. A window with
/// equal bounds is empty.
pub fn window_on_day(
    date: NaiveDate,
    window_start: NaiveTime,
    window_end: NaiveTime,
) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    let midnight = date.and_time(NaiveTime::MIN);
    let next_midnight = midnight + Duration::days(1);

    if window_start == window_end {
        Vec::new()
    } else if window_start < window_end {
        vec![(date.and_time(window_start), date.and_time(window_end))]
    } else {
        vec![
            (midnight, date.and_time(window_end)),
            (date.and_time(window_start), next_midnight),
        ]
    }
}

/// Minutes of `[start, end)` inside a daily clock window, per calendar day.
///
/// Days without overlap are absent from the result.
///
/// # Example
///
/// ```
/// use shift_compliance::rules::window_minutes_by_day;
/// use chrono::{NaiveDate, NaiveTime};
///
/// let day = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
/// let start = day.and_hms_opt(22, 0, 0).unwrap();
/// let end = day.succ_opt().unwrap().and_hms_opt(6, 0, 0).unwrap();
/// let clock = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
///
/// let minutes = window_minutes_by_day(start, end, clock(21), clock(6));
/// assert_eq!(minutes.get(&day), Some(&120));
/// assert_eq!(minutes.get(&day.succ_opt().unwrap()), Some(&360));
/// ```
pub fn window_minutes_by_day(
    start: NaiveDateTime,
    end: NaiveDateTime,
    window_start: NaiveTime,
    window_end: NaiveTime,
) -> BTreeMap<NaiveDate, i64> {
    let mut by_day = BTreeMap::new();

    for (date, piece_start, piece_end) in split_at_midnight(start, end) {
        let minutes: i64 = window_on_day(date, window_start, window_end)
            .into_iter()
            .map(|(w_start, w_end)| overlap_minutes(piece_start, piece_end, w_start, w_end))
            .sum();
        if minutes > 0 {
            *by_day.entry(date).or_insert(0) += minutes;
        }
    }

    by_day
}
