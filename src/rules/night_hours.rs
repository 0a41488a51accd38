//! Night-hours accounting. Informational only: never produces a violation.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::config::RuleThresholds;
use crate::models::ResolvedShift;

use super::calendar::window_minutes_by_day;

/// Minutes worked inside the night window, per calendar day they fall on.
///
/// Breaks are not located in time, so the raw shift interval is used.
pub fn night_minutes_by_day(
    shifts: &[ResolvedShift],
    thresholds: &RuleThresholds,
) -> BTreeMap<NaiveDate, i64> {
    let mut by_day = BTreeMap::new();

    for shift in shifts {
        let minutes = window_minutes_by_day(
            shift.start_instant,
            shift.end_instant,
            thresholds.night_start_hour,
            thresholds.night_end_hour,
        );
        for (date, minutes) in minutes {
            *by_day.entry(date).or_insert(0) += minutes;
        }
    }

    by_day
}
