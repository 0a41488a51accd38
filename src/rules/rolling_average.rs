//! AVG_12W: mean weekly hours over sliding runs of twelve weeks.
//!
//! By default the sequence holds only weeks that contain shifts, so a run of
//! twelve entries may cover more than twelve calendar weeks. With
//! `pad_empty_weeks_in_average` every calendar week between the first and the
//! last worked week is present, empty ones counting zero hours.

use chrono::Duration;
use rust_decimal::Decimal;
use serde_json::json;

use crate::config::RuleThresholds;
use crate::models::{Evidence, IsoWeek, ResolvedShift, RuleCode, Violation, ViolationScope};

use super::weekly_max::weekly_minutes;

/// Number of weeks in one averaging window.
pub const AVERAGE_WINDOW_WEEKS: usize = 12;

/// Weekly totals in the order the average walks them.
pub fn average_sequence(shifts: &[ResolvedShift], pad_empty_weeks: bool) -> Vec<(IsoWeek, i64)> {
    let worked = weekly_minutes(shifts);
    if !pad_empty_weeks {
        return worked.into_iter().collect();
    }

    let (Some(first), Some(last)) = (worked.keys().next(), worked.keys().next_back()) else {
        return Vec::new();
    };
    let (Some(mut monday), Some(last_monday)) = (first.monday(), last.monday()) else {
        return worked.into_iter().collect();
    };

    let mut sequence = Vec::new();
    while monday <= last_monday {
        let week = IsoWeek::of(monday);
        sequence.push((week, worked.get(&week).copied().unwrap_or(0)));
        monday += Duration::weeks(1);
    }
    sequence
}

/// Checks every run of twelve consecutive entries against the average cap.
///
/// # Returns
///
/// One violation per offending run, scoped to its first and last week.
///
/// # Example
///
/// ```
/// use shift_compliance::config::RuleThresholds;
/// use shift_compliance::rules::check_rolling_average;
///
/// // Fewer than twelve worked weeks never produce a window.
/// assert!(check_rolling_average("T1", &[], &RuleThresholds::default()).is_empty());
/// ```
pub fn check_rolling_average(
    agent_id: &str,
    shifts: &[ResolvedShift],
    thresholds: &RuleThresholds,
) -> Vec<Violation> {
    let threshold = thresholds.avg_weekly_hours_over_12_weeks;
    let window_len = AVERAGE_WINDOW_WEEKS as i64;
    let limit_minutes = threshold * Decimal::new(60 * window_len, 0);
    let sequence = average_sequence(shifts, thresholds.pad_empty_weeks_in_average);

    sequence
        .windows(AVERAGE_WINDOW_WEEKS)
        .filter_map(|window| {
            let total: i64 = window.iter().map(|(_, minutes)| minutes).sum();
            if Decimal::new(total, 0) <= limit_minutes {
                return None;
            }

            let first = window[0].0;
            let last = window[AVERAGE_WINDOW_WEEKS - 1].0;
            let mean = (Decimal::new(total, 0) / Decimal::new(60 * window_len, 0)).round_dp(2);
            Some(Violation::new(
                agent_id,
                RuleCode::Avg12w,
                ViolationScope::WeekRange { first, last },
                format!(
                    "Average of {}h per week over {}..{} exceeds the 12-week cap of {}h",
                    mean.normalize(),
                    first,
                    last,
                    threshold.normalize()
                ),
                Evidence::new(mean, threshold, "hours")
                    .with("weeks", json!(AVERAGE_WINDOW_WEEKS))
                    .with("total_hours", json!((Decimal::new(total, 0) / Decimal::new(60, 0)).round_dp(2))),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::{dec, make_date, resolved};

    /// `minutes` per week spread over Monday to Friday, for `weeks` weeks from 2025-01-06.
    fn weekly_shifts(weeks: i64, skip: &[i64], minutes: i64) -> Vec<ResolvedShift> {
        (0..weeks)
            .filter(|w| !skip.contains(w))
            .flat_map(|w| {
                let monday = make_date("2025-01-06") + Duration::weeks(w);
                (0..5).map(move |d| {
                    let date = monday + Duration::days(d);
                    let end_minutes = 6 * 60 + minutes / 5;
                    resolved(
                        "T1",
                        &date.to_string(),
                        "06:00",
                        &format!("{:02}:{:02}", end_minutes / 60, end_minutes % 60),
                    )
                })
            })
            .collect()
    }

    #[test]
    fn test_twelve_weeks_averaging_45h_violates() {
        let shifts = weekly_shifts(12, &[], 45 * 60);
        let violations = check_rolling_average("T1", &shifts, &RuleThresholds::default());

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule_code, RuleCode::Avg12w);
        assert_eq!(violations[0].evidence.measured, dec("45"));
        assert_eq!(violations[0].evidence.threshold, dec("44"));
        assert_eq!(violations[0].scope.to_string(), "2025-W02..2025-W13");
    }

    #[test]
    fn test_average_exactly_at_cap_is_compliant() {
        let shifts = weekly_shifts(12, &[], 44 * 60);
        assert!(check_rolling_average("T1", &shifts, &RuleThresholds::default()).is_empty());
    }

    #[test]
    fn test_each_sliding_window_is_checked() {
        let shifts = weekly_shifts(14, &[], 45 * 60);
        let violations = check_rolling_average("T1", &shifts, &RuleThresholds::default());
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn test_empty_weeks_are_skipped_by_default() {
        // Thirteen calendar weeks with one week off: twelve worked weeks remain.
        let shifts = weekly_shifts(13, &[6], 45 * 60);
        let violations = check_rolling_average("T1", &shifts, &RuleThresholds::default());

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].scope.to_string(), "2025-W02..2025-W14");
    }

    #[test]
    fn test_padding_counts_empty_weeks_as_zero() {
        let shifts = weekly_shifts(13, &[6], 45 * 60);
        let thresholds = RuleThresholds {
            pad_empty_weeks_in_average: true,
            ..RuleThresholds::default()
        };

        let sequence = average_sequence(&shifts, true);
        assert_eq!(sequence.len(), 13);
        assert_eq!(sequence[6].1, 0);

        // Both padded windows include the zero week: 11 * 45 / 12 < 44.
        assert!(check_rolling_average("T1", &shifts, &thresholds).is_empty());
    }
}
