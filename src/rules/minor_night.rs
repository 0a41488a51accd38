//! MINOR_NIGHT_FORBIDDEN: minors working inside the forbidden night window.

use rust_decimal::Decimal;
use serde_json::json;

use crate::config::RuleThresholds;
use crate::models::{Evidence, ResolvedShift, RuleCode, Violation, ViolationScope};

use super::calendar::{reported_hours, window_minutes_by_day};

/// Flags every minor's shift that overlaps the forbidden window.
///
/// The window spans midnight when its end is at or before its start.
///
/// # Returns
///
/// One violation per offending shift, scoped to the shift's date, with the
/// overlapping hours as evidence against a threshold of zero.
pub fn check_minor_night(
    agent_id: &str,
    shifts: &[ResolvedShift],
    thresholds: &RuleThresholds,
) -> Vec<Violation> {
    let (window_start, window_end) = (
        thresholds.minor_night_forbidden_start,
        thresholds.minor_night_forbidden_end,
    );

    shifts
        .iter()
        .filter(|s| s.shift.is_minor)
        .filter_map(|s| {
            let overlap: i64 = window_minutes_by_day(s.start_instant, s.end_instant, window_start, window_end)
                .values()
                .sum();
            if overlap == 0 {
                return None;
            }

            let measured = reported_hours(overlap);
            Some(Violation::new(
                agent_id,
                RuleCode::MinorNightForbidden,
                ViolationScope::Date { date: s.date() },
                format!(
                    "Minor worked {}h between {} and {} on the shift of {}",
                    measured.normalize(),
                    window_start.format("%H:%M"),
                    window_end.format("%H:%M"),
                    s.date()
                ),
                Evidence::new(measured, Decimal::ZERO, "hours")
                    .with("start", json!(s.start_instant))
                    .with("end", json!(s.end_instant)),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::{dec, resolved};

    fn minor(mut shift: ResolvedShift) -> ResolvedShift {
        shift.shift.is_minor = true;
        shift
    }

    #[test]
    fn test_minor_overnight_shift_violates() {
        let shift = minor(resolved("M1", "2025-07-01", "22:00", "06:00"));
        let violations = check_minor_night("M1", &[shift], &RuleThresholds::default());

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].evidence.measured, dec("8"));
        assert_eq!(violations[0].severity, crate::models::Severity::Critical);
    }

    #[test]
    fn test_adult_overnight_shift_is_not_checked() {
        let shift = resolved("A1", "2025-07-01", "22:00", "06:00");
        assert!(check_minor_night("A1", &[shift], &RuleThresholds::default()).is_empty());
    }

    #[test]
    fn test_window_edges_are_half_open() {
        let ends_at_start = minor(resolved("M1", "2025-07-01", "14:00", "22:00"));
        let starts_at_end = minor(resolved("M1", "2025-07-02", "06:00", "12:00"));
        assert!(
            check_minor_night("M1", &[ends_at_start, starts_at_end], &RuleThresholds::default())
                .is_empty()
        );
    }

    #[test]
    fn test_early_morning_overlap_violates() {
        let shift = minor(resolved("M1", "2025-07-01", "05:30", "12:00"));
        let violations = check_minor_night("M1", &[shift], &RuleThresholds::default());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].evidence.measured, dec("0.5"));
    }
}
