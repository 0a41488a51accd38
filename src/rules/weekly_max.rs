//! WEEKLY_MAX: worked hours per ISO week.

use std::collections::BTreeMap;

use serde_json::json;

use crate::config::RuleThresholds;
use crate::models::{Evidence, IsoWeek, ResolvedShift, RuleCode, Violation, ViolationScope};

use super::calendar::{exceeds_hours, reported_hours};

/// Worked minutes per ISO week of the shift date, in week order.
pub fn weekly_minutes(shifts: &[ResolvedShift]) -> BTreeMap<IsoWeek, i64> {
    let mut weeks = BTreeMap::new();
    for shift in shifts {
        *weeks.entry(shift.iso_week()).or_insert(0) += shift.worked_minutes;
    }
    weeks
}

/// Checks each ISO week's worked hours against `max_weekly_hours`.
pub fn check_weekly_max(
    agent_id: &str,
    shifts: &[ResolvedShift],
    thresholds: &RuleThresholds,
) -> Vec<Violation> {
    let threshold = thresholds.max_weekly_hours;

    weekly_minutes(shifts)
        .into_iter()
        .filter(|(_, minutes)| exceeds_hours(*minutes, threshold))
        .map(|(week, minutes)| {
            let measured = reported_hours(minutes);
            Violation::new(
                agent_id,
                RuleCode::WeeklyMax,
                ViolationScope::Week { week },
                format!(
                    "{}h worked in week {} exceeds the weekly cap of {}h",
                    measured.normalize(),
                    week,
                    threshold.normalize()
                ),
                Evidence::new(measured, threshold, "hours")
                    .with("week_start", json!(week.monday())),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::{dec, resolved};

    #[test]
    fn test_weekly_total_at_cap_is_compliant() {
        // Mon 2025-07-07 .. Sat 2025-07-12: six 8h shifts = 48h
        let shifts: Vec<_> = (7..=12)
            .map(|d| resolved("T1", &format!("2025-07-{:02}", d), "08:00", "16:00"))
            .collect();
        assert!(check_weekly_max("T1", &shifts, &RuleThresholds::default()).is_empty());
    }

    #[test]
    fn test_weekly_total_over_cap_violates() {
        let shifts: Vec<_> = (7..=12)
            .map(|d| resolved("T1", &format!("2025-07-{:02}", d), "08:00", "16:30"))
            .collect();
        let violations = check_weekly_max("T1", &shifts, &RuleThresholds::default());

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].scope.to_string(), "2025-W28");
        assert_eq!(violations[0].evidence.measured, dec("51"));
        assert_eq!(violations[0].evidence.context["week_start"], json!("2025-07-07"));
    }

    #[test]
    fn test_weeks_split_on_iso_boundaries_across_new_year() {
        // 2024-12-30 and 2024-12-31 belong to 2025-W01; 2024-12-29 to 2024-W52.
        let shifts = vec![
            resolved("T1", "2024-12-29", "08:00", "16:00"),
            resolved("T1", "2024-12-30", "08:00", "16:00"),
            resolved("T1", "2024-12-31", "08:00", "16:00"),
        ];
        let weeks = weekly_minutes(&shifts);
        let keys: Vec<String> = weeks.keys().map(|w| w.to_string()).collect();
        assert_eq!(keys, vec!["2024-W52", "2025-W01"]);
        assert_eq!(weeks.values().copied().collect::<Vec<_>>(), vec![480, 960]);
    }
}
