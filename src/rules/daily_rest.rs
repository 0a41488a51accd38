//! DAILY_REST: rest between consecutive shifts.

use serde_json::json;

use crate::config::RuleThresholds;
use crate::models::{Evidence, ResolvedShift, RuleCode, Violation, ViolationScope};

use super::calendar::{below_hours, reported_hours};

/// Checks the gap between each pair of adjacent shifts.
///
/// The gap runs from the earlier shift's end to the later shift's start. The
/// minors' minimum applies when either shift is flagged `is_minor`.
/// Overlapping shifts give a negative gap and always violate.
///
/// # Returns
///
/// One violation per short gap, scoped to the later shift's date.
pub fn check_daily_rest(
    agent_id: &str,
    shifts: &[ResolvedShift],
    thresholds: &RuleThresholds,
) -> Vec<Violation> {
    shifts
        .windows(2)
        .filter_map(|pair| {
            let (previous, next) = (&pair[0], &pair[1]);
            let minor = previous.shift.is_minor || next.shift.is_minor;
            let threshold = if minor {
                thresholds.minor_min_daily_rest_hours
            } else {
                thresholds.min_daily_rest_hours
            };

            let gap = (next.start_instant - previous.end_instant).num_minutes();
            if !below_hours(gap, threshold) {
                return None;
            }

            let measured = reported_hours(gap);
            Some(Violation::new(
                agent_id,
                RuleCode::DailyRest,
                ViolationScope::Date { date: next.date() },
                format!(
                    "Rest of {}h before the shift of {} is below the {}h minimum",
                    measured.normalize(),
                    next.date(),
                    threshold.normalize()
                ),
                Evidence::new(measured, threshold, "hours")
                    .with("previous_end", json!(previous.end_instant))
                    .with("next_start", json!(next.start_instant))
                    .with("minor", json!(minor)),
            ))
        })
        .collect()
}
