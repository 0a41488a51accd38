//! DAILY_MAX: worked hours per calendar date.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::json;

use crate::config::RuleThresholds;
use crate::models::{Evidence, ResolvedShift, RuleCode, Violation, ViolationScope};

use super::calendar::{exceeds_hours, reported_hours};

#[derive(Default)]
struct DayTotal {
    minutes: i64,
    derogation: bool,
    shifts: usize,
}

/// Checks each calendar date's worked hours against the daily cap.
///
/// A date on which any shift carries the 12h derogation is held to
/// `max_daily_hours_with_derogation` instead of `max_daily_hours`. Hours are
/// attributed to the date the shift starts on.
///
/// # Arguments
///
/// * `agent_id` - The agent being evaluated
/// * `shifts` - The agent's shifts, sorted by start
/// * `thresholds` - The caps in force
///
/// # Returns
///
/// One violation per offending date, in date order.
pub fn check_daily_max(
    agent_id: &str,
    shifts: &[ResolvedShift],
    thresholds: &RuleThresholds,
) -> Vec<Violation> {
    let mut days: BTreeMap<NaiveDate, DayTotal> = BTreeMap::new();
    for shift in shifts {
        let day = days.entry(shift.date()).or_default();
        day.minutes += shift.worked_minutes;
        day.derogation |= shift.shift.has_daily_derogation_12h;
        day.shifts += 1;
    }

    days.into_iter()
        .filter_map(|(date, day)| {
            let threshold = if day.derogation {
                thresholds.max_daily_hours_with_derogation
            } else {
                thresholds.max_daily_hours
            };
            if !exceeds_hours(day.minutes, threshold) {
                return None;
            }

            let measured = reported_hours(day.minutes);
            Some(Violation::new(
                agent_id,
                RuleCode::DailyMax,
                ViolationScope::Date { date },
                format!(
                    "{}h worked on {} exceeds the daily cap of {}h",
                    measured.normalize(),
                    date,
                    threshold.normalize()
                ),
                Evidence::new(measured, threshold, "hours")
                    .with("derogation", json!(day.derogation))
                    .with("shifts", json!(day.shifts)),
            ))
        })
        .collect()
}
