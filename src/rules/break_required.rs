//! BREAK_REQUIRED: minimum break on long shifts.

use rust_decimal::Decimal;
use serde_json::json;

use crate::config::RuleThresholds;
use crate::models::{Evidence, ResolvedShift, RuleCode, Violation, ViolationScope};

/// Worked minutes from which a break is required.
pub const LONG_SHIFT_MINUTES: i64 = 6 * 60;

/// Flags shifts of six worked hours or more whose declared break is too short.
pub fn check_break_required(
    agent_id: &str,
    shifts: &[ResolvedShift],
    thresholds: &RuleThresholds,
) -> Vec<Violation> {
    let minimum = thresholds.min_break_minutes_after_6h;

    shifts
        .iter()
        .filter(|s| s.worked_minutes >= LONG_SHIFT_MINUTES && s.shift.break_minutes < minimum)
        .map(|s| {
            Violation::new(
                agent_id,
                RuleCode::BreakRequired,
                ViolationScope::Date { date: s.date() },
                format!(
                    "Shift of {}h on {} has a {} min break, below the required {} min",
                    s.duration_hours.round_dp(2).normalize(),
                    s.date(),
                    s.shift.break_minutes,
                    minimum
                ),
                Evidence::new(Decimal::from(s.shift.break_minutes), Decimal::from(minimum), "minutes")
                    .with("duration_hours", json!(s.duration_hours.round_dp(2)))
                    .with("start", json!(s.start_instant)),
            )
        })
        .collect()
}
