//! Per-agent rule evaluation.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::config::RuleThresholds;
use crate::models::{AgentStats, ResolvedShift, Violation};

use super::break_required::check_break_required;
use super::calendar::reported_hours;
use super::consecutive_days::check_consecutive_days;
use super::daily_max::check_daily_max;
use super::daily_rest::check_daily_rest;
use super::minor_night::check_minor_night;
use super::night_hours::night_minutes_by_day;
use super::rolling_average::check_rolling_average;
use super::weekly_max::check_weekly_max;
use super::weekly_rest::check_weekly_rest;

/// Signature shared by every rule check.
pub type RuleCheck = fn(&str, &[ResolvedShift], &RuleThresholds) -> Vec<Violation>;

/// Every rule, in the order violations are reported.
pub const RULES: [RuleCheck; 8] = [
    check_daily_max,
    check_weekly_max,
    check_rolling_average,
    check_daily_rest,
    check_weekly_rest,
    check_consecutive_days,
    check_break_required,
    check_minor_night,
];

/// Violations and statistics for one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentEvaluation {
    /// Aggregate figures.
    pub stats: AgentStats,
    /// Violations in rule order, each rule's in chronological order.
    pub violations: Vec<Violation>,
    /// Earliest shift date.
    pub first_date: Option<NaiveDate>,
    /// Latest shift date.
    pub last_date: Option<NaiveDate>,
}

/// Evaluates every rule for one agent.
///
/// Shifts are sorted by start before evaluation; the input order does not
/// matter. All rules run; a violation of one never stops another. The result
/// depends only on the shifts and the thresholds.
///
/// # Arguments
///
/// * `agent_id` - The agent being evaluated
/// * `shifts` - All of the agent's resolved shifts
/// * `thresholds` - Snapshot of the caps in force for this evaluation
///
/// # Example
///
/// ```
/// use shift_compliance::config::RuleThresholds;
/// use shift_compliance::models::{CanonicalShift, RuleCode};
/// use shift_compliance::pipeline::resolve_shift;
/// use shift_compliance::rules::evaluate_agent;
/// use chrono::{NaiveDate, NaiveTime};
///
/// let date = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
/// let clock = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
/// let shift = resolve_shift(CanonicalShift::new("T1", date, clock(8), clock(20)));
///
/// let evaluation = evaluate_agent("T1", &[shift], &RuleThresholds::default());
/// let codes: Vec<RuleCode> = evaluation.violations.iter().map(|v| v.rule_code).collect();
/// assert_eq!(codes, vec![RuleCode::DailyMax, RuleCode::BreakRequired]);
/// assert_eq!(evaluation.stats.days_worked, 1);
/// ```
pub fn evaluate_agent(
    agent_id: &str,
    shifts: &[ResolvedShift],
    thresholds: &RuleThresholds,
) -> AgentEvaluation {
    let mut sorted = shifts.to_vec();
    sorted.sort_by_key(|s| s.start_instant);

    let violations: Vec<Violation> = RULES
        .iter()
        .flat_map(|rule| rule(agent_id, &sorted, thresholds))
        .collect();

    let stats = agent_stats(agent_id, &sorted, thresholds);
    debug!(
        agent_id,
        shifts = sorted.len(),
        violations = violations.len(),
        total_hours = %stats.total_hours,
        "Evaluated agent"
    );

    AgentEvaluation {
        stats,
        violations,
        first_date: sorted.first().map(|s| s.date()),
        last_date: sorted.last().map(|s| s.date()),
    }
}

/// Totals, distinct days and weeks, and night hours for one agent.
pub fn agent_stats(
    agent_id: &str,
    shifts: &[ResolvedShift],
    thresholds: &RuleThresholds,
) -> AgentStats {
    let total_minutes: i64 = shifts.iter().map(|s| s.worked_minutes).sum();
    let days: BTreeSet<_> = shifts.iter().map(|s| s.date()).collect();
    let weeks: BTreeSet<_> = shifts.iter().map(|s| s.iso_week()).collect();

    let nights = night_minutes_by_day(shifts, thresholds);
    let night_minutes: i64 = nights.values().sum();

    AgentStats {
        agent_id: agent_id.to_string(),
        total_hours: reported_hours(total_minutes),
        days_worked: days.len(),
        weeks_counted: weeks.len(),
        night_hours: reported_hours(night_minutes),
        night_hours_by_day: nights
            .into_iter()
            .map(|(date, minutes)| (date, reported_hours(minutes)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RuleCode;
    use crate::rules::testing::{dec, make_date, resolved};
    use rust_decimal::Decimal;

    #[test]
    fn test_compliant_week_has_no_violations() {
        let shifts: Vec<_> = (7..=11)
            .map(|d| {
                let mut s = resolved("T1", &format!("2025-07-{:02}", d), "08:00", "16:30");
                s.shift.break_minutes = 30;
                crate::pipeline::resolve_shift(s.shift)
            })
            .collect();

        let evaluation = evaluate_agent("T1", &shifts, &RuleThresholds::default());
        assert!(evaluation.violations.is_empty());
        assert_eq!(evaluation.stats.total_hours, dec("40"));
        assert_eq!(evaluation.stats.days_worked, 5);
        assert_eq!(evaluation.stats.weeks_counted, 1);
        assert_eq!(evaluation.stats.night_hours, Decimal::ZERO);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let a = resolved("T1", "2025-07-01", "14:00", "22:00");
        let b = resolved("T1", "2025-07-02", "06:00", "14:00");

        let forward = evaluate_agent("T1", &[a.clone(), b.clone()], &RuleThresholds::default());
        let backward = evaluate_agent("T1", &[b, a], &RuleThresholds::default());
        assert_eq!(forward, backward);
        assert!(forward.violations.iter().any(|v| v.rule_code == RuleCode::DailyRest));
    }

    #[test]
    fn test_violations_follow_rule_order() {
        let mut night = resolved("M1", "2025-07-01", "20:00", "09:00");
        night.shift.is_minor = true;
        let evaluation = evaluate_agent("M1", &[night], &RuleThresholds::default());

        let codes: Vec<RuleCode> = evaluation.violations.iter().map(|v| v.rule_code).collect();
        assert_eq!(
            codes,
            vec![
                RuleCode::DailyMax,
                RuleCode::BreakRequired,
                RuleCode::MinorNightForbidden
            ]
        );
    }

    #[test]
    fn test_night_hours_are_reported_not_violations() {
        let shift = resolved("A1", "2025-07-01", "22:00", "06:00");
        let mut with_break = shift.shift.clone();
        with_break.break_minutes = 30;
        let shift = crate::pipeline::resolve_shift(with_break);

        let evaluation = evaluate_agent("A1", &[shift], &RuleThresholds::default());
        assert!(evaluation.violations.is_empty());
        assert_eq!(evaluation.stats.night_hours, dec("8"));
        assert_eq!(
            evaluation.stats.night_hours_by_day.get(&make_date("2025-07-02")),
            Some(&dec("6"))
        );
    }
}
