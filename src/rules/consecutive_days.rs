//! CONSEC_DAYS: runs of consecutive worked calendar dates.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde_json::json;

use crate::config::RuleThresholds;
use crate::models::{Evidence, ResolvedShift, RuleCode, Violation, ViolationScope};

/// Runs of consecutive worked dates as `(first, last)` pairs, in date order.
///
/// # Example
///
/// ```
/// use shift_compliance::rules::worked_date_runs;
/// use chrono::NaiveDate;
///
/// let d = |day| NaiveDate::from_ymd_opt(2025, 7, day).unwrap();
/// let runs = worked_date_runs([d(1), d(2), d(3), d(5), d(2)]);
/// assert_eq!(runs, vec![(d(1), d(3)), (d(5), d(5))]);
/// ```
pub fn worked_date_runs(dates: impl IntoIterator<Item = NaiveDate>) -> Vec<(NaiveDate, NaiveDate)> {
    let dates: BTreeSet<NaiveDate> = dates.into_iter().collect();
    let mut runs: Vec<(NaiveDate, NaiveDate)> = Vec::new();

    for date in dates {
        let extends = runs
            .last()
            .is_some_and(|(_, last)| *last + Duration::days(1) == date);
        match runs.last_mut() {
            Some(run) if extends => run.1 = date,
            _ => runs.push((date, date)),
        }
    }

    runs
}

/// Flags every run longer than `max_consecutive_work_days`.
///
/// The violation is scoped to the first day beyond the limit; the evidence
/// carries the full run length.
pub fn check_consecutive_days(
    agent_id: &str,
    shifts: &[ResolvedShift],
    thresholds: &RuleThresholds,
) -> Vec<Violation> {
    let limit = i64::from(thresholds.max_consecutive_work_days);

    worked_date_runs(shifts.iter().map(|s| s.date()))
        .into_iter()
        .filter_map(|(first, last)| {
            let length = (last - first).num_days() + 1;
            if length <= limit {
                return None;
            }

            let crossed_on = first + Duration::days(limit);
            Some(Violation::new(
                agent_id,
                RuleCode::ConsecDays,
                ViolationScope::Date { date: crossed_on },
                format!(
                    "{} consecutive days worked from {} to {} exceed the limit of {}",
                    length, first, last, limit
                ),
                Evidence::new(Decimal::from(length), Decimal::from(limit), "days")
                    .with("run_start", json!(first))
                    .with("run_end", json!(last)),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::{dec, make_date, resolved};

    fn daily(from: u32, to: u32) -> Vec<ResolvedShift> {
        (from..=to)
            .map(|d| resolved("T1", &format!("2025-07-{:02}", d), "08:00", "12:00"))
            .collect()
    }

    #[test]
    fn test_six_days_is_compliant() {
        assert!(check_consecutive_days("T1", &daily(1, 6), &RuleThresholds::default()).is_empty());
    }

    #[test]
    fn test_seventh_day_violates() {
        let violations = check_consecutive_days("T1", &daily(1, 7), &RuleThresholds::default());

        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].scope,
            ViolationScope::Date {
                date: make_date("2025-07-07")
            }
        );
        assert_eq!(violations[0].evidence.measured, dec("7"));
        assert_eq!(violations[0].evidence.threshold, dec("6"));
    }

    #[test]
    fn test_long_run_is_reported_once() {
        let violations = check_consecutive_days("T1", &daily(1, 10), &RuleThresholds::default());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].evidence.measured, dec("10"));
        assert_eq!(violations[0].evidence.context["run_end"], json!("2025-07-10"));
    }

    #[test]
    fn test_gap_day_breaks_the_run() {
        let mut shifts = daily(1, 4);
        shifts.extend(daily(6, 9));
        assert!(check_consecutive_days("T1", &shifts, &RuleThresholds::default()).is_empty());
    }

    #[test]
    fn test_several_shifts_on_one_day_count_once() {
        let mut shifts = daily(1, 6);
        shifts.push(resolved("T1", "2025-07-03", "14:00", "18:00"));
        assert!(check_consecutive_days("T1", &shifts, &RuleThresholds::default()).is_empty());
    }

    #[test]
    fn test_two_separate_runs_each_violate() {
        let mut shifts = daily(1, 7);
        shifts.extend(daily(9, 15));
        let violations = check_consecutive_days("T1", &shifts, &RuleThresholds::default());
        assert_eq!(violations.len(), 2);
    }
}
