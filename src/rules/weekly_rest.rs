//! WEEKLY_REST: longest uninterrupted rest within each ISO week.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde_json::json;

use crate::config::RuleThresholds;
use crate::models::{Evidence, IsoWeek, ResolvedShift, RuleCode, Violation, ViolationScope};

use super::calendar::{below_hours, reported_hours};

/// Longest free gap in minutes inside `week`, counting the gaps from Monday
/// 00:00 to the first shift and from the last shift to the next Monday.
///
/// `rest_from` is the latest end of any earlier shift; an overnight shift
/// started the previous Sunday pushes the opening gap past Monday 00:00.
/// `shifts` are the week's shifts in start order.
pub fn longest_rest_in_week(
    week: IsoWeek,
    rest_from: Option<NaiveDateTime>,
    shifts: &[&ResolvedShift],
) -> Option<i64> {
    let week_start = week.monday()?.and_time(NaiveTime::MIN);
    let week_end = week_start + Duration::weeks(1);

    let mut cursor = rest_from.map_or(week_start, |end| week_start.max(end));
    let mut longest = 0;
    for shift in shifts {
        longest = longest.max((shift.start_instant - cursor).num_minutes());
        cursor = cursor.max(shift.end_instant);
    }
    longest = longest.max((week_end - cursor).num_minutes());

    Some(longest)
}

/// Checks that every ISO week with shifts contains a long enough rest.
pub fn check_weekly_rest(
    agent_id: &str,
    shifts: &[ResolvedShift],
    thresholds: &RuleThresholds,
) -> Vec<Violation> {
    let threshold = thresholds.min_weekly_rest_hours;

    let mut weeks: BTreeMap<IsoWeek, Vec<&ResolvedShift>> = BTreeMap::new();
    for shift in shifts {
        weeks.entry(shift.iso_week()).or_default().push(shift);
    }

    let mut latest_end: Option<NaiveDateTime> = None;
    weeks
        .into_iter()
        .filter_map(|(week, week_shifts)| {
            let rest_from = latest_end;
            latest_end = week_shifts
                .iter()
                .map(|shift| shift.end_instant)
                .chain(rest_from)
                .max();

            let longest = longest_rest_in_week(week, rest_from, &week_shifts)?;
            if !below_hours(longest, threshold) {
                return None;
            }

            let measured = reported_hours(longest);
            Some(Violation::new(
                agent_id,
                RuleCode::WeeklyRest,
                ViolationScope::Week { week },
                format!(
                    "Longest rest in week {} is {}h, below the {}h weekly minimum",
                    week,
                    measured.normalize(),
                    threshold.normalize()
                ),
                Evidence::new(measured, threshold, "hours").with("shifts", json!(week_shifts.len())),
            ))
        })
        .collect()
}
