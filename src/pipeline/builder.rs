//! Interval construction.
//!
//! Anchors canonical rows to absolute instants, applying overnight rollover,
//! and groups the result per agent in start order.

use std::collections::BTreeMap;

use chrono::Duration;

use crate::models::{CanonicalShift, ResolvedShift};
use crate::rules::minutes_to_hours;

/// Anchors a shift to absolute instants.
///
/// When the same-day end is not after the start, the end moves to the next
/// calendar day. Worked minutes are the raw span less the declared break,
/// floored at zero.
///
/// # Example
///
/// ```
/// use shift_compliance::models::CanonicalShift;
/// use shift_compliance::pipeline::resolve_shift;
/// use chrono::{NaiveDate, NaiveTime};
/// use rust_decimal::Decimal;
///
/// let date = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
/// let clock = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
///
/// let mut shift = CanonicalShift::new("T1", date, clock(8), clock(18));
/// shift.break_minutes = 30;
/// let resolved = resolve_shift(shift);
/// assert_eq!(resolved.duration_hours, Decimal::new(95, 1));
///
/// let overnight = resolve_shift(CanonicalShift::new("T1", date, clock(22), clock(6)));
/// assert_eq!(overnight.end_instant.date(), date.succ_opt().unwrap());
/// assert_eq!(overnight.worked_minutes, 480);
/// ```
pub fn resolve_shift(shift: CanonicalShift) -> ResolvedShift {
    let start_instant = shift.date.and_time(shift.start);
    let mut end_instant = shift.date.and_time(shift.end);
    if end_instant <= start_instant {
        end_instant += Duration::days(1);
    }

    let span = (end_instant - start_instant).num_minutes();
    let worked_minutes = (span - i64::from(shift.break_minutes)).max(0);

    ResolvedShift {
        shift,
        start_instant,
        end_instant,
        worked_minutes,
        duration_hours: minutes_to_hours(worked_minutes),
    }
}

/// Resolves every shift and groups them by agent, each list sorted by start.
///
/// Agents come out in ascending identifier order. Shifts with the same
/// start keep their input order.
pub fn build_agent_shifts(shifts: Vec<CanonicalShift>) -> BTreeMap<String, Vec<ResolvedShift>> {
    let mut by_agent: BTreeMap<String, Vec<ResolvedShift>> = BTreeMap::new();

    for shift in shifts {
        let resolved = resolve_shift(shift);
        by_agent
            .entry(resolved.shift.agent_id.clone())
            .or_default()
            .push(resolved);
    }

    for agent_shifts in by_agent.values_mut() {
        agent_shifts.sort_by_key(|s| s.start_instant);
    }

    by_agent
}
