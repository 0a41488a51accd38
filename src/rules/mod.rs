//! Compliance rules.
//!
//! Each rule is a pure function of one agent's shifts and a thresholds
//! snapshot: maximum daily and weekly hours, the 12-week rolling average,
//! daily and weekly rest, consecutive working days, mandatory breaks and the
//! night prohibition for minors. Night-hours accounting is computed alongside
//! for statistics.

mod break_required;
mod calendar;
mod consecutive_days;
mod daily_max;
mod daily_rest;
mod engine;
mod minor_night;
mod night_hours;
mod rolling_average;
mod weekly_max;
mod weekly_rest;

pub use break_required::{LONG_SHIFT_MINUTES, check_break_required};
pub use calendar::{
    below_hours, exceeds_hours, minutes_to_hours, overlap_minutes, reported_hours,
    split_at_midnight, window_minutes_by_day, window_on_day,
};
pub use consecutive_days::{check_consecutive_days, worked_date_runs};
pub use daily_max::check_daily_max;
pub use daily_rest::check_daily_rest;
pub use engine::{AgentEvaluation, RULES, RuleCheck, agent_stats, evaluate_agent};
pub use minor_night::check_minor_night;
pub use night_hours::night_minutes_by_day;
pub use rolling_average::{AVERAGE_WINDOW_WEEKS, average_sequence, check_rolling_average};
pub use weekly_max::{check_weekly_max, weekly_minutes};
pub use weekly_rest::{check_weekly_rest, longest_rest_in_week};

#[cfg(test)]
pub(crate) mod testing {
    use std::str::FromStr;

    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal::Decimal;

    use crate::models::{CanonicalShift, ResolvedShift};
    use crate::pipeline::resolve_shift;

    pub(crate) fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    pub(crate) fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    /// A resolved shift with no break and no flags.
    pub(crate) fn resolved(agent: &str, date: &str, start: &str, end: &str) -> ResolvedShift {
        resolve_shift(CanonicalShift::new(
            agent,
            make_date(date),
            NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
            NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
        ))
    }
}
