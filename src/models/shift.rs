//! Shift models.
//!
//! A [`CanonicalShift`] is one roster row after header normalization; a
//! [`ResolvedShift`] anchors it to absolute instants and carries its worked
//! duration net of break.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::violation::IsoWeek;

/// One roster row in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalShift {
    /// Stable agent identifier, taken from the document or synthesized.
    pub agent_id: String,
    /// Calendar date the shift starts on.
    pub date: NaiveDate,
    /// Clock time the shift starts.
    pub start: NaiveTime,
    /// Clock time the shift ends, possibly on the next day.
    pub end: NaiveTime,
    /// Declared unpaid break.
    #[serde(default)]
    pub break_minutes: u32,
    /// The shift is covered by a 12h daily derogation.
    #[serde(default)]
    pub has_daily_derogation_12h: bool,
    /// The agent is under 18.
    #[serde(default)]
    pub is_minor: bool,
    /// The agent holds night-worker status.
    #[serde(default)]
    pub is_night_worker: bool,
    /// Display name, when the document carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Site the shift is worked at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    /// Employing company.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employer: Option<String>,
}

impl CanonicalShift {
    /// Creates a shift with no break, no flags and no descriptive fields.
    ///
    /// # Example
    ///
    /// ```
    /// use shift_compliance::models::CanonicalShift;
    /// use chrono::{NaiveDate, NaiveTime};
    ///
    /// let shift = CanonicalShift::new(
    ///     "T1",
    ///     NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
    ///     NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
    ///     NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
    /// );
    /// assert_eq!(shift.break_minutes, 0);
    /// assert!(!shift.is_minor);
    /// ```
    pub fn new(agent_id: impl Into<String>, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            agent_id: agent_id.into(),
            date,
            start,
            end,
            break_minutes: 0,
            has_daily_derogation_12h: false,
            is_minor: false,
            is_night_worker: false,
            name: None,
            site: None,
            employer: None,
        }
    }
}

/// A shift anchored to absolute instants.
///
/// Invariant: `end_instant > start_instant`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedShift {
    /// The canonical row this shift was built from.
    #[serde(flatten)]
    pub shift: CanonicalShift,
    /// Absolute start.
    pub start_instant: NaiveDateTime,
    /// Absolute end, one day after `date` for overnight shifts.
    pub end_instant: NaiveDateTime,
    /// Worked minutes net of break, never negative.
    pub worked_minutes: i64,
    /// `worked_minutes` expressed in hours.
    pub duration_hours: Decimal,
}

impl ResolvedShift {
    /// The calendar date the shift is attributed to.
    pub fn date(&self) -> NaiveDate {
        self.shift.date
    }

    /// The agent who worked the shift.
    pub fn agent_id(&self) -> &str {
        &self.shift.agent_id
    }

    /// The ISO week of the shift's date.
    pub fn iso_week(&self) -> IsoWeek {
        IsoWeek::of(self.shift.date)
    }

    /// Raw interval length in minutes, break included.
    pub fn span_minutes(&self) -> i64 {
        (self.end_instant - self.start_instant).num_minutes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn make_time(time_str: &str) -> NaiveTime {
        NaiveTime::parse_from_str(time_str, "%H:%M").unwrap()
    }

    #[test]
    fn test_canonical_shift_deserializes_with_defaults() {
        let json = r#"{"agent_id":"A1","date":"2025-07-01","start":"08:00:00","end":"16:00:00"}"#;
        let shift: CanonicalShift = serde_json::from_str(json).unwrap();
        assert_eq!(shift.agent_id, "A1");
        assert_eq!(shift.break_minutes, 0);
        assert!(!shift.has_daily_derogation_12h);
        assert!(shift.name.is_none());
    }

    #[test]
    fn test_resolved_shift_flattens_canonical_fields() {
        let shift = CanonicalShift::new(
            "A1",
            make_date("2025-07-01"),
            make_time("22:00"),
            make_time("06:00"),
        );
        let resolved = ResolvedShift {
            shift,
            start_instant: make_date("2025-07-01").and_time(make_time("22:00")),
            end_instant: make_date("2025-07-02").and_time(make_time("06:00")),
            worked_minutes: 480,
            duration_hours: Decimal::new(8, 0),
        };

        let value = serde_json::to_value(&resolved).unwrap();
        assert_eq!(value["agent_id"], "A1");
        assert_eq!(value["duration_hours"], "8");
        assert_eq!(resolved.span_minutes(), 480);
        assert_eq!(resolved.iso_week().to_string(), "2025-W27");
    }
}
