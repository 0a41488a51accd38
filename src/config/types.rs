//! Configuration types for compliance evaluation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Every field carries a
//! serde default so partial files override only what they name.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Labour-law caps applied to an agent's roster.
///
/// A value of this type is an immutable snapshot: the engine receives it by
/// reference for the whole of one evaluation.
///
/// # Example
///
/// ```
/// use shift_compliance::config::RuleThresholds;
/// use rust_decimal::Decimal;
///
/// let thresholds = RuleThresholds::default();
/// assert_eq!(thresholds.max_daily_hours, Decimal::new(10, 0));
/// assert_eq!(thresholds.max_consecutive_work_days, 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleThresholds {
    /// Daily cap on worked hours.
    pub max_daily_hours: Decimal,
    /// Daily cap when a shift on that day carries the 12h derogation.
    pub max_daily_hours_with_derogation: Decimal,
    /// Cap on hours within one ISO week.
    pub max_weekly_hours: Decimal,
    /// Cap on the mean weekly hours over a 12-week window.
    pub avg_weekly_hours_over_12_weeks: Decimal,
    /// Minimum rest between two consecutive shifts.
    pub min_daily_rest_hours: Decimal,
    /// Minimum rest between two consecutive shifts when either is worked by a minor.
    pub minor_min_daily_rest_hours: Decimal,
    /// Minimum uninterrupted rest that must occur within each ISO week.
    pub min_weekly_rest_hours: Decimal,
    /// Minimum declared break for shifts of six hours or more.
    pub min_break_minutes_after_6h: u32,
    /// Longest allowed run of consecutive worked calendar days.
    pub max_consecutive_work_days: u32,
    /// Start of the night window used for night-hours accounting.
    pub night_start_hour: NaiveTime,
    /// End of the night window used for night-hours accounting.
    pub night_end_hour: NaiveTime,
    /// Start of the window in which minors may not work.
    pub minor_night_forbidden_start: NaiveTime,
    /// End of the window in which minors may not work.
    pub minor_night_forbidden_end: NaiveTime,
    /// Count ISO weeks without shifts as zero-hour weeks in the 12-week average.
    pub pad_empty_weeks_in_average: bool,
}

fn clock(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            max_daily_hours: Decimal::new(10, 0),
            max_daily_hours_with_derogation: Decimal::new(12, 0),
            max_weekly_hours: Decimal::new(48, 0),
            avg_weekly_hours_over_12_weeks: Decimal::new(44, 0),
            min_daily_rest_hours: Decimal::new(11, 0),
            minor_min_daily_rest_hours: Decimal::new(12, 0),
            min_weekly_rest_hours: Decimal::new(35, 0),
            min_break_minutes_after_6h: 20,
            max_consecutive_work_days: 6,
            night_start_hour: clock(21),
            night_end_hour: clock(6),
            minor_night_forbidden_start: clock(22),
            minor_night_forbidden_end: clock(6),
            pad_empty_weeks_in_average: false,
        }
    }
}

impl RuleThresholds {
    /// Checks that every cap is positive and that paired caps are consistent.
    ///
    /// # Returns
    ///
    /// `Ok(())` when the thresholds are usable, otherwise
    /// [`EngineError::InvalidThresholds`] naming the first offending field.
    ///
    /// # Example
    ///
    /// ```
    /// use shift_compliance::config::RuleThresholds;
    /// use rust_decimal::Decimal;
    ///
    /// let mut thresholds = RuleThresholds::default();
    /// assert!(thresholds.validate().is_ok());
    ///
    /// thresholds.max_weekly_hours = Decimal::ZERO;
    /// assert!(thresholds.validate().is_err());
    /// ```
    pub fn validate(&self) -> EngineResult<()> {
        let hour_caps = [
            ("max_daily_hours", self.max_daily_hours),
            (
                "max_daily_hours_with_derogation",
                self.max_daily_hours_with_derogation,
            ),
            ("max_weekly_hours", self.max_weekly_hours),
            (
                "avg_weekly_hours_over_12_weeks",
                self.avg_weekly_hours_over_12_weeks,
            ),
            ("min_daily_rest_hours", self.min_daily_rest_hours),
            ("minor_min_daily_rest_hours", self.minor_min_daily_rest_hours),
            ("min_weekly_rest_hours", self.min_weekly_rest_hours),
        ];

        for (field, value) in hour_caps {
            if value <= Decimal::ZERO {
                return Err(EngineError::InvalidThresholds {
                    field: field.to_string(),
                    message: format!("must be greater than zero, got {}", value),
                });
            }
        }

        if self.max_daily_hours_with_derogation < self.max_daily_hours {
            return Err(EngineError::InvalidThresholds {
                field: "max_daily_hours_with_derogation".to_string(),
                message: format!(
                    "{} is below max_daily_hours {}",
                    self.max_daily_hours_with_derogation, self.max_daily_hours
                ),
            });
        }

        if self.max_consecutive_work_days == 0 {
            return Err(EngineError::InvalidThresholds {
                field: "max_consecutive_work_days".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Settings for turning documents into canonical rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionSettings {
    /// chrono format strings tried in order before the fallback date grammar.
    pub date_formats: Vec<String>,
    /// Whether ambiguous `a/b/yyyy` dates are read day-first in the fallback.
    pub day_first: bool,
    /// Deadline for extraction, including page recognition, in milliseconds.
    pub recognition_deadline_ms: u64,
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            date_formats: ["%Y-%m-%d", "%d/%m/%Y", "%d/%m/%y", "%d-%m-%Y", "%d.%m.%Y"]
                .iter()
                .map(|f| f.to_string())
                .collect(),
            day_first: true,
            recognition_deadline_ms: 30_000,
        }
    }
}
