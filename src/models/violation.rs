//! Violation model and its scope types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The closed set of compliance rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RuleCode {
    /// Daily worked hours above the daily cap.
    #[serde(rename = "DAILY_MAX")]
    DailyMax,
    /// ISO-week worked hours above the weekly cap.
    #[serde(rename = "WEEKLY_MAX")]
    WeeklyMax,
    /// Mean weekly hours over 12 weeks above the average cap.
    #[serde(rename = "AVG_12W")]
    Avg12w,
    /// Rest between two shifts below the daily minimum.
    #[serde(rename = "DAILY_REST")]
    DailyRest,
    /// No rest period within an ISO week reaches the weekly minimum.
    #[serde(rename = "WEEKLY_REST")]
    WeeklyRest,
    /// Too many consecutive worked calendar days.
    #[serde(rename = "CONSEC_DAYS")]
    ConsecDays,
    /// Long shift without the minimum break.
    #[serde(rename = "BREAK_REQUIRED")]
    BreakRequired,
    /// A minor worked inside the forbidden night window.
    #[serde(rename = "MINOR_NIGHT_FORBIDDEN")]
    MinorNightForbidden,
}

impl RuleCode {
    /// Wire name of the rule.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCode::DailyMax => "DAILY_MAX",
            RuleCode::WeeklyMax => "WEEKLY_MAX",
            RuleCode::Avg12w => "AVG_12W",
            RuleCode::DailyRest => "DAILY_REST",
            RuleCode::WeeklyRest => "WEEKLY_REST",
            RuleCode::ConsecDays => "CONSEC_DAYS",
            RuleCode::BreakRequired => "BREAK_REQUIRED",
            RuleCode::MinorNightForbidden => "MINOR_NIGHT_FORBIDDEN",
        }
    }

    /// Fixed severity attached to every violation of this rule.
    pub fn severity(&self) -> Severity {
        match self {
            RuleCode::MinorNightForbidden => Severity::Critical,
            RuleCode::DailyMax
            | RuleCode::WeeklyMax
            | RuleCode::DailyRest
            | RuleCode::WeeklyRest
            | RuleCode::ConsecDays => Severity::High,
            RuleCode::Avg12w | RuleCode::BreakRequired => Severity::Medium,
        }
    }
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How serious a violation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Needs review.
    Medium,
    /// Breach of a hard cap.
    High,
    /// Breach of a protection for minors.
    Critical,
}

/// An ISO 8601 (year, week) pair, rendered as `2025-W07`.
///
/// # Example
///
/// ```
/// use shift_compliance::models::IsoWeek;
/// use chrono::NaiveDate;
///
/// // 2024-12-30 is a Monday belonging to the first ISO week of 2025.
/// let week = IsoWeek::of(NaiveDate::from_ymd_opt(2024, 12, 30).unwrap());
/// assert_eq!(week.to_string(), "2025-W01");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct IsoWeek {
    /// ISO week-numbering year.
    pub year: i32,
    /// ISO week number, 1 to 53.
    pub week: u32,
}

impl IsoWeek {
    /// The ISO week containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    /// The Monday opening this week.
    pub fn monday(&self) -> Option<NaiveDate> {
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon)
    }
}

impl fmt::Display for IsoWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

impl From<IsoWeek> for String {
    fn from(week: IsoWeek) -> Self {
        week.to_string()
    }
}

impl FromStr for IsoWeek {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, week) = s
            .split_once("-W")
            .ok_or_else(|| format!("invalid ISO week '{}'", s))?;
        let year: i32 = year.parse().map_err(|_| format!("invalid ISO year in '{}'", s))?;
        let week: u32 = week.parse().map_err(|_| format!("invalid ISO week in '{}'", s))?;
        if NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).is_none() {
            return Err(format!("ISO week '{}' does not exist", s));
        }
        Ok(Self { year, week })
    }
}

impl TryFrom<String> for IsoWeek {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// What a violation refers to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationScope {
    /// A single calendar date.
    Date {
        /// The date.
        date: NaiveDate,
    },
    /// A single ISO week.
    Week {
        /// The week.
        week: IsoWeek,
    },
    /// A run of ISO weeks, first and last inclusive.
    WeekRange {
        /// First week of the run.
        first: IsoWeek,
        /// Last week of the run.
        last: IsoWeek,
    },
}

impl fmt::Display for ViolationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationScope::Date { date } => write!(f, "{}", date),
            ViolationScope::Week { week } => write!(f, "{}", week),
            ViolationScope::WeekRange { first, last } => write!(f, "{}..{}", first, last),
        }
    }
}

/// The numbers behind a violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    /// The measured quantity.
    pub measured: Decimal,
    /// The threshold it was compared with.
    pub threshold: Decimal,
    /// Unit of both quantities: `hours`, `minutes` or `days`.
    pub unit: String,
    /// Rule-specific extra facts.
    #[serde(flatten)]
    pub context: BTreeMap<String, serde_json::Value>,
}

impl Evidence {
    /// Creates evidence without extra context.
    pub fn new(measured: Decimal, threshold: Decimal, unit: &str) -> Self {
        Self {
            measured,
            threshold,
            unit: unit.to_string(),
            context: BTreeMap::new(),
        }
    }

    /// Adds one context entry.
    pub fn with(mut self, key: &str, value: serde_json::Value) -> Self {
        self.context.insert(key.to_string(), value);
        self
    }
}

/// One breach of one rule by one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// The agent concerned.
    pub agent_id: String,
    /// The rule breached.
    pub rule_code: RuleCode,
    /// The date or week the breach is attributed to.
    pub scope: ViolationScope,
    /// Severity derived from the rule.
    pub severity: Severity,
    /// Human-readable summary.
    pub message: String,
    /// Measured value against threshold.
    pub evidence: Evidence,
}

impl Violation {
    /// Creates a violation, taking the severity from the rule code.
    pub fn new(
        agent_id: &str,
        rule_code: RuleCode,
        scope: ViolationScope,
        message: String,
        evidence: Evidence,
    ) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            rule_code,
            scope,
            severity: rule_code.severity(),
            message,
            evidence,
        }
    }
}
