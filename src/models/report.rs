//! The evaluation report and its per-agent statistics.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::raw::{DocumentFormat, ExtractionMethod};
use super::violation::{RuleCode, Violation};

/// Aggregate figures for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStats {
    /// The agent.
    pub agent_id: String,
    /// Worked hours net of breaks, rounded to 2 decimal places.
    pub total_hours: Decimal,
    /// Distinct calendar dates with at least one shift.
    pub days_worked: usize,
    /// Distinct ISO weeks with at least one shift.
    pub weeks_counted: usize,
    /// Hours inside the night window, rounded to 2 decimal places.
    pub night_hours: Decimal,
    /// Night hours per calendar day the overlap falls on.
    pub night_hours_by_day: BTreeMap<NaiveDate, Decimal>,
}

/// How the document was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionSummary {
    /// Detected document format.
    pub format: DocumentFormat,
    /// Extraction path that produced the rows.
    pub method: ExtractionMethod,
    /// Data rows read across all tables.
    pub rows_read: usize,
    /// Rows dropped because a date or time could not be parsed.
    pub rows_dropped: usize,
    /// Shifts handed to the rule engine.
    pub shifts_evaluated: usize,
    /// Canonical columns resolved from the headers.
    pub columns: Vec<String>,
}

/// The outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Earliest shift date across all agents.
    pub period_start: Option<NaiveDate>,
    /// Latest shift date across all agents.
    pub period_end: Option<NaiveDate>,
    /// Agent identifiers, sorted.
    pub agents: Vec<String>,
    /// Statistics, one entry per agent in `agents` order.
    pub stats: Vec<AgentStats>,
    /// All violations, grouped by agent in `agents` order.
    pub violations: Vec<Violation>,
    /// Number of violations per rule.
    pub violation_counts: BTreeMap<RuleCode, usize>,
    /// Ingestion details, absent when shifts were supplied directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingestion: Option<IngestionSummary>,
}

impl Report {
    /// True when no rule was breached.
    pub fn is_compliant(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations of one agent.
    pub fn violations_for<'a>(&'a self, agent_id: &'a str) -> impl Iterator<Item = &'a Violation> {
        self.violations.iter().filter(move |v| v.agent_id == agent_id)
    }

    /// Statistics of one agent.
    pub fn stats_for(&self, agent_id: &str) -> Option<&AgentStats> {
        self.stats.iter().find(|s| s.agent_id == agent_id)
    }
}
