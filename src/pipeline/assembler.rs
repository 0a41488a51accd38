//! Report assembly: a pure merge of per-agent results.

use std::collections::BTreeMap;

use crate::models::{IngestionSummary, Report};
use crate::rules::AgentEvaluation;

/// Merges per-agent evaluations into one report.
///
/// Agents are listed in ascending identifier order whatever the input order.
/// The period runs from the earliest to the latest shift date of any agent.
///
/// # Example
///
/// ```
/// use shift_compliance::pipeline::assemble_report;
///
/// let report = assemble_report(Vec::new(), None);
/// assert!(report.agents.is_empty());
/// assert!(report.period_start.is_none());
/// assert!(report.is_compliant());
/// ```
pub fn assemble_report(
    mut evaluations: Vec<AgentEvaluation>,
    ingestion: Option<IngestionSummary>,
) -> Report {
    evaluations.sort_by(|a, b| a.stats.agent_id.cmp(&b.stats.agent_id));

    let period_start = evaluations.iter().filter_map(|e| e.first_date).min();
    let period_end = evaluations.iter().filter_map(|e| e.last_date).max();

    let mut agents = Vec::with_capacity(evaluations.len());
    let mut stats = Vec::with_capacity(evaluations.len());
    let mut violations = Vec::new();
    let mut violation_counts = BTreeMap::new();

    for evaluation in evaluations {
        for violation in &evaluation.violations {
            *violation_counts.entry(violation.rule_code).or_insert(0) += 1;
        }
        agents.push(evaluation.stats.agent_id.clone());
        stats.push(evaluation.stats);
        violations.extend(evaluation.violations);
    }

    Report {
        period_start,
        period_end,
        agents,
        stats,
        violations,
        violation_counts,
        ingestion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleThresholds;
    use crate::models::RuleCode;
    use crate::rules::evaluate_agent;
    use crate::rules::testing::{make_date, resolved};

    #[test]
    fn test_agents_sorted_and_period_spans_all_agents() {
        let thresholds = RuleThresholds::default();
        let late = evaluate_agent(
            "Z9",
            &[resolved("Z9", "2025-07-20", "08:00", "12:00")],
            &thresholds,
        );
        let early = evaluate_agent(
            "A1",
            &[
                resolved("A1", "2025-07-03", "08:00", "20:00"),
                resolved("A1", "2025-07-05", "08:00", "12:00"),
            ],
            &thresholds,
        );

        let report = assemble_report(vec![late, early], None);

        assert_eq!(report.agents, vec!["A1", "Z9"]);
        assert_eq!(report.stats[0].agent_id, "A1");
        assert_eq!(report.period_start, Some(make_date("2025-07-03")));
        assert_eq!(report.period_end, Some(make_date("2025-07-20")));
        assert_eq!(report.violation_counts.get(&RuleCode::DailyMax), Some(&1));
        assert_eq!(report.violations_for("A1").count(), report.violations.len());
    }

    #[test]
    fn test_report_serializes_to_plain_json() {
        let evaluation = evaluate_agent(
            "T1",
            &[resolved("T1", "2025-07-01", "08:00", "20:00")],
            &RuleThresholds::default(),
        );
        let report = assemble_report(vec![evaluation], None);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["period_start"], "2025-07-01");
        assert_eq!(value["violations"][0]["rule_code"], "DAILY_MAX");
        assert_eq!(value["violations"][0]["severity"], "high");
        assert_eq!(value["violations"][0]["scope"]["kind"], "date");
        assert_eq!(value["violation_counts"]["BREAK_REQUIRED"], 1);
        assert!(value.get("ingestion").is_none());
    }
}
