//! The evaluation pipeline.
//!
//! bytes and filename → format detection → table extraction → column
//! normalization → interval construction → per-agent rule evaluation →
//! report assembly.
//!
//! An [`Evaluator`] holds one thresholds snapshot for its whole life. Callers
//! that hot-reload thresholds build a new evaluator per request from
//! [`crate::config::ThresholdStore::snapshot`].

mod assembler;
mod builder;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::{IngestionSettings, RuleThresholds};
use crate::error::{EngineError, EngineResult};
use crate::ingest::{TableExtractor, TextRecognizer, detect_format, sniff_format};
use crate::models::{CanonicalShift, DocumentFormat, IngestionSummary, Report};
use crate::normalize::ColumnNormalizer;
use crate::rules::evaluate_agent;

pub use assembler::assemble_report;
pub use builder::{build_agent_shifts, resolve_shift};

/// Runs documents or shift lists through the whole pipeline.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use shift_compliance::config::{IngestionSettings, RuleThresholds};
/// use shift_compliance::models::RuleCode;
/// use shift_compliance::pipeline::Evaluator;
///
/// let evaluator = Evaluator::new(Arc::new(RuleThresholds::default()), IngestionSettings::default());
/// let csv = "Matricule;Date;Début;Fin;Pause\nT1;01/07/2025;08:00;20:00;30\nT1;02/07/2025;08:00;18:00;30\n";
///
/// let report = evaluator.evaluate(csv.as_bytes(), Some("planning.csv"), None).unwrap();
/// assert_eq!(report.agents, vec!["T1"]);
/// assert_eq!(report.violations.len(), 1);
/// assert_eq!(report.violations[0].rule_code, RuleCode::DailyMax);
/// ```
#[derive(Clone)]
pub struct Evaluator {
    thresholds: Arc<RuleThresholds>,
    settings: IngestionSettings,
    extractor: TableExtractor,
}

impl Evaluator {
    /// Creates an evaluator with the default extractor and no recognition backend.
    pub fn new(thresholds: Arc<RuleThresholds>, settings: IngestionSettings) -> Self {
        let extractor =
            TableExtractor::default().with_deadline(Duration::from_millis(settings.recognition_deadline_ms));
        Self {
            thresholds,
            settings,
            extractor,
        }
    }

    /// Uses `recognizer` for scanned pages.
    pub fn with_recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.extractor = TableExtractor::new(recognizer).with_deadline(self.deadline());
        self
    }

    /// Replaces the table extractor.
    pub fn with_extractor(mut self, extractor: TableExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// The thresholds snapshot this evaluator applies.
    pub fn thresholds(&self) -> &RuleThresholds {
        &self.thresholds
    }

    /// Deadline for a whole document evaluation.
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.settings.recognition_deadline_ms)
    }

    /// Evaluates one document.
    ///
    /// The filename extension decides the format; the content type is
    /// consulted when the extension is missing or unknown, and the leading
    /// bytes last.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The document content
    /// * `filename` - Original file name, if known
    /// * `content_type` - Declared MIME type, if any
    ///
    /// # Returns
    ///
    /// The report, or the first file-level error. Unparsable rows are
    /// dropped and counted in [`Report::ingestion`].
    pub fn evaluate(
        &self,
        bytes: &[u8],
        filename: Option<&str>,
        content_type: Option<&str>,
    ) -> EngineResult<Report> {
        let started = Instant::now();

        let format = match detect_format(filename, content_type) {
            DocumentFormat::Unknown => sniff_format(bytes),
            known => known,
        };
        if format == DocumentFormat::Unknown {
            return Err(EngineError::FormatUnsupported {
                filename: filename.unwrap_or_default().to_string(),
                content_type: content_type.unwrap_or_default().to_string(),
            });
        }

        let document = self.extractor.extract(bytes, format)?;
        let rows = ColumnNormalizer::new(self.settings.clone()).normalize(&document.tables)?;

        let summary = IngestionSummary {
            format: document.format,
            method: document.method,
            rows_read: rows.rows_read,
            rows_dropped: rows.rows_dropped,
            shifts_evaluated: rows.shifts.len(),
            columns: rows.columns,
        };
        let report = self.run(rows.shifts, Some(summary));

        info!(
            format = %format,
            agents = report.agents.len(),
            violations = report.violations.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Evaluation complete"
        );
        Ok(report)
    }

    /// Evaluates shifts that are already in canonical form.
    pub fn evaluate_shifts(&self, shifts: Vec<CanonicalShift>) -> Report {
        self.run(shifts, None)
    }

    /// Evaluates one document on the blocking pool, bounded by [`Self::deadline`].
    ///
    /// Expiry is reported as [`EngineError::RecognitionTimeout`]. The blocking
    /// task itself stops at its next deadline check.
    pub async fn evaluate_with_deadline(
        &self,
        bytes: Vec<u8>,
        filename: Option<String>,
        content_type: Option<String>,
    ) -> EngineResult<Report> {
        let deadline = self.deadline();
        let evaluator = self.clone();
        let task = tokio::task::spawn_blocking(move || {
            evaluator.evaluate(&bytes, filename.as_deref(), content_type.as_deref())
        });

        match tokio::time::timeout(deadline, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(EngineError::EmptyExtraction {
                reason: format!("evaluation task failed: {}", join_error),
            }),
            Err(_) => {
                warn!(deadline_ms = deadline.as_millis() as u64, "Evaluation deadline exceeded");
                Err(EngineError::RecognitionTimeout {
                    elapsed_ms: deadline.as_millis() as u64,
                    deadline_ms: deadline.as_millis() as u64,
                })
            }
        }
    }

    fn run(&self, shifts: Vec<CanonicalShift>, ingestion: Option<IngestionSummary>) -> Report {
        let evaluations = build_agent_shifts(shifts)
            .iter()
            .map(|(agent_id, agent_shifts)| evaluate_agent(agent_id, agent_shifts, &self.thresholds))
            .collect();
        assemble_report(evaluations, ingestion)
    }
}
