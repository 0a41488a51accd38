//! Core data models for the compliance engine.
//!
//! This module contains the domain models that flow through the pipeline,
//! from raw extracted tables to the final report.

mod raw;
mod report;
mod shift;
mod violation;

pub use raw::{DocumentFormat, ExtractedDocument, ExtractionMethod, RawTable};
pub use report::{AgentStats, IngestionSummary, Report};
pub use shift::{CanonicalShift, ResolvedShift};
pub use violation::{Evidence, IsoWeek, RuleCode, Severity, Violation, ViolationScope};
