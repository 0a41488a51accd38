//! Error types for the schedule compliance engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the ingestion and evaluation pipeline can surface.
//! Collaborator failures (spreadsheet reader, PDF parser, recognition
//! engine) are translated into these variants at the extraction boundary.

use thiserror::Error;

/// The main error type for the schedule compliance engine.
///
/// # Example
///
/// ```
/// use shift_compliance::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/file.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/file.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Neither the filename extension nor the declared content type name a supported format.
    #[error("Unsupported document format for '{filename}' (content type: {content_type})")]
    FormatUnsupported {
        /// The filename as received, empty when absent.
        filename: String,
        /// The declared content type, empty when absent.
        content_type: String,
    },

    /// No table could be extracted by the direct or recognition paths.
    #[error("No table could be extracted: {reason}")]
    EmptyExtraction {
        /// Why extraction produced nothing.
        reason: String,
    },

    /// Required canonical columns were not found after header normalization.
    #[error(
        "Missing required columns [{}] (detected: [{}])",
        .missing.join(", "),
        .detected.join(", ")
    )]
    MissingColumns {
        /// Canonical columns that could not be resolved.
        missing: Vec<String>,
        /// Canonical columns that were resolved.
        detected: Vec<String>,
    },

    /// A single row could not be turned into a shift.
    ///
    /// Recovered locally by dropping the row; never returned by `evaluate`.
    #[error("Row {row} could not be parsed: {message}")]
    UnparsableRow {
        /// The 1-based data row index within the document.
        row: usize,
        /// A description of what failed to parse.
        message: String,
    },

    /// Every row of the document was dropped.
    #[error("No usable rows: {rows_dropped} of {rows_read} rows could not be parsed")]
    NoUsableRows {
        /// Number of data rows read from the document.
        rows_read: usize,
        /// Number of rows dropped as unparsable.
        rows_dropped: usize,
    },

    /// Extraction (including page recognition) exceeded its deadline.
    #[error("Text recognition exceeded its deadline ({elapsed_ms} ms > {deadline_ms} ms)")]
    RecognitionTimeout {
        /// Milliseconds spent before giving up.
        elapsed_ms: u64,
        /// The configured deadline in milliseconds.
        deadline_ms: u64,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A threshold value is out of range or inconsistent with another.
    #[error("Invalid threshold '{field}': {message}")]
    InvalidThresholds {
        /// The offending field.
        field: String,
        /// A description of the problem.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
