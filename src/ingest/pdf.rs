//! Table extraction from the text layer of digital PDFs.
//!
//! Lines are split into cells on tabs, pipes, or runs of two or more
//! whitespace characters. A table is a run of consecutive lines that
//! split into at least two cells, header included.

use std::panic::{AssertUnwindSafe, catch_unwind};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::RawTable;

use super::ExtractionError;

// Tabs, pipes, or two or more whitespace characters.
static CELL_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\t+|\s*\|\s*|\s{2,}").unwrap());

/// Reads the text layer of a PDF, one string per page.
///
/// Implemented as a trait so extraction can be tested without real PDFs.
pub trait PdfTextSource: Send + Sync {
    /// Returns the text of every page in order.
    fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError>;
}

/// [`PdfTextSource`] backed by the `pdf-extract` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextLayer;

impl PdfTextSource for PdfTextLayer {
    fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
        }))
        .map_err(|_| ExtractionError::PdfParsing("text extraction panicked".to_string()))?
        .map_err(|e| ExtractionError::PdfParsing(e.to_string()))
    }
}

/// Splits one text line into trimmed, non-empty cells.
///
/// # Example
///
/// ```
/// use shift_compliance::ingest::split_columns;
///
/// assert_eq!(
///     split_columns("A1   01/07/2025  08:00   16:00"),
///     vec!["A1", "01/07/2025", "08:00", "16:00"]
/// );
/// assert_eq!(split_columns("Planning juillet"), vec!["Planning juillet"]);
/// ```
pub fn split_columns(line: &str) -> Vec<String> {
    let trimmed = line.trim().trim_matches('|');
    CELL_GAP
        .split(trimmed)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Finds tables in the text of one page.
///
/// Runs of fewer than two tabular lines (a header with no data) are ignored.
pub fn tables_from_page_text(text: &str, page: usize) -> Vec<RawTable> {
    let mut tables = Vec::new();
    let mut current: Vec<Vec<String>> = Vec::new();

    let mut flush = |current: &mut Vec<Vec<String>>| {
        if current.len() >= 2 {
            if let Some(mut table) = RawTable::from_rows(std::mem::take(current)) {
                table.page = Some(page);
                tables.push(table);
            }
        }
        current.clear();
    };

    for line in text.lines() {
        let cells = split_columns(line);
        if cells.len() >= 2 {
            current.push(cells);
        } else {
            flush(&mut current);
        }
    }
    flush(&mut current);

    tables
}
