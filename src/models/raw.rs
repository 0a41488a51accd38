//! Raw tables as they come out of a document, before any interpretation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Document family, as classified from filename and content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    /// Delimited text (`.csv`, `.tsv`, `.txt`).
    Delimited,
    /// Workbook (`.xlsx`, `.xls`, `.xlsm`, `.ods`).
    Spreadsheet,
    /// Paginated document (`.pdf`).
    PageBased,
    /// Not recognized.
    Unknown,
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentFormat::Delimited => "delimited",
            DocumentFormat::Spreadsheet => "spreadsheet",
            DocumentFormat::PageBased => "page_based",
            DocumentFormat::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Which extraction path produced the tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Delimited text parsed directly.
    Delimited,
    /// First worksheet of a workbook.
    Spreadsheet,
    /// Text layer of a digital PDF.
    PdfText,
    /// Text recognized from page images.
    Recognition,
}

/// A header row plus data rows, cells kept as trimmed text.
///
/// Rows may be shorter or longer than the header; missing cells read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    /// Header cells in source order.
    pub headers: Vec<String>,
    /// Data rows in source order.
    pub rows: Vec<Vec<String>>,
    /// 1-based page the table was found on, for page-based documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
}

impl RawTable {
    /// Creates a table from a header row and data rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers,
            rows,
            page: None,
        }
    }

    /// Creates a table whose first row is the header. Returns `None` for no rows.
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let headers = rows.remove(0);
        Some(Self::new(headers, rows))
    }

    /// Number of header cells.
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// True when the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The cell at `row`, `column`, or `""` when absent.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// One data row keyed by source header text.
    pub fn record(&self, row: usize) -> BTreeMap<&str, &str> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), self.cell(row, i)))
            .collect()
    }
}

/// Everything extraction found in one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// Detected format.
    pub format: DocumentFormat,
    /// Path that produced the tables.
    pub method: ExtractionMethod,
    /// Non-empty tables in document order.
    pub tables: Vec<RawTable>,
}
