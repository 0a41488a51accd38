//! Document ingestion: format detection and table extraction.
//!
//! Delimited and spreadsheet documents are parsed directly. Page-based
//! documents are read from their text layer first; only when no page yields
//! a table are page images handed to the injected [`TextRecognizer`].
//!
//! Collaborator failures surface here as [`ExtractionError`] and leave this
//! module as [`EngineError`] values.

mod delimited;
mod format;
mod pdf;
mod recognition;
mod scan;
mod spreadsheet;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{DocumentFormat, ExtractedDocument, ExtractionMethod, RawTable};

pub use delimited::{decode_text, detect_delimiter, read_delimited};
pub use format::{detect_format, sniff_format};
pub use pdf::{PdfTextLayer, PdfTextSource, split_columns, tables_from_page_text};
pub use recognition::{NullRecognizer, TextRecognizer, rows_from_recognized_lines};
pub use scan::{EmbeddedImageSource, PageImage, PageImageSource};
pub use spreadsheet::{cell_text, excel_serial_text, read_first_sheet};

/// Failures raised by extraction collaborators.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Delimited text could not be read.
    #[error("delimited text: {0}")]
    Delimited(String),
    /// The workbook could not be opened or read.
    #[error("spreadsheet: {0}")]
    Spreadsheet(String),
    /// The PDF could not be parsed.
    #[error("PDF parsing: {0}")]
    PdfParsing(String),
    /// The recognition backend failed on a page.
    #[error("text recognition: {0}")]
    Recognition(String),
}

/// Runs one collaborator call, turning a panic into `wrap("<what> panicked")`.
fn guarded<T>(
    what: &str,
    wrap: fn(String) -> ExtractionError,
    call: impl FnOnce() -> Result<T, ExtractionError>,
) -> Result<T, ExtractionError> {
    catch_unwind(AssertUnwindSafe(call)).unwrap_or_else(|_| {
        warn!(collaborator = what, "Collaborator panicked");
        Err(wrap(format!("{} panicked", what)))
    })
}

impl From<ExtractionError> for EngineError {
    fn from(error: ExtractionError) -> Self {
        EngineError::EmptyExtraction {
            reason: error.to_string(),
        }
    }
}

/// Extracts raw tables from document bytes.
///
/// # Example
///
/// ```
/// use shift_compliance::ingest::TableExtractor;
/// use shift_compliance::models::{DocumentFormat, ExtractionMethod};
///
/// let extractor = TableExtractor::default();
/// let csv = b"agent;date;debut;fin\nA1;01/07/2025;08:00;16:00\n";
/// let document = extractor.extract(csv, DocumentFormat::Delimited).unwrap();
///
/// assert_eq!(document.method, ExtractionMethod::Delimited);
/// assert_eq!(document.tables[0].rows.len(), 1);
/// ```
#[derive(Clone)]
pub struct TableExtractor {
    text: Arc<dyn PdfTextSource>,
    images: Arc<dyn PageImageSource>,
    recognizer: Arc<dyn TextRecognizer>,
    deadline: Duration,
}

impl Default for TableExtractor {
    fn default() -> Self {
        Self {
            text: Arc::new(PdfTextLayer),
            images: Arc::new(EmbeddedImageSource),
            recognizer: Arc::new(NullRecognizer),
            deadline: Duration::from_secs(30),
        }
    }
}

impl TableExtractor {
    /// Creates an extractor that falls back to `recognizer` for scanned pages.
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            recognizer,
            ..Self::default()
        }
    }

    /// Replaces the PDF text-layer reader.
    pub fn with_text_source(mut self, text: Arc<dyn PdfTextSource>) -> Self {
        self.text = text;
        self
    }

    /// Replaces the page image source.
    pub fn with_image_source(mut self, images: Arc<dyn PageImageSource>) -> Self {
        self.images = images;
        self
    }

    /// Sets the deadline checked between recognized pages.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Extracts every non-empty table from `bytes`.
    ///
    /// # Returns
    ///
    /// The tables in document order, or:
    /// - `FormatUnsupported` for [`DocumentFormat::Unknown`]
    /// - `EmptyExtraction` when no path produced a table, or a collaborator failed
    /// - `RecognitionTimeout` when page recognition ran past the deadline
    pub fn extract(&self, bytes: &[u8], format: DocumentFormat) -> EngineResult<ExtractedDocument> {
        let (method, tables) = match format {
            DocumentFormat::Delimited => (
                ExtractionMethod::Delimited,
                guarded("delimited reader", ExtractionError::Delimited, || read_delimited(bytes))?,
            ),
            DocumentFormat::Spreadsheet => (
                ExtractionMethod::Spreadsheet,
                guarded("workbook reader", ExtractionError::Spreadsheet, || read_first_sheet(bytes))?,
            ),
            DocumentFormat::PageBased => self.extract_pages(bytes)?,
            DocumentFormat::Unknown => {
                return Err(EngineError::FormatUnsupported {
                    filename: String::new(),
                    content_type: String::new(),
                });
            }
        };

        if tables.is_empty() {
            return Err(EngineError::EmptyExtraction {
                reason: format!("no table with data rows found in {} document", format),
            });
        }

        info!(
            format = %format,
            method = ?method,
            tables = tables.len(),
            rows = tables.iter().map(|t| t.rows.len()).sum::<usize>(),
            "Extracted tables"
        );

        Ok(ExtractedDocument {
            format,
            method,
            tables,
        })
    }

    fn extract_pages(&self, bytes: &[u8]) -> EngineResult<(ExtractionMethod, Vec<RawTable>)> {
        let text_failure = match guarded("text layer", ExtractionError::PdfParsing, || {
            self.text.page_texts(bytes)
        }) {
            Ok(pages) => {
                let tables: Vec<RawTable> = pages
                    .iter()
                    .enumerate()
                    .flat_map(|(i, text)| tables_from_page_text(text, i + 1))
                    .collect();
                debug!(pages = pages.len(), tables = tables.len(), "Read PDF text layer");
                if !tables.is_empty() {
                    return Ok((ExtractionMethod::PdfText, tables));
                }
                None
            }
            Err(e) => {
                warn!(error = %e, "PDF text layer unreadable, trying page images");
                Some(e)
            }
        };

        info!("No table in text layer, falling back to page recognition");
        let with_text_failure = |reason: String| match &text_failure {
            Some(text_error) => format!("{}; {}", text_error, reason),
            None => reason,
        };

        let tables = match self.recognize_pages(bytes) {
            Ok(tables) => tables,
            Err(EngineError::EmptyExtraction { reason }) => {
                return Err(EngineError::EmptyExtraction {
                    reason: with_text_failure(reason),
                });
            }
            Err(other) => return Err(other),
        };

        if tables.is_empty() {
            return Err(EngineError::EmptyExtraction {
                reason: with_text_failure(
                    "no table in the text layer or in recognized page text".to_string(),
                ),
            });
        }

        Ok((ExtractionMethod::Recognition, tables))
    }

    fn recognize_pages(&self, bytes: &[u8]) -> EngineResult<Vec<RawTable>> {
        let started = Instant::now();
        let images = guarded("page image source", ExtractionError::PdfParsing, || {
            self.images.page_images(bytes)
        })?;

        let mut pages = Vec::with_capacity(images.len());
        for image in &images {
            let elapsed = started.elapsed();
            if elapsed > self.deadline {
                warn!(page = image.page, elapsed_ms = elapsed.as_millis() as u64, "Recognition deadline exceeded");
                return Err(EngineError::RecognitionTimeout {
                    elapsed_ms: elapsed.as_millis() as u64,
                    deadline_ms: self.deadline.as_millis() as u64,
                });
            }
            let lines = guarded("recognizer", ExtractionError::Recognition, || {
                self.recognizer.recognize(image)
            })?;
            debug!(page = image.page, lines = lines.len(), "Recognized page");
            pages.push(lines);
        }

        let rows = rows_from_recognized_lines(&pages);
        Ok(RawTable::from_rows(rows)
            .filter(|t| !t.is_empty())
            .into_iter()
            .collect())
    }
}
