//! Text recognition capability for scanned pages.
//!
//! The engine owns no recognition backend. Callers inject a
//! [`TextRecognizer`]; rows are rebuilt here from the lines it returns.

use super::ExtractionError;
use super::pdf::split_columns;
use super::scan::PageImage;

/// Turns a page image into ordered text lines.
///
/// Implemented as a trait so extraction can be tested without a real
/// recognition backend.
pub trait TextRecognizer: Send + Sync {
    /// Returns the recognized lines of one page, top to bottom.
    fn recognize(&self, image: &PageImage) -> Result<Vec<String>, ExtractionError>;
}

/// Recognizer used when no backend is wired: recognizes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecognizer;

impl TextRecognizer for NullRecognizer {
    fn recognize(&self, _image: &PageImage) -> Result<Vec<String>, ExtractionError> {
        Ok(Vec::new())
    }
}

/// Rebuilds table rows from recognized lines of consecutive pages.
///
/// Each line is split on runs of two or more whitespace characters. Lines
/// yielding fewer than two cells are dropped. The first tabular line is the
/// header; identical header lines repeated on later pages are skipped.
///
/// # Example
///
/// ```
/// use shift_compliance::ingest::rows_from_recognized_lines;
///
/// let pages = vec![
///     vec!["PLANNING".to_string(), "Agent  Date  Debut  Fin".to_string(), "A1  01/07/2025  08:00  16:00".to_string()],
///     vec!["Agent  Date  Debut  Fin".to_string(), "A1  02/07/2025  08:00  16:00".to_string()],
/// ];
/// let rows = rows_from_recognized_lines(&pages);
/// assert_eq!(rows.len(), 3);
/// assert_eq!(rows[0], vec!["Agent", "Date", "Debut", "Fin"]);
/// ```
pub fn rows_from_recognized_lines(pages: &[Vec<String>]) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();

    for line in pages.iter().flatten() {
        let cells = split_columns(line);
        if cells.len() < 2 {
            continue;
        }
        if rows.first().is_some_and(|header| same_row(header, &cells)) {
            continue;
        }
        rows.push(cells);
    }

    rows
}

fn same_row(a: &[String], b: &[String]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| x.to_lowercase() == y.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_null_recognizer_returns_nothing() {
        let image = PageImage {
            page: 1,
            bytes: vec![0xFF, 0xD8],
            filter: Some("DCTDecode".to_string()),
        };
        assert!(NullRecognizer.recognize(&image).unwrap().is_empty());
    }

    #[test]
    fn test_title_and_footer_lines_are_dropped() {
        let pages = vec![lines(&[
            "SOCIETE DE SURVEILLANCE",
            "Matricule   Jour   Debut   Fin",
            "M01   01/07/2025   08:00   16:00",
            "Page 1",
        ])];
        let rows = rows_from_recognized_lines(&pages);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["M01", "01/07/2025", "08:00", "16:00"]);
    }

    #[test]
    fn test_repeated_header_is_case_insensitive() {
        let pages = vec![
            lines(&["Agent  Date  Debut  Fin", "A1  01/07/2025  08:00  16:00"]),
            lines(&["AGENT  DATE  DEBUT  FIN", "A1  02/07/2025  08:00  16:00"]),
        ];
        let rows = rows_from_recognized_lines(&pages);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_no_tabular_lines_yields_nothing() {
        let pages = vec![lines(&["illegible", ""])];
        assert!(rows_from_recognized_lines(&pages).is_empty());
    }
}
