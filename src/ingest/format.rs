//! Document format detection.
//!
//! The filename extension is authoritative; the declared content type is
//! consulted only when the extension is missing or not recognized.

use std::path::Path;

use crate::models::DocumentFormat;

const DELIMITED_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsm", "xlsb", "ods"];
const PAGE_EXTENSIONS: &[&str] = &["pdf"];

/// Classifies a document from its filename and declared content type.
///
/// Never fails: an unrecognized document is [`DocumentFormat::Unknown`] and
/// the caller decides whether that is fatal.
///
/// # Arguments
///
/// * `filename` - The uploaded filename, if any
/// * `content_type` - The declared MIME type, if any
///
/// # Example
///
/// ```
/// use shift_compliance::ingest::detect_format;
/// use shift_compliance::models::DocumentFormat;
///
/// assert_eq!(detect_format(Some("planning.CSV"), None), DocumentFormat::Delimited);
/// assert_eq!(
///     detect_format(Some("export"), Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")),
///     DocumentFormat::Spreadsheet
/// );
/// assert_eq!(detect_format(None, None), DocumentFormat::Unknown);
/// ```
pub fn detect_format(filename: Option<&str>, content_type: Option<&str>) -> DocumentFormat {
    if let Some(format) = filename.and_then(format_from_extension) {
        return format;
    }

    content_type
        .and_then(format_from_content_type)
        .unwrap_or(DocumentFormat::Unknown)
}

fn format_from_extension(filename: &str) -> Option<DocumentFormat> {
    let extension = Path::new(filename.trim())
        .extension()?
        .to_str()?
        .to_ascii_lowercase();

    if DELIMITED_EXTENSIONS.contains(&extension.as_str()) {
        Some(DocumentFormat::Delimited)
    } else if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
        Some(DocumentFormat::Spreadsheet)
    } else if PAGE_EXTENSIONS.contains(&extension.as_str()) {
        Some(DocumentFormat::PageBased)
    } else {
        None
    }
}

fn format_from_content_type(content_type: &str) -> Option<DocumentFormat> {
    let content_type = content_type.to_ascii_lowercase();

    if content_type.contains("pdf") {
        Some(DocumentFormat::PageBased)
    } else if content_type.contains("spreadsheetml")
        || content_type.contains("excel")
        || content_type.contains("opendocument.spreadsheet")
    {
        Some(DocumentFormat::Spreadsheet)
    } else if content_type.contains("csv")
        || content_type.contains("tab-separated")
        || content_type.starts_with("text/plain")
    {
        Some(DocumentFormat::Delimited)
    } else {
        None
    }
}

/// Guesses a format from the leading bytes of a document.
///
/// Used as a last resort when neither filename nor content type is usable.
pub fn sniff_format(bytes: &[u8]) -> DocumentFormat {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace() && ![0xEF, 0xBB, 0xBF].contains(b))
        .unwrap_or(bytes.len());
    let head = &bytes[start..];

    if head.starts_with(b"%PDF") {
        DocumentFormat::PageBased
    } else if head.starts_with(b"PK\x03\x04") || head.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
        DocumentFormat::Spreadsheet
    } else {
        DocumentFormat::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_takes_priority_over_content_type() {
        assert_eq!(
            detect_format(Some("roster.pdf"), Some("text/csv")),
            DocumentFormat::PageBased
        );
        assert_eq!(
            detect_format(Some("roster.xls"), Some("application/pdf")),
            DocumentFormat::Spreadsheet
        );
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(detect_format(Some("A.XLSX"), None), DocumentFormat::Spreadsheet);
        assert_eq!(detect_format(Some("a.Tsv"), None), DocumentFormat::Delimited);
    }

    #[test]
    fn test_content_type_used_when_extension_missing_or_unknown() {
        assert_eq!(
            detect_format(Some("upload"), Some("application/pdf")),
            DocumentFormat::PageBased
        );
        assert_eq!(
            detect_format(Some("upload.bin"), Some("text/csv; charset=utf-8")),
            DocumentFormat::Delimited
        );
        assert_eq!(
            detect_format(None, Some("application/vnd.ms-excel")),
            DocumentFormat::Spreadsheet
        );
    }

    #[test]
    fn test_unknown_when_no_signal_matches() {
        assert_eq!(
            detect_format(Some("notes.docx"), Some("application/msword")),
            DocumentFormat::Unknown
        );
        assert_eq!(detect_format(Some(""), Some("")), DocumentFormat::Unknown);
    }

    #[test]
    fn test_sniff_magic_bytes() {
        assert_eq!(sniff_format(b"%PDF-1.4\n..."), DocumentFormat::PageBased);
        assert_eq!(sniff_format(b"\xEF\xBB\xBF %PDF-1.7"), DocumentFormat::PageBased);
        assert_eq!(sniff_format(b"PK\x03\x04rest"), DocumentFormat::Spreadsheet);
        assert_eq!(sniff_format(b"agent;date"), DocumentFormat::Unknown);
        assert_eq!(sniff_format(b""), DocumentFormat::Unknown);
    }
}
