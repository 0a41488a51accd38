//! Delimited-text reading with separator auto-detection.

use encoding_rs::WINDOWS_1252;
use tracing::debug;

use crate::models::RawTable;

use super::ExtractionError;

const CANDIDATES: &[u8] = &[b';', b',', b'\t', b'|'];
const SAMPLE_LINES: usize = 10;

/// Decodes document bytes as text.
///
/// A UTF-8 byte order mark is dropped. Bytes that are not valid UTF-8 are
/// read as Windows-1252, the ANSI code page of spreadsheet exports on
/// French locales (`0x92` is `’`, `0x9C` is `œ`).
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            debug!("Document is not UTF-8, decoding as Windows-1252");
            WINDOWS_1252.decode_without_bom_handling(bytes).0.into_owned()
        }
    }
}

/// Picks the field separator among `;`, `,`, tab and `|`.
///
/// A candidate that appears the same non-zero number of times on every
/// sampled line wins; ties go to the higher count, then to candidate order.
/// Without a consistent candidate the most frequent one is used, and `,`
/// when nothing appears at all.
///
/// # Example
///
/// ```
/// use shift_compliance::ingest::detect_delimiter;
///
/// assert_eq!(detect_delimiter("agent;date;debut\nA1;01/07/2025;08:00"), b';');
/// assert_eq!(detect_delimiter("agent,date\nA1,2025-07-01"), b',');
/// ```
pub fn detect_delimiter(text: &str) -> u8 {
    let lines: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SAMPLE_LINES)
        .collect();

    let counts: Vec<(u8, Vec<usize>)> = CANDIDATES
        .iter()
        .map(|&c| (c, lines.iter().map(|l| count_outside_quotes(l, c)).collect()))
        .collect();

    let consistent = counts
        .iter()
        .filter(|(_, per_line)| {
            per_line.first().is_some_and(|&n| n > 0) && per_line.iter().all(|&n| n == per_line[0])
        })
        .max_by(|(ca, a), (cb, b)| a[0].cmp(&b[0]).then_with(|| rank(*cb).cmp(&rank(*ca))));

    if let Some((c, _)) = consistent {
        return *c;
    }

    counts
        .iter()
        .map(|(c, per_line)| (*c, per_line.iter().sum::<usize>()))
        .filter(|(_, total)| *total > 0)
        .max_by(|(ca, a), (cb, b)| a.cmp(b).then_with(|| rank(*cb).cmp(&rank(*ca))))
        .map(|(c, _)| c)
        .unwrap_or(b',')
}

fn rank(candidate: u8) -> usize {
    CANDIDATES
        .iter()
        .position(|&c| c == candidate)
        .unwrap_or(CANDIDATES.len())
}

fn count_outside_quotes(line: &str, delimiter: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for b in line.bytes() {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if b == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Parses delimited text into one table whose first non-empty record is the header.
pub fn read_delimited(bytes: &[u8]) -> Result<Vec<RawTable>, ExtractionError> {
    let text = decode_text(bytes);
    let delimiter = detect_delimiter(&text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ExtractionError::Delimited(e.to_string()))?;
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        rows.push(cells);
    }

    debug!(
        delimiter = %(delimiter as char).escape_default(),
        records = rows.len(),
        "Parsed delimited text"
    );

    Ok(RawTable::from_rows(rows)
        .filter(|t| !t.is_empty())
        .into_iter()
        .collect())
}
