//! Workbook reading through calamine.

use std::io::Cursor;

use calamine::{Data, Reader, SheetVisible, open_workbook_auto_from_rs};
use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::models::RawTable;

use super::ExtractionError;

/// Reads the first visible worksheet; its first non-empty row is the header.
///
/// Hidden sheets (lookup tables, archived months) are skipped. A workbook
/// whose sheets are all hidden falls back to the first one.
pub fn read_first_sheet(bytes: &[u8]) -> Result<Vec<RawTable>, ExtractionError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ExtractionError::Spreadsheet(e.to_string()))?;

    let visible = first_visible_sheet(
        workbook
            .sheets_metadata()
            .iter()
            .map(|sheet| (sheet.name.as_str(), sheet.visible)),
    );
    let range = match visible {
        Some(name) => {
            debug!(sheet = %name, "Reading first visible worksheet");
            workbook.worksheet_range(&name)
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ExtractionError::Spreadsheet("workbook has no worksheet".to_string()))?,
    }
    .map_err(|e| ExtractionError::Spreadsheet(e.to_string()))?;

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
        .filter(|cells| cells.iter().any(|c| !c.is_empty()))
        .collect();

    debug!(rows = rows.len(), "Read worksheet");

    Ok(RawTable::from_rows(rows)
        .filter(|t| !t.is_empty())
        .into_iter()
        .collect())
}

/// Name of the first sheet marked visible, in workbook order.
fn first_visible_sheet<'a>(
    sheets: impl IntoIterator<Item = (&'a str, SheetVisible)>,
) -> Option<String> {
    sheets
        .into_iter()
        .find(|(_, visible)| *visible == SheetVisible::Visible)
        .map(|(name, _)| name.to_string())
}

/// Renders one cell as text the column grammar understands.
///
/// Date-typed cells become `YYYY-MM-DD`, time-typed cells `HH:MM`, and
/// date-times `YYYY-MM-DD HH:MM`. Whole floats lose their fractional part;
/// other floats keep their decimal text, so an untyped time cell such as
/// `0.25` reaches the time grammar as a fractional day.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_text(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
    }
}

/// Formats an Excel day serial (1900 system) as date, time or date-time text.
pub fn excel_serial_text(serial: f64) -> String {
    let days = serial.trunc();
    let minutes = ((serial - days) * 1440.0).round() as i64;
    let (days, minutes) = if minutes >= 1440 {
        (days + 1.0, minutes - 1440)
    } else {
        (days, minutes)
    };
    let time = format!("{:02}:{:02}", minutes / 60, minutes % 60);

    if days < 1.0 {
        return time;
    }

    let date = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|epoch| epoch.checked_add_signed(Duration::days(days as i64)));
    match date {
        Some(date) if minutes == 0 => date.format("%Y-%m-%d").to_string(),
        Some(date) => format!("{} {}", date.format("%Y-%m-%d"), time),
        None => serial.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excel_serial_date_only() {
        // 45839 is 2025-07-01 in the 1900 date system.
        assert_eq!(excel_serial_text(45839.0), "2025-07-01");
    }

    #[test]
    fn test_excel_fraction_is_clock_time() {
        assert_eq!(excel_serial_text(0.25), "06:00");
        assert_eq!(excel_serial_text(0.9375), "22:30");
    }

    #[test]
    fn test_excel_serial_with_time() {
        assert_eq!(excel_serial_text(45839.5), "2025-07-01 12:00");
    }

    #[test]
    fn test_rounding_up_to_midnight_carries_the_day() {
        assert_eq!(excel_serial_text(45838.99999), "2025-07-01");
    }

    #[test]
    fn test_cell_text_variants() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("  A1 ".to_string())), "A1");
        assert_eq!(cell_text(&Data::Float(30.0)), "30");
        assert_eq!(cell_text(&Data::Float(7.5)), "7.5");
        assert_eq!(cell_text(&Data::Int(12)), "12");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
    }

    #[test]
    fn test_untyped_fraction_cells_read_as_clock_times() {
        use crate::normalize::parse_time;
        use chrono::NaiveTime;

        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert_eq!(parse_time(&cell_text(&Data::Float(0.25))), Some(t(6, 0)));
        assert_eq!(parse_time(&cell_text(&Data::Float(0.5))), Some(t(12, 0)));
        assert_eq!(parse_time(&cell_text(&Data::Float(0.75))), Some(t(18, 0)));
    }

    #[test]
    fn test_hidden_sheets_are_skipped() {
        let sheets = [
            ("Codes", SheetVisible::Hidden),
            ("Juin", SheetVisible::VeryHidden),
            ("Juillet", SheetVisible::Visible),
            ("Aout", SheetVisible::Visible),
        ];
        assert_eq!(first_visible_sheet(sheets), Some("Juillet".to_string()));
    }

    #[test]
    fn test_all_hidden_sheets_have_no_visible_choice() {
        let sheets = [("Codes", SheetVisible::Hidden)];
        assert_eq!(first_visible_sheet(sheets), None);
    }

    #[test]
    fn test_garbage_bytes_are_a_spreadsheet_error() {
        let result = read_first_sheet(b"definitely not a workbook");
        assert!(matches!(result, Err(ExtractionError::Spreadsheet(_))));
    }
}
