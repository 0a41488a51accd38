//! Header reconciliation and row conversion into [`CanonicalShift`] values.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::config::IngestionSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{CanonicalShift, RawTable};

use super::aliases::{Column, fold_accents, resolve_header};
use super::parse::{parse_break_minutes, parse_date, parse_flag, parse_time, parse_time_range};

/// Canonical column positions resolved from one header row.
///
/// When two headers resolve to the same column, the leftmost one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMapping {
    positions: BTreeMap<Column, usize>,
    width: usize,
}

impl HeaderMapping {
    /// Resolves every header cell against the alias table.
    ///
    /// # Example
    ///
    /// ```
    /// use shift_compliance::normalize::{Column, HeaderMapping};
    ///
    /// let headers: Vec<String> = ["Matricule", "Jour", "Heure début", "Heure fin", "Remarque"]
    ///     .iter()
    ///     .map(|h| h.to_string())
    ///     .collect();
    /// let mapping = HeaderMapping::from_headers(&headers);
    ///
    /// assert_eq!(mapping.position(Column::Start), Some(2));
    /// assert!(mapping.is_complete());
    /// assert_eq!(mapping.detected(), vec!["agent_id", "date", "start", "end"]);
    /// ```
    pub fn from_headers(headers: &[String]) -> Self {
        let mut positions = BTreeMap::new();
        for (index, header) in headers.iter().enumerate() {
            if let Some(column) = resolve_header(header) {
                positions.entry(column).or_insert(index);
            }
        }
        Self {
            positions,
            width: headers.len(),
        }
    }

    /// Source index of `column`, if a header resolved to it.
    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions.get(&column).copied()
    }

    /// True when `column` was resolved.
    pub fn has(&self, column: Column) -> bool {
        self.positions.contains_key(&column)
    }

    /// Canonical names of the resolved columns, in canonical order.
    pub fn detected(&self) -> Vec<String> {
        self.positions.keys().map(|c| c.canonical_name().to_string()).collect()
    }

    /// Required columns that are absent.
    ///
    /// `start` and `end` are satisfied by a single time-range column.
    pub fn missing_required(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if !self.has(Column::Date) {
            missing.push(Column::Date);
        }
        if !self.has(Column::TimeRange) {
            for column in [Column::Start, Column::End] {
                if !self.has(column) {
                    missing.push(column);
                }
            }
        }
        missing.iter().map(|c| c.canonical_name().to_string()).collect()
    }

    /// True when every required column is resolved.
    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }

    fn cell<'a>(&self, cells: &'a [String], column: Column) -> Option<&'a str> {
        self.position(column)
            .and_then(|i| cells.get(i))
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
    }
}

/// Canonical rows plus row-level accounting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRows {
    /// Rows that parsed, in document order.
    pub shifts: Vec<CanonicalShift>,
    /// Data rows seen in tables with a usable header.
    pub rows_read: usize,
    /// Rows dropped because a date or time could not be parsed.
    pub rows_dropped: usize,
    /// Canonical columns resolved across all used tables.
    pub columns: Vec<String>,
}

/// Maps raw tables onto the canonical shift schema.
#[derive(Debug, Clone, Default)]
pub struct ColumnNormalizer {
    settings: IngestionSettings,
}

impl ColumnNormalizer {
    /// Creates a normalizer using the given date settings.
    pub fn new(settings: IngestionSettings) -> Self {
        Self { settings }
    }

    /// Converts raw tables into canonical shifts.
    ///
    /// Tables are read in order. A table whose header does not resolve but
    /// whose width equals the previous usable table is a continuation: its
    /// first row is data and the previous mapping applies. Rows that fail to
    /// parse are dropped and counted.
    ///
    /// # Arguments
    ///
    /// * `tables` - Raw tables in document order
    ///
    /// # Returns
    ///
    /// The parsed rows, or [`EngineError::MissingColumns`] when no table has a
    /// usable header, or [`EngineError::NoUsableRows`] when every row was dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use shift_compliance::models::RawTable;
    /// use shift_compliance::normalize::ColumnNormalizer;
    ///
    /// let row = |cells: &[&str]| cells.iter().map(|c| c.to_string()).collect::<Vec<_>>();
    /// let table = RawTable::new(
    ///     row(&["Nom", "Prénom", "Date", "Horaire", "Pause"]),
    ///     vec![
    ///         row(&["Durand", "Éloïse", "01/07/2025", "22h - 6h", "30"]),
    ///         row(&["Durand", "Éloïse", "pas de date", "8h - 16h", ""]),
    ///     ],
    /// );
    ///
    /// let rows = ColumnNormalizer::default().normalize(&[table]).unwrap();
    /// assert_eq!(rows.shifts.len(), 1);
    /// assert_eq!(rows.rows_dropped, 1);
    /// assert_eq!(rows.shifts[0].agent_id, "DURAND_ELOISE");
    /// assert_eq!(rows.shifts[0].break_minutes, 30);
    /// ```
    pub fn normalize(&self, tables: &[RawTable]) -> EngineResult<NormalizedRows> {
        let mut shifts = Vec::new();
        let mut rows_read = 0;
        let mut rows_dropped = 0;
        let mut resolved: BTreeSet<Column> = BTreeSet::new();
        let mut previous: Option<HeaderMapping> = None;
        let mut first_failure: Option<HeaderMapping> = None;

        for table in tables {
            let mapping = HeaderMapping::from_headers(&table.headers);

            let (mapping, header_is_data) = if mapping.is_complete() {
                (mapping, false)
            } else {
                match previous.as_ref() {
                    Some(prev) if prev.width == table.width() => (prev.clone(), true),
                    _ => {
                        debug!(
                            headers = ?table.headers,
                            missing = ?mapping.missing_required(),
                            "Skipping table without usable header"
                        );
                        first_failure.get_or_insert(mapping);
                        continue;
                    }
                }
            };

            let data = header_is_data
                .then_some(&table.headers)
                .into_iter()
                .chain(table.rows.iter());

            for cells in data {
                if cells.iter().all(|c| c.trim().is_empty()) {
                    continue;
                }
                rows_read += 1;
                match self.parse_row(&mapping, cells, rows_read) {
                    Ok(shift) => shifts.push(shift),
                    Err(error) => {
                        debug!(error = %error, "Dropping row");
                        rows_dropped += 1;
                    }
                }
            }

            resolved.extend(mapping.positions.keys().copied());
            previous = Some(mapping);
        }

        if previous.is_none() {
            let failure = first_failure.unwrap_or_default();
            return Err(EngineError::MissingColumns {
                missing: failure.missing_required(),
                detected: failure.detected(),
            });
        }

        if rows_dropped > 0 {
            warn!(rows_read, rows_dropped, "Some rows could not be parsed");
        }

        if shifts.is_empty() {
            return Err(EngineError::NoUsableRows {
                rows_read,
                rows_dropped,
            });
        }

        Ok(NormalizedRows {
            shifts,
            rows_read,
            rows_dropped,
            columns: resolved.iter().map(|c| c.canonical_name().to_string()).collect(),
        })
    }

    /// Parses one data row. `row` is the 1-based data row number.
    fn parse_row(
        &self,
        mapping: &HeaderMapping,
        cells: &[String],
        row: usize,
    ) -> EngineResult<CanonicalShift> {
        let unparsable = |message: String| EngineError::UnparsableRow { row, message };
        let cell = |column| mapping.cell(cells, column);

        let raw_date = cell(Column::Date).ok_or_else(|| unparsable("empty date".to_string()))?;
        let date = parse_date(raw_date, &self.settings)
            .ok_or_else(|| unparsable(format!("invalid date '{}'", raw_date)))?;

        let separate = cell(Column::Start)
            .and_then(parse_time)
            .zip(cell(Column::End).and_then(parse_time));
        let (start, end) = match separate.or_else(|| cell(Column::TimeRange).and_then(parse_time_range)) {
            Some(times) => times,
            None => {
                let shown = [Column::Start, Column::End, Column::TimeRange]
                    .into_iter()
                    .filter_map(|c| cell(c).map(|v| format!("{}='{}'", c, v)))
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(unparsable(format!("invalid or missing times ({})", shown)));
            }
        };

        let name = display_name(cell(Column::FullName), cell(Column::Name), cell(Column::FirstName));
        let agent_id = match cell(Column::AgentId) {
            Some(id) => id.to_string(),
            None => synthesize_agent_id(
                cell(Column::FullName),
                cell(Column::Name),
                cell(Column::FirstName),
                row,
            ),
        };

        Ok(CanonicalShift {
            agent_id,
            date,
            start,
            end,
            break_minutes: cell(Column::BreakMinutes).map(parse_break_minutes).unwrap_or(0),
            has_daily_derogation_12h: cell(Column::DailyDerogation).is_some_and(parse_flag),
            is_minor: cell(Column::Minor).is_some_and(parse_flag),
            is_night_worker: cell(Column::NightWorker).is_some_and(parse_flag),
            name,
            site: cell(Column::Site).map(str::to_string),
            employer: cell(Column::Employer).map(str::to_string),
        })
    }
}

fn display_name(full: Option<&str>, name: Option<&str>, first: Option<&str>) -> Option<String> {
    match (full, name, first) {
        (Some(full), _, _) => Some(full.to_string()),
        (None, Some(name), Some(first)) => Some(format!("{} {}", name, first)),
        (None, Some(only), None) | (None, None, Some(only)) => Some(only.to_string()),
        (None, None, None) => None,
    }
}

/// Builds `NAME_FIRSTNAME` from name cells, or `ROW-0007` from the row number.
fn synthesize_agent_id(
    full: Option<&str>,
    name: Option<&str>,
    first: Option<&str>,
    row: usize,
) -> String {
    let parts: Vec<&str> = match (name, first, full) {
        (Some(name), Some(first), _) => vec![name, first],
        (_, _, Some(full)) => vec![full],
        (Some(only), None, None) | (None, Some(only), None) => vec![only],
        (None, None, None) => vec![],
    };

    let key = parts
        .iter()
        .flat_map(|p| p.split_whitespace())
        .map(|word| fold_accents(word).to_uppercase())
        .collect::<Vec<_>>()
        .join("_");

    if key.is_empty() {
        format!("ROW-{:04}", row)
    } else {
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn make_time(time_str: &str) -> NaiveTime {
        NaiveTime::parse_from_str(time_str, "%H:%M").unwrap()
    }

    fn normalize(tables: &[RawTable]) -> EngineResult<NormalizedRows> {
        ColumnNormalizer::default().normalize(tables)
    }

    #[test]
    fn test_full_row_with_flags() {
        let table = RawTable::new(
            row(&["Agent", "Date", "Début", "Fin", "Pause", "Derog12h", "Mineur", "Nuit", "Site"]),
            vec![row(&["T1", "2025-07-01", "08:00", "18:00", "30", "oui", "non", "x", "Gare"])],
        );

        let rows = normalize(&[table]).unwrap();
        let shift = &rows.shifts[0];
        assert_eq!(shift.agent_id, "T1");
        assert_eq!(shift.date, make_date("2025-07-01"));
        assert_eq!(shift.start, make_time("08:00"));
        assert_eq!(shift.end, make_time("18:00"));
        assert_eq!(shift.break_minutes, 30);
        assert!(shift.has_daily_derogation_12h);
        assert!(!shift.is_minor);
        assert!(shift.is_night_worker);
        assert_eq!(shift.site.as_deref(), Some("Gare"));
        assert_eq!(rows.rows_read, 1);
        assert_eq!(rows.rows_dropped, 0);
    }

    #[test]
    fn test_alias_variants_produce_the_same_schema() {
        let variants = [
            ["agent_id", "date", "start", "end", "break_minutes"],
            ["MATRICULE", "JOUR", "HEURE DEBUT", "HEURE FIN", "PAUSE"],
            ["Collaborateur", "Date jour", "Heure début", "Heure fin", "Pause (min)"],
            ["id", "date_jour", "debut", "fin", "pause_min"],
        ];

        let mut schemas = Vec::new();
        for headers in variants {
            let table = RawTable::new(
                row(&headers),
                vec![row(&["A1", "01/07/2025", "08:00", "16:00", "20"])],
            );
            let rows = normalize(&[table]).unwrap();
            schemas.push((rows.columns, rows.shifts));
        }

        assert!(schemas.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(schemas[0].0, vec!["agent_id", "date", "start", "end", "break_minutes"]);
    }

    #[test]
    fn test_leftmost_duplicate_header_wins() {
        let mapping = HeaderMapping::from_headers(&row(&["date", "jour", "debut", "fin"]));
        assert_eq!(mapping.position(Column::Date), Some(0));
    }

    #[test]
    fn test_missing_columns_lists_missing_and_detected() {
        let table = RawTable::new(row(&["Matricule", "Jour", "Commentaire"]), vec![row(&["A1", "01/07/2025", ""])]);

        match normalize(&[table]) {
            Err(EngineError::MissingColumns { missing, detected }) => {
                assert_eq!(missing, vec!["start", "end"]);
                assert_eq!(detected, vec!["agent_id", "date"]);
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_no_tables_is_missing_everything() {
        match normalize(&[]) {
            Err(EngineError::MissingColumns { missing, detected }) => {
                assert_eq!(missing, vec!["date", "start", "end"]);
                assert!(detected.is_empty());
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_rows_are_counted_not_fatal() {
        let table = RawTable::new(
            row(&["agent", "date", "debut", "fin"]),
            vec![
                row(&["A1", "01/07/2025", "08:00", "16:00"]),
                row(&["A1", "??", "08:00", "16:00"]),
                row(&["A1", "03/07/2025", "repos", ""]),
                row(&["", "", "", ""]),
            ],
        );

        let rows = normalize(&[table]).unwrap();
        assert_eq!(rows.shifts.len(), 1);
        assert_eq!(rows.rows_read, 3);
        assert_eq!(rows.rows_dropped, 2);
    }

    #[test]
    fn test_all_rows_dropped_is_no_usable_rows() {
        let table = RawTable::new(row(&["agent", "date", "debut", "fin"]), vec![row(&["A1", "x", "y", "z"])]);

        assert!(matches!(
            normalize(&[table]),
            Err(EngineError::NoUsableRows {
                rows_read: 1,
                rows_dropped: 1
            })
        ));
    }

    #[test]
    fn test_parse_row_reports_row_number() {
        let normalizer = ColumnNormalizer::default();
        let mapping = HeaderMapping::from_headers(&row(&["date", "debut", "fin"]));

        let error = normalizer
            .parse_row(&mapping, &row(&["31/02/2025", "08:00", "16:00"]), 7)
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Row 7 could not be parsed: invalid date '31/02/2025'"
        );
    }

    #[test]
    fn test_time_range_fills_missing_start_and_end() {
        let table = RawTable::new(
            row(&["agent", "date", "créneau"]),
            vec![row(&["A1", "01/07/2025", "19h00 – 07h00"])],
        );

        let shift = &normalize(&[table]).unwrap().shifts[0];
        assert_eq!(shift.start, make_time("19:00"));
        assert_eq!(shift.end, make_time("07:00"));
    }

    #[test]
    fn test_agent_id_synthesis_is_deterministic() {
        let by_name = RawTable::new(
            row(&["nom", "prénom", "date", "debut", "fin"]),
            vec![row(&["Lefèvre", "Jean Marc", "01/07/2025", "08:00", "16:00"])],
        );
        let by_full = RawTable::new(
            row(&["Nom Prénom", "date", "debut", "fin"]),
            vec![row(&["Lefèvre Jean Marc", "01/07/2025", "08:00", "16:00"])],
        );
        let anonymous = RawTable::new(
            row(&["date", "debut", "fin"]),
            vec![
                row(&["01/07/2025", "08:00", "16:00"]),
                row(&["02/07/2025", "08:00", "16:00"]),
            ],
        );

        let a = normalize(&[by_name.clone()]).unwrap();
        let b = normalize(&[by_name]).unwrap();
        assert_eq!(a.shifts[0].agent_id, "LEFEVRE_JEAN_MARC");
        assert_eq!(a, b);
        assert_eq!(a.shifts[0].name.as_deref(), Some("Lefèvre Jean Marc"));

        let full = normalize(&[by_full]).unwrap();
        assert_eq!(full.shifts[0].agent_id, "LEFEVRE_JEAN_MARC");

        let anon = normalize(&[anonymous]).unwrap();
        assert_eq!(anon.shifts[0].agent_id, "ROW-0001");
        assert_eq!(anon.shifts[1].agent_id, "ROW-0002");
    }

    #[test]
    fn test_continuation_table_reuses_previous_header() {
        let first = RawTable::new(
            row(&["agent", "date", "debut", "fin"]),
            vec![row(&["A1", "01/07/2025", "08:00", "16:00"])],
        );
        let continuation = RawTable::new(
            row(&["A1", "02/07/2025", "08:00", "16:00"]),
            vec![row(&["A1", "03/07/2025", "08:00", "16:00"])],
        );

        let rows = normalize(&[first, continuation]).unwrap();
        assert_eq!(rows.shifts.len(), 3);
        assert_eq!(rows.shifts[1].date, make_date("2025-07-02"));
        assert_eq!(rows.rows_read, 3);
    }

    #[test]
    fn test_unrelated_table_of_other_width_is_skipped() {
        let legend = RawTable::new(row(&["Code", "Signification", "Couleur"]), vec![row(&["R", "Repos", "vert"])]);
        let roster = RawTable::new(
            row(&["agent", "date", "debut", "fin"]),
            vec![row(&["A1", "01/07/2025", "08:00", "16:00"])],
        );

        let rows = normalize(&[legend, roster]).unwrap();
        assert_eq!(rows.shifts.len(), 1);
        assert_eq!(rows.rows_read, 1);
    }
}
