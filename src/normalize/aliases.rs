//! Static header alias table.
//!
//! Headers are matched exactly after [`header_key`] folding; there is no
//! fuzzy or substring matching beyond the aliases listed here.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

/// Canonical columns a header can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    /// Agent identifier.
    AgentId,
    /// Shift date.
    Date,
    /// Start clock time.
    Start,
    /// End clock time.
    End,
    /// Break length.
    BreakMinutes,
    /// 12h daily derogation flag.
    DailyDerogation,
    /// Minor flag.
    Minor,
    /// Night-worker flag.
    NightWorker,
    /// Family name.
    Name,
    /// Given name.
    FirstName,
    /// Family and given name in one cell.
    FullName,
    /// Work site.
    Site,
    /// Employing company.
    Employer,
    /// Start and end in one cell, e.g. `08:00 - 16:00`.
    TimeRange,
}

impl Column {
    /// Every column, in report order.
    pub const ALL: [Column; 14] = [
        Column::AgentId,
        Column::Date,
        Column::Start,
        Column::End,
        Column::BreakMinutes,
        Column::DailyDerogation,
        Column::Minor,
        Column::NightWorker,
        Column::Name,
        Column::FirstName,
        Column::FullName,
        Column::Site,
        Column::Employer,
        Column::TimeRange,
    ];

    /// Canonical field name.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Column::AgentId => "agent_id",
            Column::Date => "date",
            Column::Start => "start",
            Column::End => "end",
            Column::BreakMinutes => "break_minutes",
            Column::DailyDerogation => "has_daily_derogation_12h",
            Column::Minor => "is_minor",
            Column::NightWorker => "is_night_worker",
            Column::Name => "name",
            Column::FirstName => "first_name",
            Column::FullName => "full_name",
            Column::Site => "site",
            Column::Employer => "employer",
            Column::TimeRange => "time_range",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

const ALIASES: &[(Column, &[&str])] = &[
    (
        Column::AgentId,
        &[
            "agent_id", "agent", "id", "id_agent", "matricule", "collaborateur", "salarie",
            "employe", "employee", "employee_id", "code_agent", "num_agent", "numero_agent",
        ],
    ),
    (
        Column::Date,
        &["date", "jour", "date_jour", "day", "date_poste", "date_vacation", "date_service"],
    ),
    (
        Column::Start,
        &[
            "start", "debut", "heure_debut", "debut_poste", "heure_de_debut", "start_time",
            "prise_de_poste", "prise_poste", "hd",
        ],
    ),
    (
        Column::End,
        &[
            "end", "fin", "heure_fin", "fin_poste", "heure_de_fin", "end_time", "fin_de_poste",
            "hf",
        ],
    ),
    (
        Column::BreakMinutes,
        &[
            "break_minutes", "pause", "pause_min", "pause_minutes", "pause_mn", "break",
            "duree_pause", "pause_repas",
        ],
    ),
    (
        Column::DailyDerogation,
        &[
            "has_daily_derogation_12h", "derog12h", "derog_12h", "derogation", "derogation_12h",
        ],
    ),
    (Column::Minor, &["is_minor", "mineur", "minor", "moins_de_18_ans"]),
    (
        Column::NightWorker,
        &["is_night_worker", "nuit", "travailleur_de_nuit", "travailleur_nuit", "night_worker"],
    ),
    (Column::Name, &["name", "nom", "last_name", "nom_agent", "nom_de_famille"]),
    (Column::FirstName, &["first_name", "prenom", "firstname", "prenom_agent"]),
    (
        Column::FullName,
        &["full_name", "nom_prenom", "nom_et_prenom", "prenom_nom", "nom_complet", "agent_nom"],
    ),
    (Column::Site, &["site", "lieu", "affectation", "poste", "site_client"]),
    (Column::Employer, &["employer", "employeur", "societe", "entreprise"]),
    (
        Column::TimeRange,
        &["time_range", "horaire", "horaires", "creneau", "plage_horaire", "vacation", "shift"],
    ),
];

static ALIAS_TABLE: Lazy<HashMap<&'static str, Column>> = Lazy::new(|| {
    ALIASES
        .iter()
        .flat_map(|(column, aliases)| aliases.iter().map(move |alias| (*alias, *column)))
        .collect()
});

/// Folds a header into its lookup key.
///
/// Accents are removed, letters lowercased, and every run of other
/// characters becomes a single `_`, trimmed at both ends.
///
/// # Example
///
/// ```
/// use shift_compliance::normalize::header_key;
///
/// assert_eq!(header_key("  Heure Début "), "heure_debut");
/// assert_eq!(header_key("Pause (min)"), "pause_min");
/// assert_eq!(header_key("SALARIÉ"), "salarie");
/// ```
pub fn header_key(header: &str) -> String {
    let mut key = String::with_capacity(header.len());
    let mut pending_separator = false;

    for ch in fold_accents(header).chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !key.is_empty() {
                key.push('_');
            }
            pending_separator = false;
            key.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    key
}

/// Replaces accented Latin letters with their base letters.
pub fn fold_accents(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => out.push('a'),
            'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => out.push('A'),
            'è' | 'é' | 'ê' | 'ë' => out.push('e'),
            'È' | 'É' | 'Ê' | 'Ë' => out.push('E'),
            'ì' | 'í' | 'î' | 'ï' => out.push('i'),
            'Ì' | 'Í' | 'Î' | 'Ï' => out.push('I'),
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' => out.push('o'),
            'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => out.push('O'),
            'ù' | 'ú' | 'û' | 'ü' => out.push('u'),
            'Ù' | 'Ú' | 'Û' | 'Ü' => out.push('U'),
            'ç' => out.push('c'),
            'Ç' => out.push('C'),
            'ñ' => out.push('n'),
            'Ñ' => out.push('N'),
            'ÿ' => out.push('y'),
            'œ' => out.push_str("oe"),
            'Œ' => out.push_str("OE"),
            'æ' => out.push_str("ae"),
            'Æ' => out.push_str("AE"),
            other => out.push(other),
        }
    }
    out
}

/// Looks a raw header up in the alias table.
///
/// # Example
///
/// ```
/// use shift_compliance::normalize::{Column, resolve_header};
///
/// assert_eq!(resolve_header("Matricule"), Some(Column::AgentId));
/// assert_eq!(resolve_header("HEURE_FIN"), Some(Column::End));
/// assert_eq!(resolve_header("commentaire"), None);
/// ```
pub fn resolve_header(header: &str) -> Option<Column> {
    ALIAS_TABLE.get(header_key(header).as_str()).copied()
}

/// Every alias of `column`, in table order.
pub fn aliases_of(column: Column) -> &'static [&'static str] {
    ALIASES
        .iter()
        .find(|(c, _)| *c == column)
        .map(|(_, aliases)| *aliases)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_column_has_aliases_including_its_canonical_name() {
        for column in Column::ALL {
            let aliases = aliases_of(column);
            assert!(
                aliases.contains(&column.canonical_name()),
                "{} missing its canonical name",
                column
            );
        }
    }

    #[test]
    fn test_alias_keys_are_already_folded() {
        for (_, aliases) in ALIASES {
            for alias in *aliases {
                assert_eq!(header_key(alias), *alias, "alias '{}' is not a folded key", alias);
            }
        }
    }

    #[test]
    fn test_no_alias_maps_to_two_columns() {
        let mut seen = HashSet::new();
        for (_, aliases) in ALIASES {
            for alias in *aliases {
                assert!(seen.insert(*alias), "alias '{}' appears twice", alias);
            }
        }
        assert_eq!(seen.len(), ALIAS_TABLE.len());
    }

    #[test]
    fn test_every_alias_resolves_under_case_and_spacing_variants() {
        for (column, aliases) in ALIASES {
            for alias in *aliases {
                let shouted = alias.to_uppercase().replace('_', " ");
                let padded = format!("  {}  ", alias.replace('_', "-"));
                assert_eq!(resolve_header(alias), Some(*column));
                assert_eq!(resolve_header(&shouted), Some(*column), "'{}'", shouted);
                assert_eq!(resolve_header(&padded), Some(*column), "'{}'", padded);
            }
        }
    }

    #[test]
    fn test_documented_accented_spellings() {
        assert_eq!(resolve_header("Salarié"), Some(Column::AgentId));
        assert_eq!(resolve_header("Heure début"), Some(Column::Start));
        assert_eq!(resolve_header("Début poste"), Some(Column::Start));
        assert_eq!(resolve_header("Prénom"), Some(Column::FirstName));
        assert_eq!(resolve_header("Nom & Prénom"), Some(Column::FullName));
        assert_eq!(resolve_header("Créneau"), Some(Column::TimeRange));
        assert_eq!(resolve_header("Société"), Some(Column::Employer));
        assert_eq!(resolve_header("Pause (min)"), Some(Column::BreakMinutes));
        assert_eq!(resolve_header("Derog12h"), Some(Column::DailyDerogation));
        assert_eq!(resolve_header("Mineur"), Some(Column::Minor));
        assert_eq!(resolve_header("Nuit"), Some(Column::NightWorker));
    }

    #[test]
    fn test_no_substring_guessing() {
        assert_eq!(resolve_header("date de naissance"), None);
        assert_eq!(resolve_header("debut contrat"), None);
        assert_eq!(resolve_header(""), None);
    }
}
