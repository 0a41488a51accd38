//! Column normalization.
//!
//! Maps the open set of roster header spellings onto canonical columns and
//! parses cells with a tolerant date and time grammar.

mod aliases;
mod columns;
mod parse;

pub use aliases::{Column, aliases_of, fold_accents, header_key, resolve_header};
pub use columns::{ColumnNormalizer, HeaderMapping, NormalizedRows};
pub use parse::{parse_break_minutes, parse_date, parse_flag, parse_time, parse_time_range};
