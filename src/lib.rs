//! Schedule compliance auditor for security-sector staff rosters.
//!
//! This crate ingests a roster document (CSV, TSV, spreadsheet, text PDF or
//! scanned PDF), normalizes its columns into canonical shifts and checks each
//! agent's schedule against labour-law caps: daily and weekly hours, the
//! 12-week average, daily and weekly rest, consecutive days, mandatory breaks
//! and night work for minors.

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod rules;
