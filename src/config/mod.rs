//! Configuration loading and management for the compliance engine.
//!
//! This module provides functionality to load rule thresholds and
//! ingestion settings from YAML files, and a shared store that lets an
//! admin surface replace thresholds while evaluations keep their snapshot.
//!
//! # Example
//!
//! ```no_run
//! use shift_compliance::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Daily cap: {}h", config.thresholds().max_daily_hours);
//! ```

mod loader;
mod store;
mod types;

pub use loader::ConfigLoader;
pub use store::ThresholdStore;
pub use types::{IngestionSettings, RuleThresholds};
