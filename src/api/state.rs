//! Application state for the compliance API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::{ConfigLoader, ThresholdStore};
use crate::ingest::{NullRecognizer, TextRecognizer};
use crate::pipeline::Evaluator;

/// Shared application state.
///
/// Holds the loaded configuration, the hot-reloadable thresholds and the
/// recognition backend used for scanned documents.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    thresholds: ThresholdStore,
    recognizer: Arc<dyn TextRecognizer>,
}

impl AppState {
    /// Creates a new application state seeded from the given configuration.
    ///
    /// Scanned documents fail with an empty extraction until a recognizer is
    /// installed with [`AppState::with_recognizer`].
    pub fn new(config: ConfigLoader) -> Self {
        let thresholds = ThresholdStore::new(config.thresholds().clone());
        Self {
            config: Arc::new(config),
            thresholds,
            recognizer: Arc::new(NullRecognizer),
        }
    }

    /// Installs a recognition backend.
    pub fn with_recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.recognizer = recognizer;
        self
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the threshold store.
    pub fn thresholds(&self) -> &ThresholdStore {
        &self.thresholds
    }

    /// Builds an evaluator bound to the thresholds in force right now.
    pub fn evaluator(&self) -> Evaluator {
        Evaluator::new(self.thresholds.snapshot(), self.config.ingestion().clone())
            .with_recognizer(Arc::clone(&self.recognizer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IngestionSettings, RuleThresholds};
    use rust_decimal::Decimal;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_evaluator_picks_up_replaced_thresholds() {
        let state = AppState::new(ConfigLoader::from_parts(
            RuleThresholds::default(),
            IngestionSettings::default(),
        ));
        let before = state.evaluator();

        let updated = RuleThresholds {
            max_daily_hours: Decimal::new(8, 0),
            ..RuleThresholds::default()
        };
        state.thresholds().replace(updated).unwrap();

        assert_eq!(before.thresholds().max_daily_hours, Decimal::new(10, 0));
        assert_eq!(state.evaluator().thresholds().max_daily_hours, Decimal::new(8, 0));
    }
}
