//! Hot-reloadable threshold snapshots.
//!
//! Readers take an `Arc` snapshot and keep it for the whole evaluation;
//! writers swap in a new validated value without touching snapshots
//! already handed out.

use std::sync::{Arc, RwLock};

use tracing::info;

use crate::error::EngineResult;

use super::types::RuleThresholds;

/// Shared handle to the current [`RuleThresholds`].
///
/// # Example
///
/// ```
/// use shift_compliance::config::{RuleThresholds, ThresholdStore};
/// use rust_decimal::Decimal;
///
/// let store = ThresholdStore::new(RuleThresholds::default());
/// let before = store.snapshot();
///
/// let mut updated = RuleThresholds::default();
/// updated.max_weekly_hours = Decimal::new(46, 0);
/// store.replace(updated).unwrap();
///
/// assert_eq!(before.max_weekly_hours, Decimal::new(48, 0));
/// assert_eq!(store.snapshot().max_weekly_hours, Decimal::new(46, 0));
/// ```
#[derive(Debug, Clone)]
pub struct ThresholdStore {
    current: Arc<RwLock<Arc<RuleThresholds>>>,
}

impl ThresholdStore {
    /// Creates a store holding `initial`.
    pub fn new(initial: RuleThresholds) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    /// Returns the thresholds in force right now.
    pub fn snapshot(&self) -> Arc<RuleThresholds> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Validates and installs new thresholds.
    ///
    /// Snapshots taken before the call are unaffected.
    pub fn replace(&self, thresholds: RuleThresholds) -> EngineResult<()> {
        thresholds.validate()?;
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(thresholds);
        info!("Rule thresholds replaced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_snapshot_survives_replace() {
        let store = ThresholdStore::new(RuleThresholds::default());
        let in_flight = store.snapshot();

        let updated = RuleThresholds {
            max_daily_hours: Decimal::new(9, 0),
            ..RuleThresholds::default()
        };
        store.replace(updated).unwrap();

        assert_eq!(in_flight.max_daily_hours, Decimal::new(10, 0));
        assert_eq!(store.snapshot().max_daily_hours, Decimal::new(9, 0));
    }

    #[test]
    fn test_invalid_replacement_keeps_current_value() {
        let store = ThresholdStore::new(RuleThresholds::default());
        let invalid = RuleThresholds {
            min_weekly_rest_hours: Decimal::ZERO,
            ..RuleThresholds::default()
        };

        assert!(store.replace(invalid).is_err());
        assert_eq!(*store.snapshot(), RuleThresholds::default());
    }

    #[test]
    fn test_clones_share_the_same_value() {
        let store = ThresholdStore::new(RuleThresholds::default());
        let other = store.clone();
        other
            .replace(RuleThresholds {
                max_consecutive_work_days: 5,
                ..RuleThresholds::default()
            })
            .unwrap();
        assert_eq!(store.snapshot().max_consecutive_work_days, 5);
    }
}
