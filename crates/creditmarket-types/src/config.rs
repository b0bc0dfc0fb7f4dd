//! Configuration for a CreditMarket engine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{MarketError, Result, constants};

/// Engine configuration. Every field has a default, so an empty JSON object
/// is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Receipts kept in the journal before the oldest are evicted.
    pub journal_capacity: usize,
    /// Re-check supply conservation after every successful mutation.
    pub verify_supply_after_each_op: bool,
    /// Reject `deposit` calls with a zero amount instead of treating them
    /// as no-ops.
    pub reject_zero_deposits: bool,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            journal_capacity: constants::DEFAULT_JOURNAL_CAPACITY,
            verify_supply_after_each_op: false,
            reject_zero_deposits: false,
        }
    }
}

impl MarketConfig {
    /// Check field values.
    ///
    /// # Errors
    /// Returns [`MarketError::Configuration`] if `journal_capacity` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.journal_capacity == 0 {
            return Err(MarketError::Configuration(
                "journal_capacity must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = MarketConfig::default();
        assert_eq!(cfg.journal_capacity, 10_000);
        assert!(!cfg.verify_supply_after_each_op);
        assert!(!cfg.reject_zero_deposits);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_object_uses_defaults() {
        let cfg = MarketConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, MarketConfig::default());
    }

    #[test]
    fn partial_override() {
        let cfg = MarketConfig::from_json_str(r#"{"verify_supply_after_each_op": true}"#).unwrap();
        assert!(cfg.verify_supply_after_each_op);
        assert_eq!(cfg.journal_capacity, constants::DEFAULT_JOURNAL_CAPACITY);
    }

    #[test]
    fn zero_capacity_rejected() {
        let err = MarketConfig::from_json_str(r#"{"journal_capacity": 0}"#).unwrap_err();
        assert!(matches!(err, MarketError::Configuration(_)));
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        let err = MarketConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, MarketError::Serialization(_)));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("market.json");
        let cfg = MarketConfig {
            journal_capacity: 64,
            verify_supply_after_each_op: true,
            reject_zero_deposits: true,
        };
        std::fs::write(&path, serde_json::to_string(&cfg).unwrap()).unwrap();

        assert_eq!(MarketConfig::from_path(&path).unwrap(), cfg);
    }

    #[test]
    fn invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("market.json");
        std::fs::write(&path, r#"{"journal_capacity": 0}"#).unwrap();

        let err = MarketConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, MarketError::Configuration(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = MarketConfig::from_path("/nonexistent/creditmarket.json").unwrap_err();
        assert!(matches!(err, MarketError::Io(_)));
    }
}
