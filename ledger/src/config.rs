use std::path::Path;

use ledger_core::Rent;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Fee and rent parameters of a ledger instance. Every field has a default,
/// so a config file only needs to list what it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Fee charged to the fee payer per signature on the transaction.
    pub lamports_per_signature: u64,
    pub rent: Rent,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            lamports_per_signature: 5000,
            rent: Rent::default(),
        }
    }
}

impl LedgerConfig {
    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = LedgerConfig::from_json(r#"{ "lamports_per_signature": 10 }"#).unwrap();
        assert_eq!(config.lamports_per_signature, 10);
        assert_eq!(config.rent, Rent::default());
    }

    #[test]
    fn test_nested_rent_override() {
        let config =
            LedgerConfig::from_json(r#"{ "rent": { "lamports_per_byte_year": 1 } }"#).unwrap();
        assert_eq!(config.lamports_per_signature, 5000);
        assert_eq!(config.rent.lamports_per_byte_year, 1);
        assert_eq!(config.rent.exemption_threshold_years, 2);
    }

    #[test]
    fn test_malformed_config_is_a_persistence_error() {
        assert!(matches!(
            LedgerConfig::from_json("{"),
            Err(LedgerError::Persistence(_))
        ));
    }
}
