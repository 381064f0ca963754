//! Engine configuration

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// How the engine treats references it cannot resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceMode {
    /// Dangling returns and unknown parties contribute nothing
    #[default]
    Lenient,
    /// Any unresolved reference fails the computation
    Strict,
}

/// Settings for balance computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Balances within `[-epsilon, epsilon]` count as settled
    #[serde(default = "default_settlement_epsilon")]
    pub settlement_epsilon: BigDecimal,
    #[serde(default)]
    pub reference_mode: ReferenceMode,
}

/// One hundredth of a currency unit
pub fn default_settlement_epsilon() -> BigDecimal {
    BigDecimal::from(1) / BigDecimal::from(100)
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            settlement_epsilon: default_settlement_epsilon(),
            reference_mode: ReferenceMode::default(),
        }
    }
}

impl LedgerConfig {
    /// Lenient configuration with the default epsilon
    pub fn new() -> Self {
        Self::default()
    }

    /// Strict configuration with the default epsilon
    pub fn strict() -> Self {
        Self {
            reference_mode: ReferenceMode::Strict,
            ..Self::default()
        }
    }

    pub fn with_settlement_epsilon(mut self, epsilon: BigDecimal) -> Self {
        self.settlement_epsilon = epsilon;
        self
    }

    pub fn with_reference_mode(mut self, mode: ReferenceMode) -> Self {
        self.reference_mode = mode;
        self
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> LedgerResult<Self> {
        let config: LedgerConfig =
            serde_json::from_str(json).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if self.settlement_epsilon < BigDecimal::from(0) {
            return Err(LedgerError::Config(format!(
                "settlement epsilon must be non-negative, got {}",
                self.settlement_epsilon
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::default();
        assert_eq!(
            config.settlement_epsilon,
            BigDecimal::from_str("0.01").unwrap()
        );
        assert_eq!(config.reference_mode, ReferenceMode::Lenient);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = LedgerConfig::from_json_str(r#"{"reference_mode": "strict"}"#).unwrap();
        assert_eq!(config.reference_mode, ReferenceMode::Strict);
        assert_eq!(config.settlement_epsilon, default_settlement_epsilon());

        let config = LedgerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, LedgerConfig::default());
    }

    #[test]
    fn test_from_json_custom_epsilon() {
        let config = LedgerConfig::from_json_str(r#"{"settlement_epsilon": "0.5"}"#).unwrap();
        assert_eq!(
            config.settlement_epsilon,
            BigDecimal::from_str("0.5").unwrap()
        );
    }

    #[test]
    fn test_rejects_negative_epsilon() {
        let result = LedgerConfig::from_json_str(r#"{"settlement_epsilon": "-1"}"#);
        assert!(matches!(result, Err(LedgerError::Config(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let result = LedgerConfig::from_json_str(r#"{"reference_mode": "paranoid"}"#);
        assert!(matches!(result, Err(LedgerError::Config(_))));
    }
}
