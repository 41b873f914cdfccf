//! Serializable screen configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use canslim_core::scoring::ScoringThresholds;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Serializable configuration for a single screen run.
///
/// Captures everything needed to reproduce a screen: the ticker list, the
/// market-direction flag, and the scoring thresholds. The former ambient
/// dashboard state (selected tickers, market toggle) lives here as explicit
/// parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScreenConfig {
    pub screen: ScreenSection,

    /// Threshold overrides; absent fields keep the defaults.
    #[serde(default)]
    pub thresholds: ScoringThresholds,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScreenSection {
    /// Tickers to screen, in display order.
    pub tickers: Vec<String>,

    /// External market-direction flag, fed to the M criterion unmodified.
    #[serde(default = "default_market_is_uptrend")]
    pub market_is_uptrend: bool,
}

fn default_market_is_uptrend() -> bool {
    true
}

impl ScreenConfig {
    /// Load a screen config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse a screen config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Build a config from a plain ticker list with default everything.
    pub fn from_tickers(tickers: Vec<String>) -> Result<Self, ConfigError> {
        let config = Self {
            screen: ScreenSection {
                tickers,
                market_is_uptrend: true,
            },
            thresholds: ScoringThresholds::default(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.screen.tickers.is_empty() {
            return Err(ConfigError::Invalid("no tickers configured".into()));
        }
        let t = &self.thresholds;
        if !(0.0..=1.0).contains(&t.min_institutional_ownership) {
            return Err(ConfigError::Invalid(
                "min_institutional_ownership must be in [0, 1]".into(),
            ));
        }
        if t.near_high_fraction <= 0.0 {
            return Err(ConfigError::Invalid(
                "near_high_fraction must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs share the same ID; artifact
    /// directories embed it so reruns are attributable.
    pub fn config_id(&self) -> String {
        let json = serde_json::to_string(self).expect("ScreenConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_toml() -> &'static str {
        r#"
[screen]
tickers = ["NVDA", "AAPL", "MSFT"]
market_is_uptrend = true

[thresholds]
min_eps_growth_quarterly = 0.25
near_high_fraction = 0.85
"#
    }

    #[test]
    fn parses_full_config() {
        let config = ScreenConfig::from_toml(sample_toml()).unwrap();
        assert_eq!(config.screen.tickers, vec!["NVDA", "AAPL", "MSFT"]);
        assert!(config.screen.market_is_uptrend);
        assert_eq!(config.thresholds.min_eps_growth_quarterly, 0.25);
        // Unspecified thresholds keep their defaults
        assert_eq!(config.thresholds.min_institutional_ownership, 0.70);
    }

    #[test]
    fn market_flag_defaults_to_uptrend() {
        let config = ScreenConfig::from_toml("[screen]\ntickers = [\"NVDA\"]").unwrap();
        assert!(config.screen.market_is_uptrend);
        assert_eq!(config.thresholds, ScoringThresholds::default());
    }

    #[test]
    fn empty_ticker_list_is_invalid() {
        let err = ScreenConfig::from_toml("[screen]\ntickers = []").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn out_of_range_ownership_is_invalid() {
        let toml_str = r#"
[screen]
tickers = ["NVDA"]

[thresholds]
min_institutional_ownership = 1.5
"#;
        let err = ScreenConfig::from_toml(toml_str).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn config_id_is_deterministic() {
        let a = ScreenConfig::from_toml(sample_toml()).unwrap();
        let b = ScreenConfig::from_toml(sample_toml()).unwrap();
        assert_eq!(a.config_id(), b.config_id());
        assert!(!a.config_id().is_empty());
    }

    #[test]
    fn config_id_changes_with_params() {
        let a = ScreenConfig::from_toml(sample_toml()).unwrap();
        let mut b = a.clone();
        b.screen.market_is_uptrend = false;
        assert_ne!(a.config_id(), b.config_id());
    }

    #[test]
    fn serde_roundtrip() {
        let config = ScreenConfig::from_toml(sample_toml()).unwrap();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let restored: ScreenConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }
}
