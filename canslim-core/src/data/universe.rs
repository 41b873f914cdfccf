//! Universe configuration — sector-organized ticker lists.
//!
//! The universe is stored as a TOML config file with GICS sectors and
//! their member tickers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// The complete universe configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Universe {
    pub sectors: BTreeMap<String, Vec<String>>,
}

impl Universe {
    /// Load a universe from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("read universe file: {e}"))?;
        Self::from_toml(&content)
    }

    /// Parse a universe from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("parse universe TOML: {e}"))
    }

    /// Get all tickers across all sectors.
    pub fn all_tickers(&self) -> Vec<&str> {
        self.sectors
            .values()
            .flat_map(|tickers| tickers.iter().map(|t| t.as_str()))
            .collect()
    }

    /// Get tickers for a specific sector.
    pub fn sector_tickers(&self, sector: &str) -> Option<&[String]> {
        self.sectors.get(sector).map(|v| v.as_slice())
    }

    /// Get the list of sector names.
    pub fn sector_names(&self) -> Vec<&str> {
        self.sectors.keys().map(|s| s.as_str()).collect()
    }

    /// Total number of tickers.
    pub fn ticker_count(&self) -> usize {
        self.sectors.values().map(|v| v.len()).sum()
    }

    /// Default screening watchlist, organized by sector.
    pub fn default_watchlist() -> Self {
        let mut sectors = BTreeMap::new();

        sectors.insert(
            "Technology".into(),
            vec!["NVDA", "AAPL", "MSFT", "PLTR"]
                .into_iter()
                .map(String::from)
                .collect(),
        );

        sectors.insert(
            "Communication Services".into(),
            vec!["GOOGL", "META"].into_iter().map(String::from).collect(),
        );

        sectors.insert(
            "Healthcare".into(),
            vec!["LLY", "JNJ"].into_iter().map(String::from).collect(),
        );

        sectors.insert(
            "Consumer Staples".into(),
            vec!["PEP", "MKC", "ADM"]
                .into_iter()
                .map(String::from)
                .collect(),
        );

        sectors.insert(
            "Consumer Discretionary".into(),
            vec!["TSLA"].into_iter().map(String::from).collect(),
        );

        sectors.insert(
            "Industrials".into(),
            vec!["LYFT"].into_iter().map(String::from).collect(),
        );

        Self { sectors }
    }

    /// Serialize the universe to TOML.
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("serialize universe: {e}"))
    }
}
