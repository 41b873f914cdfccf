//! Scoring thresholds — the configurable knobs of the seven predicates.

use serde::{Deserialize, Serialize};

/// Thresholds for the threshold-based criteria (C, A, N, I).
///
/// Deserializable from the `[thresholds]` section of a screen config;
/// every field is optional there and falls back to the defaults below.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringThresholds {
    /// Minimum quarterly EPS growth for C (fractional, 0.25 = 25%).
    pub min_eps_growth_quarterly: f64,
    /// Minimum annual EPS growth for A.
    pub min_eps_growth_annual: f64,
    /// Minimum institutional ownership for I, in [0, 1].
    pub min_institutional_ownership: f64,
    /// Fraction of the 52-week high the price must reach for N.
    pub near_high_fraction: f64,
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self {
            min_eps_growth_quarterly: 0.25,
            min_eps_growth_annual: 0.25,
            min_institutional_ownership: 0.70,
            near_high_fraction: 0.85,
        }
    }
}
