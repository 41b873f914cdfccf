//! TickerSnapshot — the fundamental per-ticker data unit.

use serde::{Deserialize, Serialize};

/// Point-in-time bundle of fundamental and price data for one ticker.
///
/// Every field except `ticker` is optional: the provider may return any
/// combination of absent fields and the scorer must tolerate all of them.
/// Growth rates are fractional (0.30 = 30%); institutional ownership is a
/// fraction in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    pub ticker: String,
    pub current_price: Option<f64>,
    pub eps_growth_quarterly: Option<f64>,
    pub eps_growth_annual: Option<f64>,
    pub institutional_ownership: Option<f64>,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    /// Daily closing prices over the trailing year, oldest first. May be empty.
    pub trailing_52w_closes: Vec<f64>,
}

impl TickerSnapshot {
    /// Bare snapshot with only the ticker set.
    pub fn empty(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            current_price: None,
            eps_growth_quarterly: None,
            eps_growth_annual: None,
            institutional_ownership: None,
            company_name: None,
            sector: None,
            industry: None,
            trailing_52w_closes: Vec::new(),
        }
    }

    /// Maximum daily close over the trailing year.
    ///
    /// Falls back to 1.0 when the history is empty (or contains no finite
    /// close). This is the documented degenerate denominator, not an error:
    /// the N criterion then compares the raw price against the near-high
    /// fraction directly.
    pub fn high_52w(&self) -> f64 {
        let high = self
            .trailing_52w_closes
            .iter()
            .copied()
            .filter(|c| c.is_finite())
            .fold(f64::NEG_INFINITY, f64::max);
        if high.is_finite() {
            high
        } else {
            1.0
        }
    }

    /// True when both growth fields required for scoring are present.
    pub fn has_growth_data(&self) -> bool {
        self.eps_growth_quarterly.is_some() && self.eps_growth_annual.is_some()
    }
}
