//! ScoredRecord — the scorer's output, one per snapshot.

use serde::{Deserialize, Serialize};

use crate::scoring::CriterionSet;

/// Marker rendered for records that could not be scored for lack of
/// earnings-growth data. Consumers display this inline instead of a score.
pub const MISSING_EPS_MARKER: &str = "missing EPS data";

/// Outcome of scoring one snapshot.
///
/// `Scored` carries the full per-criterion verdict; `MissingEpsData` is the
/// degraded case — either growth field was absent, so no partial score is
/// attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScoreOutcome {
    Scored {
        criteria: CriterionSet,
        score: u8,
        overall_pass: bool,
    },
    MissingEpsData,
}

/// One ticker's screen result: display fields plus the scoring outcome.
///
/// Ephemeral — rebuilt on every screen run, no identity beyond the ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub ticker: String,
    /// Resolved to `"Unknown"` when the provider had no name.
    pub company_name: String,
    pub sector: String,
    pub industry: String,
    pub current_price: Option<f64>,
    pub eps_growth_quarterly: Option<f64>,
    pub eps_growth_annual: Option<f64>,
    pub institutional_ownership: Option<f64>,
    /// Current price / 52-week high. `None` when the price was absent.
    pub near_high_pct: Option<f64>,
    pub outcome: ScoreOutcome,
}

impl ScoredRecord {
    /// Numeric score, or `None` for a degraded record.
    pub fn score(&self) -> Option<u8> {
        match self.outcome {
            ScoreOutcome::Scored { score, .. } => Some(score),
            ScoreOutcome::MissingEpsData => None,
        }
    }

    /// True iff all seven criteria passed.
    pub fn overall_pass(&self) -> bool {
        matches!(
            self.outcome,
            ScoreOutcome::Scored {
                overall_pass: true,
                ..
            }
        )
    }

    /// True for records lacking the growth data required to score.
    pub fn is_degraded(&self) -> bool {
        matches!(self.outcome, ScoreOutcome::MissingEpsData)
    }
}
