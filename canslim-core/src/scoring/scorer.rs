//! The pure scoring function: snapshot + market flag → scored record.

use crate::domain::{ScoreOutcome, ScoredRecord, TickerSnapshot, UNKNOWN};

use super::{CriterionSet, ScoringThresholds};

/// Score one snapshot against the seven CAN SLIM criteria.
///
/// Pure and deterministic: no I/O, no clock, no shared state. Calling it
/// twice with the same inputs yields identical records.
///
/// If either earnings-growth field is absent the record degrades
/// immediately — display fields are still populated, but the outcome is
/// `MissingEpsData` and no partial score is attempted.
pub fn score_snapshot(
    snapshot: &TickerSnapshot,
    market_is_uptrend: bool,
    thresholds: &ScoringThresholds,
) -> ScoredRecord {
    let high_52w = snapshot.high_52w();
    let near_high_pct = snapshot.current_price.map(|price| price / high_52w);

    let mut record = ScoredRecord {
        ticker: snapshot.ticker.clone(),
        company_name: display_or_unknown(&snapshot.company_name),
        sector: display_or_unknown(&snapshot.sector),
        industry: display_or_unknown(&snapshot.industry),
        current_price: snapshot.current_price,
        eps_growth_quarterly: snapshot.eps_growth_quarterly,
        eps_growth_annual: snapshot.eps_growth_annual,
        institutional_ownership: snapshot.institutional_ownership,
        near_high_pct,
        outcome: ScoreOutcome::MissingEpsData,
    };

    let (Some(growth_qtr), Some(growth_yr)) =
        (snapshot.eps_growth_quarterly, snapshot.eps_growth_annual)
    else {
        return record;
    };

    let c = growth_qtr >= thresholds.min_eps_growth_quarterly;
    let a = growth_yr >= thresholds.min_eps_growth_annual;
    let n = match snapshot.current_price {
        Some(price) => price >= thresholds.near_high_fraction * high_52w,
        None => false,
    };
    // Supply/demand has no data source wired up; S is a static placeholder.
    let s = true;
    let l = c && a;
    let i = snapshot
        .institutional_ownership
        .is_some_and(|own| own >= thresholds.min_institutional_ownership);
    let m = market_is_uptrend;

    let criteria = CriterionSet { c, a, n, s, l, i, m };
    record.outcome = ScoreOutcome::Scored {
        criteria,
        score: criteria.score(),
        overall_pass: criteria.all_pass(),
    };
    record
}

fn display_or_unknown(field: &Option<String>) -> String {
    match field {
        Some(value) if !value.is_empty() => value.clone(),
        _ => UNKNOWN.to_string(),
    }
}
