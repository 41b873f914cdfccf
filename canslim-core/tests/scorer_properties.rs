//! Property tests for scorer invariants.
//!
//! Uses proptest to verify:
//! 1. Score bounds — score is always in [0, 7] and overall_pass ⇔ score == 7
//! 2. Degradation — a record degrades iff a growth field is absent
//! 3. Idempotence — identical inputs yield identical records
//! 4. Institutional sponsorship is never true by omission
//! 5. Leader is exactly C AND A

use proptest::prelude::*;

use canslim_core::domain::{ScoreOutcome, TickerSnapshot};
use canslim_core::scoring::{score_snapshot, ScoringThresholds};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_growth() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        1 => Just(None),
        4 => (-0.95..2.0_f64).prop_map(|g| Some((g * 1000.0).round() / 1000.0)),
    ]
}

fn arb_price() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        1 => Just(None),
        4 => (0.5..500.0_f64).prop_map(|p| Some((p * 100.0).round() / 100.0)),
    ]
}

fn arb_ownership() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        1 => Just(None),
        4 => (0.0..1.0_f64).prop_map(|o| Some((o * 100.0).round() / 100.0)),
    ]
}

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..500.0_f64, 0..40)
}

prop_compose! {
    fn arb_snapshot()(
        price in arb_price(),
        growth_qtr in arb_growth(),
        growth_yr in arb_growth(),
        ownership in arb_ownership(),
        closes in arb_closes(),
    ) -> TickerSnapshot {
        TickerSnapshot {
            ticker: "TEST".into(),
            current_price: price,
            eps_growth_quarterly: growth_qtr,
            eps_growth_annual: growth_yr,
            institutional_ownership: ownership,
            company_name: Some("Test Corp".into()),
            sector: Some("Technology".into()),
            industry: Some("Software".into()),
            trailing_52w_closes: closes,
        }
    }
}

// ── 1. Score bounds ──────────────────────────────────────────────────

proptest! {
    /// With both growth fields present, the score is in [0, 7] and
    /// overall_pass holds exactly when the score is 7.
    #[test]
    fn score_bounds_and_pass_equivalence(
        snapshot in arb_snapshot(),
        market_up in any::<bool>(),
    ) {
        let record = score_snapshot(&snapshot, market_up, &ScoringThresholds::default());

        if snapshot.has_growth_data() {
            match record.outcome {
                ScoreOutcome::Scored { criteria, score, overall_pass } => {
                    prop_assert!(score <= 7);
                    prop_assert_eq!(score, criteria.score());
                    prop_assert_eq!(overall_pass, score == 7);
                }
                ScoreOutcome::MissingEpsData => {
                    prop_assert!(false, "complete snapshot must be scored");
                }
            }
        }
    }

    // ── 2. Degradation ──────────────────────────────────────────────

    /// Either growth field absent ⇒ degraded record, regardless of any
    /// other field's value.
    #[test]
    fn missing_growth_always_degrades(
        snapshot in arb_snapshot(),
        market_up in any::<bool>(),
    ) {
        let record = score_snapshot(&snapshot, market_up, &ScoringThresholds::default());

        if !snapshot.has_growth_data() {
            prop_assert!(record.is_degraded());
            prop_assert_eq!(record.score(), None);
            prop_assert!(!record.overall_pass());
        } else {
            prop_assert!(!record.is_degraded());
        }
    }

    // ── 3. Idempotence ──────────────────────────────────────────────

    /// Scoring the same snapshot and market flag twice yields identical
    /// records, field for field.
    #[test]
    fn scoring_is_deterministic(
        snapshot in arb_snapshot(),
        market_up in any::<bool>(),
    ) {
        let thresholds = ScoringThresholds::default();
        let first = score_snapshot(&snapshot, market_up, &thresholds);
        let second = score_snapshot(&snapshot, market_up, &thresholds);
        prop_assert_eq!(first, second);
    }

    // ── 4. Institutional sponsorship ────────────────────────────────

    /// I passes iff ownership is present and at/above the threshold;
    /// absent ownership never passes.
    #[test]
    fn institutional_criterion_semantics(
        snapshot in arb_snapshot(),
    ) {
        let thresholds = ScoringThresholds::default();
        let record = score_snapshot(&snapshot, true, &thresholds);

        if let ScoreOutcome::Scored { criteria, .. } = record.outcome {
            let expected = snapshot
                .institutional_ownership
                .is_some_and(|own| own >= thresholds.min_institutional_ownership);
            prop_assert_eq!(criteria.i, expected);
        }
    }

    // ── 5. Leader ───────────────────────────────────────────────────

    /// L is exactly the conjunction of C and A.
    #[test]
    fn leader_is_c_and_a(
        snapshot in arb_snapshot(),
        market_up in any::<bool>(),
    ) {
        let record = score_snapshot(&snapshot, market_up, &ScoringThresholds::default());

        if let ScoreOutcome::Scored { criteria, .. } = record.outcome {
            prop_assert_eq!(criteria.l, criteria.c && criteria.a);
        }
    }

    /// The market criterion mirrors the external flag unmodified.
    #[test]
    fn market_criterion_mirrors_flag(
        snapshot in arb_snapshot(),
        market_up in any::<bool>(),
    ) {
        let record = score_snapshot(&snapshot, market_up, &ScoringThresholds::default());

        if let ScoreOutcome::Scored { criteria, .. } = record.outcome {
            prop_assert_eq!(criteria.m, market_up);
        }
    }

    /// The S placeholder always passes on scored records.
    #[test]
    fn supply_placeholder_always_passes(
        snapshot in arb_snapshot(),
        market_up in any::<bool>(),
    ) {
        let record = score_snapshot(&snapshot, market_up, &ScoringThresholds::default());

        if let ScoreOutcome::Scored { criteria, .. } = record.outcome {
            prop_assert!(criteria.s);
        }
    }
}
