//! Screen runner — fetch (cache-aware) and score every configured ticker.

use serde::{Deserialize, Serialize};

use canslim_core::data::{
    fetch_universe, FetchOptions, FetchProgress, FetchWindow, SnapshotCache, SnapshotProvider,
};
use canslim_core::domain::ScoredRecord;
use canslim_core::scoring::score_snapshot;

use crate::config::ScreenConfig;

/// Artifact schema version; bump on breaking changes to `ScreenResult`.
pub const SCHEMA_VERSION: u32 = 1;

/// Options controlling a single screen run.
#[derive(Debug, Clone, Copy)]
pub struct ScreenOptions {
    /// Trailing price window to request per ticker.
    pub window: FetchWindow,
    /// Never hit the provider; only cached snapshots are used.
    pub offline: bool,
    /// Invalidate the whole snapshot cache before fetching.
    pub refresh: bool,
}

/// A transport-level failure for one ticker, kept distinct from degraded
/// (but successfully fetched) records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScreenFailure {
    pub ticker: String,
    pub error: String,
}

/// The complete result of one screen run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenResult {
    pub schema_version: u32,
    pub config_id: String,
    pub market_is_uptrend: bool,
    /// Scored records in input ticker order.
    pub records: Vec<ScoredRecord>,
    /// Tickers whose fetch failed outright (network, unknown symbol, …).
    pub failures: Vec<ScreenFailure>,
}

impl ScreenResult {
    /// Count of records that passed all seven criteria.
    pub fn pass_count(&self) -> usize {
        self.records.iter().filter(|r| r.overall_pass()).count()
    }

    /// Count of degraded (missing-EPS) records.
    pub fn degraded_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_degraded()).count()
    }
}

/// Run the screen: fetch a snapshot per configured ticker and score each
/// one against the configured thresholds.
///
/// Record order matches the configured ticker order. A ticker whose fetch
/// fails lands in `failures` and never aborts the rest; a ticker that
/// fetched but lacks growth data lands in `records` as a degraded record.
pub fn run_screen(
    config: &ScreenConfig,
    provider: Option<&dyn SnapshotProvider>,
    cache: &SnapshotCache,
    opts: &ScreenOptions,
    progress: &dyn FetchProgress,
) -> Result<ScreenResult, canslim_core::data::DataError> {
    if opts.refresh {
        let removed = cache.invalidate_all()?;
        log::info!("refresh: invalidated {removed} cached snapshot(s)");
    }

    let tickers: Vec<&str> = config.screen.tickers.iter().map(|t| t.as_str()).collect();
    let fetch_opts = FetchOptions {
        window: opts.window,
        // A refresh already emptied the cache; force matters only for
        // selective re-fetching on top of a warm cache.
        force: false,
    };

    let provider = if opts.offline { None } else { provider };
    let outcome = fetch_universe(provider, cache, &tickers, &fetch_opts, progress);

    let records = outcome
        .snapshots
        .iter()
        .map(|snapshot| {
            score_snapshot(
                snapshot,
                config.screen.market_is_uptrend,
                &config.thresholds,
            )
        })
        .collect();

    let failures = outcome
        .failures
        .into_iter()
        .map(|(ticker, error)| ScreenFailure {
            ticker,
            error: error.to_string(),
        })
        .collect();

    Ok(ScreenResult {
        schema_version: SCHEMA_VERSION,
        config_id: config.config_id(),
        market_is_uptrend: config.screen.market_is_uptrend,
        records,
        failures,
    })
}
