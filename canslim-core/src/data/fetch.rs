//! Batch fetch orchestrator — cache-first per-ticker fetches with progress
//! reporting.
//!
//! One ticker's failure never aborts the rest of the batch; failures are
//! collected alongside the snapshots, and snapshot order always matches
//! input ticker order.

use super::cache::SnapshotCache;
use super::provider::{DataError, FetchProgress, FetchWindow, SnapshotProvider};
use crate::domain::TickerSnapshot;

/// Options controlling a batch fetch.
///
/// Offline operation is expressed by passing no provider: cache misses then
/// become `NoCachedData` failures.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Trailing price window to request (and the cache key).
    pub window: FetchWindow,
    /// Bypass the cache and re-fetch even when covered.
    pub force: bool,
}

/// Result of a batch fetch: snapshots in input order plus per-ticker
/// failures.
#[derive(Debug)]
pub struct FetchOutcome {
    pub snapshots: Vec<TickerSnapshot>,
    pub failures: Vec<(String, DataError)>,
}

impl FetchOutcome {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fetch snapshots for a list of tickers, cache-first.
///
/// Per ticker: serve from the cache when it covers the window (unless
/// forcing), otherwise fetch from the provider and cache the result.
/// When the provider trips its circuit breaker mid-batch, the remaining
/// tickers fail fast with `CircuitBreakerTripped` instead of hammering it.
pub fn fetch_universe(
    provider: Option<&dyn SnapshotProvider>,
    cache: &SnapshotCache,
    tickers: &[&str],
    opts: &FetchOptions,
    progress: &dyn FetchProgress,
) -> FetchOutcome {
    let total = tickers.len();
    let mut snapshots = Vec::with_capacity(total);
    let mut failures: Vec<(String, DataError)> = Vec::new();

    for (i, ticker) in tickers.iter().enumerate() {
        progress.on_start(ticker, i, total);

        let result = fetch_single(provider, cache, ticker, opts);
        progress.on_complete(ticker, i, total, &result.as_ref().map(|_| ()).map_err(clone_err));

        match result {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(e) => {
                let tripped = matches!(e, DataError::CircuitBreakerTripped);
                failures.push((ticker.to_string(), e));

                // Bail out early once the provider has blocked us
                if tripped || provider.is_some_and(|p| !p.is_available()) {
                    for remaining in &tickers[(i + 1)..total] {
                        failures.push((remaining.to_string(), DataError::CircuitBreakerTripped));
                    }
                    break;
                }
            }
        }
    }

    let failed = failures.len();
    progress.on_batch_complete(total - failed, failed, total);

    FetchOutcome {
        snapshots,
        failures,
    }
}

fn fetch_single(
    provider: Option<&dyn SnapshotProvider>,
    cache: &SnapshotCache,
    ticker: &str,
    opts: &FetchOptions,
) -> Result<TickerSnapshot, DataError> {
    if !opts.force && cache.covers(ticker, opts.window) {
        match cache.load(ticker) {
            Ok(snapshot) => return Ok(snapshot),
            // Quarantined or unreadable: fall through to a live fetch
            Err(e) => log::debug!("[{ticker}] cache miss after coverage hit: {e}"),
        }
    }

    let Some(provider) = provider else {
        return Err(DataError::NoCachedData {
            ticker: ticker.to_string(),
        });
    };

    let snapshot = provider.fetch(ticker, opts.window)?;
    cache.write(&snapshot, opts.window, provider.name())?;
    Ok(snapshot)
}

// DataError is not Clone (reqwest sources aren't); progress callbacks only
// need the rendered message.
fn clone_err(e: &DataError) -> DataError {
    DataError::Other(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::SilentProgress;
    use chrono::NaiveDate;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
    use std::sync::Mutex;

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_cache() -> (PathBuf, SnapshotCache) {
        let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("canslim_fetch_{}_{id}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let cache = SnapshotCache::new(&dir);
        (dir, cache)
    }

    fn window() -> FetchWindow {
        FetchWindow::trailing_year(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap())
    }

    fn opts() -> FetchOptions {
        FetchOptions {
            window: window(),
            force: false,
        }
    }

    /// Provider stub: configurable per-ticker failures, counts fetches.
    struct StubProvider {
        fail: Vec<&'static str>,
        trip_on: Option<&'static str>,
        fetches: AtomicU32,
        tripped: Mutex<bool>,
    }

    impl StubProvider {
        fn new() -> Self {
            Self {
                fail: Vec::new(),
                trip_on: None,
                fetches: AtomicU32::new(0),
                tripped: Mutex::new(false),
            }
        }

        fn failing(fail: Vec<&'static str>) -> Self {
            Self {
                fail,
                ..Self::new()
            }
        }

        fn fetch_count(&self) -> u32 {
            self.fetches.load(Ordering::Relaxed)
        }
    }

    impl SnapshotProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        fn fetch(&self, ticker: &str, _window: FetchWindow) -> Result<TickerSnapshot, DataError> {
            self.fetches.fetch_add(1, Ordering::Relaxed);
            if self.trip_on == Some(ticker) {
                *self.tripped.lock().unwrap() = true;
                return Err(DataError::CircuitBreakerTripped);
            }
            if self.fail.contains(&ticker) {
                return Err(DataError::NetworkUnreachable("stub failure".into()));
            }
            let mut snapshot = TickerSnapshot::empty(ticker);
            snapshot.current_price = Some(100.0);
            Ok(snapshot)
        }

        fn is_available(&self) -> bool {
            !*self.tripped.lock().unwrap()
        }
    }

    #[test]
    fn fetches_and_caches_in_input_order() {
        let (dir, cache) = temp_cache();
        let provider = StubProvider::new();

        let outcome = fetch_universe(
            Some(&provider),
            &cache,
            &["NVDA", "AAPL", "MSFT"],
            &opts(),
            &SilentProgress,
        );

        assert!(outcome.all_succeeded());
        let order: Vec<&str> = outcome.snapshots.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(order, vec!["NVDA", "AAPL", "MSFT"]);
        assert!(cache.covers("AAPL", window()));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn one_failure_does_not_abort_the_batch() {
        let (dir, cache) = temp_cache();
        let provider = StubProvider::failing(vec!["AAPL"]);

        let outcome = fetch_universe(
            Some(&provider),
            &cache,
            &["NVDA", "AAPL", "MSFT"],
            &opts(),
            &SilentProgress,
        );

        assert_eq!(outcome.snapshots.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, "AAPL");
        let order: Vec<&str> = outcome.snapshots.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(order, vec!["NVDA", "MSFT"]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn covered_cache_skips_the_provider() {
        let (dir, cache) = temp_cache();
        let provider = StubProvider::new();

        fetch_universe(Some(&provider), &cache, &["NVDA"], &opts(), &SilentProgress);
        assert_eq!(provider.fetch_count(), 1);

        fetch_universe(Some(&provider), &cache, &["NVDA"], &opts(), &SilentProgress);
        assert_eq!(provider.fetch_count(), 1); // served from cache

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn force_refetches_despite_coverage() {
        let (dir, cache) = temp_cache();
        let provider = StubProvider::new();

        fetch_universe(Some(&provider), &cache, &["NVDA"], &opts(), &SilentProgress);
        let forced = FetchOptions {
            force: true,
            ..opts()
        };
        fetch_universe(Some(&provider), &cache, &["NVDA"], &forced, &SilentProgress);
        assert_eq!(provider.fetch_count(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn offline_without_cache_fails_with_no_cached_data() {
        let (dir, cache) = temp_cache();

        let outcome = fetch_universe(None, &cache, &["NVDA"], &opts(), &SilentProgress);

        assert!(outcome.snapshots.is_empty());
        assert!(matches!(
            outcome.failures[0].1,
            DataError::NoCachedData { .. }
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn offline_serves_covered_cache() {
        let (dir, cache) = temp_cache();
        let provider = StubProvider::new();

        fetch_universe(Some(&provider), &cache, &["NVDA"], &opts(), &SilentProgress);
        let outcome = fetch_universe(None, &cache, &["NVDA"], &opts(), &SilentProgress);

        assert!(outcome.all_succeeded());
        assert_eq!(outcome.snapshots[0].ticker, "NVDA");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn breaker_trip_fails_remaining_tickers_fast() {
        let (dir, cache) = temp_cache();
        let provider = StubProvider {
            trip_on: Some("AAPL"),
            ..StubProvider::new()
        };

        let outcome = fetch_universe(
            Some(&provider),
            &cache,
            &["NVDA", "AAPL", "MSFT", "GOOGL"],
            &opts(),
            &SilentProgress,
        );

        assert_eq!(outcome.snapshots.len(), 1);
        assert_eq!(outcome.failures.len(), 3);
        assert!(outcome
            .failures
            .iter()
            .all(|(_, e)| matches!(e, DataError::CircuitBreakerTripped)));
        // MSFT and GOOGL were never attempted
        assert_eq!(provider.fetch_count(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
