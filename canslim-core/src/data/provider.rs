//! Snapshot provider trait and structured error types.
//!
//! The SnapshotProvider trait abstracts over data sources (Yahoo Finance,
//! the on-disk cache, mocks in tests) so the screen can swap
//! implementations freely.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::TickerSnapshot;

/// Date range bounding the trailing price history of a fetch.
///
/// Part of the cache key: a cached snapshot only covers a request whose
/// window falls inside the one it was fetched with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchWindow {
    /// One trailing year ending on `end`.
    pub fn trailing_year(end: NaiveDate) -> Self {
        Self {
            start: end - chrono::Duration::days(365),
            end,
        }
    }

    /// True when this window fully contains `other`.
    pub fn covers(&self, other: &FetchWindow) -> bool {
        self.start <= other.start && self.end >= other.end
    }
}

/// Structured error types for data operations.
///
/// Transport failures (network, auth, rate limits) live here; they are
/// never conflated with data-quality degradation, which yields a valid
/// snapshot with absent fields instead.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("ticker not found: {ticker}")]
    TickerNotFound { ticker: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("cache error: {0}")]
    CacheError(String),

    #[error("no cached snapshot for '{ticker}' — run `fetch {ticker}` first")]
    NoCachedData { ticker: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for snapshot providers.
///
/// Implementations handle the specifics of one source. The cache layer
/// sits above this trait — providers don't know about the cache. A
/// provider must tolerate every combination of absent fields: partial
/// data becomes `None`s in the snapshot, never an error.
pub trait SnapshotProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the fundamentals snapshot plus trailing closes for one ticker.
    fn fetch(&self, ticker: &str, window: FetchWindow) -> Result<TickerSnapshot, DataError>;

    /// Check if the provider is currently usable (not rate-limited or blocked).
    fn is_available(&self) -> bool;
}

/// Progress callback for multi-ticker operations.
pub trait FetchProgress: Send {
    /// Called when starting to fetch a ticker.
    fn on_start(&self, ticker: &str, index: usize, total: usize);

    /// Called when a ticker fetch completes.
    fn on_complete(&self, ticker: &str, index: usize, total: usize, result: &Result<(), DataError>);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress reporter that prints to stdout.
pub struct StdoutProgress;

impl FetchProgress for StdoutProgress {
    fn on_start(&self, ticker: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {ticker}...", index + 1, total);
    }

    fn on_complete(
        &self,
        ticker: &str,
        _index: usize,
        _total: usize,
        result: &Result<(), DataError>,
    ) {
        match result {
            Ok(()) => println!("  OK: {ticker}"),
            Err(e) => println!("  FAIL: {ticker}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("\nFetch complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}

/// No-op progress reporter for embedding and tests.
pub struct SilentProgress;

impl FetchProgress for SilentProgress {
    fn on_start(&self, _ticker: &str, _index: usize, _total: usize) {}
    fn on_complete(
        &self,
        _ticker: &str,
        _index: usize,
        _total: usize,
        _result: &Result<(), DataError>,
    ) {
    }
    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn trailing_year_spans_365_days() {
        let w = FetchWindow::trailing_year(date(2025, 6, 30));
        assert_eq!(w.end, date(2025, 6, 30));
        assert_eq!(w.start, date(2024, 6, 30));
    }

    #[test]
    fn covers_requires_containment() {
        let wide = FetchWindow {
            start: date(2024, 1, 1),
            end: date(2025, 1, 1),
        };
        let inner = FetchWindow {
            start: date(2024, 3, 1),
            end: date(2024, 9, 1),
        };
        assert!(wide.covers(&inner));
        assert!(!inner.covers(&wide));
        assert!(wide.covers(&wide));
    }
}
