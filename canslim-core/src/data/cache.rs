//! Snapshot cache — the screen's memoization layer, made explicit.
//!
//! Layout: `{cache_dir}/ticker={TICKER}/snapshot.json` + `meta.json`
//!
//! Features:
//! - Atomic writes (write to .tmp, rename into place)
//! - Metadata sidecar per ticker (fetch window, content hash, cached-at)
//! - Quarantine for corrupt files ({filename}.quarantined)
//! - Wholesale invalidation for the manual refresh action
//!
//! The cache key is ticker + fetch window: a cached snapshot only serves a
//! request whose window its own window contains. The cache sits outside
//! the pure scorer, above the provider trait.

use super::provider::{DataError, FetchWindow};
use crate::domain::TickerSnapshot;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Metadata sidecar for a cached ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMeta {
    pub ticker: String,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub content_hash: String,
    pub source: String,
    pub cached_at: chrono::NaiveDateTime,
}

/// Cache status for a single ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStatus {
    pub ticker: String,
    pub cached: bool,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    pub cached_at: Option<chrono::NaiveDateTime>,
}

/// The on-disk snapshot cache.
pub struct SnapshotCache {
    cache_dir: PathBuf,
}

impl SnapshotCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Root directory of the cache.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Directory for a specific ticker: `{cache_dir}/ticker={TICKER}/`
    fn ticker_dir(&self, ticker: &str) -> PathBuf {
        self.cache_dir.join(format!("ticker={ticker}"))
    }

    fn snapshot_path(&self, ticker: &str) -> PathBuf {
        self.ticker_dir(ticker).join("snapshot.json")
    }

    fn meta_path(&self, ticker: &str) -> PathBuf {
        self.ticker_dir(ticker).join("meta.json")
    }

    /// Write a snapshot and its metadata sidecar. Writes are atomic:
    /// write to .tmp then rename.
    pub fn write(
        &self,
        snapshot: &TickerSnapshot,
        window: FetchWindow,
        source: &str,
    ) -> Result<(), DataError> {
        let dir = self.ticker_dir(&snapshot.ticker);
        fs::create_dir_all(&dir)
            .map_err(|e| DataError::CacheError(format!("failed to create dir: {e}")))?;

        let body = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| DataError::CacheError(format!("snapshot serialization: {e}")))?;

        let path = self.snapshot_path(&snapshot.ticker);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, &body)
            .map_err(|e| DataError::CacheError(format!("snapshot write: {e}")))?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DataError::CacheError(format!("atomic rename failed: {e}"))
        })?;

        let meta = CacheMeta {
            ticker: snapshot.ticker.clone(),
            window_start: window.start,
            window_end: window.end,
            content_hash: blake3::hash(&body).to_hex().to_string(),
            source: source.to_string(),
            cached_at: chrono::Local::now().naive_local(),
        };
        let meta_json = serde_json::to_string_pretty(&meta)
            .map_err(|e| DataError::CacheError(format!("meta serialization: {e}")))?;
        fs::write(self.meta_path(&snapshot.ticker), meta_json)
            .map_err(|e| DataError::CacheError(format!("meta write: {e}")))?;

        Ok(())
    }

    /// Load the cached snapshot for a ticker.
    ///
    /// A corrupt snapshot file is quarantined and reported as missing so the
    /// caller falls back to a live fetch.
    pub fn load(&self, ticker: &str) -> Result<TickerSnapshot, DataError> {
        let path = self.snapshot_path(ticker);
        if !path.exists() {
            return Err(DataError::NoCachedData {
                ticker: ticker.to_string(),
            });
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| DataError::CacheError(format!("snapshot read: {e}")))?;

        match serde_json::from_str(&content) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                let quarantine = path.with_extension("json.quarantined");
                log::warn!(
                    "quarantining corrupt cache file {}: {e}",
                    path.display()
                );
                let _ = fs::rename(&path, &quarantine);
                Err(DataError::NoCachedData {
                    ticker: ticker.to_string(),
                })
            }
        }
    }

    /// Read the metadata sidecar for a ticker, if present and parseable.
    pub fn meta(&self, ticker: &str) -> Option<CacheMeta> {
        let content = fs::read_to_string(self.meta_path(ticker)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// True when the cached snapshot's window covers the requested window.
    pub fn covers(&self, ticker: &str, window: FetchWindow) -> bool {
        match self.meta(ticker) {
            None => false,
            Some(meta) => FetchWindow {
                start: meta.window_start,
                end: meta.window_end,
            }
            .covers(&window),
        }
    }

    /// Cache status for a list of tickers.
    pub fn status(&self, tickers: &[&str]) -> Vec<CacheStatus> {
        tickers
            .iter()
            .map(|ticker| {
                let meta = self.meta(ticker);
                CacheStatus {
                    ticker: ticker.to_string(),
                    cached: meta.is_some() && self.snapshot_path(ticker).exists(),
                    window_start: meta.as_ref().map(|m| m.window_start),
                    window_end: meta.as_ref().map(|m| m.window_end),
                    cached_at: meta.as_ref().map(|m| m.cached_at),
                }
            })
            .collect()
    }

    /// Remove every cached ticker (the refresh action). Returns the number
    /// of tickers removed. No partial invalidation — the policy is
    /// wholesale.
    pub fn invalidate_all(&self) -> Result<usize, DataError> {
        if !self.cache_dir.exists() {
            return Ok(0);
        }

        let entries = fs::read_dir(&self.cache_dir)
            .map_err(|e| DataError::CacheError(format!("read cache dir: {e}")))?;

        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(|e| DataError::CacheError(format!("dir entry: {e}")))?;
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with("ticker=") {
                continue;
            }
            fs::remove_dir_all(entry.path())
                .map_err(|e| DataError::CacheError(format!("remove {name}: {e}")))?;
            removed += 1;
        }
        Ok(removed)
    }

    /// Tickers currently present in the cache, sorted.
    pub fn cached_tickers(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.cache_dir) else {
            return Vec::new();
        };
        let mut tickers: Vec<String> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                name.strip_prefix("ticker=").map(str::to_string)
            })
            .collect();
        tickers.sort();
        tickers
    }
}
