//! Data layer — provider trait, Yahoo Finance client, snapshot cache, and
//! the batch fetch orchestrator.

pub mod cache;
pub mod circuit_breaker;
pub mod fetch;
pub mod provider;
pub mod universe;
pub mod yahoo;

pub use cache::{CacheMeta, CacheStatus, SnapshotCache};
pub use circuit_breaker::CircuitBreaker;
pub use fetch::{fetch_universe, FetchOptions, FetchOutcome};
pub use provider::{
    DataError, FetchProgress, FetchWindow, SilentProgress, SnapshotProvider, StdoutProgress,
};
pub use universe::Universe;
pub use yahoo::YahooProvider;
