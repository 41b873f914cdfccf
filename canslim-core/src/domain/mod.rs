//! Domain types — ticker snapshots and scored records.

pub mod record;
pub mod snapshot;

pub use record::{ScoreOutcome, ScoredRecord, MISSING_EPS_MARKER};
pub use snapshot::TickerSnapshot;

/// Sentinel shown for absent company/sector/industry strings.
pub const UNKNOWN: &str = "Unknown";

/// Ticker symbol type alias
pub type Ticker = String;
