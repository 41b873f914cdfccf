//! CAN SLIM Runner — screen orchestration, configuration, table model, and
//! export.
//!
//! This crate builds on `canslim-core` to provide:
//! - TOML screen configuration with deterministic config IDs
//! - The cache-aware screen runner (fetch + score per configured ticker)
//! - Score tiers and sector filtering for the table view
//! - CSV/JSON export and per-run artifact bundles

pub mod config;
pub mod export;
pub mod screen;
pub mod table;

pub use config::{ConfigError, ScreenConfig, ScreenSection};
pub use export::{export_json, export_records_csv, import_json, load_artifacts, save_artifacts};
pub use screen::{run_screen, ScreenFailure, ScreenOptions, ScreenResult, SCHEMA_VERSION};
pub use table::{available_sectors, filter_by_sector, ScoreTier, SectorFilter, TableRow};
