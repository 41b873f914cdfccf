//! CAN SLIM Core — domain types, the pure scorer, and the data layer.
//!
//! This crate contains the heart of the screener:
//! - Domain types (ticker snapshots, scored records, criteria)
//! - The pure seven-criterion scoring function with configurable thresholds
//! - Snapshot provider trait with the Yahoo Finance implementation
//! - Circuit breaker, on-disk snapshot cache, batch fetch orchestrator
//! - Sector-organized universe configuration

pub mod data;
pub mod domain;
pub mod scoring;
