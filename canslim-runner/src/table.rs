//! Table model — score tiers, sector filtering, and display formatting.
//!
//! Pure consumers of `ScoredRecord`; nothing here feeds back into the
//! scorer.

use serde::{Deserialize, Serialize};

use canslim_core::domain::{ScoredRecord, MISSING_EPS_MARKER};

/// Row styling tier, driven purely by the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreTier {
    /// Score ≥ 6.
    Strong,
    /// Score 4–5.
    Moderate,
    /// Score < 4, or a degraded record.
    Weak,
}

impl ScoreTier {
    pub fn of(record: &ScoredRecord) -> Self {
        match record.score() {
            Some(score) if score >= 6 => ScoreTier::Strong,
            Some(score) if score >= 4 => ScoreTier::Moderate,
            _ => ScoreTier::Weak,
        }
    }
}

/// Sector selection: everything, or a single sector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectorFilter {
    All,
    Sector(String),
}

impl SectorFilter {
    pub fn matches(&self, record: &ScoredRecord) -> bool {
        match self {
            SectorFilter::All => true,
            SectorFilter::Sector(sector) => record.sector == *sector,
        }
    }
}

/// Filter records by sector, preserving their order.
pub fn filter_by_sector<'a>(
    records: &'a [ScoredRecord],
    filter: &SectorFilter,
) -> Vec<&'a ScoredRecord> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

/// Distinct sectors present in the records, sorted.
pub fn available_sectors(records: &[ScoredRecord]) -> Vec<String> {
    let mut sectors: Vec<String> = records.iter().map(|r| r.sector.clone()).collect();
    sectors.sort();
    sectors.dedup();
    sectors
}

/// One record rendered to display strings — the same cells feed the CLI
/// table and the CSV export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub ticker: String,
    pub company: String,
    pub sector: String,
    pub industry: String,
    pub price: String,
    pub eps_growth_qtr: String,
    pub eps_growth_yr: String,
    pub institutional_pct: String,
    pub near_52w_high_pct: String,
    /// `"5/7"` for scored records, empty for degraded ones.
    pub score: String,
    /// `"PASS"`, `"FAIL"`, or the missing-data marker.
    pub pass: String,
    pub tier: ScoreTier,
}

impl TableRow {
    pub fn from_record(record: &ScoredRecord) -> Self {
        let (score, pass) = match record.score() {
            Some(score) => (
                format!("{score}/7"),
                if record.overall_pass() { "PASS" } else { "FAIL" }.to_string(),
            ),
            None => (String::new(), MISSING_EPS_MARKER.to_string()),
        };

        Self {
            ticker: record.ticker.clone(),
            company: record.company_name.clone(),
            sector: record.sector.clone(),
            industry: record.industry.clone(),
            price: format_optional(record.current_price, |p| format!("{p:.2}")),
            eps_growth_qtr: format_optional(record.eps_growth_quarterly, format_pct),
            eps_growth_yr: format_optional(record.eps_growth_annual, format_pct),
            institutional_pct: format_optional(record.institutional_ownership, format_pct),
            near_52w_high_pct: match record.near_high_pct {
                Some(ratio) => format!("{:.1}%", ratio * 100.0),
                None => "N/A".to_string(),
            },
            score,
            pass,
            tier: ScoreTier::of(record),
        }
    }
}

fn format_optional(value: Option<f64>, fmt: impl Fn(f64) -> String) -> String {
    value.map(fmt).unwrap_or_default()
}

fn format_pct(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}
