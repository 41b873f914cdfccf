//! Reporting and export — CSV and JSON artifact generation.
//!
//! Two export formats for screen results:
//! - **CSV**: the filtered record table for spreadsheets and external tools
//! - **JSON**: full round-trip serialization with schema versioning
//!
//! Persisted JSON artifacts include a `schema_version` field. Unknown
//! versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use canslim_core::domain::ScoredRecord;

use crate::screen::{ScreenResult, SCHEMA_VERSION};
use crate::table::TableRow;

// ─── CSV export ─────────────────────────────────────────────────────

/// CSV header, one column per display field plus score and pass marker.
const CSV_HEADER: [&str; 11] = [
    "ticker",
    "company",
    "sector",
    "industry",
    "price",
    "eps_growth_qtr",
    "eps_growth_yr",
    "institutional_pct",
    "near_52w_high_pct",
    "score",
    "pass",
];

/// Export records as CSV, UTF-8, header row first.
///
/// Degraded records carry the missing-data marker in the `pass` column and
/// an empty `score` cell; absent numerics are empty cells.
pub fn export_records_csv(records: &[&ScoredRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(CSV_HEADER)?;

    for record in records {
        let row = TableRow::from_record(record);
        wtr.write_record([
            &row.ticker,
            &row.company,
            &row.sector,
            &row.industry,
            &row.price,
            &row.eps_growth_qtr,
            &row.eps_growth_yr,
            &row.institutional_pct,
            &row.near_52w_high_pct,
            &row.score,
            &row.pass,
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `ScreenResult` to pretty JSON.
pub fn export_json(result: &ScreenResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize ScreenResult to JSON")
}

/// Deserialize a `ScreenResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<ScreenResult> {
    let result: ScreenResult =
        serde_json::from_str(json).context("failed to deserialize ScreenResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one screen run.
///
/// Creates a directory named `screen_{timestamp}_{config_id_prefix}/` under
/// `output_dir` containing:
/// - `manifest.json` — the full `ScreenResult`
/// - `results.csv` — the record table
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &ScreenResult, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "screen_{}_{}",
        chrono::Local::now().format("%Y%m%d_%H%M%S"),
        &result.config_id[..result.config_id.len().min(8)],
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_json(result)?;
    std::fs::write(run_dir.join("manifest.json"), &json)?;

    let record_refs: Vec<&ScoredRecord> = result.records.iter().collect();
    let csv = export_records_csv(&record_refs)?;
    std::fs::write(run_dir.join("results.csv"), &csv)?;

    Ok(run_dir)
}

/// Load a `ScreenResult` from an artifact directory's manifest.json.
pub fn load_artifacts(dir: &Path) -> Result<ScreenResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}
