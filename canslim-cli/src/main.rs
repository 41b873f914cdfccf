//! CAN SLIM CLI — screen, fetch, and cache management commands.
//!
//! Commands:
//! - `screen` — fetch and score tickers, print the tiered table, save artifacts
//! - `fetch` — prefetch ticker snapshots from Yahoo Finance into the cache
//! - `cache status` — report cached tickers, fetch windows, and ages
//! - `cache clear` — invalidate the whole snapshot cache

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use canslim_core::data::{
    fetch_universe, CircuitBreaker, FetchOptions, FetchWindow, SnapshotCache, SnapshotProvider,
    StdoutProgress, Universe, YahooProvider,
};
use canslim_runner::{
    available_sectors, filter_by_sector, run_screen, save_artifacts, ScoreTier, ScreenConfig,
    ScreenOptions, ScreenResult, SectorFilter, TableRow,
};

#[derive(Parser)]
#[command(
    name = "canslim",
    about = "CAN SLIM screener — fetch fundamentals, score seven criteria, export results"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, score, and display the screen for a set of tickers.
    Screen {
        /// Tickers to screen (e.g., NVDA AAPL MSFT). Defaults to the
        /// built-in watchlist when neither tickers nor --config are given.
        tickers: Vec<String>,

        /// Path to a TOML screen config (mutually exclusive with tickers).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Show only one sector in the table (exports are filtered too).
        #[arg(long)]
        sector: Option<String>,

        /// Treat the market as in a downtrend (fails the M criterion).
        #[arg(long, default_value_t = false)]
        market_downtrend: bool,

        /// Offline mode: serve entirely from the cache, no network access.
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// Invalidate the entire snapshot cache before fetching.
        #[arg(long, default_value_t = false)]
        refresh: bool,

        /// Cache directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,

        /// Output directory for artifacts (results.csv, manifest.json).
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Skip writing artifacts.
        #[arg(long, default_value_t = false)]
        no_export: bool,
    },
    /// Prefetch ticker snapshots from Yahoo Finance into the cache.
    Fetch {
        /// Tickers to fetch (e.g., NVDA AAPL MSFT).
        #[arg(required = true)]
        tickers: Vec<String>,

        /// Force re-fetch even if cached.
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Cache directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report cached tickers, their fetch windows, and cache ages.
    Status {
        /// Cache directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
    /// Invalidate the whole snapshot cache (wholesale, no partial clears).
    Clear {
        /// Cache directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,

        /// Actually delete (without this flag, only previews what would be removed).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Screen {
            tickers,
            config,
            sector,
            market_downtrend,
            offline,
            refresh,
            cache_dir,
            output_dir,
            no_export,
        } => run_screen_cmd(
            tickers,
            config,
            sector,
            market_downtrend,
            offline,
            refresh,
            cache_dir,
            output_dir,
            no_export,
        ),
        Commands::Fetch {
            tickers,
            force,
            cache_dir,
        } => run_fetch_cmd(tickers, force, cache_dir),
        Commands::Cache { action } => match action {
            CacheAction::Status { cache_dir } => run_cache_status(&cache_dir),
            CacheAction::Clear { cache_dir, confirm } => run_cache_clear(&cache_dir, confirm),
        },
    }
}

#[allow(clippy::too_many_arguments)]
fn run_screen_cmd(
    tickers: Vec<String>,
    config_path: Option<PathBuf>,
    sector: Option<String>,
    market_downtrend: bool,
    offline: bool,
    refresh: bool,
    cache_dir: PathBuf,
    output_dir: PathBuf,
    no_export: bool,
) -> Result<()> {
    if config_path.is_some() && !tickers.is_empty() {
        bail!("--config and a ticker list are mutually exclusive");
    }

    let mut config = if let Some(path) = config_path {
        ScreenConfig::from_file(&path)?
    } else if !tickers.is_empty() {
        ScreenConfig::from_tickers(tickers)?
    } else {
        let watchlist = Universe::default_watchlist();
        ScreenConfig::from_tickers(
            watchlist.all_tickers().into_iter().map(String::from).collect(),
        )?
    };
    if market_downtrend {
        config.screen.market_is_uptrend = false;
    }

    let opts = ScreenOptions {
        window: FetchWindow::trailing_year(chrono::Local::now().date_naive()),
        offline,
        refresh,
    };

    let cache = SnapshotCache::new(&cache_dir);
    let circuit_breaker = Arc::new(CircuitBreaker::for_provider());
    let provider = YahooProvider::new(circuit_breaker);
    let provider_ref: Option<&dyn SnapshotProvider> = if offline { None } else { Some(&provider) };

    log::info!(
        "screening {} ticker(s), market {}",
        config.screen.tickers.len(),
        if config.screen.market_is_uptrend {
            "uptrend"
        } else {
            "downtrend"
        }
    );

    let result = run_screen(&config, provider_ref, &cache, &opts, &StdoutProgress)?;

    let filter = match sector {
        Some(name) => SectorFilter::Sector(name),
        None => SectorFilter::All,
    };
    let filtered = filter_by_sector(&result.records, &filter);

    print_table(&filtered);
    print_summary(&result, filtered.len());

    if !no_export {
        // Export what's on screen: the sector-filtered records
        let export_result = ScreenResult {
            records: filtered.into_iter().cloned().collect(),
            ..result
        };
        let run_dir = save_artifacts(&export_result, &output_dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

fn run_fetch_cmd(tickers: Vec<String>, force: bool, cache_dir: PathBuf) -> Result<()> {
    let cache = SnapshotCache::new(cache_dir);
    let circuit_breaker = Arc::new(CircuitBreaker::for_provider());
    let provider = YahooProvider::new(circuit_breaker);

    let ticker_refs: Vec<&str> = tickers.iter().map(|t| t.as_str()).collect();
    let opts = FetchOptions {
        window: FetchWindow::trailing_year(chrono::Local::now().date_naive()),
        force,
    };

    let outcome = fetch_universe(
        Some(&provider),
        &cache,
        &ticker_refs,
        &opts,
        &StdoutProgress,
    );

    if !outcome.all_succeeded() {
        for (ticker, err) in &outcome.failures {
            eprintln!("Error for {ticker}: {err}");
        }
        std::process::exit(1);
    }

    Ok(())
}

fn run_cache_status(cache_dir: &Path) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let cache = SnapshotCache::new(cache_dir);
    let tickers = cache.cached_tickers();

    if tickers.is_empty() {
        println!("Cache is empty: {}", cache_dir.display());
        return Ok(());
    }

    println!("Cache: {}", cache_dir.display());
    println!("Tickers: {}", tickers.len());
    println!();
    println!(
        "{:<8} {:<25} {:<20} {:<12}",
        "Ticker", "Fetch Window", "Cached At", "Source"
    );
    println!("{}", "-".repeat(68));

    for ticker in &tickers {
        match cache.meta(ticker) {
            Some(meta) => println!(
                "{:<8} {:<25} {:<20} {:<12}",
                ticker,
                format!("{} to {}", meta.window_start, meta.window_end),
                meta.cached_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                meta.source
            ),
            None => println!("{ticker:<8} (corrupt or missing meta)"),
        }
    }

    Ok(())
}

fn run_cache_clear(cache_dir: &Path, confirm: bool) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let cache = SnapshotCache::new(cache_dir);
    let tickers = cache.cached_tickers();

    if tickers.is_empty() {
        println!("Cache is already empty.");
        return Ok(());
    }

    println!("Cached tickers: {}", tickers.join(", "));

    if !confirm {
        println!();
        println!("Dry run — pass --confirm to actually delete.");
        return Ok(());
    }

    let removed = cache.invalidate_all()?;
    println!("Done. Removed {removed} cached ticker(s).");
    Ok(())
}

// ─── Output ─────────────────────────────────────────────────────────

fn print_table(records: &[&canslim_core::domain::ScoredRecord]) {
    println!();
    println!(
        "{:<8} {:<24} {:<22} {:>9} {:>8} {:>8} {:>7} {:>9}  {:<5} {:<16} {:<8}",
        "Ticker",
        "Company",
        "Sector",
        "Price",
        "EPS(Q)",
        "EPS(Y)",
        "Inst%",
        "52W High",
        "Score",
        "Pass",
        "Tier"
    );
    println!("{}", "-".repeat(125));

    for record in records {
        let row = TableRow::from_record(record);
        println!(
            "{:<8} {:<24} {:<22} {:>9} {:>8} {:>8} {:>7} {:>9}  {:<5} {:<16} {:<8}",
            row.ticker,
            truncate(&row.company, 24),
            truncate(&row.sector, 22),
            row.price,
            row.eps_growth_qtr,
            row.eps_growth_yr,
            row.institutional_pct,
            row.near_52w_high_pct,
            row.score,
            row.pass,
            tier_label(row.tier),
        );
    }
}

fn print_summary(result: &ScreenResult, shown: usize) {
    println!();
    println!("=== Screen Summary ===");
    println!(
        "Market:     {}",
        if result.market_is_uptrend {
            "uptrend"
        } else {
            "downtrend"
        }
    );
    println!(
        "Records:    {} scored, {} missing EPS data, {} failed",
        result.records.len() - result.degraded_count(),
        result.degraded_count(),
        result.failures.len()
    );
    if shown != result.records.len() {
        println!("Shown:      {shown} (sector filter active)");
    }
    println!("Pass 7/7:   {}", result.pass_count());

    let sectors = available_sectors(&result.records);
    if !sectors.is_empty() {
        println!("Sectors:    {}", sectors.join(", "));
    }

    if !result.failures.is_empty() {
        println!();
        for failure in &result.failures {
            println!("WARNING: {}: {}", failure.ticker, failure.error);
        }
    }
    println!();
}

fn tier_label(tier: ScoreTier) -> &'static str {
    match tier {
        ScoreTier::Strong => "strong",
        ScoreTier::Moderate => "moderate",
        ScoreTier::Weak => "weak",
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
