//! Yahoo Finance snapshot provider.
//!
//! Two requests per ticker: the v10 quoteSummary endpoint for fundamentals
//! and profile fields, and the v8 chart endpoint for one year of daily
//! closes. Handles rate limiting, retries with exponential backoff, and the
//! circuit breaker.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes. Every field is optional on the wire; absent fields become
//! `None`s in the snapshot rather than errors.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, FetchWindow, SnapshotProvider};
use crate::domain::TickerSnapshot;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

// ── quoteSummary (v10) response ─────────────────────────────────────

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    result: Option<Vec<QuoteSummaryModules>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSummaryModules {
    price: Option<PriceModule>,
    #[serde(rename = "summaryProfile")]
    summary_profile: Option<SummaryProfileModule>,
    #[serde(rename = "defaultKeyStatistics")]
    key_statistics: Option<KeyStatisticsModule>,
    #[serde(rename = "financialData")]
    financial_data: Option<FinancialDataModule>,
}

#[derive(Debug, Default, Deserialize)]
struct PriceModule {
    #[serde(rename = "longName")]
    long_name: Option<String>,
    #[serde(rename = "shortName")]
    short_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SummaryProfileModule {
    sector: Option<String>,
    industry: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct KeyStatisticsModule {
    #[serde(rename = "earningsQuarterlyGrowth")]
    earnings_quarterly_growth: Option<WrappedNumber>,
    #[serde(rename = "heldPercentInstitutions")]
    held_percent_institutions: Option<WrappedNumber>,
}

#[derive(Debug, Default, Deserialize)]
struct FinancialDataModule {
    #[serde(rename = "currentPrice")]
    current_price: Option<WrappedNumber>,
    #[serde(rename = "earningsGrowth")]
    earnings_growth: Option<WrappedNumber>,
}

/// Yahoo wraps numbers as `{"raw": 1.23, "fmt": "1.23"}`; an empty object
/// stands in for a missing value.
#[derive(Debug, Default, Deserialize)]
struct WrappedNumber {
    raw: Option<f64>,
}

fn unwrap_number(field: Option<WrappedNumber>) -> Option<f64> {
    field.and_then(|w| w.raw)
}

/// Fundamental fields extracted from a quoteSummary response.
#[derive(Debug, Default)]
struct Fundamentals {
    current_price: Option<f64>,
    eps_growth_quarterly: Option<f64>,
    eps_growth_annual: Option<f64>,
    institutional_ownership: Option<f64>,
    company_name: Option<String>,
    sector: Option<String>,
    industry: Option<String>,
}

// ── chart (v8) response ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

// ── provider ────────────────────────────────────────────────────────

/// Yahoo Finance snapshot provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            circuit_breaker,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }

    fn quote_summary_url(ticker: &str) -> String {
        format!(
            "https://query2.finance.yahoo.com/v10/finance/quoteSummary/{ticker}\
             ?modules=price,summaryProfile,defaultKeyStatistics,financialData"
        )
    }

    fn chart_url(ticker: &str, window: FetchWindow) -> String {
        let start_ts = window
            .start
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp();
        let end_ts = window
            .end
            .and_hms_opt(23, 59, 59)
            .unwrap()
            .and_utc()
            .timestamp();
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{ticker}\
             ?period1={start_ts}&period2={end_ts}&interval=1d"
        )
    }

    /// Extract fundamentals from a quoteSummary response. Absent modules and
    /// absent fields inside present modules both degrade to `None`.
    fn parse_quote_summary(
        ticker: &str,
        resp: QuoteSummaryEnvelope,
    ) -> Result<Fundamentals, DataError> {
        let result = match resp.quote_summary.result {
            Some(result) => result,
            None => return Err(api_error_to_data_error(ticker, resp.quote_summary.error)),
        };
        let modules = result.into_iter().next().unwrap_or_default();

        let mut fundamentals = Fundamentals::default();

        if let Some(price) = modules.price {
            fundamentals.company_name = price.long_name.or(price.short_name);
        }
        if let Some(profile) = modules.summary_profile {
            fundamentals.sector = profile.sector;
            fundamentals.industry = profile.industry;
        }
        if let Some(stats) = modules.key_statistics {
            fundamentals.eps_growth_quarterly = unwrap_number(stats.earnings_quarterly_growth);
            fundamentals.institutional_ownership = unwrap_number(stats.held_percent_institutions);
        }
        if let Some(financial) = modules.financial_data {
            fundamentals.current_price = unwrap_number(financial.current_price);
            fundamentals.eps_growth_annual = unwrap_number(financial.earnings_growth);
        }

        Ok(fundamentals)
    }

    /// Extract the daily closes from a chart response, oldest first.
    /// An empty series is valid data, not an error.
    fn parse_chart(ticker: &str, resp: ChartEnvelope) -> Result<Vec<f64>, DataError> {
        let result = match resp.chart.result {
            Some(result) => result,
            None => return Err(api_error_to_data_error(ticker, resp.chart.error)),
        };
        let closes = result
            .into_iter()
            .next()
            .and_then(|data| data.indicators.quote.into_iter().next())
            .map(|quote| quote.close.into_iter().flatten().collect())
            .unwrap_or_default();
        Ok(closes)
    }

    /// Execute one GET with retry, backoff, and circuit breaker accounting.
    fn request_json<T: DeserializeOwned>(&self, ticker: &str, url: &str) -> Result<T, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::FORBIDDEN {
                        // IP ban — stop hitting the provider at once
                        self.circuit_breaker.trip();
                        return Err(DataError::CircuitBreakerTripped);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        self.circuit_breaker.record_failure();
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        last_error = Some(DataError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(DataError::AuthenticationRequired(
                            "Yahoo Finance requires authentication".into(),
                        ));
                    }

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(DataError::TickerNotFound {
                            ticker: ticker.to_string(),
                        });
                    }

                    if !status.is_success() {
                        self.circuit_breaker.record_failure();
                        last_error = Some(DataError::Other(format!("HTTP {status} for {ticker}")));
                        continue;
                    }

                    let body: T = resp.json().map_err(|e| {
                        DataError::ResponseFormatChanged(format!(
                            "failed to parse response for {ticker}: {e}"
                        ))
                    })?;

                    self.circuit_breaker.record_success();
                    return Ok(body);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(DataError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

fn api_error_to_data_error(ticker: &str, error: Option<ApiError>) -> DataError {
    match error {
        Some(err) if err.code == "Not Found" => DataError::TickerNotFound {
            ticker: ticker.to_string(),
        },
        Some(err) => DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description)),
        None => DataError::ResponseFormatChanged("empty result with no error".into()),
    }
}

impl SnapshotProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, ticker: &str, window: FetchWindow) -> Result<TickerSnapshot, DataError> {
        let envelope: QuoteSummaryEnvelope =
            self.request_json(ticker, &Self::quote_summary_url(ticker))?;
        let fundamentals = Self::parse_quote_summary(ticker, envelope)?;

        // The ticker resolved, so a missing price history is partial data,
        // not a failure — the scorer's 52w-high fallback handles it.
        let closes = self
            .request_json::<ChartEnvelope>(ticker, &Self::chart_url(ticker, window))
            .and_then(|envelope| Self::parse_chart(ticker, envelope))
            .unwrap_or_else(|e| {
                log::warn!("[{ticker}] no price history ({e}); continuing without closes");
                Vec::new()
            });

        Ok(TickerSnapshot {
            ticker: ticker.to_string(),
            current_price: fundamentals.current_price,
            eps_growth_quarterly: fundamentals.eps_growth_quarterly,
            eps_growth_annual: fundamentals.eps_growth_annual,
            institutional_ownership: fundamentals.institutional_ownership,
            company_name: fundamentals.company_name,
            sector: fundamentals.sector,
            industry: fundamentals.industry,
            trailing_52w_closes: closes,
        })
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}
