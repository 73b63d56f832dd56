//! Extract stage: fetch EUR-based daily rates from Frankfurter
//!
//! The source is queried once for the whole date range and the nested
//! JSON payload is flattened into one `RawRate` row per (date, quote)
//! observation before being written to the raw CSV.

use crate::config::PipelineConfig;
use crate::csvio;
use crate::currency::Currency;
use crate::error::{PipelineError, Result};
use crate::types::RawRate;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Time-series response from the Frankfurter `{start}..{end}` endpoint
#[derive(Debug, Deserialize)]
struct RatesResponse {
    base: String,
    rates: BTreeMap<String, BTreeMap<String, f64>>,
}

/// HTTP client for the Frankfurter rate API
pub struct RateSourceClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl RateSourceClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                PipelineError::SourceUnavailable(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Fetch all EUR-based quotes for the universe over a date range
    ///
    /// Returns rows ordered by date, then by quote currency code.
    pub fn fetch_rates(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        universe: &[Currency],
    ) -> Result<Vec<RawRate>> {
        let symbols: Vec<&str> = universe
            .iter()
            .filter(|c| **c != Currency::EUR)
            .map(Currency::code)
            .collect();
        if symbols.is_empty() {
            log::warn!("Currency universe holds no non-EUR currencies, nothing to fetch");
            return Ok(Vec::new());
        }

        let url = format!("{}/{}..{}", self.base_url, start_date, end_date);
        log::info!("Requesting {} (symbols: {})", url, symbols.join(","));

        let response = self
            .client
            .get(&url)
            .query(&[("symbols", symbols.join(","))])
            .send()
            .map_err(|e| PipelineError::SourceUnavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::SourceUnavailable(format!(
                "rate API returned HTTP {status} for {url}"
            )));
        }

        let body = response
            .text()
            .map_err(|e| PipelineError::SourceUnavailable(format!("failed to read body: {e}")))?;
        parse_rates(&body)
    }
}

/// Flatten a Frankfurter JSON payload into raw rate rows
///
/// `BTreeMap` keys keep the output ordered by date and then by currency
/// code regardless of JSON key order.
pub fn parse_rates(body: &str) -> Result<Vec<RawRate>> {
    let payload: RatesResponse = serde_json::from_str(body)
        .map_err(|e| PipelineError::MalformedInput(format!("unexpected rate payload: {e}")))?;

    if payload.base != Currency::EUR.code() {
        return Err(PipelineError::MalformedInput(format!(
            "expected EUR-based payload, got base {}",
            payload.base
        )));
    }

    let mut rows = Vec::new();
    for (date_str, quotes) in &payload.rates {
        let rate_date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
            PipelineError::MalformedInput(format!("bad date key '{date_str}': {e}"))
        })?;
        for (code, rate) in quotes {
            let quote_currency = Currency::from_code(code)
                .ok_or_else(|| PipelineError::UnknownCurrency(code.clone()))?;
            rows.push(RawRate::new(rate_date, quote_currency, *rate));
        }
    }
    Ok(rows)
}

/// Optional overrides for one extract invocation
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub output: Option<PathBuf>,
}

/// Extract stage body: fetch, flatten, write the raw CSV
///
/// Returns the number of raw rows written.
pub fn run(config: &PipelineConfig, options: &ExtractOptions) -> Result<u64> {
    let start_date = options.start_date.unwrap_or(config.start_date);
    let end_date = options
        .end_date
        .unwrap_or_else(|| Local::now().date_naive());
    let output = options
        .output
        .clone()
        .unwrap_or_else(|| config.extract_output.clone());

    if end_date < start_date {
        return Err(PipelineError::Config(format!(
            "end date {end_date} precedes start date {start_date}"
        )));
    }

    log::info!("Extracting rates from {start_date} to {end_date}");
    let client = RateSourceClient::new(&config.api_base_url)?;
    let rows = client.fetch_rates(start_date, end_date, &config.currencies)?;
    log::info!("Fetched {} raw rate observations", rows.len());

    csvio::write_records(&output, &rows)?;
    log::info!("Raw rates written to {}", output.display());

    Ok(rows.len() as u64)
}
