//! Pipeline configuration assembled once from the environment
//!
//! All knobs come from `FX_*` environment variables with sensible
//! defaults, so the binary runs out of the box against Frankfurter.
//! The config is built once in `main` and passed by reference into the
//! stages; nothing mutates it afterwards.

use crate::currency::Currency;
use crate::error::{PipelineError, Result};
use chrono::NaiveDate;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Default currency universe: EUR plus the Nordic and CEE currencies
pub const DEFAULT_CURRENCIES: &str = "NOK,EUR,SEK,PLN,RON,DKK,CZK";

/// Default rate source endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://api.frankfurter.dev/v1";

/// Default first date fetched when no start date is given
pub const DEFAULT_START_DATE: &str = "2024-01-01";

/// Immutable pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Ordered currency universe; pair expansion follows this order
    pub currencies: Vec<Currency>,
    pub api_base_url: String,
    pub db_path: PathBuf,
    pub start_date: NaiveDate,
    pub temp_dir: PathBuf,
    pub extract_output: PathBuf,
    pub cross_output: PathBuf,
    pub ytd_output: PathBuf,
}

impl PipelineConfig {
    /// Build the configuration from `FX_*` environment variables,
    /// falling back to defaults for anything unset
    pub fn from_env() -> Result<Self> {
        let currencies = parse_currencies(&env_or("FX_CURRENCIES", DEFAULT_CURRENCIES))?;
        let start_date = parse_start_date(&env_or("FX_START_DATE", DEFAULT_START_DATE))?;

        Ok(Self {
            currencies,
            api_base_url: env_or("FX_API_BASE_URL", DEFAULT_API_BASE_URL),
            db_path: PathBuf::from(env_or("FX_DB_PATH", "./fx_dwh.sqlite")),
            start_date,
            temp_dir: PathBuf::from(env_or("FX_TEMP_DIR", "./temp")),
            extract_output: PathBuf::from(env_or("FX_EXTRACT_OUTPUT", "./temp/raw_fx_data.csv")),
            cross_output: PathBuf::from(env_or("FX_CROSS_OUTPUT", "./temp/cross_fx_data.csv")),
            ytd_output: PathBuf::from(env_or("FX_YTD_OUTPUT", "./temp/ytd_metrics.csv")),
        })
    }

    /// Create the scratch directory for intermediate CSV files
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.temp_dir)?;
        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a comma-separated currency list, rejecting unknown and
/// duplicate codes
fn parse_currencies(raw: &str) -> Result<Vec<Currency>> {
    let mut currencies = Vec::new();
    for code in raw.split(',') {
        let code = code.trim();
        if code.is_empty() {
            continue;
        }
        let currency = Currency::from_code(code).ok_or_else(|| {
            PipelineError::Config(format!("unknown currency code in FX_CURRENCIES: {code}"))
        })?;
        if currencies.contains(&currency) {
            return Err(PipelineError::Config(format!(
                "duplicate currency code in FX_CURRENCIES: {code}"
            )));
        }
        currencies.push(currency);
    }
    if currencies.is_empty() {
        return Err(PipelineError::Config(
            "FX_CURRENCIES resolved to an empty universe".to_string(),
        ));
    }
    Ok(currencies)
}

fn parse_start_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| PipelineError::Config(format!("invalid FX_START_DATE '{raw}': {e}")))
}
