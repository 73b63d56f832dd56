//! Core record types flowing between the pipeline stages
//!
//! Field order on each struct matches the column order of the CSV file
//! that carries it, so the `csv` crate serializes headers directly from
//! the struct definitions.

use crate::currency::Currency;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Decimal digits kept on derived exchange rates
pub const RATE_DECIMALS: u32 = 8;

/// Decimal digits kept on percentage metrics
pub const PCT_DECIMALS: u32 = 4;

/// One EUR-based observation as fetched from the rate source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRate {
    pub rate_date: NaiveDate,
    pub base_currency: Currency,
    pub quote_currency: Currency,
    pub exchange_rate: f64,
}

impl RawRate {
    /// Create a raw observation; the source quotes everything against EUR
    pub fn new(rate_date: NaiveDate, quote_currency: Currency, exchange_rate: f64) -> Self {
        Self {
            rate_date,
            base_currency: Currency::EUR,
            quote_currency,
            exchange_rate,
        }
    }
}

/// A derived rate for one ordered currency pair on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossRate {
    pub rate_date: NaiveDate,
    pub base_currency: Currency,
    pub quote_currency: Currency,
    pub exchange_rate: f64,
}

impl CrossRate {
    pub fn new(
        rate_date: NaiveDate,
        base_currency: Currency,
        quote_currency: Currency,
        exchange_rate: f64,
    ) -> Self {
        Self {
            rate_date,
            base_currency,
            quote_currency,
            exchange_rate,
        }
    }
}

/// Year-to-date statistics for one pair as of one date
///
/// `ytd_variance` and `ytd_std_dev` are `None` when the window holds a
/// single observation, mirroring the NULL stored in the warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YtdMetric {
    pub rate_date: NaiveDate,
    pub base_currency: Currency,
    pub quote_currency: Currency,
    pub ytd_avg_rate: f64,
    pub ytd_min_rate: f64,
    pub ytd_max_rate: f64,
    pub ytd_first_rate: f64,
    pub ytd_last_rate: f64,
    pub ytd_days_count: u32,
    pub ytd_variance: Option<f64>,
    pub ytd_std_dev: Option<f64>,
    pub ytd_change_pct: f64,
}

/// Column names of a row type, in struct field order
///
/// The csv serializer only learns a header from a row it writes, so
/// outputs with zero rows take theirs from here.
pub trait CsvColumns {
    const COLUMNS: &'static [&'static str];
}

impl CsvColumns for RawRate {
    const COLUMNS: &'static [&'static str] =
        &["rate_date", "base_currency", "quote_currency", "exchange_rate"];
}

impl CsvColumns for CrossRate {
    const COLUMNS: &'static [&'static str] =
        &["rate_date", "base_currency", "quote_currency", "exchange_rate"];
}

impl CsvColumns for YtdMetric {
    const COLUMNS: &'static [&'static str] = &[
        "rate_date",
        "base_currency",
        "quote_currency",
        "ytd_avg_rate",
        "ytd_min_rate",
        "ytd_max_rate",
        "ytd_first_rate",
        "ytd_last_rate",
        "ytd_days_count",
        "ytd_variance",
        "ytd_std_dev",
        "ytd_change_pct",
    ];
}

/// Round to eight decimal places (exchange rate precision)
pub fn round_rate(value: f64) -> f64 {
    round_to(value, RATE_DECIMALS)
}

/// Round to four decimal places (percentage precision)
pub fn round_pct(value: f64) -> f64 {
    round_to(value, PCT_DECIMALS)
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
