//! Load stage: push transformed CSVs into the warehouse
//!
//! Daily rates are upserted so re-running a date range is idempotent;
//! YTD metrics are replaced per covered date. Finishes with a sanity
//! check over the fact tables.

use crate::config::PipelineConfig;
use crate::csvio;
use crate::error::Result;
use crate::types::{CrossRate, YtdMetric};
use crate::warehouse::Warehouse;
use chrono::NaiveDate;
use std::path::PathBuf;

/// Optional overrides for one load invocation
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub input_cross: Option<PathBuf>,
    pub input_ytd: Option<PathBuf>,
}

/// Load stage body: upsert daily rates, replace YTD metrics, verify
///
/// Returns the combined number of rows written to the fact tables.
pub fn run(config: &PipelineConfig, options: &LoadOptions) -> Result<u64> {
    let input_cross = options
        .input_cross
        .clone()
        .unwrap_or_else(|| config.cross_output.clone());
    let input_ytd = options
        .input_ytd
        .clone()
        .unwrap_or_else(|| config.ytd_output.clone());

    let mut warehouse = Warehouse::open(&config.db_path)?;
    log::info!("Warehouse opened at {}", config.db_path.display());

    let cross: Vec<CrossRate> = csvio::read_records(&input_cross)?;
    log::info!(
        "Read {} cross-pair rows from {}",
        cross.len(),
        input_cross.display()
    );
    let daily_rows = warehouse.upsert_cross_rates(&cross)?;
    log::info!("Upserted {daily_rows} daily rate rows");

    let metrics: Vec<YtdMetric> = csvio::read_records(&input_ytd)?;
    log::info!(
        "Read {} YTD metric rows from {}",
        metrics.len(),
        input_ytd.display()
    );
    let dates_covered = distinct_dates(&metrics);
    log::info!("Replacing YTD metrics for {} dates", dates_covered.len());
    let ytd_rows = warehouse.replace_ytd_metrics(&metrics, &dates_covered)?;
    log::info!("Inserted {ytd_rows} YTD metric rows");

    let summary = warehouse.verify_load()?;
    let latest = summary
        .max_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "none".to_string());
    log::info!(
        "Warehouse now holds {} daily rows and {} YTD rows across {} pairs, latest date {}",
        summary.daily_row_count,
        summary.ytd_row_count,
        summary.distinct_pair_count,
        latest
    );

    Ok((daily_rows + ytd_rows) as u64)
}

fn distinct_dates(rows: &[YtdMetric]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = rows.iter().map(|row| row.rate_date).collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}
