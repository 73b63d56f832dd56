//! Transform stage: cross-pair expansion and YTD aggregation
//!
//! Reads the raw CSV produced by extract and writes two derived CSVs,
//! one with every ordered cross pair per date and one with cumulative
//! year-to-date statistics per pair.

pub mod cross_pairs;
pub mod ytd;

pub use cross_pairs::{expand_cross_pairs, rate_tables};
pub use ytd::compute_ytd_metrics;

use crate::config::PipelineConfig;
use crate::csvio;
use crate::error::Result;
use crate::types::{CrossRate, RawRate};
use std::path::PathBuf;

/// Optional overrides for one transform invocation
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    pub input: Option<PathBuf>,
    pub output_cross: Option<PathBuf>,
    pub output_ytd: Option<PathBuf>,
}

/// Transform stage body: derive cross pairs and YTD metrics
///
/// Returns the combined number of derived rows written.
pub fn run(config: &PipelineConfig, options: &TransformOptions) -> Result<u64> {
    let input = options
        .input
        .clone()
        .unwrap_or_else(|| config.extract_output.clone());
    let output_cross = options
        .output_cross
        .clone()
        .unwrap_or_else(|| config.cross_output.clone());
    let output_ytd = options
        .output_ytd
        .clone()
        .unwrap_or_else(|| config.ytd_output.clone());

    let raw: Vec<RawRate> = csvio::read_records(&input)?;
    log::info!("Read {} raw rate rows from {}", raw.len(), input.display());

    let cross: Vec<CrossRate> = expand_cross_pairs(&raw, &config.currencies);
    log::info!("Derived {} cross-pair rows", cross.len());
    csvio::write_records(&output_cross, &cross)?;
    log::info!("Cross pairs written to {}", output_cross.display());

    let metrics = compute_ytd_metrics(&cross);
    log::info!("Computed {} YTD metric rows", metrics.len());
    csvio::write_records(&output_ytd, &metrics)?;
    log::info!("YTD metrics written to {}", output_ytd.display());

    Ok((cross.len() + metrics.len()) as u64)
}
