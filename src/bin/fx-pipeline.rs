//! fx-pipeline CLI - Command-line interface for the FX rates pipeline
//!
//! Provides one subcommand per ETL stage plus a sequential orchestrator.
//!
//! ## Example Usage
//!
//! ```bash
//! # Fetch raw EUR-based rates
//! fx-pipeline extract --start-date 2024-01-01 --end-date 2024-03-31
//!
//! # Derive cross pairs and YTD metrics
//! fx-pipeline transform
//!
//! # Push the derived CSVs into the warehouse
//! fx-pipeline load
//!
//! # All three stages in sequence
//! fx-pipeline run --start-date 2024-01-01
//! ```

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use fx_pipeline::config::PipelineConfig;
use fx_pipeline::extract::{self, ExtractOptions};
use fx_pipeline::load::{self, LoadOptions};
use fx_pipeline::stage::{self, StageReport, StageStep};
use fx_pipeline::transform::{self, TransformOptions};
use std::path::PathBuf;
use std::process;

/// fx-pipeline: FX reference rates ETL
#[derive(Parser)]
#[command(name = "fx-pipeline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Robert Fall")]
#[command(about = "Daily FX rates ETL: extract, transform, load", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch EUR-based daily rates and write the raw CSV
    Extract {
        /// First date to fetch (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Last date to fetch (YYYY-MM-DD), defaults to today
        #[arg(long)]
        end_date: Option<NaiveDate>,

        /// Raw CSV output path
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Derive cross pairs and YTD metrics from the raw CSV
    Transform {
        /// Raw CSV input path
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Cross-pair CSV output path
        #[arg(long)]
        output_cross: Option<PathBuf>,

        /// YTD metrics CSV output path
        #[arg(long)]
        output_ytd: Option<PathBuf>,
    },

    /// Load the derived CSVs into the warehouse
    Load {
        /// Cross-pair CSV input path
        #[arg(long)]
        input_cross: Option<PathBuf>,

        /// YTD metrics CSV input path
        #[arg(long)]
        input_ytd: Option<PathBuf>,
    },

    /// Run extract, transform and load in sequence
    Run {
        /// First date to fetch (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Last date to fetch (YYYY-MM-DD), defaults to today
        #[arg(long)]
        end_date: Option<NaiveDate>,
    },
}

fn main() {
    dotenv::dotenv().ok();
    env_logger::init();
    let cli = Cli::parse();

    let config = match PipelineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    if let Err(e) = config.ensure_dirs() {
        eprintln!("Error: could not create temp directory: {e}");
        process::exit(1);
    }

    let report = match cli.command {
        Commands::Extract {
            start_date,
            end_date,
            output,
        } => {
            let options = ExtractOptions {
                start_date,
                end_date,
                output,
            };
            stage::execute(&config, StageStep::Extract, || {
                extract::run(&config, &options)
            })
        }

        Commands::Transform {
            input,
            output_cross,
            output_ytd,
        } => {
            let options = TransformOptions {
                input,
                output_cross,
                output_ytd,
            };
            stage::execute(&config, StageStep::Transform, || {
                transform::run(&config, &options)
            })
        }

        Commands::Load {
            input_cross,
            input_ytd,
        } => {
            let options = LoadOptions {
                input_cross,
                input_ytd,
            };
            stage::execute(&config, StageStep::Load, || load::run(&config, &options))
        }

        Commands::Run {
            start_date,
            end_date,
        } => run_pipeline(&config, start_date, end_date),
    };

    process::exit(report.exit_code());
}

/// Sequential orchestrator: stop at the first failed stage
fn run_pipeline(
    config: &PipelineConfig,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> StageReport {
    log::info!("Running full pipeline: extract -> transform -> load");

    let options = ExtractOptions {
        start_date,
        end_date,
        output: None,
    };
    let report = stage::execute(config, StageStep::Extract, || {
        extract::run(config, &options)
    });
    if !report.succeeded() {
        log::error!("Pipeline stopped: extract failed");
        return report;
    }

    let report = stage::execute(config, StageStep::Transform, || {
        transform::run(config, &TransformOptions::default())
    });
    if !report.succeeded() {
        log::error!("Pipeline stopped: transform failed");
        return report;
    }

    let report = stage::execute(config, StageStep::Load, || {
        load::run(config, &LoadOptions::default())
    });
    if report.succeeded() {
        log::info!("Full pipeline completed");
    } else {
        log::error!("Pipeline stopped: load failed");
    }
    report
}
