//! # fx_pipeline
//!
//! A batch ETL pipeline for daily FX reference rates.
//!
//! The extract stage fetches EUR-based rates from the Frankfurter API.
//! The transform stage expands them into every ordered cross pair of
//! the configured universe and computes cumulative year-to-date
//! statistics per pair. The load stage pushes both result sets into a
//! SQLite warehouse. Stages communicate through CSV files and each
//! stage is audited in the warehouse's execution log.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fx_pipeline::prelude::*;
//! use fx_pipeline::{stage, transform};
//!
//! fn main() {
//!     let config = PipelineConfig::from_env().expect("config");
//!     let report = stage::execute(&config, StageStep::Transform, || {
//!         transform::run(&config, &transform::TransformOptions::default())
//!     });
//!     std::process::exit(report.exit_code());
//! }
//! ```

pub mod config;
pub mod csvio;
pub mod currency;
pub mod error;
pub mod extract;
pub mod load;
pub mod stage;
pub mod transform;
pub mod types;
pub mod warehouse;

pub mod prelude {
    //! Commonly used types
    pub use crate::config::PipelineConfig;
    pub use crate::currency::{Currency, CurrencyPair};
    pub use crate::error::{PipelineError, Result};
    pub use crate::stage::{StageReport, StageStatus, StageStep};
    pub use crate::types::{CrossRate, RawRate, YtdMetric};
    pub use crate::warehouse::{LoadSummary, Warehouse};
}
