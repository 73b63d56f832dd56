//! Stage identities, outcome reports and the shared stage runner
//!
//! Every stage runs through [`execute`], which brackets the stage body
//! with audit records in the warehouse and turns the body's `Result`
//! into a [`StageReport`]. Errors stop at this boundary: callers get a
//! report and map it to an exit code, they never see a raw error.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::warehouse::Warehouse;
use std::fmt;
use std::time::Instant;

/// Pipeline stage identifier, as recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStep {
    Extract,
    Transform,
    Load,
}

impl StageStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStep::Extract => "extract",
            StageStep::Transform => "transform",
            StageStep::Load => "load",
        }
    }
}

impl fmt::Display for StageStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audit status of a stage invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Running,
    Success,
    Failed,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Running => "running",
            StageStatus::Success => "success",
            StageStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one stage invocation
#[derive(Debug, Clone)]
pub struct StageReport {
    pub step: StageStep,
    pub status: StageStatus,
    pub rows_processed: u64,
    pub duration_seconds: u64,
    pub error: Option<String>,
}

impl StageReport {
    pub fn succeeded(&self) -> bool {
        self.status == StageStatus::Success
    }

    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        if self.succeeded() {
            0
        } else {
            1
        }
    }
}

/// Run one stage body with timing and audit bookkeeping
///
/// The audit connection is best-effort: extract and transform keep
/// working when the warehouse cannot be opened, they just run without
/// audit records.
pub fn execute<F>(config: &PipelineConfig, step: StageStep, body: F) -> StageReport
where
    F: FnOnce() -> Result<u64>,
{
    let audit = open_audit(config);
    if let Some(warehouse) = &audit {
        warehouse.append_audit(step, StageStatus::Running, 0, None, None);
    }

    log::info!("{step} stage starting");
    let started = Instant::now();

    match body() {
        Ok(rows_processed) => {
            let duration_seconds = started.elapsed().as_secs();
            if let Some(warehouse) = &audit {
                warehouse.append_audit(
                    step,
                    StageStatus::Success,
                    rows_processed,
                    None,
                    Some(duration_seconds),
                );
            }
            log::info!("{step} stage completed: {rows_processed} rows in {duration_seconds}s");
            StageReport {
                step,
                status: StageStatus::Success,
                rows_processed,
                duration_seconds,
                error: None,
            }
        }
        Err(e) => {
            let duration_seconds = started.elapsed().as_secs();
            let message = e.to_string();
            if let Some(warehouse) = &audit {
                warehouse.append_audit(
                    step,
                    StageStatus::Failed,
                    0,
                    Some(&message),
                    Some(duration_seconds),
                );
            }
            log::error!("{step} stage failed: {message}");
            StageReport {
                step,
                status: StageStatus::Failed,
                rows_processed: 0,
                duration_seconds,
                error: Some(message),
            }
        }
    }
}

fn open_audit(config: &PipelineConfig) -> Option<Warehouse> {
    match Warehouse::open(&config.db_path) {
        Ok(warehouse) => Some(warehouse),
        Err(e) => {
            log::warn!("Audit logging disabled, warehouse unavailable: {e}");
            None
        }
    }
}
