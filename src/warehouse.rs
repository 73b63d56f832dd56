//! SQLite warehouse: fact tables, execution audit log, load checks
//!
//! One connection per open; the schema is created idempotently so a
//! fresh database file is usable immediately. Fact tables key on
//! (rate_date, base_currency, quote_currency).

use crate::error::Result;
use crate::stage::{StageStatus, StageStep};
use crate::types::{CrossRate, YtdMetric};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::path::Path;

/// Provider name recorded on every daily fact row
const RATE_SOURCE: &str = "Frankfurter";

/// Row counts and coverage reported after a load
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    pub daily_row_count: u64,
    pub ytd_row_count: u64,
    pub max_date: Option<NaiveDate>,
    pub distinct_pair_count: u64,
}

/// Handle to the warehouse database
pub struct Warehouse {
    conn: Connection,
}

impl Warehouse {
    /// Open (or create) the warehouse at the given path
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let warehouse = Self { conn };
        warehouse.create_tables()?;
        Ok(warehouse)
    }

    /// Open a throwaway in-memory warehouse
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let warehouse = Self { conn };
        warehouse.create_tables()?;
        Ok(warehouse)
    }

    fn create_tables(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS fact_fx_rates_daily (
                rate_date      TEXT NOT NULL,
                base_currency  TEXT NOT NULL,
                quote_currency TEXT NOT NULL,
                exchange_rate  REAL NOT NULL,
                source         TEXT NOT NULL,
                updated_at     TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (rate_date, base_currency, quote_currency)
            );
            CREATE TABLE IF NOT EXISTS fact_fx_rates_ytd (
                rate_date      TEXT NOT NULL,
                base_currency  TEXT NOT NULL,
                quote_currency TEXT NOT NULL,
                ytd_avg_rate   REAL NOT NULL,
                ytd_min_rate   REAL NOT NULL,
                ytd_max_rate   REAL NOT NULL,
                ytd_first_rate REAL NOT NULL,
                ytd_last_rate  REAL NOT NULL,
                ytd_days_count INTEGER NOT NULL,
                ytd_variance   REAL,
                ytd_std_dev    REAL,
                ytd_change_pct REAL NOT NULL,
                PRIMARY KEY (rate_date, base_currency, quote_currency)
            );
            CREATE TABLE IF NOT EXISTS pipeline_execution_log (
                id               INTEGER PRIMARY KEY AUTOINCREMENT,
                pipeline_step    TEXT NOT NULL,
                status           TEXT NOT NULL,
                rows_processed   INTEGER NOT NULL DEFAULT 0,
                error_message    TEXT,
                duration_seconds INTEGER,
                executed_at      TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );",
        )?;
        Ok(())
    }

    /// Upsert daily cross rates keyed on (date, base, quote)
    ///
    /// Re-loading the same date overwrites the rate and refreshes
    /// `updated_at` instead of growing the table. Runs in a single
    /// transaction.
    pub fn upsert_cross_rates(&mut self, rows: &[CrossRate]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO fact_fx_rates_daily
                     (rate_date, base_currency, quote_currency, exchange_rate, source)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (rate_date, base_currency, quote_currency) DO UPDATE SET
                     exchange_rate = excluded.exchange_rate,
                     updated_at = CURRENT_TIMESTAMP",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.rate_date,
                    row.base_currency.code(),
                    row.quote_currency.code(),
                    row.exchange_rate,
                    RATE_SOURCE,
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    /// Replace YTD metrics for the covered dates only
    ///
    /// Deletes existing rows date by date, never the whole table, then
    /// inserts the new rows; delete and insert share one transaction.
    pub fn replace_ytd_metrics(
        &mut self,
        rows: &[YtdMetric],
        dates_covered: &[NaiveDate],
    ) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut delete = tx.prepare("DELETE FROM fact_fx_rates_ytd WHERE rate_date = ?1")?;
            for date in dates_covered {
                delete.execute(params![date])?;
            }

            let mut insert = tx.prepare(
                "INSERT INTO fact_fx_rates_ytd
                     (rate_date, base_currency, quote_currency, ytd_avg_rate,
                      ytd_min_rate, ytd_max_rate, ytd_first_rate, ytd_last_rate,
                      ytd_days_count, ytd_variance, ytd_std_dev, ytd_change_pct)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for row in rows {
                insert.execute(params![
                    row.rate_date,
                    row.base_currency.code(),
                    row.quote_currency.code(),
                    row.ytd_avg_rate,
                    row.ytd_min_rate,
                    row.ytd_max_rate,
                    row.ytd_first_rate,
                    row.ytd_last_rate,
                    row.ytd_days_count,
                    row.ytd_variance,
                    row.ytd_std_dev,
                    row.ytd_change_pct,
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    /// Append one audit record, best-effort
    ///
    /// Audit bookkeeping must never take a stage down with it, so any
    /// database error here is downgraded to a warning.
    pub fn append_audit(
        &self,
        step: StageStep,
        status: StageStatus,
        rows_processed: u64,
        error_message: Option<&str>,
        duration_seconds: Option<u64>,
    ) {
        let result = self.conn.execute(
            "INSERT INTO pipeline_execution_log
                 (pipeline_step, status, rows_processed, error_message, duration_seconds)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                step.as_str(),
                status.as_str(),
                rows_processed as i64,
                error_message,
                duration_seconds.map(|secs| secs as i64),
            ],
        );
        if let Err(e) = result {
            log::warn!("Could not append audit record for {step} stage: {e}");
        }
    }

    /// Post-load sanity counts over the fact tables
    pub fn verify_load(&self) -> Result<LoadSummary> {
        let daily_row_count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM fact_fx_rates_daily", [], |row| {
                    row.get(0)
                })?;
        let ytd_row_count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM fact_fx_rates_ytd", [], |row| {
                    row.get(0)
                })?;
        let max_date: Option<NaiveDate> =
            self.conn
                .query_row("SELECT MAX(rate_date) FROM fact_fx_rates_daily", [], |row| {
                    row.get(0)
                })?;
        let distinct_pair_count: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT base_currency || '/' || quote_currency)
             FROM fact_fx_rates_daily",
            [],
            |row| row.get(0),
        )?;

        Ok(LoadSummary {
            daily_row_count: daily_row_count as u64,
            ytd_row_count: ytd_row_count as u64,
            max_date,
            distinct_pair_count: distinct_pair_count as u64,
        })
    }
}
