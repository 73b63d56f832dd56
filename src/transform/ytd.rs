//! Year-to-date metric aggregation over cross-pair series
//!
//! Each (base, quote) series is sorted by date and every row is
//! summarized over the window from January 1st of its year through its
//! own date, inclusive. Windows reset at year boundaries. Same-date
//! rows are kept as distinct observations in input order.

use crate::currency::CurrencyPair;
use crate::types::{round_pct, round_rate, CrossRate, YtdMetric};
use chrono::{Datelike, NaiveDate};
use statrs::statistics::{Data, Distribution};
use std::collections::BTreeMap;

/// Compute one YTD metric row per cross-rate row
///
/// Output is grouped by pair (pairs in code order) with dates ascending
/// inside each group.
pub fn compute_ytd_metrics(rates: &[CrossRate]) -> Vec<YtdMetric> {
    let mut groups: BTreeMap<CurrencyPair, Vec<(NaiveDate, f64)>> = BTreeMap::new();
    for row in rates {
        groups
            .entry(CurrencyPair::new(row.base_currency, row.quote_currency))
            .or_default()
            .push((row.rate_date, row.exchange_rate));
    }

    let mut out = Vec::new();
    for (pair, mut series) in groups {
        // stable sort: same-date observations keep their input order
        series.sort_by_key(|(date, _)| *date);

        for &(date, _) in &series {
            let year = date.year();
            let start = series.partition_point(|(d, _)| d.year() < year);
            let end = series.partition_point(|(d, _)| *d <= date);
            let window = &series[start..end];
            if window.is_empty() {
                continue;
            }
            out.push(summarize(pair, date, window));
        }
    }
    out
}

/// Summarize one same-year window of observations ending at `date`
fn summarize(pair: CurrencyPair, date: NaiveDate, window: &[(NaiveDate, f64)]) -> YtdMetric {
    let rates: Vec<f64> = window.iter().map(|(_, rate)| *rate).collect();
    let count = rates.len();
    let first = rates[0];
    let last = rates[count - 1];
    let min = rates.iter().fold(f64::INFINITY, |acc, &r| acc.min(r));
    let max = rates.iter().fold(f64::NEG_INFINITY, |acc, &r| acc.max(r));
    let change_pct = if first == 0.0 {
        0.0
    } else {
        (last - first) / first * 100.0
    };

    let data = Data::new(rates);
    let mean = data.mean().unwrap_or(0.0);
    // sample statistics are undefined for a single observation
    let (variance, std_dev) = if count > 1 {
        (data.variance().map(round_rate), data.std_dev().map(round_rate))
    } else {
        (None, None)
    };

    YtdMetric {
        rate_date: date,
        base_currency: pair.base,
        quote_currency: pair.quote,
        ytd_avg_rate: round_rate(mean),
        ytd_min_rate: round_rate(min),
        ytd_max_rate: round_rate(max),
        ytd_first_rate: round_rate(first),
        ytd_last_rate: round_rate(last),
        ytd_days_count: count as u32,
        ytd_variance: variance,
        ytd_std_dev: std_dev,
        ytd_change_pct: round_pct(change_pct),
    }
}
