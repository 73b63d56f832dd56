//! Cross-pair derivation from EUR-based observations
//!
//! Every rate carries an implicit EUR leg, so any ordered pair (B, Q)
//! prices as quote-per-EUR divided by base-per-EUR. A per-date lookup
//! table is built first; the pairing loop then reads only from that
//! table, which keeps the division step trivially testable.

use crate::currency::Currency;
use crate::types::{round_rate, CrossRate, RawRate};
use chrono::NaiveDate;
use hashbrown::HashMap;
use std::collections::BTreeMap;

/// Build one EUR-relative rate table per date
///
/// Quotes outside the universe are dropped. When EUR is part of the
/// universe it is pinned to exactly 1.0, so a stray EUR quote row in
/// the input can never displace the synthetic entry.
pub fn rate_tables(
    raw: &[RawRate],
    universe: &[Currency],
) -> BTreeMap<NaiveDate, HashMap<Currency, f64>> {
    let mut tables: BTreeMap<NaiveDate, HashMap<Currency, f64>> = BTreeMap::new();

    for row in raw {
        if !universe.contains(&row.quote_currency) {
            continue;
        }
        tables
            .entry(row.rate_date)
            .or_default()
            .insert(row.quote_currency, row.exchange_rate);
    }

    if universe.contains(&Currency::EUR) {
        for table in tables.values_mut() {
            table.insert(Currency::EUR, 1.0);
        }
    }

    tables
}

/// Expand raw EUR-based rates into all ordered cross pairs
///
/// For each date, every ordered pair of distinct universe currencies
/// with quotes available that day yields one row; currencies missing a
/// quote are skipped for that date. Output is ordered by date, then by
/// base and quote following universe order.
pub fn expand_cross_pairs(raw: &[RawRate], universe: &[Currency]) -> Vec<CrossRate> {
    let tables = rate_tables(raw, universe);
    let mut out = Vec::new();

    for (date, table) in &tables {
        for base in universe {
            let base_rate = match table.get(base) {
                Some(rate) => *rate,
                None => continue,
            };
            for quote in universe {
                if quote == base {
                    continue;
                }
                if let Some(quote_rate) = table.get(quote) {
                    out.push(CrossRate::new(
                        *date,
                        *base,
                        *quote,
                        round_rate(quote_rate / base_rate),
                    ));
                }
            }
        }
    }

    out
}
