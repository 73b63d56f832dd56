//! Integration tests for the FX pipeline
//!
//! Exercises the stages end to end against canned Frankfurter payloads
//! and a real SQLite file, without touching the network.

use chrono::NaiveDate;
use fx_pipeline::config::PipelineConfig;
use fx_pipeline::csvio;
use fx_pipeline::currency::{Currency, CurrencyPair};
use fx_pipeline::error::PipelineError;
use fx_pipeline::extract::parse_rates;
use fx_pipeline::load::{self, LoadOptions};
use fx_pipeline::stage::{self, StageStep};
use fx_pipeline::transform::{self, TransformOptions};
use fx_pipeline::types::{CrossRate, RawRate, YtdMetric};
use fx_pipeline::warehouse::Warehouse;
use rusqlite::Connection;
use tempfile::TempDir;

const PAYLOAD: &str = r#"{
    "amount": 1.0,
    "base": "EUR",
    "start_date": "2024-01-02",
    "end_date": "2024-01-04",
    "rates": {
        "2024-01-02": {"NOK": 11.2945, "SEK": 11.1405, "DKK": 7.4562},
        "2024-01-03": {"NOK": 11.3145, "SEK": 11.1785, "DKK": 7.4565},
        "2024-01-04": {"NOK": 11.3675, "SEK": 11.2205, "DKK": 7.4568}
    }
}"#;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn test_config(dir: &TempDir) -> PipelineConfig {
    PipelineConfig {
        currencies: vec![Currency::NOK, Currency::EUR, Currency::SEK, Currency::DKK],
        api_base_url: "http://localhost:0".to_string(),
        db_path: dir.path().join("fx_dwh.sqlite"),
        start_date: date("2024-01-01"),
        temp_dir: dir.path().to_path_buf(),
        extract_output: dir.path().join("raw_fx_data.csv"),
        cross_output: dir.path().join("cross_fx_data.csv"),
        ytd_output: dir.path().join("ytd_metrics.csv"),
    }
}

/// Parse the canned payload and write it where extract would
fn seed_raw_csv(config: &PipelineConfig) -> usize {
    let rows = parse_rates(PAYLOAD).unwrap();
    csvio::write_records(&config.extract_output, &rows).unwrap();
    rows.len()
}

#[test]
fn test_payload_flattens_to_one_row_per_observation() {
    let rows = parse_rates(PAYLOAD).unwrap();

    // 3 dates x 3 quotes
    assert_eq!(rows.len(), 9);
    assert!(rows.iter().all(|r| r.base_currency == Currency::EUR));

    let jan2_nok = rows
        .iter()
        .find(|r| r.rate_date == date("2024-01-02") && r.quote_currency == Currency::NOK)
        .unwrap();
    assert_eq!(jan2_nok.exchange_rate, 11.2945);
}

#[test]
fn test_transform_then_load_fills_the_warehouse() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    seed_raw_csv(&config);

    let transformed = transform::run(&config, &TransformOptions::default()).unwrap();
    // 4 currencies -> 12 ordered pairs per date, 3 dates, cross + ytd
    assert_eq!(transformed, 72);

    let loaded = load::run(&config, &LoadOptions::default()).unwrap();
    assert_eq!(loaded, 72);

    let warehouse = Warehouse::open(&config.db_path).unwrap();
    let summary = warehouse.verify_load().unwrap();
    assert_eq!(summary.daily_row_count, 36);
    assert_eq!(summary.ytd_row_count, 36);
    assert_eq!(summary.distinct_pair_count, 12);
    assert_eq!(summary.max_date, Some(date("2024-01-04")));
}

#[test]
fn test_derived_rates_match_quotient_in_warehouse() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    seed_raw_csv(&config);
    transform::run(&config, &TransformOptions::default()).unwrap();
    load::run(&config, &LoadOptions::default()).unwrap();

    let conn = Connection::open(&config.db_path).unwrap();
    let nok_sek: f64 = conn
        .query_row(
            "SELECT exchange_rate FROM fact_fx_rates_daily
             WHERE rate_date = '2024-01-02'
               AND base_currency = 'NOK' AND quote_currency = 'SEK'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    let expected = (11.1405f64 / 11.2945 * 1e8).round() / 1e8;
    assert_eq!(nok_sek, expected);

    // EUR-based pairs reproduce the raw quote exactly
    let eur_nok: f64 = conn
        .query_row(
            "SELECT exchange_rate FROM fact_fx_rates_daily
             WHERE rate_date = '2024-01-02'
               AND base_currency = 'EUR' AND quote_currency = 'NOK'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(eur_nok, 11.2945);
}

#[test]
fn test_reciprocal_pairs_round_trip_to_one() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    seed_raw_csv(&config);
    transform::run(&config, &TransformOptions::default()).unwrap();

    let cross: Vec<CrossRate> = csvio::read_records(&config.cross_output).unwrap();
    for rate in &cross {
        let counterpart = CurrencyPair::new(rate.base_currency, rate.quote_currency).inverse();
        let inverse = cross
            .iter()
            .find(|r| {
                r.rate_date == rate.rate_date
                    && r.base_currency == counterpart.base
                    && r.quote_currency == counterpart.quote
            })
            .unwrap();
        let product = rate.exchange_rate * inverse.exchange_rate;
        assert!(
            (product - 1.0).abs() < 1e-6,
            "{}/{} * inverse = {}",
            rate.base_currency,
            rate.quote_currency,
            product
        );
    }
}

#[test]
fn test_no_self_pairs_in_cross_output() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    seed_raw_csv(&config);
    transform::run(&config, &TransformOptions::default()).unwrap();

    let cross: Vec<CrossRate> = csvio::read_records(&config.cross_output).unwrap();
    assert!(cross.iter().all(|r| r.base_currency != r.quote_currency));
}

#[test]
fn test_ytd_windows_accumulate_across_the_range() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    seed_raw_csv(&config);
    transform::run(&config, &TransformOptions::default()).unwrap();

    let metrics: Vec<YtdMetric> = csvio::read_records(&config.ytd_output).unwrap();
    let eur_nok: Vec<&YtdMetric> = metrics
        .iter()
        .filter(|m| m.base_currency == Currency::EUR && m.quote_currency == Currency::NOK)
        .collect();
    assert_eq!(eur_nok.len(), 3);

    assert_eq!(eur_nok[0].ytd_days_count, 1);
    assert_eq!(eur_nok[0].ytd_variance, None);
    assert_eq!(eur_nok[2].ytd_days_count, 3);
    assert_eq!(eur_nok[2].ytd_first_rate, 11.2945);
    assert_eq!(eur_nok[2].ytd_last_rate, 11.3675);
    assert_eq!(eur_nok[2].ytd_min_rate, 11.2945);
    assert_eq!(eur_nok[2].ytd_max_rate, 11.3675);
    assert!(eur_nok[2].ytd_variance.is_some());

    let expected_change = ((11.3675f64 - 11.2945) / 11.2945 * 100.0 * 1e4).round() / 1e4;
    assert_eq!(eur_nok[2].ytd_change_pct, expected_change);
}

#[test]
fn test_reloading_same_range_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    seed_raw_csv(&config);
    transform::run(&config, &TransformOptions::default()).unwrap();

    load::run(&config, &LoadOptions::default()).unwrap();
    let first = Warehouse::open(&config.db_path)
        .unwrap()
        .verify_load()
        .unwrap();

    load::run(&config, &LoadOptions::default()).unwrap();
    let second = Warehouse::open(&config.db_path)
        .unwrap()
        .verify_load()
        .unwrap();

    assert_eq!(first.daily_row_count, second.daily_row_count);
    assert_eq!(first.ytd_row_count, second.ytd_row_count);
}

#[test]
fn test_revised_rate_overwrites_daily_row() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    seed_raw_csv(&config);
    transform::run(&config, &TransformOptions::default()).unwrap();
    load::run(&config, &LoadOptions::default()).unwrap();

    // the source restates one day's NOK fixing
    let mut raw = parse_rates(PAYLOAD).unwrap();
    for row in &mut raw {
        if row.rate_date == date("2024-01-03") && row.quote_currency == Currency::NOK {
            row.exchange_rate = 11.5;
        }
    }
    csvio::write_records(&config.extract_output, &raw).unwrap();
    transform::run(&config, &TransformOptions::default()).unwrap();
    load::run(&config, &LoadOptions::default()).unwrap();

    let conn = Connection::open(&config.db_path).unwrap();
    let eur_nok: f64 = conn
        .query_row(
            "SELECT exchange_rate FROM fact_fx_rates_daily
             WHERE rate_date = '2024-01-03'
               AND base_currency = 'EUR' AND quote_currency = 'NOK'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(eur_nok, 11.5);

    // row count unchanged: upsert, not append
    let summary = Warehouse::open(&config.db_path)
        .unwrap()
        .verify_load()
        .unwrap();
    assert_eq!(summary.daily_row_count, 36);
    assert_eq!(summary.ytd_row_count, 36);
}

#[test]
fn test_stage_runner_audits_success_and_failure() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    seed_raw_csv(&config);

    let report = stage::execute(&config, StageStep::Transform, || {
        transform::run(&config, &TransformOptions::default())
    });
    assert!(report.succeeded());
    assert_eq!(report.exit_code(), 0);

    // loading without the cross CSV fails but still audits
    std::fs::remove_file(&config.cross_output).unwrap();
    let report = stage::execute(&config, StageStep::Load, || {
        load::run(&config, &LoadOptions::default())
    });
    assert!(!report.succeeded());
    assert_eq!(report.exit_code(), 1);
    assert!(report.error.is_some());

    let conn = Connection::open(&config.db_path).unwrap();
    let mut stmt = conn
        .prepare("SELECT pipeline_step, status FROM pipeline_execution_log ORDER BY id")
        .unwrap();
    let audits: Vec<(String, String)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(
        audits,
        vec![
            ("transform".to_string(), "running".to_string()),
            ("transform".to_string(), "success".to_string()),
            ("load".to_string(), "running".to_string()),
            ("load".to_string(), "failed".to_string()),
        ]
    );
}

#[test]
fn test_missing_observation_drops_only_its_pairs() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    // DKK quote missing on the 3rd
    let raw = vec![
        RawRate::new(date("2024-01-02"), Currency::NOK, 11.2945),
        RawRate::new(date("2024-01-02"), Currency::SEK, 11.1405),
        RawRate::new(date("2024-01-02"), Currency::DKK, 7.4562),
        RawRate::new(date("2024-01-03"), Currency::NOK, 11.3145),
        RawRate::new(date("2024-01-03"), Currency::SEK, 11.1785),
    ];
    csvio::write_records(&config.extract_output, &raw).unwrap();
    transform::run(&config, &TransformOptions::default()).unwrap();

    let cross: Vec<CrossRate> = csvio::read_records(&config.cross_output).unwrap();
    let jan2 = cross
        .iter()
        .filter(|r| r.rate_date == date("2024-01-02"))
        .count();
    let jan3 = cross
        .iter()
        .filter(|r| r.rate_date == date("2024-01-03"))
        .count();

    // 4 currencies on the 2nd, 3 on the 3rd
    assert_eq!(jan2, 12);
    assert_eq!(jan3, 6);
    assert!(!cross
        .iter()
        .any(|r| r.rate_date == date("2024-01-03")
            && (r.base_currency == Currency::DKK || r.quote_currency == Currency::DKK)));
}

#[test]
fn test_malformed_raw_csv_fails_transform_with_context() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    std::fs::write(
        &config.extract_output,
        "rate_date,base_currency,quote_currency,exchange_rate\n\
         2024-01-02,EUR,NOK,abc\n",
    )
    .unwrap();

    let err = transform::run(&config, &TransformOptions::default()).unwrap_err();
    assert!(matches!(err, PipelineError::MalformedInput(_)));
    assert!(err.to_string().contains("record 1"));
}
