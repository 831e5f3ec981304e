use ride_experiments::{
    export_to_csv, export_to_json, export_to_parquet, MarketplaceResult, ParameterSpace,
};

fn fabricated_result(conversion: f64) -> MarketplaceResult {
    MarketplaceResult {
        total_riders: 50,
        total_drivers: 10,
        completed_rides: (conversion * 50.0) as usize,
        cancelled_riders: 3,
        expired_requests: 4,
        refused_requests: 1,
        conversion_rate: conversion,
        platform_revenue: 4_200.0,
        driver_payouts: 23_800.0,
        total_fares_collected: 28_000.0,
        loyalty_points_issued: 270,
        avg_time_to_assign_ms: 21_000.0,
        median_time_to_assign_ms: 19_500.0,
        p90_time_to_assign_ms: 31_000.0,
        avg_time_to_pickup_ms: 240_000.0,
        median_time_to_pickup_ms: 220_000.0,
        p90_time_to_pickup_ms: 400_000.0,
    }
}

#[test]
fn csv_export_writes_header_and_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("results.csv");
    let sets = ParameterSpace::grid()
        .commission_percent(vec![10.0, 20.0])
        .generate();
    let results = vec![fabricated_result(0.8), fabricated_result(0.6)];

    export_to_csv(&results, &sets, &path).expect("csv export");

    let contents = std::fs::read_to_string(&path).expect("read csv");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("experiment_id,run_id,seed,commission_percent"));
    assert!(lines[1].contains("exp_0"));
    assert!(lines[2].contains("exp_1"));
    assert!(lines[2].contains("20"));
}

#[test]
fn json_export_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("results.json");
    let sets = ParameterSpace::grid().commission_percent(vec![12.5]).generate();
    let results = vec![fabricated_result(0.7)];

    export_to_json(&results, &sets, &path).expect("json export");

    let contents = std::fs::read_to_string(&path).expect("read json");
    let value: serde_json::Value = serde_json::from_str(&contents).expect("parse json");
    let rows = value.as_array().expect("array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["experiment_id"], "exp_0");
    assert_eq!(rows[0]["knobs"]["commission_percent"], 12.5);
    assert_eq!(rows[0]["result"]["conversion_rate"], 0.7);
}

#[test]
fn parquet_export_produces_a_parquet_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("results.parquet");
    let sets = ParameterSpace::grid()
        .commission_percent(vec![10.0, 15.0])
        .generate();
    let results = vec![fabricated_result(0.8), fabricated_result(0.5)];

    export_to_parquet(&results, &sets, &path).expect("parquet export");

    let bytes = std::fs::read(&path).expect("read parquet");
    assert_eq!(&bytes[..4], b"PAR1");
}

#[test]
fn mismatched_lengths_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bad.csv");
    let sets = ParameterSpace::grid().commission_percent(vec![10.0]).generate();
    let results: Vec<MarketplaceResult> = vec![];

    assert!(export_to_csv(&results, &sets, &path).is_err());
}
