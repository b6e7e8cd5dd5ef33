use std::path::PathBuf;

use clinic_recon::evidence::{cause_lines, compute_summary};
use clinic_recon::ingest::{parse_csv, parse_json};
use clinic_recon::model::{ClassifyRule, InputSide, MonthCount, PrepayNote};
use clinic_recon::{run, run_with, Cause, RawRecord, ReconConfig, ReconError, SubstringLookup};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load(name: &str) -> Vec<RawRecord> {
    let path = fixtures_dir().join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    if name.ends_with(".json") {
        parse_json(name, &text).unwrap()
    } else {
        parse_csv(name, &text).unwrap()
    }
}

fn names<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    lines.into_iter().collect()
}

// -------------------------------------------------------------------------
// Korean clinic export, default keywords
// -------------------------------------------------------------------------

#[test]
fn february_is_fully_explained() {
    let revenue = load("revenue.csv");
    let collections = load("collections.csv");

    let report = run(&revenue, &collections).unwrap();

    assert_eq!(report.target_month, "2026-02");
    assert_eq!(
        report.month_counts,
        vec![
            MonthCount { month: "2026-02".into(), rows: 5 },
            MonthCount { month: "2026-01".into(), rows: 1 },
        ]
    );
    assert_eq!(report.revenue_rows, 6);
    assert_eq!(report.collection_rows, 6);

    assert_eq!(report.total_settled, 59500.0);
    assert_eq!(report.total_billed, 157500.0);
    assert_eq!(report.total_difference, -98000.0);

    assert_eq!(report.prior_month_refunds.total, -8000.0);
    assert_eq!(
        names(report.prior_month_refunds.entries.iter().map(|e| e.name.as_str())),
        vec!["오세훈"]
    );

    assert_eq!(report.prior_month_payments.total, 25000.0);
    assert_eq!(
        names(report.prior_month_payments.entries.iter().map(|e| e.name.as_str())),
        vec!["한지민", "윤아름"]
    );

    assert_eq!(report.unsettled_billing.total, -115000.0);
    assert_eq!(
        names(report.unsettled_billing.entries.iter().map(|e| e.name.as_str())),
        vec!["박지은", "최유리", "정하늘"]
    );

    assert_eq!(report.explained(), -98000.0);
    assert_eq!(report.residual, 0.0);
    assert!(report.is_explained(0.5));
}

#[test]
fn argument_order_does_not_matter() {
    let revenue = load("revenue.csv");
    let collections = load("collections.csv");

    let forward = run(&revenue, &collections).unwrap();
    let backward = run(&collections, &revenue).unwrap();

    assert_eq!(forward.classification.revenue, InputSide::First);
    assert_eq!(backward.classification.revenue, InputSide::Second);
    assert_eq!(forward.classification.rule, ClassifyRule::RevenueMarker);

    assert_eq!(forward.total_difference, backward.total_difference);
    assert_eq!(forward.prior_month_refunds, backward.prior_month_refunds);
    assert_eq!(forward.prior_month_payments, backward.prior_month_payments);
    assert_eq!(forward.unsettled_billing, backward.unsettled_billing);
    assert_eq!(forward.residual, backward.residual);
}

#[test]
fn unsettled_lines_note_prepay_usage() {
    let report = run(&load("revenue.csv"), &load("collections.csv")).unwrap();
    let lines = cause_lines(&report, Cause::UnsettledBilling);

    let notes: Vec<(&str, Option<PrepayNote>)> =
        lines.iter().map(|l| (l.name.as_str(), l.note)).collect();
    assert_eq!(
        notes,
        vec![
            ("박지은", Some(PrepayNote::Outstanding)),
            ("최유리", Some(PrepayNote::PrepayUsed)),
            ("정하늘", Some(PrepayNote::Outstanding)),
        ]
    );
    assert_eq!(lines[0].date, "2026-02-05");
    assert_eq!(lines[0].amount, -50000.0);
}

#[test]
fn summary_of_fixture_run() {
    let report = run(&load("revenue.csv"), &load("collections.csv")).unwrap();
    let summary = compute_summary(&report, 0.5);

    assert_eq!(summary.cause_counts["prior_month_refund"], 1);
    assert_eq!(summary.cause_counts["prior_month_payment"], 2);
    assert_eq!(summary.cause_counts["unsettled_billing"], 3);
    assert!(summary.fully_explained);
}

#[test]
fn summary_serializes_with_stable_keys() {
    let report = run(&load("revenue.csv"), &load("collections.csv")).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["target_month"], "2026-02");
    assert_eq!(json["unsettled_billing"]["cause"], "unsettled_billing");
    assert_eq!(json["unsettled_billing"]["entries"][0]["name"], "박지은");
    assert_eq!(json["classification"]["rule"], "revenue_marker");
}

#[test]
fn revenue_only_input_reports_empty_collections() {
    let revenue = load("revenue.csv");
    let err = run(&revenue, &[]).unwrap_err();
    assert!(matches!(err, ReconError::EmptyInput { .. }));
    assert!(err.to_string().contains("collections"));
}

// -------------------------------------------------------------------------
// Custom keywords from a config file
// -------------------------------------------------------------------------

fn english_config() -> ReconConfig {
    let toml = std::fs::read_to_string(fixtures_dir().join("english.recon.toml")).unwrap();
    ReconConfig::from_toml(&toml).unwrap()
}

#[test]
fn english_export_with_config() {
    let config = english_config();
    assert_eq!(config.display_name(), "english export");

    let revenue = load("revenue-en.json");
    let collections = load("collections-en.csv");
    let report = run_with(&config, &SubstringLookup, &collections, &revenue).unwrap();

    assert_eq!(report.classification.revenue, InputSide::Second);
    assert_eq!(report.total_settled, 225.0);
    assert_eq!(report.total_billed, 165.0);
    assert_eq!(report.total_difference, 60.0);

    assert!(report.prior_month_refunds.is_empty());
    assert_eq!(report.prior_month_payments.total, 60.0);
    assert_eq!(report.unsettled_billing.entries.len(), 1);
    assert_eq!(report.unsettled_billing.entries[0].name, "Bo");
    assert_eq!(report.prepay_note("Bo"), PrepayNote::PrepayUsed);

    // Bo's deposit was collected against a visit the revenue side dates differently.
    assert_eq!(report.residual, 40.0);
    assert!(!report.is_explained(config.tolerance.residual));
}

#[test]
fn numeric_identifier_matches_text_identifier() {
    let config = english_config();
    let report =
        run_with(&config, &SubstringLookup, &load("revenue-en.json"), &load("collections-en.csv"))
            .unwrap();
    assert!(report
        .unsettled_billing
        .entries
        .iter()
        .all(|e| e.name != "Cy"));
}

#[test]
fn default_keywords_miss_english_columns() {
    // Without the config nothing resolves, so no payment month is found.
    let err = run(&load("revenue-en.json"), &load("collections-en.csv")).unwrap_err();
    assert_eq!(err, ReconError::NoTargetMonth);
}
