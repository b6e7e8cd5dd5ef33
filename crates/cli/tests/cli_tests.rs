// Integration tests for the crecon binary: exit codes and the --json contract.
//
// Run with: cargo test -p clinic-recon-cli --test cli_tests -- --nocapture

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn crecon() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_crecon"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("CRECON_CONFIG");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../recon/tests/fixtures")
}

fn fixture(name: &str) -> String {
    fixtures_dir().join(name).to_string_lossy().into_owned()
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

fn run(args: &[&str]) -> Output {
    crecon().args(args).output().expect("run crecon")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Assert stdout is a single, parseable JSON value.
fn single_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let trimmed = stdout.trim();
    assert!(!trimmed.is_empty(), "stdout should not be empty");
    serde_json::from_str(trimmed).unwrap_or_else(|e| {
        panic!("stdout must be one JSON value.\nParse error: {e}\nstdout:\n{trimmed}")
    })
}

const REVENUE: &str = "환자명,접수번호,진료일,총매출\n김하나,R1,2026-02-03,1000\n";
const COLLECTIONS: &str = "환자명,접수번호,수납일,진료일,카드\n김하나,R1,2026-02-03,2026-02-03,1000\n";

// ===========================================================================
// crecon run
// ===========================================================================

#[test]
fn run_json_envelope() {
    let output = run(&[
        "run",
        &fixture("collections.csv"),
        &fixture("revenue.csv"),
        "--json",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let val = single_json(&output);
    let meta = &val["meta"];
    assert_eq!(meta["config_name"], "default");
    assert_eq!(meta["engine_version"], env!("CARGO_PKG_VERSION"));
    assert!(meta["run_at"].as_str().is_some_and(|s| s.contains('T')));
    assert!(meta["revenue_file"].as_str().unwrap().ends_with("revenue.csv"));
    assert!(meta["collections_file"].as_str().unwrap().ends_with("collections.csv"));

    let report = &val["report"];
    assert_eq!(report["target_month"], "2026-02");
    assert_eq!(report["total_difference"], -98000.0);
    assert_eq!(report["unsettled_billing"]["total"], -115000.0);
    assert_eq!(report["residual"], 0.0);

    assert_eq!(val["summary"]["fully_explained"], true);
    assert_eq!(val["summary"]["cause_counts"]["prior_month_payment"], 2);
}

#[test]
fn run_human_summary_goes_to_stderr() {
    let output = run(&["run", &fixture("revenue.csv"), &fixture("collections.csv")]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty(), "no stdout without --json");

    let err = stderr(&output);
    assert!(err.contains("2026-02 reconciliation"));
    assert!(err.contains("-98,000원"));
    assert!(err.contains("[A]"));
    assert!(err.contains("[B]"));
    assert!(err.contains("[C]"));
    assert!(err.contains("prepay used"));
    assert!(err.contains("residual 0원"));
}

#[test]
fn run_without_causes() {
    let dir = tempfile::tempdir().unwrap();
    let revenue = write(dir.path(), "revenue.csv", REVENUE);
    let collections = write(dir.path(), "collections.csv", COLLECTIONS);

    let output = run(&["run", &revenue, &collections, "--strict"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("no discrepancy causes found"));
}

#[test]
fn run_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("result.json");

    let output = run(&[
        "run",
        &fixture("revenue.csv"),
        &fixture("collections.csv"),
        "--output",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["report"]["target_month"], "2026-02");
}

#[test]
fn run_with_config_and_strict() {
    let config = fixture("english.recon.toml");
    let revenue = fixture("revenue-en.json");
    let collections = fixture("collections-en.csv");

    let output = run(&["run", &revenue, &collections, "--config", &config, "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let val = single_json(&output);
    assert_eq!(val["meta"]["config_name"], "english export");
    assert_eq!(val["report"]["residual"], 40.0);
    assert_eq!(val["summary"]["fully_explained"], false);

    let strict = run(&["run", &revenue, &collections, "--config", &config, "--strict"]);
    assert_eq!(strict.status.code(), Some(64));
    assert!(stderr(&strict).contains("error: +40원"));
}

// ===========================================================================
// Exit codes
// ===========================================================================

#[test]
fn exit_61_empty_collections() {
    let dir = tempfile::tempdir().unwrap();
    let revenue = write(dir.path(), "revenue.csv", REVENUE);
    let collections = write(dir.path(), "collections.csv", "환자명,수납일,카드\n");

    let output = run(&["run", &revenue, &collections]);
    assert_eq!(output.status.code(), Some(61));
    let err = stderr(&output);
    assert!(err.contains("collections ledger has no rows"));
    assert!(err.contains("hint:"));
}

#[test]
fn exit_62_no_target_month() {
    let dir = tempfile::tempdir().unwrap();
    let revenue = write(dir.path(), "revenue.csv", REVENUE);
    let collections = write(
        dir.path(),
        "collections.csv",
        "환자명,수납일,카드\n김하나,02/03/2026,1000\n",
    );

    let output = run(&["run", &revenue, &collections]);
    assert_eq!(output.status.code(), Some(62));
    assert!(stderr(&output).contains("YYYY-MM"));
}

#[test]
fn exit_60_malformed_json() {
    let dir = tempfile::tempdir().unwrap();
    let revenue = write(dir.path(), "revenue.json", "[{\"총매출\": 1000,");
    let collections = write(dir.path(), "collections.csv", COLLECTIONS);

    let output = run(&["run", &revenue, &collections]);
    assert_eq!(output.status.code(), Some(60));
    assert!(stderr(&output).contains("revenue.json"));
}

#[test]
fn exit_2_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let revenue = write(dir.path(), "revenue.xlsx", "");
    let collections = write(dir.path(), "collections.csv", COLLECTIONS);

    let output = run(&["run", &revenue, &collections]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains(".csv or .json"));
}

#[test]
fn exit_3_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.csv");
    let collections = write(dir.path(), "collections.csv", COLLECTIONS);

    let output = run(&["run", missing.to_str().unwrap(), &collections]);
    assert_eq!(output.status.code(), Some(3));
}

// ===========================================================================
// crecon classify / validate
// ===========================================================================

#[test]
fn classify_json_names_revenue_file() {
    let output = run(&[
        "classify",
        &fixture("collections.csv"),
        &fixture("revenue.csv"),
        "--json",
    ]);
    assert!(output.status.success());

    let val = single_json(&output);
    assert!(val["revenue_file"].as_str().unwrap().ends_with("revenue.csv"));
    assert_eq!(val["rule"], "revenue_marker");
}

#[test]
fn classify_falls_back_to_collections_marker() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.csv", "수납일,금액\n2026-02-01,100\n");
    let b = write(dir.path(), "b.csv", "진료일,금액\n2026-02-01,100\n");

    let output = run(&["classify", &a, &b, "--json"]);
    let val = single_json(&output);
    assert!(val["revenue_file"].as_str().unwrap().ends_with("b.csv"));
    assert_eq!(val["rule"], "collections_marker");
}

#[test]
fn validate_accepts_fixture_config() {
    let output = run(&["validate", &fixture("english.recon.toml")]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("valid: keyword config 'english export'"));
}

#[test]
fn validate_rejects_negative_tolerance() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "bad.recon.toml", "[tolerance]\nresidual = -1.0\n");

    let output = run(&["validate", &config]);
    assert_eq!(output.status.code(), Some(63));
    assert!(stderr(&output).contains("tolerance.residual"));
}

#[test]
fn validate_rejects_unknown_keys() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "bad.recon.toml", "[fields]\npatient = [\"Name\"]\n");

    let output = run(&["validate", &config]);
    assert_eq!(output.status.code(), Some(63));
}
