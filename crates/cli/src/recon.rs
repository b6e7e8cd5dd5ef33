//! `crecon run`, `crecon classify` and `crecon validate`: ledger loading, output, exit codes.

use std::path::{Path, PathBuf};

use serde::Serialize;

use clinic_recon::classify::classify;
use clinic_recon::evidence::{cause_lines, compute_summary, ReconSummary};
use clinic_recon::ingest::{parse_csv, parse_json};
use clinic_recon::model::InputSide;
use clinic_recon::{Cause, RawRecord, ReconConfig, ReconError, ReconciliationReport};

use crate::exit_codes::{recon_exit_code, EXIT_IO, EXIT_RECON_UNEXPLAINED, EXIT_USAGE};
use crate::util::{pad_left, pad_right, format_won, format_won_signed};
use crate::CliError;

fn recon_err(err: ReconError) -> CliError {
    let hint = match &err {
        ReconError::EmptyInput { .. } => {
            Some("use --config to map this export's column names".to_string())
        }
        ReconError::NoTargetMonth => {
            Some("payment dates must start with YYYY-MM, e.g. 2026-02-03".to_string())
        }
        _ => None,
    };
    CliError { code: recon_exit_code(&err), message: err.to_string(), hint }
}

fn io_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_IO, message: msg.into(), hint: None }
}

// ============================================================================
// Loading
// ============================================================================

type ParseFn = fn(&str, &str) -> Result<Vec<RawRecord>, ReconError>;

/// Pick a parser from the file extension (case-insensitive).
fn parser_for(path: &Path) -> Result<ParseFn, CliError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("csv") => Ok(parse_csv as ParseFn),
        Some("json") => Ok(parse_json as ParseFn),
        _ => Err(CliError {
            code: EXIT_USAGE,
            message: format!("unsupported ledger file: {}", path.display()),
            hint: Some("export the ledger as .csv or .json".to_string()),
        }),
    }
}

fn load_ledger(path: &Path) -> Result<Vec<RawRecord>, CliError> {
    let parse = parser_for(path)?;
    let source = path.display().to_string();
    let text = std::fs::read_to_string(path)
        .map_err(|e| io_err(format!("cannot read {source}: {e}")))?;
    parse(&source, &text).map_err(recon_err)
}

fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        return Ok(ReconConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| io_err(format!("cannot read config: {e}")))?;
    let config = ReconConfig::from_toml(&text).map_err(recon_err)?;
    log::info!("keyword config '{}' from {}", config.display_name(), path.display());
    Ok(config)
}

fn side_path<'a>(side: InputSide, first: &'a Path, second: &'a Path) -> &'a Path {
    match side {
        InputSide::First => first,
        InputSide::Second => second,
    }
}

// ============================================================================
// run
// ============================================================================

#[derive(Serialize)]
struct RunMeta {
    engine_version: String,
    run_at: String,
    revenue_file: String,
    collections_file: String,
    config_name: String,
}

#[derive(Serialize)]
struct RunOutput<'a> {
    meta: RunMeta,
    summary: ReconSummary,
    report: &'a ReconciliationReport,
}

pub fn cmd_run(
    first: PathBuf,
    second: PathBuf,
    config_path: Option<PathBuf>,
    json_output: bool,
    output_file: Option<PathBuf>,
    strict: bool,
) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;
    let first_rows = load_ledger(&first)?;
    let second_rows = load_ledger(&second)?;

    let report = clinic_recon::run_with(
        &config,
        &clinic_recon::SubstringLookup,
        &first_rows,
        &second_rows,
    )
    .map_err(recon_err)?;

    let revenue_path = side_path(report.classification.revenue, &first, &second);
    let collections_path = side_path(report.classification.collections(), &first, &second);

    let output = RunOutput {
        meta: RunMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            revenue_file: revenue_path.display().to_string(),
            collections_file: collections_path.display().to_string(),
            config_name: config.display_name().to_string(),
        },
        summary: compute_summary(&report, config.tolerance.residual),
        report: &report,
    };

    let json_str = serde_json::to_string_pretty(&output)
        .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| io_err(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    print_summary(&report, &output.meta);

    if strict && !output.summary.fully_explained {
        return Err(CliError {
            code: EXIT_RECON_UNEXPLAINED,
            message: format!(
                "{} of the difference is not explained (tolerance {})",
                format_won_signed(report.residual),
                config.tolerance.residual,
            ),
            hint: Some("look for same-month amount mismatches between the two ledgers".into()),
        });
    }

    Ok(())
}

const NAME_WIDTH: usize = 12;
const DATE_WIDTH: usize = 12;
const AMOUNT_WIDTH: usize = 14;

/// Human summary to stderr.
fn print_summary(report: &ReconciliationReport, meta: &RunMeta) {
    eprintln!("{} reconciliation (config: {})", report.target_month, meta.config_name);
    eprintln!(
        "  revenue:     {} ({} rows, by {})",
        meta.revenue_file, report.revenue_rows, report.classification.rule
    );
    eprintln!("  collections: {} ({} rows)", meta.collections_file, report.collection_rows);
    eprintln!();
    eprintln!("  {}{}", pad_right("collections total", 22), pad_left(&format_won(report.total_settled), AMOUNT_WIDTH));
    eprintln!("  {}{}", pad_right("revenue total", 22), pad_left(&format_won(report.total_billed), AMOUNT_WIDTH));
    eprintln!("  {}{}", pad_right("difference", 22), pad_left(&format_won_signed(report.total_difference), AMOUNT_WIDTH));
    eprintln!();

    if !report.has_causes() {
        eprintln!("no discrepancy causes found");
    }

    for cause in Cause::ALL {
        if report.cause_count(cause) == 0 {
            continue;
        }
        eprintln!(
            "[{}] {} ({} rows)  {}",
            cause.tag(),
            cause.title(),
            report.cause_count(cause),
            format_won_signed(report.cause_total(cause)),
        );
        for line in cause_lines(report, cause) {
            // Unsettled rows show what was billed, not the signed effect.
            let amount = match cause {
                Cause::UnsettledBilling => format_won(0.0 - line.amount),
                _ => format_won(line.amount),
            };
            let note = line.note.map(|n| format!("  {n}")).unwrap_or_default();
            eprintln!(
                "    {}{}{}{}",
                pad_right(&line.name, NAME_WIDTH),
                pad_right(&line.date, DATE_WIDTH),
                pad_left(&amount, AMOUNT_WIDTH),
                note,
            );
        }
        eprintln!();
    }

    eprintln!("verification");
    eprintln!("  {}{}", pad_right("revenue total", 26), pad_left(&format_won(report.total_billed), AMOUNT_WIDTH));
    for cause in Cause::ALL {
        eprintln!(
            "  {}{}",
            pad_right(&format!("cause {}", cause.tag()), 26),
            pad_left(&format_won_signed(report.cause_total(cause)), AMOUNT_WIDTH),
        );
    }
    eprintln!(
        "  {}{}",
        pad_right("= computed collections", 26),
        pad_left(&format_won(report.total_billed + report.explained()), AMOUNT_WIDTH),
    );
    eprintln!("residual {}", format_won_signed(report.residual));
}

// ============================================================================
// classify
// ============================================================================

#[derive(Serialize)]
struct ClassifyOutput {
    revenue_file: String,
    collections_file: String,
    rule: String,
}

pub fn cmd_classify(
    first: PathBuf,
    second: PathBuf,
    config_path: Option<PathBuf>,
    json_output: bool,
) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;
    let first_rows = load_ledger(&first)?;
    let second_rows = load_ledger(&second)?;

    let classification = classify(&first_rows, &second_rows, &config.classify).classification;
    let output = ClassifyOutput {
        revenue_file: side_path(classification.revenue, &first, &second).display().to_string(),
        collections_file: side_path(classification.collections(), &first, &second)
            .display()
            .to_string(),
        rule: classification.rule.to_string(),
    };

    if json_output {
        let json_str = serde_json::to_string_pretty(&output)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    } else {
        println!("revenue:     {}", output.revenue_file);
        println!("collections: {}", output.collections_file);
        println!("rule:        {}", output.rule);
    }
    Ok(())
}

// ============================================================================
// validate
// ============================================================================

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(Some(&config_path))?;
    eprintln!(
        "valid: keyword config '{}' with {} revenue marker(s), residual tolerance {}",
        config.display_name(),
        config.classify.revenue_markers.len(),
        config.tolerance.residual,
    );
    Ok(())
}
