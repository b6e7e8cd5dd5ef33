// crecon - clinic revenue vs. collections reconciliation, headless

mod exit_codes;
mod recon;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "crecon")]
#[command(about = "Explain the monthly gap between a clinic's revenue and collections ledgers")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile two ledger exports and break the difference into causes
    #[command(after_help = "\
Examples:
  crecon run 매출통계.csv 수납내역.csv
  crecon run collections.csv revenue.csv --json
  crecon run revenue.json collections.csv --config english.recon.toml
  crecon run revenue.csv collections.csv --output feb.json --strict")]
    Run {
        /// First ledger export (.csv or .json); order does not matter
        first: PathBuf,

        /// Second ledger export (.csv or .json)
        second: PathBuf,

        /// Keyword config (TOML) for exports with different column names
        #[arg(long, short = 'c', env = "CRECON_CONFIG")]
        config: Option<PathBuf>,

        /// Output JSON to stdout in addition to the human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Exit 64 when the residual exceeds the configured tolerance
        #[arg(long)]
        strict: bool,
    },

    /// Report which export is revenue and which is collections
    #[command(after_help = "\
Examples:
  crecon classify a.csv b.csv
  crecon classify a.csv b.json --json")]
    Classify {
        /// First ledger export
        first: PathBuf,

        /// Second ledger export
        second: PathBuf,

        /// Keyword config (TOML)
        #[arg(long, short = 'c', env = "CRECON_CONFIG")]
        config: Option<PathBuf>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Validate a keyword config without running
    #[command(after_help = "\
Examples:
  crecon validate english.recon.toml")]
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  clinic-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  clinic-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            // No subcommand = show usage
            eprintln!("Usage: crecon <command> [options]");
            eprintln!("       crecon --help for more information");
            Ok(())
        }
        Some(Commands::Run { first, second, config, json, output, strict }) => {
            recon::cmd_run(first, second, config, json, output, strict)
        }
        Some(Commands::Classify { first, second, config, json }) => {
            recon::cmd_classify(first, second, config, json)
        }
        Some(Commands::Validate { config }) => recon::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }
}
