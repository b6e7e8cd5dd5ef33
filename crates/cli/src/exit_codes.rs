//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Code    | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, unknown format) |
//! | 3       | Universal        | File could not be read or written        |
//! | 60-69   | recon            | Ledger reconciliation codes              |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use clinic_recon::ReconError;

// =============================================================================
// Universal (0-3)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unsupported input file extension.
pub const EXIT_USAGE: u8 = 2;

/// Input, config, or output file could not be read or written.
pub const EXIT_IO: u8 = 3;

// =============================================================================
// Recon (60-69)
// =============================================================================

/// Malformed CSV or JSON ledger.
pub const EXIT_RECON_PARSE: u8 = 60;

/// One ledger has no rows after parsing.
pub const EXIT_RECON_EMPTY_INPUT: u8 = 61;

/// No payment date in the collections ledger starts with `YYYY-MM`.
pub const EXIT_RECON_NO_TARGET_MONTH: u8 = 62;

/// Keyword config failed to parse or validate.
pub const EXIT_RECON_INVALID_CONFIG: u8 = 63;

/// Residual beyond tolerance. Only returned with `--strict`.
pub const EXIT_RECON_UNEXPLAINED: u8 = 64;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::Parse { .. } => EXIT_RECON_PARSE,
        ReconError::EmptyInput { .. } => EXIT_RECON_EMPTY_INPUT,
        ReconError::NoTargetMonth => EXIT_RECON_NO_TARGET_MONTH,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_RECON_INVALID_CONFIG,
    }
}
