use std::fmt;

use crate::model::LedgerKind;

#[derive(Debug, Clone, PartialEq)]
pub enum ReconError {
    /// A ledger produced zero rows after classification + normalization.
    EmptyInput { ledger: LedgerKind },
    /// No collections row carries a `YYYY-MM`-prefixed payment date.
    NoTargetMonth,
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty keyword list, negative tolerance, etc.).
    ConfigValidation(String),
    /// Malformed CSV / JSON text handed to the ingest adapters.
    Parse { source: String, message: String },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput { ledger } => write!(
                f,
                "{ledger} ledger has no rows after parsing; check the column names"
            ),
            Self::NoTargetMonth => write!(
                f,
                "cannot determine the reconciliation month: no payment date matches YYYY-MM"
            ),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Parse { source, message } => write!(f, "{source}: {message}"),
        }
    }
}

impl std::error::Error for ReconError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_names_ledger() {
        let err = ReconError::EmptyInput { ledger: LedgerKind::Collections };
        let msg = err.to_string();
        assert!(msg.starts_with("collections ledger"));
        assert!(msg.contains("column names"));
    }

    #[test]
    fn no_target_month_mentions_pattern() {
        assert!(ReconError::NoTargetMonth.to_string().contains("YYYY-MM"));
    }
}
