//! `clinic-recon`: revenue vs. collections reconciliation for clinic ledgers.
//!
//! Pure engine crate: receives parsed ledger rows, returns the monthly
//! discrepancy broken into timing causes. No CLI or filesystem dependencies.

pub mod classify;
pub mod config;
pub mod decompose;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod ingest;
pub mod model;
pub mod month;
pub mod normalize;
pub mod resolve;

pub use config::ReconConfig;
pub use engine::{run, run_with};
pub use error::ReconError;
pub use model::{
    Cause, CauseBucket, CollectionEntry, LedgerKind, RawCell, RawRecord, ReconciliationReport,
    RevenueEntry,
};
pub use resolve::{FieldLookup, SubstringLookup};
