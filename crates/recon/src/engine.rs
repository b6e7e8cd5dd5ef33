use crate::classify::classify;
use crate::config::ReconConfig;
use crate::decompose::decompose;
use crate::error::ReconError;
use crate::model::{LedgerKind, RawRecord, ReconciliationReport};
use crate::month::select_target_month;
use crate::normalize::{normalize_collections, normalize_revenue};
use crate::resolve::{FieldLookup, SubstringLookup};

/// Reconcile two ledgers with the built-in keywords. Argument order does not
/// say which ledger is which; the classifier decides.
pub fn run(first: &[RawRecord], second: &[RawRecord]) -> Result<ReconciliationReport, ReconError> {
    run_with(&ReconConfig::default(), &SubstringLookup, first, second)
}

/// Reconcile with an explicit config and column lookup strategy.
pub fn run_with<L: FieldLookup + ?Sized>(
    config: &ReconConfig,
    lookup: &L,
    first: &[RawRecord],
    second: &[RawRecord],
) -> Result<ReconciliationReport, ReconError> {
    let inputs = classify(first, second, &config.classify);

    let collections = normalize_collections(inputs.collections, &config.fields, lookup);
    let revenue = normalize_revenue(inputs.revenue, &config.fields, lookup);

    if revenue.is_empty() {
        return Err(ReconError::EmptyInput { ledger: LedgerKind::Revenue });
    }
    if collections.is_empty() {
        return Err(ReconError::EmptyInput { ledger: LedgerKind::Collections });
    }

    let (target_month, month_counts) = select_target_month(&collections)?;
    let d = decompose(&collections, &revenue, &target_month);

    if d.residual.abs() > config.tolerance.residual {
        log::warn!(
            "{target_month}: {} of {} difference not explained by any known cause",
            d.residual,
            d.total_difference,
        );
    }

    Ok(ReconciliationReport {
        target_month,
        month_counts,
        classification: inputs.classification,
        collection_rows: collections.len(),
        revenue_rows: revenue.len(),
        total_settled: d.total_settled,
        total_billed: d.total_billed,
        total_difference: d.total_difference,
        prior_month_refunds: d.prior_month_refunds,
        prior_month_payments: d.prior_month_payments,
        unsettled_billing: d.unsettled_billing,
        prepay_by_name: d.prepay_by_name,
        residual: d.residual,
    })
}
